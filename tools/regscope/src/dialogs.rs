//! Concrete forms: datapoint editor, write prompt and connection settings

use crate::form::{Field, Form};
use errors::ValidationError;
use regscope_link::{ConnectionConfig, Parity, Transport};
use regscope_model::{Bound, DataType, Datapoint, Flag, Scaling, Value, ValueKind};

// ============================================================================
// Datapoint editor
// ============================================================================

pub const DP_SERVER_ID: usize = 0;
pub const DP_NAME: usize = 1;
pub const DP_DESCRIPTION: usize = 2;
pub const DP_ADDRESS: usize = 3;
pub const DP_FLAGS: usize = 4;
pub const DP_DATATYPE: usize = 5;
pub const DP_UNIT: usize = 6;
pub const DP_MIN_IN: usize = 7;
pub const DP_MAX_IN: usize = 8;
pub const DP_MIN_OUT: usize = 9;
pub const DP_MAX_OUT: usize = 10;

fn bound_field(bound: Bound) -> usize {
    match bound {
        Bound::MinIn => DP_MIN_IN,
        Bound::MaxIn => DP_MAX_IN,
        Bound::MinOut => DP_MIN_OUT,
        Bound::MaxOut => DP_MAX_OUT,
    }
}

/// Editor pre-filled from `dp`; a missing scaling shows the type's default
pub fn datapoint_form(title: &str, dp: &Datapoint) -> Form {
    let scaling = dp
        .scaling
        .clone()
        .unwrap_or_else(|| Scaling::default_for(dp.data_type));
    let flag_index = Flag::ALL.iter().position(|f| *f == dp.flag).unwrap_or(0);
    let type_index = DataType::ALL
        .iter()
        .position(|t| *t == dp.data_type)
        .unwrap_or(0);

    Form::new(
        title,
        vec![
            Field::int("Server ID", i64::from(dp.slave_id), 0, i64::from(u8::MAX)),
            Field::text("Name", dp.name.as_str()),
            Field::text("Description", dp.description.as_str()),
            Field::int("Address", i64::from(dp.addr), 0, i64::from(u16::MAX)),
            Field::select("Flags", Flag::ALL.iter().map(|f| f.label()), flag_index),
            Field::select(
                "Datatype",
                DataType::ALL.iter().map(|t| t.label()),
                type_index,
            ),
            Field::text("Unit", dp.unit.as_str()),
            Field::text("Input Min", scaling.min_in),
            Field::text("Max", scaling.max_in),
            Field::text("Output Min", scaling.min_out),
            Field::text("Max", scaling.max_out),
        ],
    )
}

/// Validate the editor and build the definition it describes
///
/// The result carries no reading. On failure the offending field is marked
/// and focused.
pub fn datapoint_from_form(form: &mut Form) -> Result<Datapoint, (usize, ValidationError)> {
    form.check()?;

    let scaling = Scaling::new(
        form.text(DP_MIN_IN).trim(),
        form.text(DP_MAX_IN).trim(),
        form.text(DP_MIN_OUT).trim(),
        form.text(DP_MAX_OUT).trim(),
    );
    if let Err((bound, err)) = scaling.validate() {
        let index = bound_field(bound);
        form.reject(index, err.clone());
        return Err((index, err));
    }

    let flag = Flag::ALL
        .get(form.selected(DP_FLAGS))
        .copied()
        .unwrap_or_default();
    let data_type = DataType::ALL
        .get(form.selected(DP_DATATYPE))
        .copied()
        .unwrap_or_default();

    Ok(Datapoint {
        slave_id: form.int(DP_SERVER_ID) as u8,
        name: form.text(DP_NAME).to_string(),
        description: form.text(DP_DESCRIPTION).to_string(),
        addr: form.int(DP_ADDRESS) as u16,
        data_type,
        flag,
        unit: form.text(DP_UNIT).to_string(),
        scaling: Some(scaling),
        value: None,
        err: None,
    })
}

// ============================================================================
// Write prompt
// ============================================================================

pub fn write_form(dp: &Datapoint) -> Form {
    Form::new(
        format!("Write {} ({})", dp.name, dp.data_type),
        vec![Field::text("Value", dp.write_prefill())],
    )
}

/// Parse the prompt text as a value of `kind`
pub fn value_from_form(form: &mut Form, kind: ValueKind) -> Result<Value, ValidationError> {
    Value::parse(kind, form.text(0)).inspect_err(|err| form.reject(0, err.clone()))
}

// ============================================================================
// Connection settings
// ============================================================================

pub const CFG_TRANSPORT: usize = 0;
pub const CFG_ADDRESS: usize = 1;
pub const CFG_BAUDRATE: usize = 2;
pub const CFG_DATABITS: usize = 3;
pub const CFG_PARITY: usize = 4;
pub const CFG_STOPBITS: usize = 5;

pub fn connection_form(cfg: &ConnectionConfig) -> Form {
    let transport_index = Transport::ALL
        .iter()
        .position(|t| *t == cfg.transport)
        .unwrap_or(0);
    let parity_index = Parity::ALL
        .iter()
        .position(|p| *p == cfg.parity)
        .unwrap_or(0);

    let mut form = Form::new(
        "Modbus connection",
        vec![
            Field::select(
                "Transport",
                Transport::ALL.iter().map(|t| t.label()),
                transport_index,
            ),
            Field::text("Address", cfg.address.as_str()),
            Field::int("Baudrate", i64::from(cfg.baudrate), 1, 4_000_000),
            Field::int("Databits", i64::from(cfg.databits), 5, 8),
            Field::select("Parity", Parity::ALL.iter().map(|p| p.label()), parity_index),
            Field::int("Stopbits", i64::from(cfg.stopbits), 1, 2),
        ],
    );
    show_serial_fields(&mut form, cfg.transport.is_serial());
    form
}

const SERIAL_FIELDS: [usize; 4] = [CFG_BAUDRATE, CFG_DATABITS, CFG_PARITY, CFG_STOPBITS];

fn show_serial_fields(form: &mut Form, serial: bool) {
    for index in SERIAL_FIELDS {
        form.set_hidden(index, !serial);
    }
}

/// Update dependent fields after `index` changed: a new transport pre-fills
/// its conventional address and shows the serial settings only for RTU, a new
/// parity pre-fills the conventional stop bits
pub fn connection_form_edited(form: &mut Form, index: usize) {
    match index {
        CFG_TRANSPORT => {
            if let Some(transport) = Transport::ALL.get(form.selected(CFG_TRANSPORT)) {
                form.set_text(CFG_ADDRESS, transport.default_address());
                show_serial_fields(form, transport.is_serial());
            }
        },
        CFG_PARITY => {
            if let Some(parity) = Parity::ALL.get(form.selected(CFG_PARITY)) {
                form.set_text(CFG_STOPBITS, parity.default_stop_bits().to_string());
            }
        },
        _ => {},
    }
}

pub fn connection_from_form(form: &mut Form) -> Result<ConnectionConfig, (usize, ValidationError)> {
    form.check()?;
    if form.text(CFG_ADDRESS).trim().is_empty() {
        form.reject(CFG_ADDRESS, ValidationError::Empty);
        return Err((CFG_ADDRESS, ValidationError::Empty));
    }

    // hidden serial fields are not validated, so keep only values in range
    let defaults = ConnectionConfig::default();
    Ok(ConnectionConfig {
        transport: Transport::ALL
            .get(form.selected(CFG_TRANSPORT))
            .copied()
            .unwrap_or_default(),
        address: form.text(CFG_ADDRESS).trim().to_string(),
        baudrate: form
            .valid_int(CFG_BAUDRATE)
            .map_or(defaults.baudrate, |v| v as u32),
        databits: form
            .valid_int(CFG_DATABITS)
            .map_or(defaults.databits, |v| v as u8),
        parity: Parity::ALL
            .get(form.selected(CFG_PARITY))
            .copied()
            .unwrap_or_default(),
        stopbits: form
            .valid_int(CFG_STOPBITS)
            .map_or(defaults.stopbits, |v| v as u8),
    })
}
