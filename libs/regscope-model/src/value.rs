//! Decoded register values
//!
//! Multi-register values use big-endian word order (ABCD): the first
//! register read holds the most significant word.

use crate::types::ValueKind;
use errors::{LinkError, ValidationError};
use std::fmt;

/// A decoded datapoint value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    Bool(bool),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Value {
    /// Numeric view used by the scaling transform
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::Bool(b) => {
                if b {
                    1.0
                } else {
                    0.0
                }
            },
            Value::U16(v) => f64::from(v),
            Value::U32(v) => f64::from(v),
            Value::U64(v) => v as f64,
            Value::F32(v) => f64::from(v),
            Value::F64(v) => v,
        }
    }

    /// Parse operator input into the representation implied by `kind`
    pub fn parse(kind: ValueKind, text: &str) -> Result<Self, ValidationError> {
        let t = text.trim();
        if t.is_empty() {
            return Err(ValidationError::Empty);
        }
        let invalid = || ValidationError::InvalidValue { kind: kind.name() };

        match kind {
            ValueKind::Coil | ValueKind::DiscreteInput => parse_bool(t).map(Value::Bool).ok_or_else(invalid),
            ValueKind::Register => t.parse::<u16>().map(Value::U16).map_err(|_| invalid()),
            ValueKind::Uint32 => t.parse::<u32>().map(Value::U32).map_err(|_| invalid()),
            ValueKind::Uint64 => t.parse::<u64>().map(Value::U64).map_err(|_| invalid()),
            ValueKind::Float32 => t
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::F32)
                .ok_or_else(invalid),
            ValueKind::Float64 => t
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Value::F64)
                .ok_or_else(invalid),
        }
    }

    /// Decode a register response for a register kind
    pub fn from_registers(kind: ValueKind, registers: &[u16]) -> Result<Self, LinkError> {
        let expected = usize::from(kind.registers());
        if registers.len() < expected {
            return Err(LinkError::UnexpectedResponse {
                expected,
                actual: registers.len(),
            });
        }

        let wide = registers[..expected]
            .iter()
            .fold(0u64, |acc, r| (acc << 16) | u64::from(*r));

        Ok(match kind {
            ValueKind::Coil | ValueKind::DiscreteInput => Value::Bool(registers[0] != 0),
            ValueKind::Register => Value::U16(registers[0]),
            ValueKind::Uint32 => Value::U32(wide as u32),
            ValueKind::Uint64 => Value::U64(wide),
            ValueKind::Float32 => Value::F32(f32::from_bits(wide as u32)),
            ValueKind::Float64 => Value::F64(f64::from_bits(wide)),
        })
    }

    /// Encode into registers for a multi/single register write
    pub fn to_registers(&self) -> Vec<u16> {
        let bytes: Vec<u8> = match *self {
            Value::Bool(b) => return vec![u16::from(b)],
            Value::U16(v) => return vec![v],
            Value::U32(v) => v.to_be_bytes().to_vec(),
            Value::U64(v) => v.to_be_bytes().to_vec(),
            Value::F32(v) => v.to_be_bytes().to_vec(),
            Value::F64(v) => v.to_be_bytes().to_vec(),
        };
        bytes
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
        }
    }
}

/// Accepts 1/0, true/false, on/off, yes/no (case-insensitive)
fn parse_bool(t: &str) -> Option<bool> {
    if t == "1"
        || t.eq_ignore_ascii_case("true")
        || t.eq_ignore_ascii_case("on")
        || t.eq_ignore_ascii_case("yes")
    {
        Some(true)
    } else if t == "0"
        || t.eq_ignore_ascii_case("false")
        || t.eq_ignore_ascii_case("off")
        || t.eq_ignore_ascii_case("no")
    {
        Some(false)
    } else {
        None
    }
}
