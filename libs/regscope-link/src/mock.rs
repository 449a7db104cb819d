//! Scripted in-memory bridge for tests
//!
//! Values and failures are keyed by register address. Every call is recorded
//! so tests can assert on what reached the "wire".

use crate::bridge::ProtocolBridge;
use errors::LinkError;
use regscope_model::{RegisterClass, Value, ValueKind};
use std::collections::HashMap;

/// One recorded bridge call
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeCall {
    SetUnit(u8),
    Read {
        unit: u8,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
    },
    Write {
        unit: u8,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
        value: Value,
    },
    Close,
}

#[derive(Debug, Default)]
pub struct MockBridge {
    calls: Vec<BridgeCall>,
    values: HashMap<u16, Value>,
    failures: HashMap<u16, LinkError>,
    unit: u8,
    closed: bool,
}

impl MockBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value returned by reads of `addr`
    pub fn set_value(&mut self, addr: u16, value: Value) {
        self.values.insert(addr, value);
    }

    /// Make every read and write of `addr` fail with `err`
    pub fn fail(&mut self, addr: u16, err: LinkError) {
        self.failures.insert(addr, err);
    }

    pub fn clear_failure(&mut self, addr: u16) {
        self.failures.remove(&addr);
    }

    pub fn calls(&self) -> &[BridgeCall] {
        &self.calls
    }

    pub fn read_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, BridgeCall::Read { .. }))
            .count()
    }

    pub fn writes(&self) -> Vec<&BridgeCall> {
        self.calls
            .iter()
            .filter(|c| matches!(c, BridgeCall::Write { .. }))
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl ProtocolBridge for MockBridge {
    fn set_active_unit(&mut self, unit: u8) {
        self.unit = unit;
        self.calls.push(BridgeCall::SetUnit(unit));
    }

    fn read(
        &mut self,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
    ) -> Result<Value, LinkError> {
        self.calls.push(BridgeCall::Read {
            unit: self.unit,
            addr,
            kind,
            class,
        });
        if self.closed {
            return Err(LinkError::NotConnected);
        }
        if let Some(err) = self.failures.get(&addr) {
            return Err(err.clone());
        }
        match self.values.get(&addr) {
            Some(value) => Ok(*value),
            None => Value::from_registers(kind, &[0; 4]),
        }
    }

    fn write(
        &mut self,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
        value: &Value,
    ) -> Result<(), LinkError> {
        self.calls.push(BridgeCall::Write {
            unit: self.unit,
            addr,
            kind,
            class,
            value: *value,
        });
        if self.closed {
            return Err(LinkError::NotConnected);
        }
        if let Some(err) = self.failures.get(&addr) {
            return Err(err.clone());
        }
        self.values.insert(addr, *value);
        Ok(())
    }

    fn close(&mut self) {
        self.closed = true;
        self.calls.push(BridgeCall::Close);
    }
}
