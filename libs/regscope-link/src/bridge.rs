//! Protocol bridge capability

use errors::LinkError;
use regscope_model::{Datapoint, RegisterClass, Value, ValueKind};

/// Synchronous typed access to one protocol link
///
/// A single link serves several device addresses, so every datapoint call
/// selects the unit first. Calls block for their full duration and report a
/// typed [`LinkError`]; a failed call leaves the link usable for the next one.
pub trait ProtocolBridge {
    /// Select the device address used by subsequent calls
    fn set_active_unit(&mut self, unit: u8);

    fn read(&mut self, addr: u16, kind: ValueKind, class: RegisterClass)
        -> Result<Value, LinkError>;

    fn write(
        &mut self,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
        value: &Value,
    ) -> Result<(), LinkError>;

    /// Release the link, later calls fail with [`LinkError::NotConnected`]
    fn close(&mut self);

    /// Read a datapoint using its unit, address, kind and register class
    fn read_point(&mut self, dp: &Datapoint) -> Result<Value, LinkError> {
        self.set_active_unit(dp.slave_id);
        self.read(dp.addr, dp.kind(), dp.register_class())
    }

    /// Write a datapoint; register writes to the read-only bank fail before
    /// anything is sent
    fn write_point(&mut self, dp: &Datapoint, value: &Value) -> Result<(), LinkError> {
        ensure_writable(dp.addr, dp.kind(), dp.register_class())?;
        self.set_active_unit(dp.slave_id);
        self.write(dp.addr, dp.kind(), dp.register_class(), value)
    }
}

/// Input registers cannot be written; coils ignore the register class
pub fn ensure_writable(addr: u16, kind: ValueKind, class: RegisterClass) -> Result<(), LinkError> {
    if !kind.is_bit() && class == RegisterClass::ReadOnly {
        return Err(LinkError::ReadOnlyRegister { addr });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_writable() {
        assert_eq!(
            ensure_writable(7, ValueKind::Register, RegisterClass::ReadOnly),
            Err(LinkError::ReadOnlyRegister { addr: 7 })
        );
        assert_eq!(
            ensure_writable(7, ValueKind::Float64, RegisterClass::ReadOnly),
            Err(LinkError::ReadOnlyRegister { addr: 7 })
        );
        assert!(ensure_writable(7, ValueKind::Register, RegisterClass::ReadWrite).is_ok());
        assert!(ensure_writable(7, ValueKind::Coil, RegisterClass::ReadOnly).is_ok());
        assert!(ensure_writable(7, ValueKind::DiscreteInput, RegisterClass::ReadOnly).is_ok());
    }
}
