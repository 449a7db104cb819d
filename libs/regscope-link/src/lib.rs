//! Regscope Link Library
//!
//! Typed register access for the datapoint table.
//!
//! - `bridge`: the [`ProtocolBridge`] capability consumed by the table controller
//! - `config`: connection settings (transport, endpoint, serial line parameters)
//! - `modbus`: [`ModbusLink`], the tokio-modbus implementation
//! - `udp`: datagram transport for RTU-over-UDP
//! - `mock`: scripted in-memory bridge (feature `test-utils`)

pub mod bridge;
pub mod config;
pub mod modbus;
pub mod udp;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use bridge::{ensure_writable, ProtocolBridge};
pub use config::{ConnectionConfig, Parity, Transport};
pub use modbus::ModbusLink;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::{BridgeCall, MockBridge};
