//! Modbus link built on tokio-modbus
//!
//! The table controller is single-threaded and expects blocking calls, so the
//! async client context is driven by a private current-thread runtime. Every
//! request is bounded by the configured timeout.

use crate::bridge::{ensure_writable, ProtocolBridge};
use crate::config::{ConnectionConfig, Transport};
use crate::udp::UdpTransport;
use errors::{LinkError, RegscopeError, RegscopeResult};
use regscope_model::{RegisterClass, Value, ValueKind};
use std::future::Future;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::runtime::Runtime;
use tokio::time::timeout;
use tokio_modbus::client::{rtu, tcp, Context};
use tokio_modbus::prelude::{Reader, Slave, SlaveContext, Writer};
use tokio_serial::SerialPortBuilderExt;
use tracing::{debug, info, warn};

/// Blocking Modbus client over one of the supported transports
pub struct ModbusLink {
    runtime: Runtime,
    ctx: Option<Context>,
    endpoint: String,
    timeout: Duration,
}

impl std::fmt::Debug for ModbusLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModbusLink")
            .field("endpoint", &self.endpoint)
            .field("connected", &self.ctx.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModbusLink {
    /// Open the link described by `config`
    ///
    /// Invalid serial parameters are reported as configuration errors; any
    /// failure to reach the endpoint is a [`RegscopeError::ConnectionFailed`].
    pub fn open(config: &ConnectionConfig, request_timeout: Duration) -> RegscopeResult<Self> {
        config.validate()?;
        let endpoint = config.endpoint();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        debug!("Link connecting: {}", endpoint);
        let ctx = runtime
            .block_on(async { timeout(request_timeout, connect(config, request_timeout)).await })
            .map_err(|_| {
                warn!("Link timeout: {}", endpoint);
                RegscopeError::connection(
                    endpoint.as_str(),
                    format!("timed out after {} ms", request_timeout.as_millis()),
                )
            })?
            .map_err(|e| {
                warn!("Link err: {} - {}", endpoint, e);
                RegscopeError::connection(endpoint.as_str(), e.to_string())
            })?;

        info!("Link connected: {}", endpoint);
        Ok(Self {
            runtime,
            ctx: Some(ctx),
            endpoint,
            timeout: request_timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.ctx.is_some()
    }
}

async fn connect(config: &ConnectionConfig, request_timeout: Duration) -> io::Result<Context> {
    // unit id is replaced before every request
    let unit = Slave(1);
    let address = config.address.trim();

    match config.transport {
        Transport::Tcp => {
            let stream = TcpStream::connect(address).await?;
            if let Err(e) = stream.set_nodelay(true) {
                debug!("TCP_NODELAY: {}", e);
            }
            Ok(tcp::attach_slave(stream, unit))
        },
        Transport::RtuOverTcp => {
            let stream = TcpStream::connect(address).await?;
            if let Err(e) = stream.set_nodelay(true) {
                debug!("TCP_NODELAY: {}", e);
            }
            Ok(rtu::attach_slave(stream, unit))
        },
        Transport::RtuOverUdp => {
            let transport = UdpTransport::connect(address).await?;
            Ok(rtu::attach_slave(transport, unit))
        },
        Transport::Rtu => {
            let serial = tokio_serial::new(address, config.baudrate)
                .data_bits(config.serial_data_bits())
                .parity(config.parity.to_serial())
                .stop_bits(config.serial_stop_bits())
                .timeout(request_timeout)
                .open_native_async()
                .map_err(io::Error::from)?;
            debug!("RTU opened: {} @{}baud", address, config.baudrate);
            Ok(rtu::attach_slave(serial, unit))
        },
    }
}

/// Drive one request to completion on the link runtime
fn call<T, F>(runtime: &Runtime, limit: Duration, request: F) -> Result<T, LinkError>
where
    F: Future<Output = io::Result<T>>,
{
    runtime
        .block_on(async { timeout(limit, request).await })
        .map_err(|_| LinkError::Timeout(limit.as_millis() as u64))?
        .map_err(link_error)
}

fn link_error(err: io::Error) -> LinkError {
    // tokio-modbus reports exception responses as ErrorKind::Other
    if err.kind() == io::ErrorKind::Other {
        LinkError::Exception(err.to_string())
    } else {
        LinkError::from(err)
    }
}

fn first_bit(bits: Vec<bool>) -> Result<Value, LinkError> {
    bits.first()
        .copied()
        .map(Value::Bool)
        .ok_or(LinkError::UnexpectedResponse {
            expected: 1,
            actual: 0,
        })
}

impl ProtocolBridge for ModbusLink {
    fn set_active_unit(&mut self, unit: u8) {
        if let Some(ctx) = self.ctx.as_mut() {
            ctx.set_slave(Slave(unit));
        }
    }

    fn read(
        &mut self,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
    ) -> Result<Value, LinkError> {
        let ctx = self.ctx.as_mut().ok_or(LinkError::NotConnected)?;
        let count = kind.registers();

        match kind {
            ValueKind::Coil => {
                first_bit(call(&self.runtime, self.timeout, ctx.read_coils(addr, 1))?)
            },
            ValueKind::DiscreteInput => first_bit(call(
                &self.runtime,
                self.timeout,
                ctx.read_discrete_inputs(addr, 1),
            )?),
            _ => {
                let registers = match class {
                    RegisterClass::ReadOnly => call(
                        &self.runtime,
                        self.timeout,
                        ctx.read_input_registers(addr, count),
                    )?,
                    RegisterClass::ReadWrite => call(
                        &self.runtime,
                        self.timeout,
                        ctx.read_holding_registers(addr, count),
                    )?,
                };
                Value::from_registers(kind, &registers)
            },
        }
    }

    fn write(
        &mut self,
        addr: u16,
        kind: ValueKind,
        class: RegisterClass,
        value: &Value,
    ) -> Result<(), LinkError> {
        ensure_writable(addr, kind, class)?;
        let ctx = self.ctx.as_mut().ok_or(LinkError::NotConnected)?;

        if kind.is_bit() {
            let on = value.as_f64() != 0.0;
            return call(&self.runtime, self.timeout, ctx.write_single_coil(addr, on));
        }

        let registers = value.to_registers();
        if registers.len() != usize::from(kind.registers()) {
            return Err(LinkError::UnexpectedResponse {
                expected: usize::from(kind.registers()),
                actual: registers.len(),
            });
        }

        match kind {
            ValueKind::Register => call(
                &self.runtime,
                self.timeout,
                ctx.write_single_register(addr, registers[0]),
            ),
            _ => call(
                &self.runtime,
                self.timeout,
                ctx.write_multiple_registers(addr, &registers),
            ),
        }
    }

    fn close(&mut self) {
        if self.ctx.take().is_some() {
            info!("Link closed: {}", self.endpoint);
        }
    }
}

impl Drop for ModbusLink {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use errors::{ErrorCategory, RegscopeErrorTrait};
    use std::net::TcpListener;

    #[test]
    fn test_open_refused_is_connection_error() {
        // grab a free port, then release it so nothing listens there
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ConnectionConfig {
            address: format!("127.0.0.1:{port}"),
            ..Default::default()
        };

        let err = ModbusLink::open(&config, Duration::from_millis(500)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Connection);
    }

    #[test]
    fn test_open_rejects_bad_serial_parameters() {
        let config = ConnectionConfig {
            transport: Transport::Rtu,
            address: "/dev/null".into(),
            databits: 4,
            ..Default::default()
        };
        let err = ModbusLink::open(&config, Duration::from_millis(100)).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Configuration);
    }

    #[test]
    fn test_open_tcp_and_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let config = ConnectionConfig {
            address: listener.local_addr().unwrap().to_string(),
            ..Default::default()
        };

        let mut link = ModbusLink::open(&config, Duration::from_millis(500)).unwrap();
        assert!(link.is_connected());

        // read-only register writes never reach the wire
        assert_eq!(
            link.write(3, ValueKind::Register, RegisterClass::ReadOnly, &Value::U16(1)),
            Err(LinkError::ReadOnlyRegister { addr: 3 })
        );

        link.close();
        assert!(!link.is_connected());
        assert_eq!(
            link.read(0, ValueKind::Register, RegisterClass::ReadWrite),
            Err(LinkError::NotConnected)
        );
    }

    #[test]
    fn test_exception_mapping() {
        let err = link_error(io::Error::new(io::ErrorKind::Other, "Illegal data address"));
        assert!(matches!(err, LinkError::Exception(_)));
        let err = link_error(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(matches!(err, LinkError::Io { .. }));
    }
}
