//! Connection configuration

use errors::{config_error, RegscopeError, RegscopeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default network endpoint
pub const DEFAULT_TCP_ADDRESS: &str = "localhost:502";
/// Default serial device
pub const DEFAULT_SERIAL_DEVICE: &str = "/dev/ttyUSB0";

/// Transport carrying the Modbus frames
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Modbus TCP (MBAP framing)
    #[default]
    Tcp,
    /// Modbus RTU on a serial line
    Rtu,
    /// RTU frames tunnelled through a TCP stream
    RtuOverTcp,
    /// RTU frames tunnelled through UDP datagrams
    RtuOverUdp,
}

impl Transport {
    pub const ALL: [Transport; 4] = [
        Transport::Tcp,
        Transport::Rtu,
        Transport::RtuOverTcp,
        Transport::RtuOverUdp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Transport::Tcp => "tcp",
            Transport::Rtu => "rtu",
            Transport::RtuOverTcp => "rtuovertcp",
            Transport::RtuOverUdp => "rtuoverudp",
        }
    }

    /// Label used in the configuration form
    pub fn label(self) -> &'static str {
        match self {
            Transport::Tcp => "TCP",
            Transport::Rtu => "RTU (serial)",
            Transport::RtuOverTcp => "RTU over TCP",
            Transport::RtuOverUdp => "RTU over UDP",
        }
    }

    pub fn is_serial(self) -> bool {
        self == Transport::Rtu
    }

    /// Conventional address pre-filled when the transport is chosen
    pub fn default_address(self) -> &'static str {
        if self.is_serial() {
            DEFAULT_SERIAL_DEVICE
        } else {
            DEFAULT_TCP_ADDRESS
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Transport {
    type Err = RegscopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "tcp" => Ok(Transport::Tcp),
            "rtu" => Ok(Transport::Rtu),
            "rtuovertcp" => Ok(Transport::RtuOverTcp),
            "rtuoverudp" => Ok(Transport::RtuOverUdp),
            _ => Err(RegscopeError::invalid_config(
                "transport",
                format!("unknown transport \"{}\"", s),
            )),
        }
    }
}

/// Serial parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Parity {
    #[serde(alias = "N")]
    None,
    #[serde(alias = "O")]
    Odd,
    #[default]
    #[serde(alias = "E")]
    Even,
}

impl Parity {
    pub const ALL: [Parity; 3] = [Parity::None, Parity::Odd, Parity::Even];

    pub fn label(self) -> &'static str {
        match self {
            Parity::None => "None",
            Parity::Odd => "Odd",
            Parity::Even => "Even",
        }
    }

    /// Stop bits pre-filled when the parity is chosen
    pub fn default_stop_bits(self) -> u8 {
        match self {
            Parity::None => 2,
            Parity::Odd | Parity::Even => 1,
        }
    }

    pub(crate) fn to_serial(self) -> tokio_serial::Parity {
        match self {
            Parity::None => tokio_serial::Parity::None,
            Parity::Odd => tokio_serial::Parity::Odd,
            Parity::Even => tokio_serial::Parity::Even,
        }
    }
}

impl FromStr for Parity {
    type Err = RegscopeError;

    /// Accepts `E`/`N`/`O` and `even`/`none`/`odd`, case-insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e" | "even" => Ok(Parity::Even),
            "n" | "none" => Ok(Parity::None),
            "o" | "odd" => Ok(Parity::Odd),
            _ => Err(config_error!("invalid parity \"{}\", expected E, N or O", s)),
        }
    }
}

/// Settings of the single protocol link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    pub transport: Transport,
    /// `host:port` for network transports, device path for serial RTU
    pub address: String,
    pub baudrate: u32,
    pub databits: u8,
    pub parity: Parity,
    pub stopbits: u8,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            transport: Transport::Tcp,
            address: DEFAULT_TCP_ADDRESS.to_string(),
            baudrate: 19200,
            databits: 8,
            parity: Parity::Even,
            stopbits: 1,
        }
    }
}

impl ConnectionConfig {
    /// Check the serial line parameters before a connection attempt
    pub fn validate(&self) -> RegscopeResult<()> {
        if self.address.trim().is_empty() {
            return Err(RegscopeError::invalid_config("address", "address required"));
        }
        if !self.transport.is_serial() {
            return Ok(());
        }
        if self.baudrate == 0 {
            return Err(RegscopeError::invalid_config("baudrate", "must be positive"));
        }
        if !(5..=8).contains(&self.databits) {
            return Err(RegscopeError::invalid_config(
                "databits",
                format!("{} not in 5-8", self.databits),
            ));
        }
        if !(1..=2).contains(&self.stopbits) {
            return Err(RegscopeError::invalid_config(
                "stopbits",
                format!("{} not in 1-2", self.stopbits),
            ));
        }
        Ok(())
    }

    /// Human readable endpoint for logs and errors
    pub fn endpoint(&self) -> String {
        if self.transport.is_serial() {
            format!(
                "{} ({} {}{}{})",
                self.address,
                self.baudrate,
                self.databits,
                self.parity.label().chars().next().unwrap_or('N'),
                self.stopbits
            )
        } else {
            format!("{}://{}", self.transport, self.address)
        }
    }

    pub(crate) fn serial_data_bits(&self) -> tokio_serial::DataBits {
        match self.databits {
            5 => tokio_serial::DataBits::Five,
            6 => tokio_serial::DataBits::Six,
            7 => tokio_serial::DataBits::Seven,
            _ => tokio_serial::DataBits::Eight,
        }
    }

    pub(crate) fn serial_stop_bits(&self) -> tokio_serial::StopBits {
        match self.stopbits {
            2 => tokio_serial::StopBits::Two,
            _ => tokio_serial::StopBits::One,
        }
    }
}
