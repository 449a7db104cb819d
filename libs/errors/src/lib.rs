//! Unified error handling for regscope
//!
//! Three layers of failure exist in the tool and each gets its own type:
//! - [`RegscopeError`]: session-level failures (configuration, connection, I/O)
//! - [`LinkError`]: a single datapoint read or write failed on the wire
//! - [`ValidationError`]: a form field rejected the operator's input

use std::io;
use thiserror::Error;

// ============================================================================
// RegscopeError - Session-level error type
// ============================================================================

/// Main error type for the regscope session
#[derive(Debug, Error)]
pub enum RegscopeError {
    // ======================================
    // Configuration Errors
    // ======================================
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // ======================================
    // Connection Errors
    // ======================================
    #[error("Connection failed: {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    // ======================================
    // Dialog Errors
    // ======================================
    #[error("Input cancelled")]
    Cancelled,

    #[error("Validation failed: {field}: {source}")]
    Validation {
        field: String,
        #[source]
        source: ValidationError,
    },

    // ======================================
    // File Errors
    // ======================================
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using RegscopeError
pub type RegscopeResult<T> = Result<T, RegscopeError>;

impl RegscopeError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an invalid configuration error for a named field
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a connection error
    pub fn connection(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }

    /// Wrap a field validation failure
    pub fn validation(field: impl Into<String>, source: ValidationError) -> Self {
        Self::Validation {
            field: field.into(),
            source,
        }
    }
}

impl From<serde_json::Error> for RegscopeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

// Helper macros for creating errors
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::RegscopeError::Configuration($msg.to_string())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::RegscopeError::Configuration(format!($fmt, $($arg)*))
    };
}

// ============================================================================
// LinkError - Per-datapoint failure
// ============================================================================

/// Failure of one read or write against the protocol link.
///
/// Stored on the datapoint that caused it, so it must be `Clone`;
/// `io::Error` is flattened into its kind and message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkError {
    #[error("{message}")]
    Io { kind: io::ErrorKind, message: String },

    #[error("modbus exception: {0}")]
    Exception(String),

    #[error("register {addr} is read-only")]
    ReadOnlyRegister { addr: u16 },

    #[error("unexpected response: expected {expected} values, got {actual}")]
    UnexpectedResponse { expected: usize, actual: usize },

    #[error("timeout after {0} ms")]
    Timeout(u64),

    #[error("link not connected")]
    NotConnected,
}

impl From<io::Error> for LinkError {
    fn from(err: io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

// ============================================================================
// ValidationError - Form field failure
// ============================================================================

/// Local validation failure of a single form field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("value required")]
    Empty,

    #[error("input not a number")]
    NotANumber,

    #[error("input must be between {min} and {max}")]
    OutOfRange { min: i64, max: i64 },

    #[error("input range must not be empty (min equals max)")]
    ZeroWidthRange,

    #[error("not a valid {kind} value")]
    InvalidValue { kind: &'static str },
}

// ============================================================================
// Error categories
// ============================================================================

/// Error category enum - used for propagation policy and log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Invalid startup parameters, aborts before any connection attempt
    Configuration,
    /// Link could not be opened, operator corrects the configuration and retries
    Connection,
    /// A single datapoint read/write failed
    DatapointIo,
    /// A dialog was dismissed
    Cancelled,
    /// A dialog field failed local validation
    Validation,
    /// Files, terminal and everything else
    Internal,
}

/// Common capability interface of the regscope error types
pub trait RegscopeErrorTrait: std::error::Error + Send + Sync + 'static {
    /// Get error code (for logs)
    fn error_code(&self) -> &'static str;

    /// Get error category
    fn category(&self) -> ErrorCategory;

    /// Whether the error ends the run; everything else is retried or shown in place
    fn is_fatal(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::Configuration | ErrorCategory::Internal
        )
    }

    /// Get log level
    fn log_level(&self) -> tracing::Level {
        use tracing::Level;
        match self.category() {
            ErrorCategory::Configuration | ErrorCategory::Internal => Level::ERROR,
            ErrorCategory::Connection | ErrorCategory::DatapointIo => Level::WARN,
            ErrorCategory::Validation => Level::INFO,
            ErrorCategory::Cancelled => Level::DEBUG,
        }
    }
}

impl RegscopeErrorTrait for RegscopeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::InvalidConfig { .. } => "INVALID_CONFIG",
            Self::ConnectionFailed { .. } => "CONNECTION_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Other(_) => "OTHER_ERROR",
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) | Self::InvalidConfig { .. } => ErrorCategory::Configuration,
            Self::ConnectionFailed { .. } => ErrorCategory::Connection,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Io(_) | Self::Serialization(_) | Self::Other(_) => ErrorCategory::Internal,
        }
    }
}

impl RegscopeErrorTrait for LinkError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "LINK_IO_ERROR",
            Self::Exception(_) => "MODBUS_EXCEPTION",
            Self::ReadOnlyRegister { .. } => "READ_ONLY_REGISTER",
            Self::UnexpectedResponse { .. } => "UNEXPECTED_RESPONSE",
            Self::Timeout(_) => "TIMEOUT",
            Self::NotConnected => "NOT_CONNECTED",
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::DatapointIo
    }
}

impl RegscopeErrorTrait for ValidationError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Empty => "EMPTY",
            Self::NotANumber => "NOT_A_NUMBER",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::ZeroWidthRange => "ZERO_WIDTH_RANGE",
            Self::InvalidValue { .. } => "INVALID_VALUE",
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Validation
    }
}
