//! Regscope Model Library
//!
//! Pure data model of the register table. No I/O happens here.
//!
//! # Modules
//!
//! - `types`: data types, flags, register classes and the value-kind table
//! - `value`: decoded register values and their register encoding
//! - `scaling`: the four-bound linear display transform
//! - `datapoint`: one addressed, typed register definition
//! - `store`: the user-ordered datapoint sequence
//!
//! # Example
//!
//! ```
//! use regscope_model::{DataType, Datapoint, Scaling, Value};
//!
//! let mut dp = Datapoint::new(1, "Voltage", 0, DataType::UInt16);
//! dp.unit = "V".into();
//! dp.scaling = Some(Scaling::new("0", "100", "-10", "10"));
//! dp.record_success(Value::U16(50));
//! assert_eq!(dp.display_value(), "0.00V");
//! ```

pub mod datapoint;
pub mod scaling;
pub mod store;
pub mod types;
pub mod value;

// Re-exports for convenience
pub use datapoint::Datapoint;
pub use scaling::{format_value, Bound, Scaling, ScalingRanges};
pub use store::DatapointStore;
pub use types::{DataType, Flag, RegisterClass, TypeInfo, ValueKind};
pub use value::Value;
