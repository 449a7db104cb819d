//! Register data types and the static type table
//!
//! Every decision that depends on a datapoint's type (register count, which
//! read primitive, how to parse operator input) goes through [`DataType::info`]
//! so the mapping lives in exactly one place.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Data type of a datapoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    /// 16-bit unsigned integer (1 register)
    #[default]
    UInt16,
    /// 32-bit unsigned integer (2 registers)
    UInt32,
    /// 64-bit unsigned integer (4 registers)
    UInt64,
    /// 32-bit float (2 registers)
    Float32,
    /// 64-bit float (4 registers)
    Float64,
    /// Discrete input bit
    Bool,
    /// Coil bit
    Coil,
}

/// Read/write flag of a datapoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flag {
    #[default]
    Read,
    ReadWrite,
}

/// Register bank selected by a datapoint's flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterClass {
    /// Input registers (FC 04)
    ReadOnly,
    /// Holding registers (FC 03)
    ReadWrite,
}

/// Wire-level kind of a value, selects the typed link primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Coil,
    DiscreteInput,
    Register,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

/// Static description of one data type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeInfo {
    pub data_type: DataType,
    pub kind: ValueKind,
    /// Number of 16-bit registers (bits count as one)
    pub registers: u16,
    /// Label used in the editor and the document format
    pub label: &'static str,
}

const TYPE_TABLE: [TypeInfo; 7] = [
    TypeInfo {
        data_type: DataType::Coil,
        kind: ValueKind::Coil,
        registers: 1,
        label: "Coil",
    },
    TypeInfo {
        data_type: DataType::Bool,
        kind: ValueKind::DiscreteInput,
        registers: 1,
        label: "Bool",
    },
    TypeInfo {
        data_type: DataType::UInt16,
        kind: ValueKind::Register,
        registers: 1,
        label: "Uint16",
    },
    TypeInfo {
        data_type: DataType::UInt32,
        kind: ValueKind::Uint32,
        registers: 2,
        label: "Uint32",
    },
    TypeInfo {
        data_type: DataType::UInt64,
        kind: ValueKind::Uint64,
        registers: 4,
        label: "Uint64",
    },
    TypeInfo {
        data_type: DataType::Float32,
        kind: ValueKind::Float32,
        registers: 2,
        label: "Float32",
    },
    TypeInfo {
        data_type: DataType::Float64,
        kind: ValueKind::Float64,
        registers: 4,
        label: "Float64",
    },
];

impl DataType {
    /// All data types in editor order
    pub const ALL: [DataType; 7] = [
        DataType::Coil,
        DataType::Bool,
        DataType::UInt16,
        DataType::UInt32,
        DataType::UInt64,
        DataType::Float32,
        DataType::Float64,
    ];

    /// Static table entry for this type
    pub fn info(self) -> &'static TypeInfo {
        match self {
            DataType::Coil => &TYPE_TABLE[0],
            DataType::Bool => &TYPE_TABLE[1],
            DataType::UInt16 => &TYPE_TABLE[2],
            DataType::UInt32 => &TYPE_TABLE[3],
            DataType::UInt64 => &TYPE_TABLE[4],
            DataType::Float32 => &TYPE_TABLE[5],
            DataType::Float64 => &TYPE_TABLE[6],
        }
    }

    pub fn kind(self) -> ValueKind {
        self.info().kind
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    /// Single-bit types (coils and discrete inputs)
    pub fn is_bit(self) -> bool {
        matches!(self, DataType::Coil | DataType::Bool)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Flag {
    pub const ALL: [Flag; 2] = [Flag::Read, Flag::ReadWrite];

    pub fn register_class(self) -> RegisterClass {
        match self {
            Flag::Read => RegisterClass::ReadOnly,
            Flag::ReadWrite => RegisterClass::ReadWrite,
        }
    }

    /// Short form shown in the table
    pub fn short(self) -> &'static str {
        match self {
            Flag::Read => "R",
            Flag::ReadWrite => "RW",
        }
    }

    /// Long form shown in the editor
    pub fn label(self) -> &'static str {
        match self {
            Flag::Read => "Read",
            Flag::ReadWrite => "Read & Write",
        }
    }
}

impl ValueKind {
    /// Name used in validation messages
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Coil => "coil",
            ValueKind::DiscreteInput => "bool",
            ValueKind::Register => "uint16",
            ValueKind::Uint32 => "uint32",
            ValueKind::Uint64 => "uint64",
            ValueKind::Float32 => "float32",
            ValueKind::Float64 => "float64",
        }
    }

    pub fn is_bit(self) -> bool {
        matches!(self, ValueKind::Coil | ValueKind::DiscreteInput)
    }

    /// Registers (or bits) transferred per read/write
    pub fn registers(self) -> u16 {
        match self {
            ValueKind::Coil | ValueKind::DiscreteInput | ValueKind::Register => 1,
            ValueKind::Uint32 | ValueKind::Float32 => 2,
            ValueKind::Uint64 | ValueKind::Float64 => 4,
        }
    }
}
