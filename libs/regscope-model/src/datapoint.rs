//! Datapoint definition

use crate::scaling::{format_value, Scaling};
use crate::types::{DataType, Flag, RegisterClass, ValueKind};
use crate::value::Value;
use errors::LinkError;
use serde::{Deserialize, Serialize};

/// An addressed, typed register location plus its last reading
///
/// `value` and `err` are transient: every read or write attempt overwrites
/// both, and neither is ever serialized.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Datapoint {
    #[serde(default)]
    pub slave_id: u8,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub addr: u16,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub flag: Flag,
    #[serde(default)]
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scaling: Option<Scaling>,

    #[serde(skip)]
    pub value: Option<Value>,
    #[serde(skip)]
    pub err: Option<LinkError>,
}

impl Datapoint {
    pub fn new(slave_id: u8, name: impl Into<String>, addr: u16, data_type: DataType) -> Self {
        Self {
            slave_id,
            name: name.into(),
            addr,
            data_type,
            ..Default::default()
        }
    }

    /// Blank definition used by the Add editor
    pub fn blank(slave_id: u8) -> Self {
        Self {
            slave_id,
            ..Default::default()
        }
    }

    pub fn kind(&self) -> ValueKind {
        self.data_type.kind()
    }

    pub fn register_class(&self) -> RegisterClass {
        self.flag.register_class()
    }

    pub fn record_success(&mut self, value: Value) {
        self.value = Some(value);
        self.err = None;
    }

    pub fn record_failure(&mut self, err: LinkError) {
        self.value = None;
        self.err = Some(err);
    }

    pub fn clear_reading(&mut self) {
        self.value = None;
        self.err = None;
    }

    /// Copy of the definition without the reading
    pub fn duplicate(&self) -> Self {
        let mut dp = self.clone();
        dp.clear_reading();
        dp
    }

    /// Value cell text: the error if the last attempt failed, otherwise the
    /// scaled (or raw) value with its unit
    pub fn display_value(&self) -> String {
        match &self.err {
            Some(err) => err.to_string(),
            None => format_value(self.value.as_ref(), self.scaling.as_ref(), &self.unit),
        }
    }

    /// Text pre-filled into the write prompt
    pub fn write_prefill(&self) -> String {
        self.value
            .map(|v| v.to_string())
            .unwrap_or_else(|| "1".to_string())
    }

    /// Table row: `#` (the 1-based `position`), server id, address, flags,
    /// name, description, value
    pub fn row(&self, position: usize) -> [String; 7] {
        [
            position.to_string(),
            self.slave_id.to_string(),
            self.addr.to_string(),
            self.flag.short().to_string(),
            self.name.clone(),
            self.description.clone(),
            self.display_value(),
        ]
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn sample() -> Datapoint {
        let mut dp = Datapoint::new(3, "Frequency", 40, DataType::UInt16);
        dp.description = "grid frequency".into();
        dp.flag = Flag::ReadWrite;
        dp.unit = "Hz".into();
        dp.scaling = Some(Scaling::new("0", "65535", "0", "65535"));
        dp
    }

    #[test]
    fn test_duplicate_clears_reading() {
        let mut dp = sample();
        dp.record_success(Value::U16(17));

        let copy = dp.duplicate();
        assert_eq!(copy.name, dp.name);
        assert_eq!(copy.addr, dp.addr);
        assert_eq!(copy.data_type, dp.data_type);
        assert_eq!(copy.flag, dp.flag);
        assert_eq!(copy.unit, dp.unit);
        assert_eq!(copy.scaling, dp.scaling);
        assert_eq!(copy.value, None);
        assert_eq!(copy.err, None);
        // the source keeps its reading
        assert_eq!(dp.value, Some(Value::U16(17)));
    }

    #[test]
    fn test_reading_overwrites() {
        let mut dp = sample();
        dp.record_success(Value::U16(1));
        dp.record_failure(LinkError::NotConnected);
        assert_eq!(dp.value, None);
        assert_eq!(dp.display_value(), "link not connected");

        dp.record_success(Value::U16(2));
        assert_eq!(dp.err, None);
        assert_eq!(dp.display_value(), "2.00Hz");
    }

    #[test]
    fn test_write_prefill() {
        let mut dp = sample();
        assert_eq!(dp.write_prefill(), "1");
        dp.record_success(Value::U16(230));
        assert_eq!(dp.write_prefill(), "230");
    }

    #[test]
    fn test_row_projection() {
        let dp = sample();
        assert_eq!(
            dp.row(1),
            [
                "1".to_string(),
                "3".to_string(),
                "40".to_string(),
                "RW".to_string(),
                "Frequency".to_string(),
                "grid frequency".to_string(),
                "-".to_string(),
            ]
        );
    }

    #[test]
    fn test_serde_skips_reading() {
        let mut dp = sample();
        dp.record_failure(LinkError::Timeout(1000));
        let json = serde_json::to_value(&dp).unwrap();
        assert_eq!(json["slaveId"], 3);
        assert_eq!(json["dataType"], "uint16");
        assert_eq!(json["flag"], "readwrite");
        assert_eq!(json["scaling"]["maxIn"], "65535");
        assert!(json.get("value").is_none());
        assert!(json.get("err").is_none());

        let back: Datapoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, dp.duplicate());
    }

    #[test]
    fn test_deserialize_with_missing_fields() {
        let dp: Datapoint = serde_json::from_str(r#"{"name":"Pump","addr":7}"#).unwrap();
        assert_eq!(dp.slave_id, 0);
        assert_eq!(dp.data_type, DataType::UInt16);
        assert_eq!(dp.flag, Flag::Read);
        assert_eq!(dp.scaling, None);
    }
}
