//! Linear display scaling
//!
//! A [`Scaling`] keeps its four bounds as the text the operator typed. It is
//! valid once all four are non-empty; a valid scaling maps `[min_in, max_in]`
//! onto `[min_out, max_out]`:
//!
//! ```text
//! res = (raw - min_in) / (max_in - min_in) * (max_out - min_out) + min_out
//! ```

use crate::types::DataType;
use crate::value::Value;
use errors::ValidationError;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Four-bound linear transform, bounds stored as text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scaling {
    #[serde(default)]
    pub min_in: String,
    #[serde(default)]
    pub max_in: String,
    #[serde(default)]
    pub min_out: String,
    #[serde(default)]
    pub max_out: String,
}

/// One of the four scaling bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    MinIn,
    MaxIn,
    MinOut,
    MaxOut,
}

/// Parsed numeric bounds of a usable scaling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalingRanges {
    pub min_in: f64,
    pub max_in: f64,
    pub min_out: f64,
    pub max_out: f64,
}

impl ScalingRanges {
    pub fn apply(&self, raw: f64) -> f64 {
        (raw - self.min_in) / (self.max_in - self.min_in) * (self.max_out - self.min_out)
            + self.min_out
    }
}

impl Scaling {
    pub fn new(
        min_in: impl Into<String>,
        max_in: impl Into<String>,
        min_out: impl Into<String>,
        max_out: impl Into<String>,
    ) -> Self {
        Self {
            min_in: min_in.into(),
            max_in: max_in.into(),
            min_out: min_out.into(),
            max_out: max_out.into(),
        }
    }

    /// Identity scaling pre-filled by the editor for a data type
    pub fn default_for(data_type: DataType) -> Self {
        let max = match data_type {
            DataType::Bool | DataType::Coil => 1u64,
            DataType::UInt16 => u64::from(u16::MAX),
            _ => u64::from(u32::MAX),
        };
        Self::new("0", max.to_string(), "0", max.to_string())
    }

    /// True when all four bounds are filled in
    pub fn is_valid(&self) -> bool {
        !self.min_in.is_empty()
            && !self.max_in.is_empty()
            && !self.min_out.is_empty()
            && !self.max_out.is_empty()
    }

    pub fn bound(&self, bound: Bound) -> &str {
        match bound {
            Bound::MinIn => &self.min_in,
            Bound::MaxIn => &self.max_in,
            Bound::MinOut => &self.min_out,
            Bound::MaxOut => &self.max_out,
        }
    }

    /// Numeric bounds, or `None` when the scaling cannot be applied
    ///
    /// Unparsable bounds and a zero-width input range both yield `None`;
    /// the editor rejects them, so they only appear in hand-edited documents.
    pub fn ranges(&self) -> Option<ScalingRanges> {
        if !self.is_valid() {
            return None;
        }
        let ranges = ScalingRanges {
            min_in: parse_bound(&self.min_in)?,
            max_in: parse_bound(&self.max_in)?,
            min_out: parse_bound(&self.min_out)?,
            max_out: parse_bound(&self.max_out)?,
        };
        if ranges.min_in == ranges.max_in {
            debug!("Ignoring scaling with zero-width input range: {:?}", self);
            return None;
        }
        Some(ranges)
    }

    /// Definition-time validation used by the editor
    ///
    /// Empty bounds are allowed (the scaling is then simply not applied);
    /// filled bounds must be finite numbers and the input range must not be
    /// empty.
    pub fn validate(&self) -> Result<(), (Bound, ValidationError)> {
        for bound in [Bound::MinIn, Bound::MaxIn, Bound::MinOut, Bound::MaxOut] {
            let text = self.bound(bound);
            if !text.trim().is_empty() && parse_bound(text).is_none() {
                return Err((bound, ValidationError::NotANumber));
            }
        }

        if let (Some(min), Some(max)) = (parse_bound(&self.min_in), parse_bound(&self.max_in)) {
            if min == max {
                return Err((Bound::MaxIn, ValidationError::ZeroWidthRange));
            }
        }
        Ok(())
    }
}

/// Finite number, `None` for text, NaN and infinities
fn parse_bound(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Render a value for display, applying the scaling when it is usable
pub fn format_value(value: Option<&Value>, scaling: Option<&Scaling>, unit: &str) -> String {
    let Some(value) = value else {
        return "-".to_string();
    };

    match scaling.and_then(Scaling::ranges) {
        Some(ranges) => format!("{:.2}{}", ranges.apply(value.as_f64()), unit),
        None => format!("{}{}", value, unit),
    }
}
