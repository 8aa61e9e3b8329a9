//! Values exchanged with remote callers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::status::StatusCode;

/// A dynamically typed value as it travels over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Variant {
    Empty,
    Boolean(bool),
    Int32(i32),
    UInt32(u32),
    Int64(i64),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Variant>),
}

impl Variant {
    /// Name of the carried type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Variant::Empty => "Empty",
            Variant::Boolean(_) => "Boolean",
            Variant::Int32(_) => "Int32",
            Variant::UInt32(_) => "UInt32",
            Variant::Int64(_) => "Int64",
            Variant::UInt64(_) => "UInt64",
            Variant::Float(_) => "Float",
            Variant::Double(_) => "Double",
            Variant::String(_) => "String",
            Variant::Array(_) => "Array",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::Empty => f.write_str("<empty>"),
            Variant::Boolean(v) => write!(f, "{v}"),
            Variant::Int32(v) => write!(f, "{v}"),
            Variant::UInt32(v) => write!(f, "{v}"),
            Variant::Int64(v) => write!(f, "{v}"),
            Variant::UInt64(v) => write!(f, "{v}"),
            Variant::Float(v) => write!(f, "{v}"),
            Variant::Double(v) => write!(f, "{v}"),
            Variant::String(v) => write!(f, "{v:?}"),
            Variant::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// A value read from a variable, with its status and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValue {
    pub value: Variant,
    pub status: StatusCode,
    /// Only present when the caller asked for it.
    pub source_timestamp: Option<DateTime<Utc>>,
    pub server_timestamp: DateTime<Utc>,
}

/// One dimension of an index range, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeDimension {
    pub min: u32,
    pub max: u32,
}

/// Array-style sub-range addressing (`"2"`, `"0:3"`, `"0:1,2:4"`).
///
/// Every plant variable is scalar, so any non-empty range is refused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericRange {
    pub dimensions: Vec<RangeDimension>,
}

impl NumericRange {
    pub fn is_empty(&self) -> bool {
        self.dimensions.is_empty()
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dim) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            if dim.min == dim.max {
                write!(f, "{}", dim.min)?;
            } else {
                write!(f, "{}:{}", dim.min, dim.max)?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid index range '{0}'")]
pub struct ParseRangeError(pub String);

impl FromStr for NumericRange {
    type Err = ParseRangeError;

    /// Parses the textual form. The empty string is the empty range.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseRangeError(s.to_string());
        if s.trim().is_empty() {
            return Ok(Self::default());
        }

        let mut dimensions = Vec::new();
        for part in s.split(',') {
            let part = part.trim();
            let dim = match part.split_once(':') {
                Some((lo, hi)) => {
                    let min = lo.trim().parse::<u32>().map_err(|_| err())?;
                    let max = hi.trim().parse::<u32>().map_err(|_| err())?;
                    if min >= max {
                        return Err(err());
                    }
                    RangeDimension { min, max }
                }
                None => {
                    let index = part.parse::<u32>().map_err(|_| err())?;
                    RangeDimension {
                        min: index,
                        max: index,
                    }
                }
            };
            dimensions.push(dim);
        }
        Ok(Self { dimensions })
    }
}

/// Options of a read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadOptions {
    pub index_range: Option<NumericRange>,
    pub include_source_timestamp: bool,
}

/// Payload of a write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WriteValue {
    /// `None` when the caller sent no value at all.
    pub value: Option<Variant>,
    pub index_range: Option<NumericRange>,
}

impl WriteValue {
    pub fn scalar(value: Variant) -> Self {
        Self {
            value: Some(value),
            index_range: None,
        }
    }
}

/// Returns `true` when `range` asks for any sub-range at all.
pub(crate) fn has_range(range: Option<&NumericRange>) -> bool {
    range.is_some_and(|r| !r.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ranges() {
        let r: NumericRange = "0:3".parse().unwrap();
        assert_eq!(r.dimensions, vec![RangeDimension { min: 0, max: 3 }]);

        let r: NumericRange = "2".parse().unwrap();
        assert_eq!(r.dimensions, vec![RangeDimension { min: 2, max: 2 }]);

        let r: NumericRange = "0:1, 4".parse().unwrap();
        assert_eq!(r.dimensions.len(), 2);
        assert_eq!(r.to_string(), "0:1,4");

        assert!("".parse::<NumericRange>().unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_ranges() {
        assert!("3:1".parse::<NumericRange>().is_err());
        assert!("2:2".parse::<NumericRange>().is_err());
        assert!("a".parse::<NumericRange>().is_err());
        assert!("1,".parse::<NumericRange>().is_err());
        assert!("-1".parse::<NumericRange>().is_err());
    }

    #[test]
    fn test_has_range() {
        assert!(!has_range(None));
        assert!(!has_range(Some(&NumericRange::default())));
        assert!(has_range(Some(&"1".parse().unwrap())));
    }

    #[test]
    fn test_variant_type_names() {
        assert_eq!(Variant::Array(vec![]).type_name(), "Array");
        assert_eq!(Variant::UInt32(3).type_name(), "UInt32");
    }
}
