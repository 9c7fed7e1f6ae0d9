use std::fmt;

use serde::Serialize;

use super::raw::RawValue;

// ---------------------------------------------------------------------------
// Axis – which base a channel is aligned to
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Sampled at fixed crank-angle increments within each cycle.
    CrankAngle,
    /// One sample per combustion cycle.
    Cycle,
}

impl Axis {
    /// Canonical uppercase tag, also the abscissa key in a channel's values.
    pub fn tag(self) -> &'static str {
        match self {
            Axis::CrankAngle => "CA",
            Axis::Cycle => "CY",
        }
    }

    /// Human-readable base name stored in the channel metadata.
    pub fn base_name(self) -> &'static str {
        match self {
            Axis::CrankAngle => "Crank Angle",
            Axis::Cycle => "Cycle",
        }
    }

    /// Section of the raw record holding this axis' channels.
    pub fn section(self) -> &'static str {
        match self {
            Axis::CrankAngle => super::raw::sections::CRANK_ANGLE,
            Axis::Cycle => super::raw::sections::CYCLE,
        }
    }
}

// ---------------------------------------------------------------------------
// GeneralMeta – descriptive metadata of one channel or parameter
// ---------------------------------------------------------------------------

/// Metadata captured once at load time.
///
/// `record_count` and `range` describe the values as loaded; they are not
/// refreshed when the offset correction rewrites a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneralMeta {
    pub channel: String,
    pub units: String,
    pub description: String,
    pub base: String,
    pub record_count: usize,
    pub range: String,
    pub test: Option<String>,
}

// ---------------------------------------------------------------------------
// ParamValue – a parameter or engine field
// ---------------------------------------------------------------------------

/// A dynamically-typed scalar or small array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Integer(i64),
    Float(f64),
    Text(String),
    Array(Vec<f64>),
}

impl ParamValue {
    /// Convert a raw leaf. Structs have no parameter representation.
    pub fn from_raw(raw: &RawValue) -> Option<Self> {
        match raw {
            RawValue::Scalar(v) => Some(ParamValue::Float(*v)),
            RawValue::Text(s) => Some(ParamValue::Text(s.clone())),
            RawValue::Vector(v) if v.len() == 1 => Some(ParamValue::Float(v[0])),
            RawValue::Vector(v) => Some(ParamValue::Array(v.clone())),
            RawValue::Matrix(m) => Some(ParamValue::Array(m.iter().copied().collect())),
            RawValue::Struct(_) => None,
        }
    }

    /// Number of recorded elements.
    pub fn len(&self) -> usize {
        match self {
            ParamValue::Array(v) => v.len(),
            _ => 1,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Integer(i) => Some(*i as f64),
            ParamValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric content, empty for text.
    pub fn numbers(&self) -> Vec<f64> {
        match self {
            ParamValue::Integer(i) => vec![*i as f64],
            ParamValue::Float(v) => vec![*v],
            ParamValue::Text(_) => Vec::new(),
            ParamValue::Array(v) => v.clone(),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Integer(v)
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Integer(i) => write!(f, "{i}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Text(s) => write!(f, "{s}"),
            ParamValue::Array(v) => {
                write!(f, "[")?;
                for (i, x) in v.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{x}")?;
                }
                write!(f, "]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_squeezes_singletons() {
        assert_eq!(
            ParamValue::from_raw(&RawValue::Vector(vec![3.5])),
            Some(ParamValue::Float(3.5))
        );
        assert_eq!(
            ParamValue::from_raw(&RawValue::Vector(vec![1.0, 2.0])),
            Some(ParamValue::Array(vec![1.0, 2.0]))
        );
        assert_eq!(
            ParamValue::from_raw(&RawValue::Struct(Default::default())),
            None
        );
    }

    #[test]
    fn display() {
        assert_eq!(ParamValue::Integer(20240115103045).to_string(), "20240115103045");
        assert_eq!(ParamValue::Array(vec![1.0, 2.5]).to_string(), "[1, 2.5]");
        assert_eq!(ParamValue::from("E1").to_string(), "E1");
    }

    #[test]
    fn len_counts_elements() {
        assert_eq!(ParamValue::Float(1.0).len(), 1);
        assert_eq!(ParamValue::from("x").len(), 1);
        assert_eq!(ParamValue::Array(vec![]).len(), 0);
        assert!(ParamValue::Array(vec![]).is_empty());
    }
}
