use std::ops::Index;

use chrono::{NaiveDate, NaiveDateTime};

use super::model::ParamValue;
use super::parameter::{ParameterIndex, ParameterView};
use super::raw::{sections, RawStruct, RawValue};
use crate::error::{IFileError, Result};

// ---------------------------------------------------------------------------
// Engine record
// ---------------------------------------------------------------------------

/// Engine configuration fields, exactly as found in the record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EngineRecord {
    fields: Vec<(String, ParamValue)>,
}

impl EngineRecord {
    pub fn build(record: &RawStruct) -> Result<Self> {
        let block = record.get_struct(&[sections::ENGINE])?;
        let mut fields = Vec::with_capacity(block.len());
        for (name, raw) in block.iter() {
            match ParamValue::from_raw(raw) {
                Some(v) => fields.push((name.to_string(), v)),
                None => log::debug!("Engine field '{name}' is a struct, not exposed"),
            }
        }
        Ok(Self { fields })
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn try_get(&self, name: &str) -> Result<&ParamValue> {
        self.get(name)
            .ok_or_else(|| IFileError::not_found("engine field", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Index<&str> for EngineRecord {
    type Output = ParamValue;

    fn index(&self, name: &str) -> &ParamValue {
        match self.get(name) {
            Some(v) => v,
            None => panic!("engine field '{name}' not found"),
        }
    }
}

/// Engine field → (parameter name, description).
pub const ENGINE_PARAMETERS: [(&str, &str, &str); 7] = [
    ("name", "ENGINE", "engine name"),
    ("bore", "BORE", "bore diameter"),
    ("stroke", "STROKE", "stroke length"),
    ("conrod_length", "CONROD", "conrod length"),
    ("compression_ratio", "EPSILON", "compression"),
    ("number_of_strokes", "NRSTROKE", "number of strokes"),
    ("pin_offset", "PINOFF", "pinoff"),
];

/// Copy the known engine fields into `params`. Returns how many were injected.
pub fn inject_engine_parameters(
    engine: &EngineRecord,
    params: &mut ParameterIndex,
    test: Option<&str>,
) -> usize {
    let mut injected = 0;
    for (field, param, description) in ENGINE_PARAMETERS {
        if let Some(value) = engine.get(field) {
            params.insert(ParameterView::described(param, value.clone(), description, test));
            injected += 1;
        }
    }
    injected
}

// ---------------------------------------------------------------------------
// Header timestamp
// ---------------------------------------------------------------------------

pub const DATE_PARAMETER: &str = "DATE";
pub const TIMESTAMP_PARAMETER: &str = "TIMESTAMP";

/// Measurement start as stored (`yyyymmddhhmmss`) and as ISO-8601.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderTimestamp {
    pub date: i64,
    pub iso: String,
}

impl HeaderTimestamp {
    /// Parse a `yyyymmddhhmmss` value given as text or integral number.
    pub fn parse(raw: &RawValue) -> Result<Self> {
        let digits = match raw {
            RawValue::Text(s) => s.trim().to_string(),
            RawValue::Scalar(v) if v.is_finite() && v.fract() == 0.0 && *v >= 0.0 => {
                format!("{:014}", *v as i64)
            }
            other => {
                return Err(IFileError::Timestamp {
                    raw: other.to_string(),
                    message: format!("expected yyyymmddhhmmss, found {}", other.shape_name()),
                })
            }
        };
        let fail = |message: &str| IFileError::Timestamp {
            raw: digits.clone(),
            message: message.to_string(),
        };

        if digits.len() != 14 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(fail("expected 14 digits yyyymmddhhmmss"));
        }
        let field = |range: std::ops::Range<usize>| -> u32 {
            digits[range].parse().unwrap_or(u32::MAX)
        };
        let year = field(0..4) as i32;
        let dt: NaiveDateTime = NaiveDate::from_ymd_opt(year, field(4..6), field(6..8))
            .and_then(|d| d.and_hms_opt(field(8..10), field(10..12), field(12..14)))
            .ok_or_else(|| fail("not a valid calendar date/time"))?;
        let date = digits
            .parse::<i64>()
            .map_err(|e| fail(&e.to_string()))?;

        Ok(Self {
            date,
            iso: dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
        })
    }

    /// Read `header.date`. A missing header is fatal; a missing or bad date
    /// is a [`IFileError::Timestamp`].
    pub fn from_record(record: &RawStruct) -> Result<Self> {
        let header = record.get_struct(&[sections::HEADER])?;
        match header.field("date") {
            Some(raw) => Self::parse(raw),
            None => Err(IFileError::Timestamp {
                raw: String::new(),
                message: "header has no 'date' field".to_string(),
            }),
        }
    }
}

/// Inject `DATE` and `TIMESTAMP`; on a timestamp error neither is added and
/// the problem is only logged.
pub fn inject_timestamp(
    record: &RawStruct,
    params: &mut ParameterIndex,
    test: Option<&str>,
) -> Result<Option<HeaderTimestamp>> {
    match HeaderTimestamp::from_record(record) {
        Ok(ts) => {
            params.insert(ParameterView::described(
                DATE_PARAMETER,
                ParamValue::Integer(ts.date),
                "date of measurement",
                test,
            ));
            params.insert(ParameterView::described(
                TIMESTAMP_PARAMETER,
                ParamValue::Text(ts.iso.clone()),
                "time stamp",
                test,
            ));
            Ok(Some(ts))
        }
        Err(e @ IFileError::Timestamp { .. }) => {
            log::warn!("Timestamp parameters skipped: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::from_json;
    use serde_json::json;

    #[test]
    fn parses_numeric_and_text_dates() {
        let ts = HeaderTimestamp::parse(&RawValue::Scalar(20240115103045.0)).unwrap();
        assert_eq!(ts.date, 20240115103045);
        assert_eq!(ts.iso, "2024-01-15T10:30:45");

        let ts = HeaderTimestamp::parse(&RawValue::Text(" 19991231235959 ".into())).unwrap();
        assert_eq!(ts.iso, "1999-12-31T23:59:59");
    }

    #[test]
    fn rejects_out_of_range_fields() {
        for bad in ["20241315103045", "20240230103045", "20240115253045", "2024011510304"] {
            let err = HeaderTimestamp::parse(&RawValue::Text(bad.into())).unwrap_err();
            assert!(matches!(err, IFileError::Timestamp { .. }), "{bad}: {err}");
        }
        assert!(HeaderTimestamp::parse(&RawValue::Scalar(-1.0)).is_err());
        assert!(HeaderTimestamp::parse(&RawValue::Vector(vec![1.0, 2.0])).is_err());
    }

    #[test]
    fn bad_timestamp_is_not_fatal() {
        let rec = from_json(&json!({ "header": { "date": "20241399000000" } })).unwrap();
        let mut params = ParameterIndex::default();
        assert_eq!(inject_timestamp(rec.root(), &mut params, None).unwrap(), None);
        assert!(params.is_empty());
    }

    #[test]
    fn missing_header_is_fatal() {
        let rec = from_json(&json!({ "engine": {} })).unwrap();
        let mut params = ParameterIndex::default();
        assert!(matches!(
            inject_timestamp(rec.root(), &mut params, None),
            Err(IFileError::MissingField { .. })
        ));
    }

    #[test]
    fn injects_present_engine_fields_only() {
        let rec = from_json(&json!({
            "engine": { "name": "E1", "bore": 85.0, "stroke": 88.2, "cooling": { "type": "water" } }
        }))
        .unwrap();
        let engine = EngineRecord::build(rec.root()).unwrap();
        assert_eq!(engine.len(), 3);

        let mut params = ParameterIndex::default();
        assert_eq!(inject_engine_parameters(&engine, &mut params, None), 3);
        assert_eq!(params["ENGINE"].values()["ENGINE"], engine["name"]);
        assert_eq!(params["BORE"].values()["BORE"], engine["bore"]);
        assert_eq!(params["BORE"].general().description, "bore diameter");
        assert!(!params.contains("CONROD"));
    }
}
