use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde_json::{Map, Value as JsonValue};

use super::raw::{RawRecord, RawStruct, RawValue};
use crate::config::ConverterOptions;
use crate::error::{IFileError, Result};

// ---------------------------------------------------------------------------
// Record sources
// ---------------------------------------------------------------------------

/// Anything that can hand over a converted record.
///
/// The proprietary container → record conversion happens behind this trait;
/// `options` is what the converter needs to know about this crate's settings.
pub trait RecordSource {
    fn fetch(&self, options: &ConverterOptions) -> Result<RawRecord>;

    /// Test/run identifier attached to every channel's metadata.
    fn label(&self) -> Option<String> {
        None
    }
}

/// A converted record already serialized as JSON on disk.
#[derive(Debug, Clone)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonFile {
    fn fetch(&self, options: &ConverterOptions) -> Result<RawRecord> {
        log::debug!(
            "Reading converted record {} (converter offsets: {}, keep temp files: {}, converter log: {})",
            self.path.display(),
            options.offset_correction,
            options.keep_temp_files,
            options.log_level
        );
        load_file(&self.path)
    }

    fn label(&self) -> Option<String> {
        Some(self.path.display().to_string())
    }
}

impl RecordSource for RawRecord {
    fn fetch(&self, _options: &ConverterOptions) -> Result<RawRecord> {
        Ok(self.clone())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Load a converted record from a JSON file.
///
/// Expected shape (every section is an object):
///
/// ```json
/// {
///   "header": { "date": "20240115103045" },
///   "engine": { "name": "E1", "bore": 85.0 },
///   "ca": { "PCYL1": { "data": [[...], [...]], "axis": [...], "units": "bar" } },
///   "cy": { "IMEP1": { "data": [...], "units": "bar" } },
///   "parameters": { "SPEED": { "value": 2000, "unit": "rpm" } }
/// }
/// ```
pub fn load_file(path: &Path) -> Result<RawRecord> {
    let text = std::fs::read_to_string(path)?;
    from_json_str(&text)
}

pub fn from_json_str(text: &str) -> Result<RawRecord> {
    let root: JsonValue = serde_json::from_str(text)?;
    from_json(&root)
}

pub fn from_json(root: &JsonValue) -> Result<RawRecord> {
    let obj = root
        .as_object()
        .ok_or_else(|| IFileError::shape("<root>", "object", json_kind(root)))?;
    Ok(RawRecord::new(json_object_to_struct(obj, "")?))
}

fn json_kind(val: &JsonValue) -> &'static str {
    match val {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

fn json_object_to_struct(obj: &Map<String, JsonValue>, path: &str) -> Result<RawStruct> {
    let mut out = RawStruct::new();
    for (key, val) in obj {
        // null fields count as absent
        if let Some(raw) = json_to_raw(val, &child_path(path, key))? {
            out.push(key.clone(), raw);
        }
    }
    Ok(out)
}

fn json_to_raw(val: &JsonValue, path: &str) -> Result<Option<RawValue>> {
    let raw = match val {
        JsonValue::Null => return Ok(None),
        JsonValue::Bool(b) => RawValue::Scalar(if *b { 1.0 } else { 0.0 }),
        JsonValue::Number(n) => RawValue::Scalar(n.as_f64().unwrap_or(f64::NAN)),
        JsonValue::String(s) => RawValue::Text(s.clone()),
        JsonValue::Object(obj) => RawValue::Struct(json_object_to_struct(obj, path)?),
        JsonValue::Array(items) => json_array_to_raw(items, path)?,
    };
    Ok(Some(raw))
}

fn json_array_to_raw(items: &[JsonValue], path: &str) -> Result<RawValue> {
    if items.iter().all(|v| v.is_array()) && !items.is_empty() {
        return json_rows_to_matrix(items, path);
    }
    // squeezed single-string cell
    if let [JsonValue::String(s)] = items {
        return Ok(RawValue::Text(s.clone()));
    }
    json_array_to_f64(items, path).map(RawValue::Vector)
}

fn json_array_to_f64(items: &[JsonValue], path: &str) -> Result<Vec<f64>> {
    items
        .iter()
        .enumerate()
        .map(|(j, v)| match v {
            JsonValue::Number(n) => Ok(n.as_f64().unwrap_or(f64::NAN)),
            JsonValue::Null => Ok(f64::NAN),
            JsonValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(IFileError::shape(
                format!("{path}[{j}]"),
                "number",
                json_kind(other),
            )),
        })
        .collect()
}

fn json_rows_to_matrix(rows: &[JsonValue], path: &str) -> Result<RawValue> {
    let mut cols: Option<usize> = None;
    let mut flat = Vec::new();
    for (i, row) in rows.iter().enumerate() {
        let row_path = format!("{path}[{i}]");
        let items = row
            .as_array()
            .ok_or_else(|| IFileError::shape(&row_path, "array", json_kind(row)))?;
        let values = json_array_to_f64(items, &row_path)?;
        match cols {
            None => cols = Some(values.len()),
            Some(n) if n != values.len() => {
                return Err(IFileError::shape(
                    row_path,
                    format!("row of {n} values"),
                    format!("ragged row of {} values", values.len()),
                ));
            }
            Some(_) => {}
        }
        flat.extend(values);
    }
    let shape = (rows.len(), cols.unwrap_or(0));
    Array2::from_shape_vec(shape, flat)
        .map(RawValue::Matrix)
        .map_err(|e| IFileError::shape(path, "2-D array", e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn converts_all_node_kinds() {
        let rec = from_json(&json!({
            "header": { "date": "20240115103045", "flag": true, "skip": null },
            "ca": { "P": { "data": [[1, 2], [3, null]], "axis": [-1.0, 0.0] } },
            "cy": { "IMEP": { "data": [1.5, 2.5, 3.5] } },
            "parameters": { "NAME": ["engine-a"] }
        }))
        .unwrap();

        assert_eq!(rec.get_text(&["header", "date"]).unwrap(), "20240115103045");
        assert_eq!(rec.get_scalar(&["header", "flag"]).unwrap(), 1.0);
        assert!(rec.find(&["header", "skip"]).is_none());

        let m = rec.get_matrix(&["ca", "P", "data"]).unwrap();
        assert_eq!(m.dim(), (2, 2));
        assert!(m[[1, 1]].is_nan());
        assert_eq!(rec.get_vector(&["cy", "IMEP", "data"]).unwrap().len(), 3);
        assert_eq!(rec.get_text(&["parameters", "NAME"]).unwrap(), "engine-a");
    }

    #[test]
    fn keeps_declaration_order() {
        let rec = from_json_str(r#"{"ca": {"ZETA": 1, "ALPHA": 2, "MID": 3}}"#).unwrap();
        let names: Vec<&str> = rec
            .get_struct(&["ca"])
            .unwrap()
            .iter()
            .map(|(n, _)| n)
            .collect();
        assert_eq!(names, ["ZETA", "ALPHA", "MID"]);
    }

    #[test]
    fn wide_section_loads_every_channel_in_order() {
        let ca: Map<String, JsonValue> = (0..5000)
            .map(|i| (format!("CH{i:04}"), json!({ "data": [[i]] })))
            .collect();
        let rec = from_json(&json!({ "ca": ca })).unwrap();
        let group = rec.get_struct(&["ca"]).unwrap();
        assert_eq!(group.len(), 5000);
        assert_eq!(group.iter().nth(4321).map(|(n, _)| n), Some("CH4321"));
        assert_eq!(group.get_matrix(&["CH4999", "data"]).unwrap()[[0, 0]], 4999.0);
    }

    #[test]
    fn ragged_rows_rejected() {
        let err = from_json(&json!({ "ca": { "P": { "data": [[1, 2], [3]] } } })).unwrap_err();
        match err {
            IFileError::Shape { path, .. } => assert_eq!(path, "ca.P.data[1]"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn non_object_root_rejected() {
        assert!(matches!(
            from_json(&json!([1, 2, 3])),
            Err(IFileError::Shape { .. })
        ));
        assert!(matches!(from_json_str("{"), Err(IFileError::Json(_))));
    }
}
