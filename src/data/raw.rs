use std::fmt;

use ndarray::Array2;

use crate::error::{IFileError, Result};

// ---------------------------------------------------------------------------
// RawValue – one node of the converter's hierarchical record
// ---------------------------------------------------------------------------

/// A node of the converted record: named structs, numeric arrays and strings.
///
/// 2-D arrays are stored row-major with one row per combustion cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Scalar(f64),
    Text(String),
    Vector(Vec<f64>),
    Matrix(Array2<f64>),
    Struct(RawStruct),
}

impl RawValue {
    /// Short shape description used in error messages.
    pub fn shape_name(&self) -> String {
        match self {
            RawValue::Scalar(_) => "scalar".to_string(),
            RawValue::Text(_) => "text".to_string(),
            RawValue::Vector(v) => format!("1-D array [{}]", v.len()),
            RawValue::Matrix(m) => format!("2-D array [{}x{}]", m.nrows(), m.ncols()),
            RawValue::Struct(_) => "struct".to_string(),
        }
    }

    pub fn as_struct(&self) -> Option<&RawStruct> {
        match self {
            RawValue::Struct(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Scalar(v) => write!(f, "{v}"),
            RawValue::Text(s) => write!(f, "{s}"),
            other => write!(f, "<{}>", other.shape_name()),
        }
    }
}

// ---------------------------------------------------------------------------
// RawStruct – ordered named fields with typed path accessors
// ---------------------------------------------------------------------------

/// Named fields in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawStruct {
    fields: Vec<(String, RawValue)>,
}

fn join(path: &[&str]) -> String {
    path.join(".")
}

impl RawStruct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, replacing an existing one in place.
    pub fn insert(&mut self, name: impl Into<String>, value: RawValue) {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Append a field whose name is not yet present.
    pub(crate) fn push(&mut self, name: String, value: RawValue) {
        self.fields.push((name, value));
    }

    pub fn field(&self, name: &str) -> Option<&RawValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Walk `path`; `None` if any segment is absent or not a struct.
    pub fn find(&self, path: &[&str]) -> Option<&RawValue> {
        let (last, parents) = path.split_last()?;
        let mut node = self;
        for seg in parents {
            node = node.field(seg)?.as_struct()?;
        }
        node.field(last)
    }

    fn require(&self, path: &[&str]) -> Result<&RawValue> {
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| IFileError::missing("<empty path>"))?;
        let mut node = self;
        for (depth, seg) in parents.iter().enumerate() {
            let here = &path[..=depth];
            node = match node.field(seg) {
                Some(RawValue::Struct(s)) => s,
                Some(other) => {
                    return Err(IFileError::shape(join(here), "struct", other.shape_name()))
                }
                None => return Err(IFileError::missing(join(here))),
            };
        }
        node.field(last)
            .ok_or_else(|| IFileError::missing(join(path)))
    }

    pub fn get_struct(&self, path: &[&str]) -> Result<&RawStruct> {
        match self.require(path)? {
            RawValue::Struct(s) => Ok(s),
            other => Err(IFileError::shape(join(path), "struct", other.shape_name())),
        }
    }

    /// 1-D numeric array. A scalar is a squeezed one-element array.
    pub fn get_vector(&self, path: &[&str]) -> Result<Vec<f64>> {
        match self.require(path)? {
            RawValue::Scalar(v) => Ok(vec![*v]),
            RawValue::Vector(v) => Ok(v.clone()),
            other => Err(IFileError::shape(join(path), "1-D array", other.shape_name())),
        }
    }

    /// 2-D numeric array; a 1-D array is a single row, a scalar is 1x1.
    pub fn get_matrix(&self, path: &[&str]) -> Result<Array2<f64>> {
        match self.require(path)? {
            RawValue::Scalar(v) => Ok(Array2::from_elem((1, 1), *v)),
            RawValue::Vector(v) => Array2::from_shape_vec((1, v.len()), v.clone())
                .map_err(|e| IFileError::shape(join(path), "2-D array", e.to_string())),
            RawValue::Matrix(m) => Ok(m.clone()),
            other => Err(IFileError::shape(join(path), "2-D array", other.shape_name())),
        }
    }

    pub fn get_scalar(&self, path: &[&str]) -> Result<f64> {
        match self.require(path)? {
            RawValue::Scalar(v) => Ok(*v),
            RawValue::Vector(v) if v.len() == 1 => Ok(v[0]),
            other => Err(IFileError::shape(join(path), "scalar", other.shape_name())),
        }
    }

    pub fn get_text(&self, path: &[&str]) -> Result<&str> {
        match self.require(path)? {
            RawValue::Text(s) => Ok(s),
            other => Err(IFileError::shape(join(path), "text", other.shape_name())),
        }
    }
}

// ---------------------------------------------------------------------------
// RawRecord – the whole converted measurement
// ---------------------------------------------------------------------------

/// Section names of the converted record.
pub mod sections {
    pub const HEADER: &str = "header";
    pub const ENGINE: &str = "engine";
    pub const CRANK_ANGLE: &str = "ca";
    pub const CYCLE: &str = "cy";
    pub const PARAMETERS: &str = "parameters";
}

/// The converter's output: a root struct holding the record sections.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    root: RawStruct,
}

impl RawRecord {
    pub fn new(root: RawStruct) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &RawStruct {
        &self.root
    }
}

impl From<RawStruct> for RawRecord {
    fn from(root: RawStruct) -> Self {
        Self::new(root)
    }
}

impl std::ops::Deref for RawRecord {
    type Target = RawStruct;

    fn deref(&self) -> &RawStruct {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> RawStruct {
        let mut chan = RawStruct::new();
        chan.insert(
            "data",
            RawValue::Matrix(Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap()),
        );
        chan.insert("units", RawValue::Text("bar".into()));
        let mut ca = RawStruct::new();
        ca.insert("PCYL1", RawValue::Struct(chan));
        let mut root = RawStruct::new();
        root.insert("ca", RawValue::Struct(ca));
        root.insert("speed", RawValue::Scalar(2000.0));
        root.insert("single", RawValue::Vector(vec![7.0]));
        root
    }

    #[test]
    fn nested_lookup() {
        let root = sample();
        let m = root.get_matrix(&["ca", "PCYL1", "data"]).unwrap();
        assert_eq!(m.dim(), (2, 2));
        assert_eq!(root.get_text(&["ca", "PCYL1", "units"]).unwrap(), "bar");
        assert!(root.find(&["ca", "PCYL1", "axis"]).is_none());
    }

    #[test]
    fn missing_path_reports_failing_prefix() {
        let root = sample();
        match root.get_struct(&["cy", "IMEP"]) {
            Err(IFileError::MissingField { path }) => assert_eq!(path, "cy"),
            other => panic!("unexpected {other:?}"),
        }
        match root.get_vector(&["ca", "PCYL1", "axis"]) {
            Err(IFileError::MissingField { path }) => assert_eq!(path, "ca.PCYL1.axis"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn scalar_from_matrix_is_shape_error() {
        let root = sample();
        let err = root.get_scalar(&["ca", "PCYL1", "data"]).unwrap_err();
        assert!(matches!(err, IFileError::Shape { .. }), "{err}");
        let err = root.get_vector(&["speed", "x"]).unwrap_err();
        assert!(matches!(err, IFileError::Shape { .. }), "{err}");
    }

    #[test]
    fn squeezed_singletons() {
        let root = sample();
        assert_eq!(root.get_scalar(&["single"]).unwrap(), 7.0);
        assert_eq!(root.get_vector(&["speed"]).unwrap(), vec![2000.0]);
        assert_eq!(root.get_matrix(&["speed"]).unwrap().dim(), (1, 1));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut s = RawStruct::new();
        s.insert("a", RawValue::Scalar(1.0));
        s.insert("b", RawValue::Scalar(2.0));
        s.insert("a", RawValue::Scalar(3.0));
        let names: Vec<&str> = s.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["a", "b"]);
        assert_eq!(s.get_scalar(&["a"]).unwrap(), 3.0);
    }
}
