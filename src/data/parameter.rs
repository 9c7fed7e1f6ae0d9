use std::collections::HashMap;
use std::ops::Index;

use super::meta::MetaFields;
use super::model::{GeneralMeta, ParamValue};
use super::raw::{sections, RawStruct, RawValue};
use crate::error::{IFileError, Result};

// ---------------------------------------------------------------------------
// ParameterView
// ---------------------------------------------------------------------------

/// A named scalar-or-small-array value with its metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterView {
    name: String,
    general: GeneralMeta,
    value: ParamValue,
}

impl ParameterView {
    pub fn new(
        name: impl Into<String>,
        value: ParamValue,
        block: Option<&RawStruct>,
        test: Option<&str>,
    ) -> Self {
        let name = name.into();
        let general = MetaFields {
            name: &name,
            base: "",
            test,
        }
        .build(block, value.len(), &value.numbers());
        Self {
            name,
            general,
            value,
        }
    }

    /// A parameter with a fixed description and no units.
    pub fn described(
        name: impl Into<String>,
        value: ParamValue,
        description: &str,
        test: Option<&str>,
    ) -> Self {
        let mut block = RawStruct::new();
        block.insert("description", RawValue::Text(description.to_string()));
        Self::new(name, value, Some(&block), test)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn general(&self) -> &GeneralMeta {
        &self.general
    }

    pub fn value(&self) -> &ParamValue {
        &self.value
    }

    pub fn values(&self) -> ParameterValues<'_> {
        ParameterValues { parameter: self }
    }

    /// Key access: `GENERAL` or `VALUES`, case-insensitive.
    pub fn entry(&self, key: &str) -> Result<ParameterEntry<'_>> {
        match key.to_ascii_uppercase().as_str() {
            "GENERAL" => Ok(ParameterEntry::General(&self.general)),
            "VALUES" => Ok(ParameterEntry::Values(self.values())),
            _ => Err(IFileError::not_found("parameter entry", key)),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum ParameterEntry<'a> {
    General(&'a GeneralMeta),
    Values(ParameterValues<'a>),
}

/// The `{name: value}` mapping of a parameter.
#[derive(Debug, Clone, Copy)]
pub struct ParameterValues<'a> {
    parameter: &'a ParameterView,
}

impl<'a> ParameterValues<'a> {
    pub fn get(&self, key: &str) -> Option<&'a ParamValue> {
        (key == self.parameter.name).then_some(&self.parameter.value)
    }

    pub fn try_get(&self, key: &str) -> Result<&'a ParamValue> {
        self.get(key)
            .ok_or_else(|| IFileError::not_found("values key", key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        std::iter::once(self.parameter.name.as_str())
    }
}

impl Index<&str> for ParameterValues<'_> {
    type Output = ParamValue;

    fn index(&self, key: &str) -> &ParamValue {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no values entry '{key}' in parameter '{}'", self.parameter.name),
        }
    }
}

// ---------------------------------------------------------------------------
// ParameterIndex
// ---------------------------------------------------------------------------

/// Name → parameter, in declaration order, injected parameters last.
#[derive(Debug, Clone, Default)]
pub struct ParameterIndex {
    params: Vec<ParameterView>,
    index: HashMap<String, usize>,
}

impl ParameterIndex {
    pub fn get(&self, name: &str) -> Option<&ParameterView> {
        self.index.get(name).map(|&i| &self.params[i])
    }

    pub fn try_get(&self, name: &str) -> Result<&ParameterView> {
        self.get(name)
            .ok_or_else(|| IFileError::not_found("parameter", name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterView> {
        self.params.iter()
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Add a parameter; an existing one with the same name is replaced in place.
    pub(crate) fn insert(&mut self, param: ParameterView) {
        match self.index.get(&param.name) {
            Some(&i) => {
                log::debug!("Parameter '{}' overwritten", param.name);
                self.params[i] = param;
            }
            None => {
                self.index.insert(param.name.clone(), self.params.len());
                self.params.push(param);
            }
        }
    }

    /// Build the index from the record's parameter section.
    ///
    /// An entry is either a bare leaf or a struct with `value`/`values` and
    /// optional `unit`/`units` and `description`.
    pub fn build(record: &RawStruct, test: Option<&str>) -> Result<Self> {
        let group = record.get_struct(&[sections::PARAMETERS])?;
        let mut out = Self::default();
        for (name, entry) in group.iter() {
            let param = match entry {
                RawValue::Struct(block) => {
                    let raw = block
                        .field("value")
                        .or_else(|| block.field("values"))
                        .ok_or_else(|| IFileError::metadata(name, "no 'value' field"))?;
                    let value = ParamValue::from_raw(raw)
                        .ok_or_else(|| IFileError::metadata(name, "value is a struct"))?;
                    ParameterView::new(name, value, Some(block), test)
                }
                leaf => {
                    let value = ParamValue::from_raw(leaf)
                        .ok_or_else(|| IFileError::metadata(name, "value is a struct"))?;
                    ParameterView::new(name, value, None, test)
                }
            };
            out.insert(param);
        }
        log::debug!("Built parameter index with {} entries", out.len());
        Ok(out)
    }
}

impl Index<&str> for ParameterIndex {
    type Output = ParameterView;

    fn index(&self, name: &str) -> &ParameterView {
        match self.get(name) {
            Some(p) => p,
            None => panic!("parameter '{name}' not found"),
        }
    }
}

impl<'a> IntoIterator for &'a ParameterIndex {
    type Item = &'a ParameterView;
    type IntoIter = std::slice::Iter<'a, ParameterView>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::from_json;
    use crate::data::meta::NO_RANGE;
    use serde_json::json;

    fn index() -> ParameterIndex {
        let rec = from_json(&json!({
            "parameters": {
                "SPEED": { "value": 2000, "unit": "rpm", "description": "engine speed" },
                "OPERATOR": "bench-3",
                "VALVES": { "values": [1.0, 2.0, 3.0] },
                "LAMBDA": 1.02
            }
        }))
        .unwrap();
        ParameterIndex::build(rec.root(), Some("run")).unwrap()
    }

    #[test]
    fn builds_in_declaration_order() {
        let idx = index();
        assert_eq!(
            idx.names().collect::<Vec<_>>(),
            ["SPEED", "OPERATOR", "VALVES", "LAMBDA"]
        );
    }

    #[test]
    fn metadata_and_values() {
        let idx = index();
        let speed = &idx["SPEED"];
        assert_eq!(speed.values()["SPEED"], ParamValue::Float(2000.0));
        assert_eq!(speed.general().units, "rpm");
        assert_eq!(speed.general().description, "engine speed");
        assert_eq!(speed.general().record_count, 1);
        assert_eq!(speed.general().base, "");

        let op = &idx["OPERATOR"];
        assert_eq!(op.value().as_str(), Some("bench-3"));
        assert_eq!(op.general().range, NO_RANGE);
        assert_eq!(op.general().record_count, 1);

        let valves = idx.try_get("VALVES").unwrap();
        assert_eq!(valves.general().record_count, 3);
        assert_eq!(valves.general().range, "1 to 3");
    }

    #[test]
    fn insert_overwrites_in_place() {
        let mut idx = index();
        idx.insert(ParameterView::described("OPERATOR", "bench-4".into(), "op", None));
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.names().nth(1), Some("OPERATOR"));
        assert_eq!(idx["OPERATOR"].value().as_str(), Some("bench-4"));
        assert_eq!(idx["OPERATOR"].general().description, "op");
    }

    #[test]
    fn unknown_name_is_key_not_found() {
        let idx = index();
        assert!(matches!(
            idx.try_get("speed"),
            Err(IFileError::KeyNotFound { .. })
        ));
        assert!(idx["SPEED"].values().get("LAMBDA").is_none());
    }

    #[test]
    fn struct_without_value_rejected() {
        let rec = from_json(&json!({ "parameters": { "X": { "unit": "mm" } } })).unwrap();
        assert!(matches!(
            ParameterIndex::build(rec.root(), None),
            Err(IFileError::Metadata { .. })
        ));
    }
}
