use super::model::GeneralMeta;
use super::raw::{RawStruct, RawValue};

/// Range reported when there is no finite value to describe.
pub const NO_RANGE: &str = "n/a";

/// `"<min> to <max>"` over the finite values, or [`NO_RANGE`].
pub fn format_range<I>(values: I) -> String
where
    I: IntoIterator<Item = f64>,
{
    let bounds = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
    match bounds {
        Some((lo, hi)) => format!("{lo} to {hi}"),
        None => NO_RANGE.to_string(),
    }
}

/// First text field among `keys`, empty if none is present.
pub fn text_field(block: &RawStruct, keys: &[&str]) -> String {
    keys.iter()
        .find_map(|k| match block.field(k) {
            Some(RawValue::Text(s)) => Some(s.clone()),
            Some(RawValue::Scalar(v)) => Some(v.to_string()),
            _ => None,
        })
        .unwrap_or_default()
}

/// Descriptive fields read from a channel or parameter block.
pub struct MetaFields<'a> {
    pub name: &'a str,
    pub base: &'a str,
    pub test: Option<&'a str>,
}

impl MetaFields<'_> {
    /// Build the metadata from the block's well-known fields and the values
    /// actually loaded. A stored `count` is only cross-checked against
    /// `record_count`; `numeric` feeds the range.
    pub fn build(
        &self,
        block: Option<&RawStruct>,
        record_count: usize,
        numeric: &[f64],
    ) -> GeneralMeta {
        let (units, description) = match block {
            Some(b) => (
                text_field(b, &["units", "unit"]),
                text_field(b, &["description"]),
            ),
            None => (String::new(), String::new()),
        };

        if let Some(RawValue::Scalar(stored)) = block.and_then(|b| b.field("count")) {
            if *stored != record_count as f64 {
                log::warn!(
                    "'{}' declares {} records but holds {}; using the actual count",
                    self.name,
                    stored,
                    record_count
                );
            }
        }

        GeneralMeta {
            channel: self.name.to_string(),
            units,
            description,
            base: self.base.to_string(),
            record_count,
            range: format_range(numeric.iter().copied()),
            test: self.test.map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_skips_non_finite() {
        assert_eq!(format_range([3.0, f64::NAN, -1.5, f64::INFINITY]), "-1.5 to 3");
        assert_eq!(format_range([f64::NAN, f64::NEG_INFINITY]), NO_RANGE);
        assert_eq!(format_range(std::iter::empty()), NO_RANGE);
    }

    #[test]
    fn defaults_and_unit_alias() {
        let mut block = RawStruct::new();
        block.insert("unit", RawValue::Text("rpm".into()));
        block.insert("count", RawValue::Scalar(99.0));
        let meta = MetaFields {
            name: "SPEED",
            base: "",
            test: Some("run-1"),
        }
        .build(Some(&block), 2, &[2000.0, 2100.0]);

        assert_eq!(meta.units, "rpm");
        assert_eq!(meta.description, "");
        assert_eq!(meta.record_count, 2);
        assert_eq!(meta.range, "2000 to 2100");
        assert_eq!(meta.test.as_deref(), Some("run-1"));
    }
}
