use std::collections::HashMap;
use std::ops::Index;

use super::meta::MetaFields;
use super::model::{Axis, GeneralMeta};
use super::raw::{RawStruct, RawValue};
use crate::error::{IFileError, Result};

// ---------------------------------------------------------------------------
// ChannelView – one named channel on one axis
// ---------------------------------------------------------------------------

/// A channel and its single authoritative sample buffer.
///
/// Samples are stored flattened, cycle-major: `cycles` rows of
/// `samples_per_cycle` values. Cycle channels have one sample per cycle.
#[derive(Debug, Clone)]
pub struct ChannelView {
    name: String,
    axis: Axis,
    general: GeneralMeta,
    /// Crank angle of each sample within a cycle (CA), or `[1.0]` (CY).
    sample_axis: Vec<f64>,
    /// Abscissa aligned with `samples`.
    abscissa: Vec<f64>,
    samples: Vec<f64>,
    samples_per_cycle: usize,
}

impl ChannelView {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn general(&self) -> &GeneralMeta {
        &self.general
    }

    pub fn values(&self) -> ChannelValues<'_> {
        ChannelValues { channel: self }
    }

    /// Key access: `GENERAL` or `VALUES`, case-insensitive.
    pub fn entry(&self, key: &str) -> Result<ChannelEntry<'_>> {
        match key.to_ascii_uppercase().as_str() {
            "GENERAL" => Ok(ChannelEntry::General(&self.general)),
            "VALUES" => Ok(ChannelEntry::Values(self.values())),
            _ => Err(IFileError::not_found("channel entry", key)),
        }
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn sample_axis(&self) -> &[f64] {
        &self.sample_axis
    }

    pub fn samples_per_cycle(&self) -> usize {
        self.samples_per_cycle
    }

    pub fn cycles(&self) -> usize {
        if self.samples_per_cycle == 0 {
            0
        } else {
            self.samples.len() / self.samples_per_cycle
        }
    }

    /// Samples of cycle `c` (0-based).
    pub fn cycle(&self, c: usize) -> Option<&[f64]> {
        let n = self.samples_per_cycle;
        self.samples.get(c * n..(c + 1) * n)
    }

    pub(crate) fn cycle_mut(&mut self, c: usize) -> Option<&mut [f64]> {
        let n = self.samples_per_cycle;
        self.samples.get_mut(c * n..(c + 1) * n)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Result of key access on a [`ChannelView`].
#[derive(Debug, Clone, Copy)]
pub enum ChannelEntry<'a> {
    General(&'a GeneralMeta),
    Values(ChannelValues<'a>),
}

// ---------------------------------------------------------------------------
// ChannelValues – the `VALUES` mapping
// ---------------------------------------------------------------------------

/// Borrowed `{name: samples, axis-tag: abscissa}` mapping over a channel.
///
/// Both entries are slices of the channel's own buffers.
#[derive(Debug, Clone, Copy)]
pub struct ChannelValues<'a> {
    channel: &'a ChannelView,
}

impl<'a> ChannelValues<'a> {
    pub fn get(&self, key: &str) -> Option<&'a [f64]> {
        if key == self.channel.name {
            Some(&self.channel.samples)
        } else if key == self.channel.axis.tag() {
            Some(&self.channel.abscissa)
        } else {
            None
        }
    }

    pub fn try_get(&self, key: &str) -> Result<&'a [f64]> {
        self.get(key)
            .ok_or_else(|| IFileError::not_found("values key", key))
    }

    /// Keys in order: the axis tag, then the channel name. A channel named
    /// like its axis tag has only the one key, resolving to its samples.
    pub fn keys(&self) -> impl Iterator<Item = &'a str> {
        let name = self.channel.name.as_str();
        let tag: &'a str = self.channel.axis.tag();
        (tag != name).then_some(tag).into_iter().chain(std::iter::once(name))
    }

    pub fn len(&self) -> usize {
        if self.channel.name == self.channel.axis.tag() {
            1
        } else {
            2
        }
    }

    pub fn is_empty(&self) -> bool {
        false
    }
}

impl Index<&str> for ChannelValues<'_> {
    type Output = [f64];

    fn index(&self, key: &str) -> &[f64] {
        match self.get(key) {
            Some(v) => v,
            None => panic!("no values entry '{key}' in channel '{}'", self.channel.name),
        }
    }
}

// ---------------------------------------------------------------------------
// AxisView – name → channel for one axis
// ---------------------------------------------------------------------------

/// Channel table of one axis. Channels keep their raw declaration order and
/// a stable position, so correction mutates the same buffer readers see.
#[derive(Debug, Clone)]
pub struct AxisView {
    axis: Axis,
    channels: Vec<ChannelView>,
    index: HashMap<String, usize>,
}

impl AxisView {
    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn get(&self, name: &str) -> Option<&ChannelView> {
        self.index.get(name).map(|&i| &self.channels[i])
    }

    pub fn try_get(&self, name: &str) -> Result<&ChannelView> {
        self.get(name)
            .ok_or_else(|| IFileError::not_found("channel", format!("{}/{name}", self.axis.tag())))
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut ChannelView> {
        let i = *self.index.get(name)?;
        self.channels.get_mut(i)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChannelView> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Build the view from the axis' section of the raw record.
    pub fn build(record: &RawStruct, axis: Axis, test: Option<&str>) -> Result<Self> {
        let section = axis.section();
        let group = record.get_struct(&[section])?;

        let mut channels = Vec::with_capacity(group.len());
        let mut index = HashMap::with_capacity(group.len());
        for (name, entry) in group.iter() {
            let channel = build_channel(axis, name, entry, test)?;
            index.insert(name.to_string(), channels.len());
            channels.push(channel);
        }
        log::debug!("Built {} axis with {} channels", axis.tag(), channels.len());

        Ok(Self {
            axis,
            channels,
            index,
        })
    }
}

impl Index<&str> for AxisView {
    type Output = ChannelView;

    fn index(&self, name: &str) -> &ChannelView {
        match self.get(name) {
            Some(c) => c,
            None => panic!("channel '{name}' not found in {}", self.axis.tag()),
        }
    }
}

impl<'a> IntoIterator for &'a AxisView {
    type Item = &'a ChannelView;
    type IntoIter = std::slice::Iter<'a, ChannelView>;

    fn into_iter(self) -> Self::IntoIter {
        self.channels.iter()
    }
}

// ---------------------------------------------------------------------------
// Channel construction
// ---------------------------------------------------------------------------

fn build_channel(
    axis: Axis,
    name: &str,
    entry: &RawValue,
    test: Option<&str>,
) -> Result<ChannelView> {
    let section = axis.section();
    let block = entry
        .as_struct()
        .ok_or_else(|| IFileError::metadata(name, format!("entry is a {}", entry.shape_name())))?;

    let data = match block.field("data") {
        None => return Err(IFileError::metadata(name, "no 'data' field")),
        Some(RawValue::Text(_)) | Some(RawValue::Struct(_)) => {
            return Err(IFileError::metadata(name, "'data' is not numeric"))
        }
        Some(data) => data,
    };
    let data_path = || format!("{section}.{name}.data");
    let axis_path = || format!("{section}.{name}.axis");

    let (samples, sample_axis, samples_per_cycle) = match axis {
        Axis::CrankAngle => {
            let stored_axis = match block.field("axis") {
                None => None,
                Some(RawValue::Scalar(v)) => Some(vec![*v]),
                Some(RawValue::Vector(v)) => Some(v.clone()),
                Some(other) => {
                    return Err(IFileError::shape(axis_path(), "1-D array", other.shape_name()))
                }
            };
            let (samples, per_cycle) = match data {
                RawValue::Matrix(m) => (m.iter().copied().collect::<Vec<f64>>(), m.ncols()),
                // squeezed single-angle channel: one value per cycle
                RawValue::Vector(v) if stored_axis.as_ref().map_or(true, |a| a.len() == 1) => {
                    (v.clone(), 1)
                }
                RawValue::Vector(v) => (v.clone(), v.len()),
                RawValue::Scalar(v) => (vec![*v], 1),
                other => {
                    return Err(IFileError::shape(data_path(), "2-D array", other.shape_name()))
                }
            };
            let sample_axis = match stored_axis {
                None => (0..per_cycle).map(|i| i as f64).collect(),
                Some(a) if a.len() != per_cycle => {
                    return Err(IFileError::shape(
                        axis_path(),
                        format!("{per_cycle} crank angles"),
                        format!("{} values", a.len()),
                    ))
                }
                Some(a) => a,
            };
            (samples, sample_axis, per_cycle)
        }
        Axis::Cycle => match data {
            RawValue::Scalar(v) => (vec![*v], vec![1.0], 1),
            RawValue::Vector(v) => (v.clone(), vec![1.0], 1),
            other => {
                return Err(IFileError::shape(data_path(), "1-D array", other.shape_name()))
            }
        },
    };

    let abscissa: Vec<f64> = match axis {
        Axis::CrankAngle => sample_axis
            .iter()
            .copied()
            .cycle()
            .take(samples.len())
            .collect(),
        Axis::Cycle => (1..=samples.len()).map(|c| c as f64).collect(),
    };

    let general = MetaFields {
        name,
        base: axis.base_name(),
        test,
    }
    .build(Some(block), samples.len(), &samples);

    Ok(ChannelView {
        name: name.to_string(),
        axis,
        general,
        sample_axis,
        abscissa,
        samples,
        samples_per_cycle,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::from_json;
    use serde_json::json;

    fn record() -> RawStruct {
        from_json(&json!({
            "ca": {
                "PCYL1": {
                    "data": [[1, 2, 3], [4, 5, 6]],
                    "axis": [-1.0, 0.0, 1.0],
                    "units": "bar",
                    "description": "cylinder pressure"
                },
                "SDREF": { "data": [[5], [6]] }
            },
            "cy": {
                "IMEP1": { "data": [7.5, 8.5], "units": "bar" }
            }
        }))
        .unwrap()
        .root()
        .clone()
    }

    #[test]
    fn crank_angle_channel_flattens_cycle_major() {
        let ca = AxisView::build(&record(), Axis::CrankAngle, Some("t")).unwrap();
        assert_eq!(ca.names().collect::<Vec<_>>(), ["PCYL1", "SDREF"]);

        let ch = &ca["PCYL1"];
        assert_eq!(ch.samples(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(ch.cycles(), 2);
        assert_eq!(ch.cycle(1).unwrap(), [4.0, 5.0, 6.0]);
        assert_eq!(ch.values()["CA"], [-1.0, 0.0, 1.0, -1.0, 0.0, 1.0]);

        let g = ch.general();
        assert_eq!(g.base, "Crank Angle");
        assert_eq!(g.units, "bar");
        assert_eq!(g.record_count, ch.values()["PCYL1"].len());
        assert_eq!(g.range, "1 to 6");

        // no stored axis: sample indices
        assert_eq!(ca["SDREF"].sample_axis(), [0.0]);
    }

    #[test]
    fn cycle_channel_abscissa_is_cycle_number() {
        let cy = AxisView::build(&record(), Axis::Cycle, None).unwrap();
        let ch = cy.try_get("IMEP1").unwrap();
        assert_eq!(ch.values().try_get("CY").unwrap(), [1.0, 2.0]);
        assert_eq!(ch.values().keys().collect::<Vec<_>>(), ["CY", "IMEP1"]);
        assert_eq!(ch.general().base, "Cycle");
        assert!(ch.general().test.is_none());
    }

    #[test]
    fn lookup_is_exact() {
        let ca = AxisView::build(&record(), Axis::CrankAngle, None).unwrap();
        assert!(ca.get("pcyl1").is_none());
        assert!(matches!(
            ca.try_get("NOPE"),
            Err(IFileError::KeyNotFound { .. })
        ));
        assert!(matches!(
            ca["PCYL1"].entry("general"),
            Ok(ChannelEntry::General(_))
        ));
        assert!(ca["PCYL1"].entry("RAW").is_err());
    }

    #[test]
    fn missing_data_is_metadata_error() {
        let rec = from_json(&json!({ "ca": { "P": { "units": "bar" } } })).unwrap();
        let err = AxisView::build(rec.root(), Axis::CrankAngle, None).unwrap_err();
        assert!(matches!(err, IFileError::Metadata { .. }), "{err}");
    }

    #[test]
    fn axis_length_mismatch_is_shape_error() {
        let rec = from_json(&json!({
            "ca": { "P": { "data": [[1, 2]], "axis": [0, 1, 2] } }
        }))
        .unwrap();
        match AxisView::build(rec.root(), Axis::CrankAngle, None) {
            Err(IFileError::Shape { path, .. }) => assert_eq!(path, "ca.P.axis"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn one_dimensional_reference_is_one_sample_per_cycle() {
        let rec = from_json(&json!({
            "ca": {
                "SDREF": { "data": [5, 6, 7] },
                "SREF2": { "data": [1, 2], "axis": [-180] },
                "PSHORT": { "data": [1, 2, 3], "axis": [0, 1, 2] }
            }
        }))
        .unwrap();
        let ca = AxisView::build(rec.root(), Axis::CrankAngle, None).unwrap();

        assert_eq!(ca["SDREF"].cycles(), 3);
        assert_eq!(ca["SDREF"].samples_per_cycle(), 1);
        assert_eq!(ca["SDREF"].cycle(2).unwrap(), [7.0]);
        assert_eq!(ca["SDREF"].values()["CA"], [0.0, 0.0, 0.0]);

        assert_eq!(ca["SREF2"].cycles(), 2);
        assert_eq!(ca["SREF2"].values()["CA"], [-180.0, -180.0]);

        assert_eq!(ca["PSHORT"].cycles(), 1);
        assert_eq!(ca["PSHORT"].samples_per_cycle(), 3);
    }

    #[test]
    fn channel_named_like_axis_has_one_values_key() {
        let rec = from_json(&json!({ "cy": { "CY": { "data": [3, 4] } } })).unwrap();
        let cy = AxisView::build(rec.root(), Axis::Cycle, None).unwrap();
        let values = cy["CY"].values();
        assert_eq!(values.keys().collect::<Vec<_>>(), ["CY"]);
        assert_eq!(values.len(), 1);
        assert_eq!(values["CY"], [3.0, 4.0]);
    }

    #[test]
    fn two_dimensional_cycle_channel_rejected() {
        let rec = from_json(&json!({ "cy": { "X": { "data": [[1, 2], [3, 4]] } } })).unwrap();
        assert!(matches!(
            AxisView::build(rec.root(), Axis::Cycle, None),
            Err(IFileError::Shape { .. })
        ));
    }
}
