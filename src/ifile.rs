use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::config::IFileConfig;
use crate::correction::{self, AppliedOffset, CorrectionPairs};
use crate::data::axis::AxisView;
use crate::data::engine::{self, EngineRecord, HeaderTimestamp};
use crate::data::loader::{JsonFile, RecordSource};
use crate::data::model::Axis;
use crate::data::parameter::ParameterIndex;
use crate::data::raw::{sections, RawRecord, RawValue};
use crate::error::{IFileError, Result};
use crate::logging;

// ---------------------------------------------------------------------------
// Section tags
// ---------------------------------------------------------------------------

/// The four addressable sections of a loaded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionTag {
    Ca,
    Cy,
    Par,
    Engine,
}

impl SectionTag {
    pub const ALL: [SectionTag; 4] = [
        SectionTag::Ca,
        SectionTag::Cy,
        SectionTag::Par,
        SectionTag::Engine,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionTag::Ca => "CA",
            SectionTag::Cy => "CY",
            SectionTag::Par => "PAR",
            SectionTag::Engine => "ENGINE",
        }
    }
}

impl fmt::Display for SectionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionTag {
    type Err = IFileError;

    /// Tags are matched case-insensitively.
    fn from_str(s: &str) -> Result<Self> {
        SectionTag::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| IFileError::not_found("section", s))
    }
}

/// A section as returned by key access on [`IFile`].
#[derive(Debug, Clone, Copy)]
pub enum Section<'a> {
    Axis(&'a AxisView),
    Parameters(&'a ParameterIndex),
    Engine(&'a EngineRecord),
}

impl<'a> Section<'a> {
    pub fn as_axis(self) -> Option<&'a AxisView> {
        match self {
            Section::Axis(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_parameters(self) -> Option<&'a ParameterIndex> {
        match self {
            Section::Parameters(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_engine(self) -> Option<&'a EngineRecord> {
        match self {
            Section::Engine(e) => Some(e),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// IFile
// ---------------------------------------------------------------------------

/// A loaded measurement: CA/CY channels, parameters, engine data and the
/// offset-correction registry.
///
/// Construction either fully succeeds or fails; there is no partially
/// loaded state. Correction mutates CA channels in place, so callers sharing
/// an `IFile` across threads must serialize access themselves.
#[derive(Debug)]
pub struct IFile {
    config: IFileConfig,
    source: Option<String>,
    engine: EngineRecord,
    parameters: ParameterIndex,
    ca: AxisView,
    cy: AxisView,
    correction_pairs: CorrectionPairs,
    timestamp: Option<HeaderTimestamp>,
}

impl IFile {
    /// Load a converted record stored as JSON.
    pub fn open(path: impl AsRef<Path>, config: IFileConfig) -> Result<Self> {
        Self::load(&JsonFile::new(path.as_ref()), config)
    }

    pub fn load<S>(source: &S, config: IFileConfig) -> Result<Self>
    where
        S: RecordSource + ?Sized,
    {
        let record = source.fetch(&config.converter_options())?;
        Self::from_record(&record, source.label(), config)
    }

    /// Build every view from `record`; with `avl_correction` set, detect
    /// the correction pairs and apply them.
    pub fn from_record(
        record: &RawRecord,
        label: Option<String>,
        config: IFileConfig,
    ) -> Result<Self> {
        logging::init(config.log);

        let source = label.or_else(|| match record.find(&[sections::HEADER, "test"]) {
            Some(RawValue::Text(s)) => Some(s.clone()),
            _ => None,
        });
        let test = source.as_deref();

        let ca = AxisView::build(record, Axis::CrankAngle, test)?;
        let cy = AxisView::build(record, Axis::Cycle, test)?;
        let mut parameters = ParameterIndex::build(record, test)?;
        let engine = EngineRecord::build(record)?;
        let injected = engine::inject_engine_parameters(&engine, &mut parameters, test);
        let timestamp = engine::inject_timestamp(record, &mut parameters, test)?;

        let mut ifile = Self {
            config,
            source,
            engine,
            parameters,
            ca,
            cy,
            correction_pairs: CorrectionPairs::new(),
            timestamp,
        };

        if ifile.config.avl_correction {
            ifile.correction_pairs = correction::detect_pairs(ifile.ca.names());
            correction::apply_corrections(
                &mut ifile.ca,
                &ifile.correction_pairs,
                ifile.config.offset_method,
            )?;
        }

        log::info!(
            "Loaded {}: {} CA / {} CY channels, {} parameters ({} from engine), {} correction pairs",
            ifile.source.as_deref().unwrap_or("record"),
            ifile.ca.len(),
            ifile.cy.len(),
            ifile.parameters.len(),
            injected,
            ifile.correction_pairs.len()
        );
        Ok(ifile)
    }

    pub fn config(&self) -> &IFileConfig {
        &self.config
    }

    /// Source label (file path or header test name), also stored as `test`
    /// in every channel's metadata.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn engine(&self) -> &EngineRecord {
        &self.engine
    }

    pub fn parameters(&self) -> &ParameterIndex {
        &self.parameters
    }

    pub fn ca(&self) -> &AxisView {
        &self.ca
    }

    pub fn cy(&self) -> &AxisView {
        &self.cy
    }

    pub fn correction_pairs(&self) -> &CorrectionPairs {
        &self.correction_pairs
    }

    /// Parsed header timestamp, `None` if it could not be parsed.
    pub fn timestamp(&self) -> Option<&HeaderTimestamp> {
        self.timestamp.as_ref()
    }

    /// Key access by section tag (`CA`, `CY`, `PAR`, `ENGINE`).
    pub fn section(&self, tag: &str) -> Result<Section<'_>> {
        Ok(match tag.parse::<SectionTag>()? {
            SectionTag::Ca => Section::Axis(&self.ca),
            SectionTag::Cy => Section::Axis(&self.cy),
            SectionTag::Par => Section::Parameters(&self.parameters),
            SectionTag::Engine => Section::Engine(&self.engine),
        })
    }

    /// Replace the whole correction registry. Channel data is not touched;
    /// the new pairs take effect on the next [`reapply_corrections`], which
    /// applies them in the order given here. A measurement named twice keeps
    /// its first position and its last reference.
    ///
    /// Fails with [`IFileError::InvalidPair`] if a measurement or reference is
    /// not a CA channel, leaving the registry unchanged.
    ///
    /// [`reapply_corrections`]: IFile::reapply_corrections
    pub fn set_correction_pairs<I, K, V>(&mut self, pairs: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let pairs: CorrectionPairs = pairs.into_iter().collect();
        correction::validate_pairs(&self.ca, &pairs)?;
        log::debug!(
            "Correction pairs replaced: {:?}",
            pairs.iter().collect::<Vec<_>>()
        );
        self.correction_pairs = pairs;
        Ok(())
    }

    /// Run the current registry over the CA channels as currently stored.
    ///
    /// Offsets compound: a pair that was already applied is subtracted
    /// again. With `avl_correction` disabled this is a no-op that returns an
    /// empty list.
    pub fn reapply_corrections(&mut self) -> Result<Vec<AppliedOffset>> {
        if !self.config.avl_correction {
            log::debug!("Offset correction delegated to the converter; reapply skipped");
            return Ok(Vec::new());
        }
        correction::apply_corrections(
            &mut self.ca,
            &self.correction_pairs,
            self.config.offset_method,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_tags_parse_case_insensitively() {
        assert_eq!("ca".parse::<SectionTag>().unwrap(), SectionTag::Ca);
        assert_eq!("Par".parse::<SectionTag>().unwrap(), SectionTag::Par);
        assert_eq!("ENGINE".parse::<SectionTag>().unwrap(), SectionTag::Engine);
        assert!(matches!(
            "HEADER".parse::<SectionTag>(),
            Err(IFileError::KeyNotFound { kind: "section", .. })
        ));
    }
}
