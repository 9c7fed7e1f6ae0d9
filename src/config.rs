use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Log verbosity
// ---------------------------------------------------------------------------

/// Verbosity selector: `INFO` (minimal), `DEBUG` (verbose), `WARNING` (warnings only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    #[default]
    Info,
    Debug,
    Warning,
}

impl LogLevel {
    pub fn filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Warning => log::LevelFilter::Warn,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Warning => "WARNING",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "WARNING" | "WARN" => Ok(LogLevel::Warning),
            other => Err(format!("unknown log level '{other}' (expected INFO, DEBUG or WARNING)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Offset method
// ---------------------------------------------------------------------------

/// How the per-cycle offset of a measurement channel is derived from its reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetMethod {
    /// Mean of the reference samples in the cycle.
    #[default]
    ReferenceMean,
    /// Mean difference between the measurement, interpolated onto the
    /// reference crank-angle axis, and the reference.
    AxisMatched,
}

impl FromStr for OffsetMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "reference_mean" => Ok(OffsetMethod::ReferenceMean),
            "axis_matched" => Ok(OffsetMethod::AxisMatched),
            other => Err(format!(
                "unknown offset method '{other}' (expected reference-mean or axis-matched)"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// IFileConfig
// ---------------------------------------------------------------------------

/// Immutable construction options of an [`IFile`](crate::IFile).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IFileConfig {
    pub log: LogLevel,
    /// Run the offset correction here rather than in the external converter.
    pub avl_correction: bool,
    /// Ask the converter to keep its intermediate artifacts.
    pub keep_temp_files: bool,
    pub offset_method: OffsetMethod,
}

impl Default for IFileConfig {
    fn default() -> Self {
        Self {
            log: LogLevel::Info,
            avl_correction: true,
            keep_temp_files: false,
            offset_method: OffsetMethod::ReferenceMean,
        }
    }
}

impl IFileConfig {
    pub fn converter_options(&self) -> ConverterOptions {
        ConverterOptions {
            offset_correction: !self.avl_correction,
            keep_temp_files: self.keep_temp_files,
            log_level: self.log.as_str(),
        }
    }
}

/// What a record source passes on to the external converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterOptions {
    /// The converter applies its own channel offsets only when this crate doesn't.
    pub offset_correction: bool,
    pub keep_temp_files: bool,
    pub log_level: &'static str,
}
