//! Normalized view over converted engine-test measurement records.
//!
//! A converted record (named structs, 1-D / 2-D numeric arrays, strings) is
//! exposed as two channel axes (`CA` crank-angle, `CY` per-cycle), a
//! parameter index (`PAR`) and the engine block (`ENGINE`). Crank-angle
//! pressure channels that have a recorded reference get a per-cycle offset
//! correction.
//!
//! ```no_run
//! use ifile_view::{IFile, IFileConfig};
//!
//! let mut ifile = IFile::open("run_042.json", IFileConfig::default())?;
//! let p = &ifile.ca()["PSAUG"];
//! println!("{} [{}]: {}", p.name(), p.general().units, p.general().range);
//!
//! ifile.set_correction_pairs([("PSAUG", "SDREF")])?;
//! ifile.reapply_corrections()?;
//! # Ok::<(), ifile_view::IFileError>(())
//! ```

pub mod config;
pub mod correction;
pub mod data;
pub mod error;
pub mod ifile;
pub mod logging;

pub use config::{ConverterOptions, IFileConfig, LogLevel, OffsetMethod};
pub use correction::{AppliedOffset, CorrectionPairs};
pub use data::axis::{AxisView, ChannelEntry, ChannelValues, ChannelView};
pub use data::engine::{EngineRecord, HeaderTimestamp};
pub use data::loader::{JsonFile, RecordSource};
pub use data::model::{Axis, GeneralMeta, ParamValue};
pub use data::parameter::{ParameterEntry, ParameterIndex, ParameterValues, ParameterView};
pub use data::raw::{RawRecord, RawStruct, RawValue};
pub use error::{IFileError, Result};
pub use ifile::{IFile, Section, SectionTag};
