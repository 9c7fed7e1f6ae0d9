//! Per-cycle offset correction of crank-angle pressure channels.
//!
//! ```text
//!   CA channel names ──▶ detect ──▶ CorrectionPairs ◀── set_correction_pairs
//!                                        │
//!                                        ▼
//!   AxisView (CA) ◀── subtract ◀── offset (per cycle, per pair)
//! ```
//!
//! Every pass works on the samples as currently stored, so running the same
//! registry twice subtracts its offsets twice.

pub mod detect;
pub mod offset;
pub mod registry;

pub use detect::{detect_pairs, REFERENCE_RULES};
pub use registry::CorrectionPairs;

use crate::config::OffsetMethod;
use crate::data::axis::AxisView;
use crate::error::{IFileError, Result};

/// Outcome of correcting one measurement channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedOffset {
    pub measurement: String,
    pub reference: String,
    /// Mean of the per-cycle offsets that were subtracted.
    pub mean_offset: f64,
    pub cycles: usize,
}

/// Every measurement and reference must be a channel of `ca`.
pub fn validate_pairs(ca: &AxisView, pairs: &CorrectionPairs) -> Result<()> {
    for (measurement, reference) in pairs {
        if !ca.contains(measurement) {
            return Err(IFileError::invalid_pair(
                measurement,
                reference,
                format!("'{measurement}' is not a crank-angle channel"),
            ));
        }
        if !ca.contains(reference) {
            return Err(IFileError::invalid_pair(
                measurement,
                reference,
                format!("'{reference}' is not a crank-angle channel"),
            ));
        }
    }
    Ok(())
}

/// Apply every pair to the crank-angle channels, in registry order. A
/// reference corrected by an earlier pair is used as already corrected.
///
/// All pairs are checked before the first sample changes; on error no channel
/// has been touched.
pub fn apply_corrections(
    ca: &mut AxisView,
    pairs: &CorrectionPairs,
    method: OffsetMethod,
) -> Result<Vec<AppliedOffset>> {
    validate_pairs(ca, pairs)?;
    for (measurement, reference) in pairs {
        offset::check_pair(&ca[measurement], &ca[reference], method)?;
    }

    let mut applied = Vec::with_capacity(pairs.len());
    for (measurement, reference) in pairs {
        let offsets = offset::cycle_offsets(&ca[measurement], &ca[reference], method);
        let Some(channel) = ca.get_mut(measurement) else {
            continue;
        };
        offset::subtract_offsets(channel, &offsets);

        let mean_offset = offset::finite_mean(offsets.iter().copied()).unwrap_or(0.0);
        log::debug!(
            "Applied offset correction for '{measurement}' using '{reference}'. mean_offset={mean_offset}"
        );
        applied.push(AppliedOffset {
            measurement: measurement.to_string(),
            reference: reference.to_string(),
            mean_offset,
            cycles: offsets.len(),
        });
    }
    Ok(applied)
}
