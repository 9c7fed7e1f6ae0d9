use crate::config::OffsetMethod;
use crate::data::axis::ChannelView;
use crate::error::{IFileError, Result};

/// Mean of the finite values, `None` if there are none.
pub fn finite_mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, n) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Linear interpolation of `(xp, fp)` at `x`; NaN outside `[xp[0], xp[last]]`.
///
/// `xp` must be non-decreasing.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let (first, last) = match (xp.first(), xp.last()) {
        (Some(&a), Some(&b)) => (a, b),
        _ => return f64::NAN,
    };
    if !(first..=last).contains(&x) {
        return f64::NAN;
    }
    let hi = xp.partition_point(|&v| v < x);
    if hi < xp.len() && xp[hi] == x {
        return fp[hi];
    }
    // hi >= 1 here since x > first
    let lo = hi - 1;
    let t = (x - xp[lo]) / (xp[hi] - xp[lo]);
    fp[lo] + t * (fp[hi] - fp[lo])
}

/// Check that `measurement` can be corrected against `reference`.
pub fn check_pair(
    measurement: &ChannelView,
    reference: &ChannelView,
    method: OffsetMethod,
) -> Result<()> {
    if measurement.cycles() != reference.cycles() {
        return Err(IFileError::shape(
            measurement.name(),
            format!("{} cycles like '{}'", reference.cycles(), reference.name()),
            format!("{} cycles", measurement.cycles()),
        ));
    }
    if method == OffsetMethod::AxisMatched
        && measurement.sample_axis().windows(2).any(|w| w[1] < w[0])
    {
        return Err(IFileError::shape(
            format!("{}.axis", measurement.name()),
            "non-decreasing crank-angle axis",
            "unsorted axis",
        ));
    }
    Ok(())
}

/// Per-cycle offset to subtract from `measurement`. Cycles without any finite
/// contribution get 0.
pub fn cycle_offsets(
    measurement: &ChannelView,
    reference: &ChannelView,
    method: OffsetMethod,
) -> Vec<f64> {
    (0..measurement.cycles())
        .map(|c| {
            let (m, r) = match (measurement.cycle(c), reference.cycle(c)) {
                (Some(m), Some(r)) => (m, r),
                _ => return 0.0,
            };
            let offset = match method {
                OffsetMethod::ReferenceMean => finite_mean(r.iter().copied()),
                OffsetMethod::AxisMatched => finite_mean(
                    reference
                        .sample_axis()
                        .iter()
                        .zip(r)
                        .map(|(&angle, &rv)| interp(angle, measurement.sample_axis(), m) - rv),
                ),
            };
            offset.unwrap_or(0.0)
        })
        .collect()
}

/// Subtract `offsets[c]` from every sample of cycle `c`, in place.
pub fn subtract_offsets(measurement: &mut ChannelView, offsets: &[f64]) {
    for (c, offset) in offsets.iter().enumerate() {
        if let Some(samples) = measurement.cycle_mut(c) {
            samples.iter_mut().for_each(|v| *v -= offset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interp_matches_edges_and_midpoints() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [10.0, 20.0, 40.0];
        assert_eq!(interp(0.0, &xp, &fp), 10.0);
        assert_eq!(interp(0.5, &xp, &fp), 15.0);
        assert_eq!(interp(2.0, &xp, &fp), 30.0);
        assert_eq!(interp(3.0, &xp, &fp), 40.0);
        assert!(interp(-0.1, &xp, &fp).is_nan());
        assert!(interp(3.1, &xp, &fp).is_nan());
        assert!(interp(1.0, &[], &[]).is_nan());
    }

    #[test]
    fn finite_mean_ignores_nan() {
        assert_eq!(finite_mean([1.0, f64::NAN, 3.0]), Some(2.0));
        assert_eq!(finite_mean([f64::NAN]), None);
    }
}
