use std::ops::Range;

use crate::signal::Parameter;

/// Index/value pair returned by the slice-metric functions fed to the
/// key-point-value builders. `(None, None)` means no valid sample.
pub type IndexValue = (Option<f64>, Option<f64>);

/// Maximum valid sample within `window`, with its absolute index.
pub fn max_value(param: &Parameter, window: Range<usize>) -> IndexValue {
    extreme(param, window, |candidate, best| candidate > best)
}

/// Minimum valid sample within `window`, with its absolute index.
pub fn min_value(param: &Parameter, window: Range<usize>) -> IndexValue {
    extreme(param, window, |candidate, best| candidate < best)
}

fn extreme(
    param: &Parameter,
    window: Range<usize>,
    better: impl Fn(f64, f64) -> bool,
) -> IndexValue {
    let stop = window.end.min(param.len());
    let start = window.start.min(stop);
    let mut best: Option<(usize, f64)> = None;
    for i in start..stop {
        if param.mask[i] {
            continue;
        }
        let value = param.data[i];
        match best {
            Some((_, b)) if !better(value, b) => {}
            _ => best = Some((i, value)),
        }
    }
    match best {
        Some((i, v)) => (Some(i as f64), Some(v)),
        None => (None, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::TimeBase;
    use ndarray::array;

    fn param() -> Parameter {
        Parameter::with_mask(
            "Airspeed",
            array![3.0, 9.0, 1.0, 7.0],
            array![false, true, false, false],
            TimeBase::one_hz(),
        )
        .unwrap()
    }

    #[test]
    fn max_skips_masked_samples() {
        assert_eq!(max_value(&param(), 0..4), (Some(3.0), Some(7.0)));
    }

    #[test]
    fn min_within_window() {
        assert_eq!(min_value(&param(), 0..2), (Some(0.0), Some(3.0)));
    }

    #[test]
    fn fully_masked_window_yields_none() {
        assert_eq!(max_value(&param(), 1..2), (None, None));
    }
}
