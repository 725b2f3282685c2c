use ndarray::Array1;

use crate::prelude::TimeBase;
use crate::signal::{MultistateParameter, Parameter};

/// Maps a sample index at `source` rate/offset onto the `target` timebase.
///
/// Linear and invertible: aligning A to B and back recovers the index.
pub fn align_index(index: f64, source: TimeBase, target: TimeBase) -> f64 {
    index * (target.frequency / source.frequency)
        + (source.offset - target.offset) * target.frequency
}

/// As [`align_index`], leaving undefined (open) endpoints undefined.
pub fn align_optional_index(index: Option<f64>, source: TimeBase, target: TimeBase) -> Option<f64> {
    index.map(|i| align_index(i, source, target))
}

/// Resamples a continuous parameter onto `target` by linear interpolation.
///
/// The source is untouched; the result is a new owned copy. Target samples
/// falling outside the source record, or between masked source samples,
/// come out masked.
pub fn align_parameter(source: &Parameter, target: TimeBase) -> Parameter {
    if source.timebase == target {
        return source.clone();
    }
    let (data, mask) = resample(
        source.len(),
        source.timebase,
        target,
        |lo, hi, frac| {
            if source.mask[lo] || source.mask[hi] {
                None
            } else {
                Some(source.data[lo] + (source.data[hi] - source.data[lo]) * frac)
            }
        },
    );
    Parameter {
        name: source.name.clone(),
        data: Array1::from(data),
        mask: Array1::from(mask),
        unit: source.unit.clone(),
        timebase: target,
    }
}

/// Resamples a discrete-state parameter onto `target` by nearest-neighbour
/// (step) selection. Never interpolates, so no unobserved state can appear.
pub fn align_multistate(source: &MultistateParameter, target: TimeBase) -> MultistateParameter {
    if source.timebase == target {
        return source.clone();
    }
    let sentinel = source.mapping.sentinel();
    let (codes, mask) = resample(
        source.len(),
        source.timebase,
        target,
        |lo, hi, frac| {
            let nearest = if frac < 0.5 { lo } else { hi };
            if source.mask[nearest] {
                None
            } else {
                Some(source.codes[nearest] as f64)
            }
        },
    );
    let codes: Vec<i64> = codes
        .iter()
        .zip(mask.iter())
        .map(|(&c, &m)| if m { sentinel } else { c as i64 })
        .collect();
    MultistateParameter {
        name: source.name.clone(),
        codes: Array1::from(codes),
        mask: Array1::from(mask),
        timebase: target,
        mapping: source.mapping.clone(),
    }
}

/// Shared resampling walk: for each target sample, locates the bracketing
/// source samples and asks `pick` for a value. `None` masks the sample.
fn resample(
    source_len: usize,
    source: TimeBase,
    target: TimeBase,
    pick: impl Fn(usize, usize, f64) -> Option<f64>,
) -> (Vec<f64>, Vec<bool>) {
    let ratio = target.frequency / source.frequency;
    let target_len = (source_len as f64 * ratio).round() as usize;
    let mut data = vec![0.0; target_len];
    let mut mask = vec![true; target_len];
    if source_len == 0 {
        return (data, mask);
    }
    let last = (source_len - 1) as f64;
    for (j, (value, masked)) in data.iter_mut().zip(mask.iter_mut()).enumerate() {
        // Position of target sample j on the source index scale.
        let pos = (j as f64 / target.frequency + target.offset - source.offset) * source.frequency;
        if pos < 0.0 || pos > last {
            continue;
        }
        let lo = pos.floor() as usize;
        let hi = pos.ceil() as usize;
        if let Some(v) = pick(lo, hi, pos - lo as f64) {
            *value = v;
            *masked = false;
        }
    }
    (data, mask)
}
