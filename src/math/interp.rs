use ndarray::ArrayView1;

/// Interpolated value at a possibly fractional `index`.
///
/// Linear between the two neighbouring samples; falls back on whichever
/// neighbour is valid when the other is masked. `None` outside the record
/// or where both neighbours are masked.
pub fn value_at_index(data: ArrayView1<f64>, mask: ArrayView1<bool>, index: f64) -> Option<f64> {
    if data.is_empty() || !index.is_finite() {
        return None;
    }
    let last = (data.len() - 1) as f64;
    if index < 0.0 || index > last {
        return None;
    }
    let lo = index.floor() as usize;
    let hi = index.ceil() as usize;
    if lo == hi {
        return if mask[lo] { None } else { Some(data[lo]) };
    }
    let frac = index - lo as f64;
    match (mask[lo], mask[hi]) {
        (false, false) => Some(data[lo] + (data[hi] - data[lo]) * frac),
        (false, true) => Some(data[lo]),
        (true, false) => Some(data[hi]),
        (true, true) => None,
    }
}
