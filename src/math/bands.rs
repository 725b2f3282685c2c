use std::ops::Range;

use ndarray::ArrayView1;

/// Maximal runs of consecutive unmasked samples satisfying `within`.
///
/// Masked samples always break a run, so a band never spans invalid data.
pub fn band_slices(
    data: ArrayView1<f64>,
    mask: ArrayView1<bool>,
    within: impl Fn(f64) -> bool,
) -> Vec<Range<usize>> {
    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for i in 0..data.len() {
        let matching = !mask[i] && within(data[i]);
        match (matching, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                runs.push(s..i);
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        runs.push(s..data.len());
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn runs_cover_contiguous_matching_samples() {
        let data = array![0.0, 5.0, 6.0, 2.0, 7.0, 8.0];
        let mask = ndarray::Array1::from_elem(6, false);
        let runs = band_slices(data.view(), mask.view(), |v| v >= 5.0);
        assert_eq!(runs, vec![1..3, 4..6]);
    }

    #[test]
    fn masked_samples_break_a_run() {
        let data = array![5.0, 5.0, 5.0];
        let mask = array![false, true, false];
        let runs = band_slices(data.view(), mask.view(), |v| v >= 5.0);
        assert_eq!(runs, vec![0..1, 2..3]);
    }

    #[test]
    fn no_matching_samples_yields_no_runs() {
        let data = array![1.0, 2.0];
        let mask = array![false, false];
        assert!(band_slices(data.view(), mask.view(), |v| v > 10.0).is_empty());
    }
}
