use std::ops::Range;

use ndarray::ArrayView1;

/// Which sample-to-sample transitions to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeDirection {
    Rising,
    Falling,
    All,
}

/// Finds transitions between consecutive valid samples within `window`.
///
/// The reported index marks the boundary between the differing samples,
/// half way between them: a rise from sample 1 to sample 2 yields 1.5.
/// Pairs with a masked member are skipped.
pub fn find_edges(
    data: ArrayView1<f64>,
    mask: ArrayView1<bool>,
    window: Range<usize>,
    direction: EdgeDirection,
) -> Vec<f64> {
    let stop = window.end.min(data.len());
    let start = window.start.min(stop);
    let mut edges = Vec::new();
    if stop < 2 {
        return edges;
    }
    for i in start..stop - 1 {
        if mask[i] || mask[i + 1] {
            continue;
        }
        let delta = data[i + 1] - data[i];
        let wanted = match direction {
            EdgeDirection::Rising => delta > 0.0,
            EdgeDirection::Falling => delta < 0.0,
            EdgeDirection::All => delta != 0.0,
        };
        if wanted {
            edges.push(i as f64 + 0.5);
        }
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn rising_edges_mark_half_sample_boundaries() {
        let data = array![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0];
        let mask = ndarray::Array1::from_elem(7, false);
        let edges = find_edges(data.view(), mask.view(), 0..7, EdgeDirection::Rising);
        assert_eq!(edges, vec![1.5, 5.5]);
    }

    #[test]
    fn falling_and_all_directions() {
        let data = array![0.0, 1.0, 0.0];
        let mask = ndarray::Array1::from_elem(3, false);
        assert_eq!(
            find_edges(data.view(), mask.view(), 0..3, EdgeDirection::Falling),
            vec![1.5]
        );
        assert_eq!(
            find_edges(data.view(), mask.view(), 0..3, EdgeDirection::All),
            vec![0.5, 1.5]
        );
    }

    #[test]
    fn masked_pairs_and_window_are_respected() {
        let data = array![0.0, 1.0, 0.0, 1.0];
        let mask = array![false, true, false, false];
        // Transitions touching index 1 are skipped; only 2 -> 3 remains.
        assert_eq!(
            find_edges(data.view(), mask.view(), 0..4, EdgeDirection::Rising),
            vec![2.5]
        );
        assert!(find_edges(data.view(), mask.view(), 0..2, EdgeDirection::Rising).is_empty());
    }
}
