use std::ops::Range;

use ndarray::Array1;

use crate::flight::{KtiCollection, Window};
use crate::math::{band_slices, value_at_index};
use crate::prelude::{NodeError, NodeResult, TimeBase};

/// A continuous recorded or derived signal: numeric samples with a parallel
/// validity mask (true = masked/invalid), a unit tag, and a timebase.
///
/// Consumers receive parameters by shared reference or as aligned copies;
/// a derive never writes into an input it was handed.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub data: Array1<f64>,
    pub mask: Array1<bool>,
    pub unit: Option<String>,
    pub timebase: TimeBase,
}

impl Parameter {
    /// A fully valid parameter with no masked samples.
    pub fn new(name: impl Into<String>, data: Array1<f64>, timebase: TimeBase) -> Self {
        let mask = Array1::from_elem(data.len(), false);
        Self {
            name: name.into(),
            data,
            mask,
            unit: None,
            timebase,
        }
    }

    pub fn with_mask(
        name: impl Into<String>,
        data: Array1<f64>,
        mask: Array1<bool>,
        timebase: TimeBase,
    ) -> NodeResult<Self> {
        if data.len() != mask.len() {
            return Err(NodeError::LengthMismatch {
                data: data.len(),
                mask: mask.len(),
            });
        }
        Ok(Self {
            name: name.into(),
            data,
            mask,
            unit: None,
            timebase,
        })
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_masked_at(&self, index: usize) -> bool {
        self.mask.get(index).copied().unwrap_or(true)
    }

    /// Interpolated value at a possibly fractional sample index, or `None`
    /// where the record is masked or the index falls outside it.
    pub fn value_at(&self, index: f64) -> Option<f64> {
        value_at_index(self.data.view(), self.mask.view(), index)
    }

    /// Value at a time in seconds from the start of the record.
    pub fn at(&self, secs: f64) -> Option<f64> {
        let index = (secs - self.timebase.offset) * self.timebase.frequency;
        self.value_at(index)
    }

    /// Bands of the record where the signal is at or above `value`.
    pub fn slices_above(&self, value: f64) -> Vec<Window> {
        self.band_windows(|v| v >= value)
    }

    /// Bands where the signal is at or below `value`. Prefer
    /// [`Parameter::slices_between`] with an explicit lower bound where the
    /// signal can wander arbitrarily low.
    pub fn slices_below(&self, value: f64) -> Vec<Window> {
        self.band_windows(|v| v <= value)
    }

    /// Bands where the signal stays within `[min, max]`, both inclusive.
    pub fn slices_between(&self, min: f64, max: f64) -> Vec<Window> {
        self.band_windows(|v| v >= min && v <= max)
    }

    /// Directional bands between `from` and `to`: the argument order sets
    /// the direction, so `slices_from_to(1000.0, 1500.0)` keeps only bands
    /// the signal climbs through, and swapping the arguments keeps only
    /// descending ones.
    pub fn slices_from_to(&self, from: f64, to: f64) -> Vec<Window> {
        self.from_to_runs(from, to)
            .into_iter()
            .map(range_window)
            .collect()
    }

    /// Bands descending from `height` to the ground, each clipped to end
    /// exactly at the touchdown instant it contains. The scan overruns each
    /// band by a few samples so a touchdown recorded just past it still
    /// anchors the band; a band with no touchdown is dropped.
    pub fn slices_to_kti(&self, height: f64, touchdowns: &KtiCollection) -> Vec<Window> {
        const OVERRUN: usize = 20;
        let mut result = Vec::new();
        for run in self.from_to_runs(height, 0.0) {
            let stop = (run.end + OVERRUN).min(self.len());
            let anchored = touchdowns
                .iter()
                .find(|kti| kti.index >= run.start as f64 && kti.index < stop as f64);
            if let Some(kti) = anchored {
                result.push(Window {
                    start: Some(run.start as f64),
                    stop: Some(kti.index),
                });
            }
        }
        result
    }

    fn band_runs(&self, within: impl Fn(f64) -> bool) -> Vec<Range<usize>> {
        band_slices(self.data.view(), self.mask.view(), within)
    }

    fn band_windows(&self, within: impl Fn(f64) -> bool) -> Vec<Window> {
        self.band_runs(within).into_iter().map(range_window).collect()
    }

    fn from_to_runs(&self, from: f64, to: f64) -> Vec<Range<usize>> {
        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        self.band_runs(|v| v >= lo && v <= hi)
            .into_iter()
            .filter(|run| {
                let first = self.data[run.start];
                let last = self.data[run.end - 1];
                if from < to {
                    first < last
                } else {
                    first > last
                }
            })
            .collect()
    }
}

fn range_window(range: Range<usize>) -> Window {
    Window::new(range.start as f64, range.end as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn mask_length_must_match_data() {
        let err = Parameter::with_mask(
            "Heading",
            array![1.0, 2.0],
            array![false],
            TimeBase::one_hz(),
        );
        assert!(matches!(err, Err(NodeError::LengthMismatch { .. })));
    }

    #[test]
    fn at_converts_seconds_through_the_timebase() {
        let tb = TimeBase::new(2.0, 0.25).unwrap();
        let param = Parameter::new("Altitude STD", array![0.0, 10.0, 20.0, 30.0], tb);
        // 0.75s is exactly sample 1 (0.25s offset at 2 Hz).
        assert_eq!(param.at(0.75), Some(10.0));
        assert_eq!(param.at(1.0), Some(15.0));
    }

    #[test]
    fn band_slices_split_on_threshold_and_mask() {
        let param = Parameter::with_mask(
            "Altitude AAL",
            array![0.0, 600.0, 900.0, 400.0, 700.0, 800.0],
            array![false, false, false, false, true, false],
            TimeBase::one_hz(),
        )
        .unwrap();
        assert_eq!(
            param.slices_above(500.0),
            vec![Window::new(1.0, 3.0), Window::new(5.0, 6.0)]
        );
        assert_eq!(param.slices_below(400.0), vec![Window::new(0.0, 1.0), Window::new(3.0, 4.0)]);
        assert_eq!(
            param.slices_between(400.0, 800.0),
            vec![Window::new(1.0, 2.0), Window::new(3.0, 4.0), Window::new(5.0, 6.0)]
        );
    }

    #[test]
    fn from_to_keeps_only_the_traversal_direction() {
        let param = Parameter::new(
            "Altitude AAL",
            array![0.0, 500.0, 1200.0, 1400.0, 1600.0, 1400.0, 1200.0, 500.0],
            TimeBase::one_hz(),
        );
        // Climb through the band only.
        assert_eq!(param.slices_from_to(1000.0, 1500.0), vec![Window::new(2.0, 4.0)]);
        // Swapped arguments keep the descent instead.
        assert_eq!(param.slices_from_to(1500.0, 1000.0), vec![Window::new(5.0, 7.0)]);
    }

    #[test]
    fn slices_to_kti_clip_at_the_touchdown_instant() {
        let altitude = Parameter::new(
            "Altitude AAL",
            array![1600.0, 1200.0, 800.0, 400.0, 0.0, 0.0],
            TimeBase::one_hz(),
        );
        let mut touchdowns = KtiCollection::new(
            crate::flight::NameFormat::fixed("Touchdown"),
            TimeBase::one_hz(),
        );
        touchdowns.create_kti(4.2, &[]).unwrap();
        assert_eq!(
            altitude.slices_to_kti(1500.0, &touchdowns),
            vec![Window {
                start: Some(1.0),
                stop: Some(4.2),
            }]
        );

        // A descent with no touchdown inside it anchors nothing.
        let empty = KtiCollection::new(
            crate::flight::NameFormat::fixed("Touchdown"),
            TimeBase::one_hz(),
        );
        assert!(altitude.slices_to_kti(1500.0, &empty).is_empty());
    }

    #[test]
    fn value_at_respects_the_mask() {
        let param = Parameter::with_mask(
            "Pitch",
            array![1.0, 2.0, 3.0],
            array![false, false, true],
            TimeBase::one_hz(),
        )
        .unwrap();
        assert_eq!(param.value_at(1.0), Some(2.0));
        assert_eq!(param.value_at(2.0), None);
    }
}
