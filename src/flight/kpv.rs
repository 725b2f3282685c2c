use serde::{Deserialize, Serialize};

use crate::flight::filter::{Filter, Window};
use crate::flight::kti::KtiCollection;
use crate::flight::naming::{NameFormat, TemplateValue};
use crate::flight::section::SectionCollection;
use crate::math::extrema::IndexValue;
use crate::prelude::{NodeResult, TimeBase};
use crate::signal::{align_index, MultistateParameter, Parameter};
use crate::telemetry::Diagnostics;
use ndarray::Array1;

/// Where within an interval a duration measurement is pinned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Start,
    Midpoint,
    End,
}

/// A single named scalar sourced at an index; the value is always finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPointValue {
    pub index: f64,
    pub value: f64,
    pub name: String,
}

/// Collection of key point values sharing one naming scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct KpvCollection {
    pub timebase: TimeBase,
    format: NameFormat,
    values: Vec<KeyPointValue>,
}

impl KpvCollection {
    pub fn new(format: NameFormat, timebase: TimeBase) -> Self {
        Self {
            timebase,
            format,
            values: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.format.base()
    }

    pub fn format(&self) -> &NameFormat {
        &self.format
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyPointValue> {
        self.values.iter()
    }

    fn like(&self, values: Vec<KeyPointValue>) -> Self {
        Self {
            timebase: self.timebase,
            format: self.format.clone(),
            values,
        }
    }

    /// Appends one entry, or records a data-quality diagnostic and appends
    /// nothing. A missing index or value, or a non-finite value, happens
    /// routinely in production recordings and must never abort a run; only
    /// a broken name template is an error.
    pub fn create_kpv(
        &mut self,
        index: Option<f64>,
        value: Option<f64>,
        values: &[(&str, TemplateValue)],
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        let (index, value) = match (index, value) {
            (Some(i), Some(v)) => (i, v),
            (i, v) => {
                diag.data_quality(
                    self.name(),
                    format!("cannot create KPV for index {:?} and value {:?}", i, v),
                );
                return Ok(());
            }
        };
        if !index.is_finite() {
            diag.data_quality(self.name(), format!("index {} is not finite", index));
            return Ok(());
        }
        if value.is_infinite() {
            diag.data_quality(
                self.name(),
                format!("value at index {} is infinite", index),
            );
            return Ok(());
        }
        if value.is_nan() {
            diag.data_quality(self.name(), format!("value at index {} is NaN", index));
            return Ok(());
        }
        let name = self.format.format_name(values)?;
        self.values.push(KeyPointValue { index, value, name });
        Ok(())
    }

    /// One entry per key time instance, sourcing the (interpolated) value
    /// of `param` at each instance's index. Requires `param` to be aligned
    /// to the instances. `suppress_zeros` skips zero-valued results.
    pub fn create_kpvs_at_ktis(
        &mut self,
        param: &Parameter,
        ktis: &KtiCollection,
        suppress_zeros: bool,
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        for kti in ktis.iter() {
            let value = param.value_at(kti.index);
            if suppress_zeros && value == Some(0.0) {
                continue;
            }
            self.create_kpv(Some(kti.index), value, &[], diag)?;
        }
        Ok(())
    }

    /// One entry per window, from a function returning an absolute index
    /// and value over that window (for instance [`crate::math::max_value`]).
    pub fn create_kpvs_within_slices(
        &mut self,
        param: &Parameter,
        slices: &[Window],
        function: impl Fn(&Parameter, std::ops::Range<usize>) -> IndexValue,
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        for window in slices {
            let (index, value) = function(param, window.resolve(param.len()));
            self.create_kpv(index, value, &[], diag)?;
        }
        Ok(())
    }

    /// A single entry from several windows: their data is joined into one
    /// buffer, the function runs once over it, and the resulting index is
    /// walked back to the window it came from.
    pub fn create_kpv_from_slices(
        &mut self,
        param: &Parameter,
        slices: &[Window],
        function: impl Fn(&Parameter, std::ops::Range<usize>) -> IndexValue,
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        let ranges: Vec<std::ops::Range<usize>> =
            slices.iter().map(|w| w.resolve(param.len())).collect();
        let mut data = Vec::new();
        let mut mask = Vec::new();
        for range in &ranges {
            data.extend(param.data.slice(ndarray::s![range.clone()]).iter());
            mask.extend(param.mask.slice(ndarray::s![range.clone()]).iter());
        }
        if data.is_empty() {
            return Ok(());
        }
        let joined = Parameter {
            name: param.name.clone(),
            data: Array1::from(data),
            mask: Array1::from(mask),
            unit: param.unit.clone(),
            timebase: param.timebase,
        };
        let joined_len = joined.len();
        let (index, value) = function(&joined, 0..joined_len);
        let index = index.and_then(|joined_index| {
            // Subtract each window's length until the index falls inside one.
            let mut remaining = joined_index;
            for range in &ranges {
                let span = (range.end - range.start) as f64;
                if remaining < span {
                    return Some(remaining + range.start as f64);
                }
                remaining -= span;
            }
            None
        });
        self.create_kpv(index, value, &[], diag)
    }

    /// One entry from everything outside the given windows: a copy of the
    /// parameter with those windows masked out is scanned instead.
    pub fn create_kpv_outside_slices(
        &mut self,
        param: &Parameter,
        slices: &[Window],
        function: impl Fn(&Parameter, std::ops::Range<usize>) -> IndexValue,
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        let mut masked = param.clone();
        for window in slices {
            for i in window.resolve(masked.len()) {
                masked.mask[i] = true;
            }
        }
        let full = 0..masked.len();
        let (index, value) = function(&masked, full);
        self.create_kpv(index, value, &[], diag)
    }

    /// One entry per section lasting longer than `min_duration` seconds,
    /// valued by the duration and pinned at the configured mark. Sections
    /// with an open end have no duration and are skipped.
    pub fn create_kpvs_from_slice_durations(
        &mut self,
        sections: &SectionCollection,
        min_duration: f64,
        mark: Mark,
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        let frequency = sections.timebase.frequency;
        for section in sections.iter() {
            let (start, stop) = match (section.start_edge, section.stop_edge) {
                (Some(start), Some(stop)) => (start, stop),
                _ => {
                    diag.data_quality(
                        self.name(),
                        format!("section '{}' has an open end, no duration", section.name),
                    );
                    continue;
                }
            };
            let duration = (stop - start) / frequency;
            if duration <= min_duration {
                continue;
            }
            let index = match mark {
                Mark::Start => start,
                Mark::Midpoint => (start + stop) / 2.0,
                Mark::End => stop,
            };
            self.create_kpv(Some(index), Some(duration), &[], diag)?;
        }
        Ok(())
    }

    /// One entry per maximal run of `state`, valued by the run duration in
    /// seconds when it meets `min_duration`, pinned at the run start.
    pub fn create_kpvs_where_state(
        &mut self,
        state: &str,
        param: &MultistateParameter,
        phases: Option<&SectionCollection>,
        min_duration: f64,
        diag: &Diagnostics,
    ) -> NodeResult<()> {
        let frequency = param.timebase.frequency;
        let windows = match phases {
            Some(sections) => sections.get_slices(),
            None => vec![Window::unbounded()],
        };
        for window in windows {
            let range = window.resolve(param.len());
            for run in param.state_runs(state, Some(range))? {
                let duration = (run.end - run.start) as f64 / frequency;
                if duration >= min_duration {
                    self.create_kpv(Some(run.start as f64), Some(duration), &[], diag)?;
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, filter: &Filter) -> Self {
        if let Some(name) = filter.name.as_deref() {
            if !self.format.names().contains(&name.to_string()) {
                log::warn!(
                    "filtering '{}' by a name it can never produce: '{}'",
                    self.name(),
                    name
                );
            }
        }
        self.like(
            self.values
                .iter()
                .filter(|k| filter.matches_name(&k.name) && filter.matches_index(k.index))
                .cloned()
                .collect(),
        )
    }

    fn sorted_matches(
        &self,
        filter: &Filter,
        key: impl Fn(&KeyPointValue) -> f64,
    ) -> Vec<&KeyPointValue> {
        let mut matching: Vec<&KeyPointValue> = self
            .values
            .iter()
            .filter(|k| filter.matches_name(&k.name) && filter.matches_index(k.index))
            .collect();
        matching.sort_by(|a, b| key(a).total_cmp(&key(b)));
        matching
    }

    pub fn get_first(&self, filter: &Filter) -> Option<&KeyPointValue> {
        self.sorted_matches(filter, |k| k.index).into_iter().next()
    }

    pub fn get_last(&self, filter: &Filter) -> Option<&KeyPointValue> {
        self.sorted_matches(filter, |k| k.index)
            .into_iter()
            .next_back()
    }

    pub fn get_ordered_by_index(&self, filter: &Filter) -> Self {
        self.like(
            self.sorted_matches(filter, |k| k.index)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    pub fn get_next(
        &self,
        index: f64,
        frequency: Option<f64>,
        filter: &Filter,
    ) -> Option<&KeyPointValue> {
        let index = self.local_index(index, frequency);
        self.sorted_matches(filter, |k| k.index)
            .into_iter()
            .find(|k| k.index > index)
    }

    pub fn get_previous(
        &self,
        index: f64,
        frequency: Option<f64>,
        filter: &Filter,
    ) -> Option<&KeyPointValue> {
        let index = self.local_index(index, frequency);
        self.sorted_matches(filter, |k| k.index)
            .into_iter()
            .rev()
            .find(|k| k.index < index)
    }

    pub fn get_max(&self, filter: &Filter) -> Option<&KeyPointValue> {
        self.sorted_matches(filter, |k| k.value)
            .into_iter()
            .next_back()
    }

    pub fn get_min(&self, filter: &Filter) -> Option<&KeyPointValue> {
        self.sorted_matches(filter, |k| k.value).into_iter().next()
    }

    pub fn get_ordered_by_value(&self, filter: &Filter) -> Self {
        self.like(
            self.sorted_matches(filter, |k| k.value)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    fn local_index(&self, index: f64, frequency: Option<f64>) -> f64 {
        match frequency {
            Some(f) => index * (self.timebase.frequency / f),
            None => index,
        }
    }

    /// Copy with every index mapped onto `target`; the source is untouched.
    pub fn get_aligned(&self, target: TimeBase) -> Self {
        let values = self
            .values
            .iter()
            .map(|kpv| KeyPointValue {
                index: align_index(kpv.index, self.timebase, target),
                ..kpv.clone()
            })
            .collect();
        Self {
            timebase: target,
            format: self.format.clone(),
            values,
        }
    }
}
