use serde::{Deserialize, Serialize};

use crate::flight::filter::Filter;
use crate::flight::naming::{NameFormat, TemplateValue};
use crate::flight::section::SectionCollection;
use crate::math::{find_edges, EdgeDirection};
use crate::prelude::{NodeError, NodeResult, TimeBase};
use crate::signal::{align_index, MultistateParameter, Parameter};

/// Which boundary of a state run produces a key time instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Entering,
    Leaving,
    EnteringAndLeaving,
}

/// A single named instant, possibly between samples, at the owning
/// collection's rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyTimeInstance {
    pub index: f64,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

/// Collection of key time instances sharing one naming scheme.
#[derive(Debug, Clone, PartialEq)]
pub struct KtiCollection {
    pub timebase: TimeBase,
    format: NameFormat,
    instances: Vec<KeyTimeInstance>,
}

impl KtiCollection {
    pub fn new(format: NameFormat, timebase: TimeBase) -> Self {
        Self {
            timebase,
            format,
            instances: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.format.base()
    }

    pub fn format(&self) -> &NameFormat {
        &self.format
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyTimeInstance> {
        self.instances.iter()
    }

    fn like(&self, instances: Vec<KeyTimeInstance>) -> Self {
        Self {
            timebase: self.timebase,
            format: self.format.clone(),
            instances,
        }
    }

    /// Appends an instance at `index`. A non-finite index fails loudly: a
    /// condition where no instant arises must be handled by the caller, not
    /// smuggled in as NaN.
    pub fn create_kti(&mut self, index: f64, values: &[(&str, TemplateValue)]) -> NodeResult<()> {
        if !index.is_finite() {
            return Err(NodeError::InvalidIndex(index));
        }
        let name = self.format.format_name(values)?;
        self.instances.push(KeyTimeInstance {
            index,
            name,
            latitude: None,
            longitude: None,
        });
        Ok(())
    }

    /// One instance per transition of `param` in the given direction,
    /// optionally restricted to each of a set of phases. With `state_key`,
    /// the post-transition sample value is substituted under that template
    /// key to annotate the event.
    pub fn create_ktis_at_edges(
        &mut self,
        param: &Parameter,
        direction: EdgeDirection,
        phases: Option<&SectionCollection>,
        state_key: Option<&str>,
    ) -> NodeResult<()> {
        let windows = match phases {
            Some(sections) => sections.get_slices(),
            None => vec![crate::flight::Window::unbounded()],
        };
        for window in windows {
            let range = window.resolve(param.len());
            let edges = find_edges(param.data.view(), param.mask.view(), range, direction);
            for edge in edges {
                match state_key {
                    Some(key) => {
                        let after = param.data[edge.ceil() as usize];
                        self.create_kti(edge, &[(key, TemplateValue::Number(after))])?;
                    }
                    None => {
                        self.create_kti(edge, &[])?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Instances half a sample before each run of `state` begins and/or
    /// half a sample after it ends. The half-sample offset marks the
    /// boundary between samples, not either sample; runs touching the
    /// absolute start or end of the scanned range produce nothing there,
    /// as no change from undefined data is observable.
    pub fn create_ktis_on_state_change(
        &mut self,
        state: &str,
        param: &MultistateParameter,
        change: StateChange,
        phases: Option<&SectionCollection>,
    ) -> NodeResult<()> {
        let windows = match phases {
            Some(sections) => sections.get_slices(),
            None => vec![crate::flight::Window::unbounded()],
        };
        let entering = matches!(change, StateChange::Entering | StateChange::EnteringAndLeaving);
        let leaving = matches!(change, StateChange::Leaving | StateChange::EnteringAndLeaving);
        for window in windows {
            let range = window.resolve(param.len());
            let (scan_start, scan_stop) = (range.start, range.end);
            for run in param.state_runs(state, Some(range.clone()))? {
                if entering && run.start > scan_start {
                    self.create_kti(run.start as f64 - 0.5, &[])?;
                }
                if leaving && run.end < scan_stop {
                    self.create_kti(run.end as f64 - 0.5, &[])?;
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
            self.instances
                .iter()
                .filter(|k| filter.matches_name(&k.name) && filter.matches_index(k.index))
                .cloned()
                .collect(),
        )
    }

    fn sorted_matches(&self, filter: &Filter) -> Vec<&KeyTimeInstance> {
        let mut matching: Vec<&KeyTimeInstance> = self
            .instances
            .iter()
            .filter(|k| filter.matches_name(&k.name) && filter.matches_index(k.index))
            .collect();
        matching.sort_by(|a, b| a.index.total_cmp(&b.index));
        matching
    }

    pub fn get_first(&self, filter: &Filter) -> Option<&KeyTimeInstance> {
        self.sorted_matches(filter).into_iter().next()
    }

    pub fn get_last(&self, filter: &Filter) -> Option<&KeyTimeInstance> {
        self.sorted_matches(filter).into_iter().next_back()
    }

    pub fn get_ordered_by_index(&self, filter: &Filter) -> Self {
        self.like(self.sorted_matches(filter).into_iter().cloned().collect())
    }

    pub fn get_next(
        &self,
        index: f64,
        frequency: Option<f64>,
        filter: &Filter,
    ) -> Option<&KeyTimeInstance> {
        let index = self.local_index(index, frequency);
        self.sorted_matches(filter)
            .into_iter()
            .find(|k| k.index > index)
    }

    pub fn get_previous(
        &self,
        index: f64,
        frequency: Option<f64>,
        filter: &Filter,
    ) -> Option<&KeyTimeInstance> {
        let index = self.local_index(index, frequency);
        self.sorted_matches(filter)
            .into_iter()
            .rev()
            .find(|k| k.index < index)
    }

    fn local_index(&self, index: f64, frequency: Option<f64>) -> f64 {
        match frequency {
            Some(f) => index * (self.timebase.frequency / f),
            None => index,
        }
    }

    /// Copy with every index mapped onto `target`; the source is untouched.
    pub fn get_aligned(&self, target: TimeBase) -> Self {
        let instances = self
            .instances
            .iter()
            .map(|kti| KeyTimeInstance {
                index: align_index(kti.index, self.timebase, target),
                ..kti.clone()
            })
            .collect();
        Self {
            timebase: target,
            format: self.format.clone(),
            instances,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flight::Window;
    use ndarray::array;

    fn fixed(name: &str) -> KtiCollection {
        KtiCollection::new(NameFormat::fixed(name), TimeBase::one_hz())
    }

    #[test]
    fn create_kti_rejects_non_finite_indices() {
        let mut node = fixed("Touchdown");
        assert!(node.create_kti(f64::NAN, &[]).is_err());
        assert!(node.create_kti(f64::INFINITY, &[]).is_err());
        assert!(node.create_kti(12.5, &[]).is_ok());
        assert_eq!(node.len(), 1);
    }

    #[test]
    fn edges_produce_boundary_indices() {
        let mut node = fixed("Event Marker Pressed");
        let param = Parameter::new(
            "Event Marker",
            array![0.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0],
            TimeBase::one_hz(),
        );
        node.create_ktis_at_edges(&param, EdgeDirection::Rising, None, None)
            .unwrap();
        let indices: Vec<f64> = node.iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![1.5, 5.5]);
    }

    #[test]
    fn edges_can_be_restricted_to_phases() {
        let mut node = fixed("Flap Change");
        let param = Parameter::new(
            "Flap",
            array![0.0, 1.0, 1.0, 0.0, 1.0, 1.0],
            TimeBase::one_hz(),
        );
        let mut phases = SectionCollection::new("Airborne", TimeBase::one_hz());
        phases.create_section(Some(3), Some(6), None);
        node.create_ktis_at_edges(&param, EdgeDirection::Rising, Some(&phases), None)
            .unwrap();
        let indices: Vec<f64> = node.iter().map(|k| k.index).collect();
        assert_eq!(indices, vec![3.5]);
    }

    #[test]
    fn state_changes_sit_half_a_sample_off_the_boundary() {
        let mapping = crate::signal::StateMapping::new(&[(0, "-"), (1, "Engaged")]).unwrap();
        let param = MultistateParameter::from_codes(
            "AP Engaged",
            array![0, 1, 1, 0, 1, 1],
            ndarray::Array1::from_elem(6, false),
            TimeBase::one_hz(),
            mapping,
        )
        .unwrap();
        let mut node = fixed("AP Engaged Selection");
        node.create_ktis_on_state_change(
            "Engaged",
            &param,
            StateChange::EnteringAndLeaving,
            None,
        )
        .unwrap();
        let indices: Vec<f64> = node.iter().map(|k| k.index).collect();
        // Run 1..3 gives 0.5 and 2.5; run 4..6 touches the end of the data,
        // so only its entry at 3.5 is reported.
        assert_eq!(indices, vec![0.5, 2.5, 3.5]);
    }

    #[test]
    fn state_change_at_the_scan_start_is_suppressed() {
        let mapping = crate::signal::StateMapping::new(&[(0, "-"), (1, "Engaged")]).unwrap();
        let param = MultistateParameter::from_codes(
            "AP Engaged",
            array![1, 1, 0, 0],
            ndarray::Array1::from_elem(4, false),
            TimeBase::one_hz(),
            mapping,
        )
        .unwrap();
        let mut node = fixed("AP Engaged Selection");
        node.create_ktis_on_state_change("Engaged", &param, StateChange::Entering, None)
            .unwrap();
        assert!(node.is_empty());
    }

    #[test]
    fn queries_and_alignment() {
        let mut node = fixed("Touchdown");
        node.create_kti(20.0, &[]).unwrap();
        node.create_kti(5.0, &[]).unwrap();
        node.create_kti(12.0, &[]).unwrap();

        assert_eq!(node.get_first(&Filter::new()).unwrap().index, 5.0);
        assert_eq!(node.get_last(&Filter::new()).unwrap().index, 20.0);
        assert_eq!(
            node.get_next(10.0, None, &Filter::new()).unwrap().index,
            12.0
        );
        assert_eq!(
            node.get_previous(10.0, None, &Filter::new()).unwrap().index,
            5.0
        );
        let windowed = node.get(&Filter::new().within(Window::new(4.0, 13.0)));
        assert_eq!(windowed.len(), 2);

        let target = TimeBase::new(2.0, 0.0).unwrap();
        let aligned = node.get_aligned(target);
        let back = aligned.get_aligned(node.timebase);
        let original: Vec<f64> = node.iter().map(|k| k.index).collect();
        let recovered: Vec<f64> = back.iter().map(|k| k.index).collect();
        for (a, b) in original.iter().zip(recovered.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }
}
