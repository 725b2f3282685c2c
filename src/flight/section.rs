use serde::{Deserialize, Serialize};

use crate::flight::filter::{Filter, WithinUse, Window};
use crate::prelude::TimeBase;
use crate::signal::align_optional_index;

/// Which end of a section orders or keys a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Start,
    Stop,
}

/// A named `[start, stop)` interval of the record, in samples at the owning
/// collection's rate. Integer bounds slice raw arrays; the fractional edges
/// carry sub-sample timing the bounds cannot express. `None` means the
/// section is unbounded at that end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub start: Option<usize>,
    pub stop: Option<usize>,
    pub start_edge: Option<f64>,
    pub stop_edge: Option<f64>,
}

impl Section {
    pub fn new(name: impl Into<String>, start: Option<usize>, stop: Option<usize>) -> Self {
        Self {
            name: name.into(),
            start,
            stop,
            start_edge: start.map(|s| s as f64),
            stop_edge: stop.map(|s| s as f64),
        }
    }

    /// Integer bounds are the ceiling of each edge, mirroring how aligned
    /// sections are rebuilt.
    pub fn with_edges(
        name: impl Into<String>,
        start_edge: Option<f64>,
        stop_edge: Option<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            start: start_edge.map(|e| e.ceil().max(0.0) as usize),
            stop: stop_edge.map(|e| e.ceil().max(0.0) as usize),
            start_edge,
            stop_edge,
        }
    }

    pub fn duration_samples(&self) -> Option<f64> {
        match (self.start_edge, self.stop_edge) {
            (Some(start), Some(stop)) => Some(stop - start),
            _ => None,
        }
    }

    /// Sort/tie-break key; open ends sort before/after everything.
    fn key(&self, edge: Edge) -> f64 {
        match edge {
            Edge::Start => self.start_edge.unwrap_or(f64::NEG_INFINITY),
            Edge::Stop => self.stop_edge.unwrap_or(f64::INFINITY),
        }
    }

    /// True when `index` lies within the closed `[start, stop]` bounds,
    /// treating open ends as unbounded.
    pub fn surrounds(&self, index: f64) -> bool {
        self.start_edge.map_or(true, |s| s <= index)
            && self.stop_edge.map_or(true, |s| index <= s)
    }

    fn window(&self) -> Window {
        Window {
            start: self.start_edge,
            stop: self.stop_edge,
        }
    }

    fn matches(&self, filter: &Filter) -> bool {
        if !filter.matches_name(&self.name) {
            return false;
        }
        let window = match filter.within {
            Some(w) => w,
            None => return true,
        };
        match filter.within_use {
            WithinUse::Whole => {
                self.start_edge.map_or(false, |s| window.contains(s))
                    && self.stop_edge.map_or(false, |s| window.contains(s))
            }
            WithinUse::Start => self.start_edge.map_or(false, |s| window.contains(s)),
            WithinUse::Stop => self.stop_edge.map_or(false, |s| window.contains(s)),
            WithinUse::Any => {
                let own = self.window();
                let starts_before_other_stops =
                    match (own.start, window.stop) {
                        (Some(s), Some(stop)) => s < stop,
                        _ => true,
                    };
                let other_starts_before_own_stop =
                    match (window.start, own.stop) {
                        (Some(s), Some(stop)) => s < stop,
                        _ => true,
                    };
                starts_before_other_stops && other_starts_before_own_stop
            }
        }
    }
}

/// Ordered collection of [`Section`]s at one timebase. Flight phases are
/// the same thing under an alternate vocabulary, via the `create_phase`
/// aliases.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionCollection {
    pub name: String,
    pub timebase: TimeBase,
    sections: Vec<Section>,
}

impl SectionCollection {
    pub fn new(name: impl Into<String>, timebase: TimeBase) -> Self {
        Self {
            name: name.into(),
            timebase,
            sections: Vec::new(),
        }
    }

    pub fn with_sections(
        name: impl Into<String>,
        timebase: TimeBase,
        sections: Vec<Section>,
    ) -> Self {
        Self {
            name: name.into(),
            timebase,
            sections,
        }
    }

    fn like(&self, sections: Vec<Section>) -> Self {
        Self {
            name: self.name.clone(),
            timebase: self.timebase,
            sections,
        }
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Appends a new section. Open-ended sections are legal for slicing raw
    /// arrays but noted, as converting one to an event index later has
    /// nothing to anchor to.
    pub fn create_section(&mut self, start: Option<usize>, stop: Option<usize>, name: Option<&str>) {
        self.push(Section::new(name.unwrap_or(&self.name).to_string(), start, stop));
    }

    pub fn create_section_with_edges(
        &mut self,
        start_edge: Option<f64>,
        stop_edge: Option<f64>,
        name: Option<&str>,
    ) {
        self.push(Section::with_edges(
            name.unwrap_or(&self.name).to_string(),
            start_edge,
            stop_edge,
        ));
    }

    pub fn create_sections(&mut self, slices: &[(Option<usize>, Option<usize>)], name: Option<&str>) {
        for &(start, stop) in slices {
            self.create_section(start, stop, name);
        }
    }

    /// Phase vocabulary for the same operation.
    pub fn create_phase(&mut self, start: Option<usize>, stop: Option<usize>, name: Option<&str>) {
        self.create_section(start, stop, name);
    }

    pub fn create_phases(&mut self, slices: &[(Option<usize>, Option<usize>)], name: Option<&str>) {
        self.create_sections(slices, name);
    }

    fn push(&mut self, section: Section) {
        if section.start.is_none() || section.stop.is_none() {
            log::debug!(
                "section '{}' created with an open end ({:?}..{:?})",
                section.name,
                section.start,
                section.stop
            );
        }
        self.sections.push(section);
    }

    /// Filtered copy of the collection.
    pub fn get(&self, filter: &Filter) -> Self {
        self.like(
            self.sections
                .iter()
                .filter(|s| s.matches(filter))
                .cloned()
                .collect(),
        )
    }

    fn sorted_matches(&self, by: Edge, filter: &Filter) -> Vec<&Section> {
        let mut matching: Vec<&Section> =
            self.sections.iter().filter(|s| s.matches(filter)).collect();
        matching.sort_by(|a, b| a.key(by).total_cmp(&b.key(by)));
        matching
    }

    /// Earliest matching section by the chosen edge; `None` when nothing
    /// matches, never a panic.
    pub fn get_first(&self, by: Edge, filter: &Filter) -> Option<&Section> {
        self.sorted_matches(by, filter).into_iter().next()
    }

    pub fn get_last(&self, by: Edge, filter: &Filter) -> Option<&Section> {
        self.sorted_matches(by, filter).into_iter().next_back()
    }

    /// Stable ascending sort by the chosen edge.
    pub fn get_ordered_by_index(&self, by: Edge, filter: &Filter) -> Self {
        self.like(
            self.sorted_matches(by, filter)
                .into_iter()
                .cloned()
                .collect(),
        )
    }

    /// First section whose chosen edge is strictly beyond `index`. A
    /// `frequency` converts a foreign-rate index onto this collection's
    /// rate first.
    pub fn get_next(
        &self,
        index: f64,
        frequency: Option<f64>,
        by: Edge,
        filter: &Filter,
    ) -> Option<&Section> {
        let index = self.local_index(index, frequency);
        self.sorted_matches(by, filter)
            .into_iter()
            .find(|s| s.key(by) > index)
    }

    pub fn get_previous(
        &self,
        index: f64,
        frequency: Option<f64>,
        by: Edge,
        filter: &Filter,
    ) -> Option<&Section> {
        let index = self.local_index(index, frequency);
        self.sorted_matches(by, filter)
            .into_iter()
            .rev()
            .find(|s| s.key(by) < index)
    }

    fn local_index(&self, index: f64, frequency: Option<f64>) -> f64 {
        match frequency {
            Some(f) => index * (self.timebase.frequency / f),
            None => index,
        }
    }

    /// All sections whose closed `[start, stop]` interval contains `index`.
    pub fn get_surrounding(&self, index: f64) -> Self {
        self.like(
            self.sections
                .iter()
                .filter(|s| s.surrounds(index))
                .cloned()
                .collect(),
        )
    }

    /// Slice bounds for cutting raw arrays, as window values.
    pub fn get_slices(&self) -> Vec<Window> {
        self.sections
            .iter()
            .map(|s| Window {
                start: s.start.map(|v| v as f64),
                stop: s.stop.map(|v| v as f64),
            })
            .collect()
    }

    /// Copy with every section's edges mapped onto `target`; open ends stay
    /// open. The source collection is untouched.
    pub fn get_aligned(&self, target: TimeBase) -> Self {
        let mut aligned = Self::new(self.name.clone(), target);
        for section in &self.sections {
            aligned.create_section_with_edges(
                align_optional_index(section.start_edge, self.timebase, target),
                align_optional_index(section.stop_edge, self.timebase, target),
                Some(&section.name),
            );
        }
        aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn climbs() -> SectionCollection {
        let mut node = SectionCollection::new("Climb", TimeBase::one_hz());
        node.create_section(Some(5), Some(9), None);
        node.create_section(Some(12), Some(15), None);
        node.create_section(Some(20), Some(30), None);
        node
    }

    #[test]
    fn get_next_and_previous_are_strict() {
        let node = climbs();
        let next = node.get_next(10.0, None, Edge::Start, &Filter::new()).unwrap();
        assert_eq!(next.start, Some(12));
        let previous = node
            .get_previous(10.0, None, Edge::Stop, &Filter::new())
            .unwrap();
        assert_eq!(previous.stop, Some(9));
        // Strictly greater/lesser: an exact hit does not count.
        let at_edge = node.get_next(12.0, None, Edge::Start, &Filter::new()).unwrap();
        assert_eq!(at_edge.start, Some(20));
    }

    #[test]
    fn foreign_frequency_indices_are_converted() {
        let node = climbs(); // 1 Hz
        // Index 40 at 4 Hz is index 10 here.
        let next = node
            .get_next(40.0, Some(4.0), Edge::Start, &Filter::new())
            .unwrap();
        assert_eq!(next.start, Some(12));
    }

    #[test]
    fn get_first_and_last_never_panic_on_empty() {
        let node = SectionCollection::new("Climb", TimeBase::one_hz());
        assert!(node.get_first(Edge::Start, &Filter::new()).is_none());
        assert!(node.get_last(Edge::Stop, &Filter::new()).is_none());
    }

    #[test]
    fn surrounding_includes_open_ended_sections() {
        let mut node = SectionCollection::new("Airborne", TimeBase::one_hz());
        node.create_section(Some(10), Some(20), None);
        node.create_section(None, Some(5), None);
        node.create_section(Some(18), None, None);
        let surrounding = node.get_surrounding(19.0);
        assert_eq!(surrounding.len(), 2);
        assert_eq!(node.get_surrounding(3.0).len(), 1);
    }

    #[test]
    fn window_filters_respect_within_use() {
        let node = climbs();
        let window = Window::new(4.0, 13.0);
        let whole = node.get(&Filter::new().within(window));
        assert_eq!(whole.len(), 1); // only 5..9 fits entirely
        let by_start = node.get(&Filter::new().within(window).within_use(WithinUse::Start));
        assert_eq!(by_start.len(), 2); // 5..9 and 12..15
        let any = node.get(&Filter::new().within(window).within_use(WithinUse::Any));
        assert_eq!(any.len(), 2);
    }

    #[test]
    fn alignment_converts_edges_and_keeps_open_ends() {
        let mut node = SectionCollection::new("Approach", TimeBase::one_hz());
        node.create_section_with_edges(Some(2.5), Some(6.5), None);
        node.create_section_with_edges(None, Some(4.0), None);
        let target = TimeBase::new(2.0, 0.0).unwrap();
        let aligned = node.get_aligned(target);
        let first = aligned.iter().next().unwrap();
        assert_eq!(first.start_edge, Some(5.0));
        assert_eq!(first.stop_edge, Some(13.0));
        assert_eq!(first.start, Some(5));
        let second = aligned.iter().nth(1).unwrap();
        assert_eq!(second.start_edge, None);
        assert_eq!(second.stop, Some(8));

        // Round trip recovers the original edges.
        let back = aligned.get_aligned(node.timebase);
        let first_back = back.iter().next().unwrap();
        assert!((first_back.start_edge.unwrap() - 2.5).abs() < 1e-9);
        assert!((first_back.stop_edge.unwrap() - 6.5).abs() < 1e-9);
    }

    #[test]
    fn phase_aliases_create_sections() {
        let mut node = SectionCollection::new("Takeoff", TimeBase::one_hz());
        node.create_phase(Some(0), Some(10), None);
        node.create_phases(&[(Some(20), Some(25))], Some("Go Around"));
        assert_eq!(node.len(), 2);
        assert_eq!(node.iter().nth(1).unwrap().name, "Go Around");
    }
}
