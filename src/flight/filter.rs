use serde::{Deserialize, Serialize};

/// An index range `[start, stop)` at some collection's rate, with `None`
/// meaning unbounded at that end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Window {
    pub start: Option<f64>,
    pub stop: Option<f64>,
}

impl Window {
    pub fn new(start: f64, stop: f64) -> Self {
        Self {
            start: Some(start),
            stop: Some(stop),
        }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: f64) -> bool {
        self.start.map_or(true, |s| index >= s) && self.stop.map_or(true, |s| index < s)
    }

    /// Resolves the window onto a record of `len` samples.
    pub fn resolve(&self, len: usize) -> std::ops::Range<usize> {
        let start = self
            .start
            .map_or(0, |s| s.max(0.0).ceil() as usize)
            .min(len);
        let stop = self
            .stop
            .map_or(len, |s| s.max(0.0).ceil() as usize)
            .min(len);
        start..stop.max(start)
    }
}

/// Which part of a section is tested against a window filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WithinUse {
    /// The whole section must sit inside the window.
    #[default]
    Whole,
    /// Only the section start must sit inside the window.
    Start,
    /// Only the section stop must sit inside the window.
    Stop,
    /// Any overlap with the window is enough.
    Any,
}

/// Query filter shared by sections, key time instances, and key point
/// values. An empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub name: Option<String>,
    pub within: Option<Window>,
    pub within_use: WithinUse,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn within(mut self, window: Window) -> Self {
        self.within = Some(window);
        self
    }

    pub fn within_use(mut self, within_use: WithinUse) -> Self {
        self.within_use = within_use;
        self
    }

    pub fn matches_name(&self, name: &str) -> bool {
        self.name.as_deref().map_or(true, |n| n == name)
    }

    pub fn matches_index(&self, index: f64) -> bool {
        self.within.map_or(true, |w| w.contains(index))
    }
}
