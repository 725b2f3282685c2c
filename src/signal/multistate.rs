use std::collections::BTreeMap;
use std::ops::Range;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::prelude::{NodeError, NodeResult, TimeBase};

/// Bijection between integer state codes and their labels.
///
/// Masked samples are stored as a sentinel code one above the highest mapped
/// code, so they can never collide with a real state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateMapping {
    states: BTreeMap<i64, String>,
}

impl StateMapping {
    pub fn new(pairs: &[(i64, &str)]) -> NodeResult<Self> {
        let mut states = BTreeMap::new();
        for &(code, label) in pairs {
            if states.values().any(|l| l == label) {
                return Err(NodeError::DuplicateState(label.to_string()));
            }
            if states.insert(code, label.to_string()).is_some() {
                return Err(NodeError::DuplicateState(code.to_string()));
            }
        }
        Ok(Self { states })
    }

    pub fn label(&self, code: i64) -> Option<&str> {
        self.states.get(&code).map(String::as_str)
    }

    pub fn code(&self, label: &str) -> Option<i64> {
        self.states
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(&c, _)| c)
    }

    pub fn contains_code(&self, code: i64) -> bool {
        self.states.contains_key(&code)
    }

    /// Reserved code for masked samples, outside the valid code range.
    pub fn sentinel(&self) -> i64 {
        self.states.keys().next_back().map_or(0, |&max| max + 1)
    }
}

/// A discrete-state signal whose integer codes read through a [`StateMapping`].
///
/// Only the three explicit constructors build one, each normalizing its input
/// shape to the same internal representation: codes, mask, own mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct MultistateParameter {
    pub name: String,
    pub codes: Array1<i64>,
    pub mask: Array1<bool>,
    pub timebase: TimeBase,
    pub mapping: StateMapping,
}

impl MultistateParameter {
    /// Adopts raw integer codes. Every unmasked code must be mapped; masked
    /// entries are rewritten to the sentinel.
    pub fn from_codes(
        name: impl Into<String>,
        codes: Array1<i64>,
        mask: Array1<bool>,
        timebase: TimeBase,
        mapping: StateMapping,
    ) -> NodeResult<Self> {
        if codes.len() != mask.len() {
            return Err(NodeError::LengthMismatch {
                data: codes.len(),
                mask: mask.len(),
            });
        }
        let sentinel = mapping.sentinel();
        let mut normalized = codes;
        for (code, &masked) in normalized.iter_mut().zip(mask.iter()) {
            if masked {
                *code = sentinel;
            } else if !mapping.contains_code(*code) {
                return Err(NodeError::UnknownCode(*code));
            }
        }
        Ok(Self {
            name: name.into(),
            codes: normalized,
            mask,
            timebase,
            mapping,
        })
    }

    /// Translates labels through the reverse mapping. `None` entries are
    /// masked; an unknown label is an error.
    pub fn from_labels(
        name: impl Into<String>,
        labels: &[Option<&str>],
        timebase: TimeBase,
        mapping: StateMapping,
    ) -> NodeResult<Self> {
        let sentinel = mapping.sentinel();
        let mut codes = Vec::with_capacity(labels.len());
        let mut mask = Vec::with_capacity(labels.len());
        for label in labels {
            match label {
                Some(l) => {
                    let code = mapping
                        .code(l)
                        .ok_or_else(|| NodeError::UnknownState(l.to_string()))?;
                    codes.push(code);
                    mask.push(false);
                }
                None => {
                    codes.push(sentinel);
                    mask.push(true);
                }
            }
        }
        Ok(Self {
            name: name.into(),
            codes: Array1::from(codes),
            mask: Array1::from(mask),
            timebase,
            mapping,
        })
    }

    /// Adopts an already-mapped array, forcing this node's own mapping onto
    /// the data and revalidating every unmasked code against it.
    pub fn from_mapped(
        name: impl Into<String>,
        source: &MultistateParameter,
        mapping: StateMapping,
    ) -> NodeResult<Self> {
        Self::from_codes(
            name,
            source.codes.clone(),
            source.mask.clone(),
            source.timebase,
            mapping,
        )
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn label_at(&self, index: usize) -> Option<&str> {
        if self.mask.get(index).copied().unwrap_or(true) {
            return None;
        }
        self.mapping.label(self.codes[index])
    }

    /// Labels per sample; masked samples read back as `None`.
    pub fn labels(&self) -> Vec<Option<&str>> {
        (0..self.len()).map(|i| self.label_at(i)).collect()
    }

    /// Maximal runs of consecutive unmasked samples equal to `label`,
    /// restricted to `window` when given. Indices are absolute.
    pub fn state_runs(
        &self,
        label: &str,
        window: Option<Range<usize>>,
    ) -> NodeResult<Vec<Range<usize>>> {
        let code = self
            .mapping
            .code(label)
            .ok_or_else(|| NodeError::UnknownState(label.to_string()))?;
        let window = window.unwrap_or(0..self.len());
        let stop = window.end.min(self.len());
        let start = window.start.min(stop);
        let mut runs = Vec::new();
        let mut run_start: Option<usize> = None;
        for i in start..stop {
            let matching = !self.mask[i] && self.codes[i] == code;
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
            runs.push(s..stop);
        }
        Ok(runs)
    }
}
