use serde::{Deserialize, Serialize};

use crate::flight::{Attribute, KpvCollection, KtiCollection, SectionCollection};
use crate::signal::{align_multistate, align_parameter, MultistateParameter, Parameter};

/// Sample rate and phase offset shared by every time-based result.
///
/// `offset` is the time in seconds of the first sample within its sample
/// period. Nominally `0 <= offset < 1 / frequency`; values outside that
/// range are accepted with a warning as some recorders report them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeBase {
    pub frequency: f64,
    pub offset: f64,
}

impl TimeBase {
    pub fn new(frequency: f64, offset: f64) -> NodeResult<Self> {
        if !frequency.is_finite() || frequency <= 0.0 {
            return Err(NodeError::InvalidFrequency(frequency));
        }
        if offset < 0.0 || offset >= 1.0 / frequency {
            log::warn!(
                "offset {:.3}s outside nominal sample period at {} Hz",
                offset,
                frequency
            );
        }
        Ok(Self { frequency, offset })
    }

    /// 1 Hz with no phase offset, the fallback base for rate-less inputs.
    pub fn one_hz() -> Self {
        Self {
            frequency: 1.0,
            offset: 0.0,
        }
    }
}

/// The shape a node declares for its output, checked after every derivation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataShape {
    Parameter,
    Multistate,
    Sections,
    Instances,
    Values,
    Fact,
}

/// Common error type for node declaration and derivation.
#[derive(thiserror::Error, Debug)]
pub enum NodeError {
    #[error("invalid declaration for '{node}': {reason}")]
    Declaration { node: String, reason: String },
    #[error("derive for '{0}' is not implemented")]
    NotImplemented(String),
    #[error("'{node}' produced {got:?} output, declared {declared:?}")]
    UnexpectedOutput {
        node: String,
        declared: DataShape,
        got: DataShape,
    },
    #[error("invalid frequency {0} Hz")]
    InvalidFrequency(f64),
    #[error("data/mask length mismatch: {data} vs {mask}")]
    LengthMismatch { data: usize, mask: usize },
    #[error("no state '{0}' in mapping")]
    UnknownState(String),
    #[error("no code {0} in mapping")]
    UnknownCode(i64),
    #[error("duplicate mapping entry '{0}'")]
    DuplicateState(String),
    #[error("invalid name '{0}'")]
    InvalidName(String),
    #[error("missing template key '{0}'")]
    MissingKey(String),
    #[error("cannot create at index {0}")]
    InvalidIndex(f64),
}

pub type NodeResult<T> = Result<T, NodeError>;

/// One variant per result shape a node can produce.
///
/// Each value is independently owned; handing a result to a downstream node
/// goes through [`NodeData::get_aligned`], which always copies, so no derive
/// can mutate another node's output.
#[derive(Debug, Clone)]
pub enum NodeData {
    Parameter(Parameter),
    Multistate(MultistateParameter),
    Sections(SectionCollection),
    Instances(KtiCollection),
    Values(KpvCollection),
    Fact(Attribute),
}

impl NodeData {
    pub fn shape(&self) -> DataShape {
        match self {
            NodeData::Parameter(_) => DataShape::Parameter,
            NodeData::Multistate(_) => DataShape::Multistate,
            NodeData::Sections(_) => DataShape::Sections,
            NodeData::Instances(_) => DataShape::Instances,
            NodeData::Values(_) => DataShape::Values,
            NodeData::Fact(_) => DataShape::Fact,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeData::Parameter(p) => &p.name,
            NodeData::Multistate(m) => &m.name,
            NodeData::Sections(s) => &s.name,
            NodeData::Instances(k) => k.name(),
            NodeData::Values(k) => k.name(),
            NodeData::Fact(a) => &a.name,
        }
    }

    /// Scalar facts carry no time dimension, hence `None`.
    pub fn timebase(&self) -> Option<TimeBase> {
        match self {
            NodeData::Parameter(p) => Some(p.timebase),
            NodeData::Multistate(m) => Some(m.timebase),
            NodeData::Sections(s) => Some(s.timebase),
            NodeData::Instances(k) => Some(k.timebase),
            NodeData::Values(k) => Some(k.timebase),
            NodeData::Fact(_) => None,
        }
    }

    /// Returns a new result resampled onto `target`. The source is never
    /// mutated; aligning a fact is the identity.
    pub fn get_aligned(&self, target: TimeBase) -> NodeData {
        match self {
            NodeData::Parameter(p) => NodeData::Parameter(align_parameter(p, target)),
            NodeData::Multistate(m) => NodeData::Multistate(align_multistate(m, target)),
            NodeData::Sections(s) => NodeData::Sections(s.get_aligned(target)),
            NodeData::Instances(k) => NodeData::Instances(k.get_aligned(target)),
            NodeData::Values(k) => NodeData::Values(k.get_aligned(target)),
            NodeData::Fact(a) => NodeData::Fact(a.get_aligned(target)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timebase_rejects_non_positive_frequency() {
        assert!(TimeBase::new(0.0, 0.0).is_err());
        assert!(TimeBase::new(-4.0, 0.0).is_err());
        assert!(TimeBase::new(f64::NAN, 0.0).is_err());
        assert!(TimeBase::new(8.0, 0.05).is_ok());
    }

    #[test]
    fn fact_has_no_timebase_and_aligns_to_itself() {
        let fact = NodeData::Fact(Attribute::new("Series", serde_json::json!("B737-300")));
        assert_eq!(fact.timebase(), None);
        let aligned = fact.get_aligned(TimeBase::one_hz());
        assert_eq!(aligned.name(), "Series");
        assert_eq!(aligned.shape(), DataShape::Fact);
    }
}
