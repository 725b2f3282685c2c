pub mod align;
pub mod multistate;
pub mod parameter;

pub use align::{align_index, align_multistate, align_optional_index, align_parameter};
pub use multistate::{MultistateParameter, StateMapping};
pub use parameter::Parameter;
