//! Node-graph analysis core for the flight-data-recorder processing platform.
//!
//! The modules provide the building blocks a dependency-driven analysis run
//! is assembled from: typed signal arrays with alignment, flight-event
//! collections, declarative node schemas, and the per-flight namespace.

pub mod flight;
pub mod math;
pub mod node;
pub mod prelude;
pub mod registry;
pub mod signal;
pub mod telemetry;

pub use prelude::{DataShape, NodeData, NodeError, NodeResult, TimeBase};
