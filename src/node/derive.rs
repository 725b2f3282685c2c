use crate::node::schema::NodeSchema;
use crate::prelude::{DataShape, NodeData, NodeError, NodeResult, TimeBase};
use crate::telemetry::Diagnostics;

/// A computed node: a declared schema, a declared output shape, and the
/// derivation itself.
///
/// `inputs` holds one slot per declared dependency, in declaration order;
/// a dependency that is unavailable for this flight arrives as `None`.
/// Implementations read their inputs immutably and build a fresh owned
/// result.
pub trait DerivedNode {
    fn schema(&self) -> &NodeSchema;

    /// The shape this node's output must have.
    fn shape(&self) -> DataShape;

    fn derive(&self, inputs: &[Option<NodeData>], diag: &Diagnostics) -> NodeResult<NodeData> {
        let _ = (inputs, diag);
        Err(NodeError::NotImplemented(self.schema().name().to_string()))
    }
}

/// Runs one derivation: aligns every input onto the timebase of the first
/// present time-based input, invokes the node, and checks the output shape
/// against the declaration.
///
/// The first time-based input keeps its native rate, so a node wanting its
/// output at a particular rate lists that dependency first. When no input
/// carries a timebase (facts only), inputs pass through untouched.
pub fn get_derived(
    node: &dyn DerivedNode,
    inputs: &[Option<NodeData>],
    diag: &Diagnostics,
) -> NodeResult<NodeData> {
    let name = node.schema().name().to_string();
    let base = first_timebase(inputs);
    let aligned: Vec<Option<NodeData>> = match base {
        Some(base) => inputs
            .iter()
            .map(|slot| slot.as_ref().map(|data| data.get_aligned(base)))
            .collect(),
        None => inputs.to_vec(),
    };

    let output = node.derive(&aligned, diag)?;
    let declared = node.shape();
    if output.shape() != declared {
        diag.defect(
            &name,
            format!("produced {:?}, declared {:?}", output.shape(), declared),
        );
        return Err(NodeError::UnexpectedOutput {
            node: name,
            declared,
            got: output.shape(),
        });
    }
    Ok(output)
}

fn first_timebase(inputs: &[Option<NodeData>]) -> Option<TimeBase> {
    inputs
        .iter()
        .flatten()
        .find_map(|data| data.timebase())
}
