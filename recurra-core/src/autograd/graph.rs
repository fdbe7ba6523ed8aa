use std::collections::HashSet;
use std::sync::RwLock;

use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

/// Identity of a node in the computation graph: the address of its shared storage.
///
/// Only ever used as a map key; it is never dereferenced.
pub type NodeId = *const RwLock<TensorData>;

/// Performs a topological sort of the computation graph ending at `root`.
///
/// The returned order starts at `root` and lists every node before any of its
/// inputs, which is the order the backward pass needs: when a node is visited
/// every consumer has already contributed its gradient.
///
/// The traversal is iterative so that long unrolled sequences cannot overflow
/// the stack.
pub(crate) fn topological_sort(root: &Tensor) -> Vec<Tensor> {
    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut post_order: Vec<Tensor> = Vec::new();
    // (node, inputs already expanded)
    let mut stack: Vec<(Tensor, bool)> = vec![(root.clone(), false)];

    while let Some((node, expanded)) = stack.pop() {
        if expanded {
            post_order.push(node);
            continue;
        }
        if !visited.insert(node.node_id()) {
            continue;
        }
        let grad_fn = node.grad_fn();
        stack.push((node, true));
        if let Some(op) = grad_fn {
            for input in op.inputs() {
                if !visited.contains(&input.node_id()) {
                    stack.push((input, false));
                }
            }
        }
    }

    post_order.reverse();
    post_order
}
