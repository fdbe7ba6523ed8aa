use std::collections::HashMap;
use std::sync::Arc;

use crate::autograd::graph::{topological_sort, NodeId};
use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::tensor::Tensor;
use crate::tensor_data::TensorData;

impl Tensor {
    /// Returns `true` if operations on this tensor are recorded for differentiation.
    pub fn requires_grad(&self) -> bool {
        self.read_data().requires_grad
    }

    /// Sets the `requires_grad` flag of a leaf tensor.
    ///
    /// # Errors
    /// Returns `RecurraError::UnsupportedOperation` when called on a non-leaf
    /// tensor: its flag is decided by the operation that produced it.
    pub fn set_requires_grad(&self, requires_grad: bool) -> Result<(), RecurraError> {
        let mut guard = self.write_data();
        if guard.grad_fn.is_some() {
            return Err(RecurraError::UnsupportedOperation(
                "requires_grad can only be changed on leaf tensors".to_string(),
            ));
        }
        guard.requires_grad = requires_grad;
        Ok(())
    }

    /// Returns the accumulated gradient, if any.
    pub fn grad(&self) -> Option<Tensor> {
        self.read_data().grad.clone()
    }

    /// Returns the operation that produced this tensor, if any.
    pub fn grad_fn(&self) -> Option<Arc<dyn BackwardOp>> {
        self.read_data().grad_fn.clone()
    }

    /// A leaf has no `grad_fn`: it was created by the user, not by an operation.
    pub fn is_leaf(&self) -> bool {
        self.read_data().grad_fn.is_none()
    }

    /// Drops the accumulated gradient.
    pub fn clear_grad(&self) {
        self.write_data().grad = None;
    }

    /// Adds `gradient` into this tensor's accumulator.
    pub(crate) fn acc_grad(&self, gradient: Tensor) -> Result<(), RecurraError> {
        let incoming = gradient.get_f32_data();
        let incoming_shape = gradient.shape();
        let mut guard = self.write_data();
        if incoming_shape != guard.shape {
            return Err(RecurraError::ShapeMismatch {
                expected: guard.shape.clone(),
                actual: incoming_shape,
                operation: "acc_grad".to_string(),
            });
        }
        let summed = match guard.grad.as_ref() {
            Some(existing) => {
                let mut values = existing.get_f32_data();
                values.iter_mut().zip(incoming.iter()).for_each(|(v, g)| *v += g);
                values
            }
            None => incoming,
        };
        guard.grad = Some(Tensor::new(summed, incoming_shape)?);
        Ok(())
    }

    /// Returns a new leaf tensor with a copy of the data and no autograd history.
    pub fn detach(&self) -> Tensor {
        let guard = self.read_data();
        Tensor::from_tensor_data(TensorData {
            data: guard.data.clone(),
            shape: guard.shape.clone(),
            device: guard.device,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    /// Computes gradients of this tensor with respect to every leaf that requires grad.
    ///
    /// Gradients are *added* into each leaf's accumulator; call
    /// [`Tensor::clear_grad`] (or zero the owning parameters) between passes.
    ///
    /// # Arguments
    /// * `gradient`: dL/dself. May be omitted for tensors with a single element,
    ///   in which case it defaults to one.
    ///
    /// # Errors
    /// * `BackwardNonScalar` if `gradient` is omitted for a multi-element tensor.
    /// * `BackwardError` if a supplied gradient does not match the tensor's shape
    ///   or a backward op returns inconsistent gradients.
    pub fn backward(&self, gradient: Option<&Tensor>) -> Result<(), RecurraError> {
        if !self.requires_grad() {
            return Ok(());
        }

        let root_grad = match gradient {
            Some(g) => {
                if g.shape() != self.shape() {
                    return Err(RecurraError::BackwardError(format!(
                        "Gradient shape mismatch: expected {:?}, got {:?}",
                        self.shape(),
                        g.shape()
                    )));
                }
                g.detach()
            }
            None => {
                if self.numel() != 1 {
                    return Err(RecurraError::BackwardNonScalar);
                }
                Tensor::new(vec![1.0], self.shape())?
            }
        };

        let mut grad_map: HashMap<NodeId, Tensor> = HashMap::new();
        grad_map.insert(self.node_id(), root_grad);

        for node in topological_sort(self) {
            let Some(node_grad) = grad_map.remove(&node.node_id()) else {
                continue;
            };
            match node.grad_fn() {
                Some(op) => {
                    let inputs = op.inputs();
                    let input_grads = op.backward(&node_grad)?;
                    if inputs.len() != input_grads.len() {
                        return Err(RecurraError::BackwardError(format!(
                            "{:?} returned {} gradients for {} inputs",
                            op,
                            input_grads.len(),
                            inputs.len()
                        )));
                    }
                    for (input, input_grad) in inputs.iter().zip(input_grads) {
                        if !input.requires_grad() {
                            continue;
                        }
                        if input_grad.shape() != input.shape() {
                            return Err(RecurraError::BackwardError(format!(
                                "{:?} produced gradient of shape {:?} for input of shape {:?}",
                                op,
                                input_grad.shape(),
                                input.shape()
                            )));
                        }
                        accumulate_in_map(&mut grad_map, input.node_id(), input_grad)?;
                    }
                }
                None => {
                    if node.requires_grad() {
                        node.acc_grad(node_grad)?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn accumulate_in_map(
    grad_map: &mut HashMap<NodeId, Tensor>,
    id: NodeId,
    gradient: Tensor,
) -> Result<(), RecurraError> {
    match grad_map.remove(&id) {
        Some(existing) => {
            let mut values = existing.get_f32_data();
            let incoming = gradient.get_f32_data();
            values.iter_mut().zip(incoming.iter()).for_each(|(v, g)| *v += g);
            grad_map.insert(id, Tensor::new(values, existing.shape())?);
        }
        None => {
            grad_map.insert(id, gradient);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "autograd_methods_test.rs"]
mod tests;
