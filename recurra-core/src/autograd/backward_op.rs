use crate::error::RecurraError;
use crate::tensor::Tensor;
use std::fmt::Debug;

/// Defines the interface for the backward pass of a differentiable tensor operation.
///
/// Any operation that creates a non-leaf `Tensor` stores an implementation of this
/// trait in the output's `grad_fn`. During `backward()` it receives dL/dOutput and
/// returns dL/dInput for each input.
///
/// The `Debug + Send + Sync` bounds let `Arc<dyn BackwardOp>` live inside
/// `TensorData`, which is itself shared behind an `Arc<RwLock<_>>`.
pub trait BackwardOp: Debug + Send + Sync {
    /// Computes the gradients of the operation's inputs.
    ///
    /// # Returns
    /// One gradient per input, in the same order as [`BackwardOp::inputs`].
    /// Each gradient has the shape of its input. Gradient tensors never
    /// require grad themselves.
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError>;

    /// Returns handles to the input tensors that participated in the forward operation.
    ///
    /// The order **must** match the order of gradients returned by `backward()`.
    fn inputs(&self) -> Vec<Tensor>;
}
