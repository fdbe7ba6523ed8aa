use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::apply_unary_op;
use crate::tensor::Tensor;

use super::{broadcast_binary_op, reduce_gradient};

/// Backward pass for `a + b`: the upstream gradient, summed over broadcast dimensions.
#[derive(Debug)]
struct AddBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for AddBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![
            reduce_gradient(grad_output, &self.a_shape, 1.0)?,
            reduce_gradient(grad_output, &self.b_shape, 1.0)?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise addition with broadcasting.
pub(crate) fn add_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RecurraError> {
    broadcast_binary_op(
        a,
        b,
        |x, y| x + y,
        |a, b, _| {
            let a_shape = a.shape();
            let b_shape = b.shape();
            Arc::new(AddBackward { a, b, a_shape, b_shape })
        },
        "add",
    )
}

#[derive(Debug)]
struct AddScalarBackward {
    input: Tensor,
}

impl BackwardOp for AddScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![grad_output.detach()])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Adds a scalar to every element.
pub(crate) fn add_scalar_op(a: &Tensor, scalar: f32) -> Result<Tensor, RecurraError> {
    apply_unary_op(
        a,
        |x| x + scalar,
        |input, _| Arc::new(AddScalarBackward { input }),
        "add_scalar",
    )
}

#[cfg(test)]
#[path = "add_test.rs"]
mod tests;
