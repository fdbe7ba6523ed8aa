use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{apply_unary_op, elementwise_grad};
use crate::tensor::broadcast_utils::{broadcast_binary, reduce_to_shape};
use crate::tensor::Tensor;

use super::broadcast_binary_op;

/// Backward pass for `a * b`: `dL/da = dL/dy * b`, `dL/db = dL/dy * a`,
/// each summed back to its input's shape.
#[derive(Debug)]
struct MulBackward {
    a: Tensor,
    b: Tensor,
}

impl MulBackward {
    fn grad_for(grad_output: &Tensor, target: &Tensor, other: &Tensor) -> Result<Tensor, RecurraError> {
        let target_shape = target.shape();
        let g = grad_output.read_data();
        let o = other.read_data();
        let product = broadcast_binary(&g.data, &g.shape, &o.data, &o.shape, &g.shape, |g, o| g * o);
        Tensor::new(reduce_to_shape(&product, &g.shape, &target_shape), target_shape)
    }
}

impl BackwardOp for MulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![
            MulBackward::grad_for(grad_output, &self.a, &self.b)?,
            MulBackward::grad_for(grad_output, &self.b, &self.a)?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise (Hadamard) product with broadcasting.
pub(crate) fn mul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RecurraError> {
    broadcast_binary_op(
        a,
        b,
        |x, y| x * y,
        |a, b, _| Arc::new(MulBackward { a, b }),
        "mul",
    )
}

#[derive(Debug)]
struct MulScalarBackward {
    input: Tensor,
    scalar: f32,
}

impl BackwardOp for MulScalarBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let scalar = self.scalar;
        Ok(vec![elementwise_grad(grad_output, &self.input, |g, _| g * scalar)?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Multiplies every element by a scalar.
pub(crate) fn mul_scalar_op(a: &Tensor, scalar: f32) -> Result<Tensor, RecurraError> {
    apply_unary_op(
        a,
        |x| x * scalar,
        |input, _| Arc::new(MulScalarBackward { input, scalar }),
        "mul_scalar",
    )
}

#[cfg(test)]
#[path = "mul_test.rs"]
mod tests;
