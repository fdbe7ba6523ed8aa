use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{apply_unary_op, elementwise_grad};
use crate::tensor::Tensor;

/// Backward pass for `tanh`: `dL/dx = dL/dy * (1 - y²)`.
#[derive(Debug)]
struct TanhBackward {
    input: Tensor,
    output: Tensor,
}

impl BackwardOp for TanhBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![elementwise_grad(grad_output, &self.output, |g, y| {
            g * (1.0 - y * y)
        })?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

pub(crate) fn tanh_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    apply_unary_op(
        a,
        f32::tanh,
        |input, output| Arc::new(TanhBackward { input, output }),
        "tanh",
    )
}
