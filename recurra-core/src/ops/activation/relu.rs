use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{apply_unary_op, elementwise_grad};
use crate::tensor::Tensor;

#[derive(Debug)]
struct ReluBackward {
    input: Tensor,
}

impl BackwardOp for ReluBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        // grad = upstream * (x > 0)
        Ok(vec![elementwise_grad(grad_output, &self.input, |g, x| {
            if x > 0.0 {
                g
            } else {
                0.0
            }
        })?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Rectified Linear Unit: `max(0, x)`.
pub(crate) fn relu_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    apply_unary_op(
        a,
        |x| if x > 0.0 { x } else { 0.0 },
        |input, _output| Arc::new(ReluBackward { input }),
        "relu",
    )
}
