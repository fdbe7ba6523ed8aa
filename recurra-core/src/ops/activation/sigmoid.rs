use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{apply_unary_op, elementwise_grad};
use crate::tensor::Tensor;

#[derive(Debug)]
struct SigmoidBackward {
    input: Tensor,
    output: Tensor,
}

impl BackwardOp for SigmoidBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![elementwise_grad(grad_output, &self.output, |g, y| {
            g * y * (1.0 - y)
        })?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Logistic function `1 / (1 + e^{-x})`, evaluated without overflow for large `|x|`.
fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

pub(crate) fn sigmoid_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    apply_unary_op(
        a,
        sigmoid,
        |input, output| Arc::new(SigmoidBackward { input, output }),
        "sigmoid",
    )
}
