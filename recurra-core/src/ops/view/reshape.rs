use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

#[derive(Debug)]
struct ReshapeBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for ReshapeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![Tensor::new(
            grad_output.get_f32_data(),
            self.input_shape.clone(),
        )?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Returns a tensor with the same elements laid out under `new_shape`.
///
/// # Errors
/// `ShapeMismatch` if `new_shape` describes a different number of elements.
pub(crate) fn reshape_op(a: &Tensor, new_shape: Vec<usize>) -> Result<Tensor, RecurraError> {
    check_cpu(a, "reshape")?;
    let (data, shape) = {
        let guard = a.read_data();
        (guard.data.clone(), guard.shape.clone())
    };
    let new_numel: usize = new_shape.iter().product();
    if new_numel != data.len() {
        return Err(RecurraError::ShapeMismatch {
            expected: shape,
            actual: new_shape,
            operation: "reshape (element count)".to_string(),
        });
    }
    let output = Tensor::new(data, new_shape)?;
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(ReshapeBackward {
                input: a.clone(),
                input_shape: shape,
            }),
        );
    }
    Ok(output)
}
