use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

#[derive(Debug)]
struct MeanBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for MeanBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let numel: usize = self.input_shape.iter().product();
        let g = grad_output.item()? / numel as f32;
        Ok(vec![Tensor::new(vec![g; numel], self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Mean of every element, as a rank-0 tensor.
///
/// # Errors
/// `UnsupportedOperation` for an empty tensor, whose mean is undefined.
pub(crate) fn mean_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    check_cpu(a, "mean")?;
    let (total, shape) = {
        let guard = a.read_data();
        (guard.data.iter().sum::<f32>(), guard.shape.clone())
    };
    let numel: usize = shape.iter().product();
    if numel == 0 {
        return Err(RecurraError::UnsupportedOperation(
            "mean of an empty tensor".to_string(),
        ));
    }
    let output = Tensor::scalar(total / numel as f32);
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(MeanBackward {
                input: a.clone(),
                input_shape: shape,
            }),
        );
    }
    Ok(output)
}
