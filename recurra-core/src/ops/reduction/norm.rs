use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

/// Backward of the L2 norm: `dL/dx = dL/dy * x / ||x||`, zero at the origin.
#[derive(Debug)]
struct NormBackward {
    input: Tensor,
    norm: f32,
}

impl BackwardOp for NormBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let g = grad_output.item()?;
        let guard = self.input.read_data();
        let data = if self.norm == 0.0 {
            vec![0.0; guard.data.len()]
        } else {
            guard.data.iter().map(|x| g * x / self.norm).collect()
        };
        Ok(vec![Tensor::new(data, guard.shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Euclidean (L2) norm over all elements.
pub(crate) fn norm_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    check_cpu(a, "norm")?;
    let norm = a.read_data().data.iter().map(|x| x * x).sum::<f32>().sqrt();
    let output = Tensor::scalar(norm);
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(NormBackward {
                input: a.clone(),
                norm,
            }),
        );
    }
    Ok(output)
}
