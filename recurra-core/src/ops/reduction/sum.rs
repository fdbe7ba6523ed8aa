use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

use super::split_at_axis;

#[derive(Debug)]
struct SumBackward {
    input: Tensor,
    input_shape: Vec<usize>,
}

impl BackwardOp for SumBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let g = grad_output.item()?;
        let numel = self.input_shape.iter().product();
        Ok(vec![Tensor::new(vec![g; numel], self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Sums every element into a rank-0 tensor.
pub(crate) fn sum_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    check_cpu(a, "sum")?;
    let (total, shape) = {
        let guard = a.read_data();
        (guard.data.iter().sum::<f32>(), guard.shape.clone())
    };
    let output = Tensor::scalar(total);
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(SumBackward {
                input: a.clone(),
                input_shape: shape,
            }),
        );
    }
    Ok(output)
}

/// Backward of `sum_axis`: the upstream gradient is repeated along the reduced axis.
#[derive(Debug)]
struct SumAxisBackward {
    input: Tensor,
    input_shape: Vec<usize>,
    axis: usize,
}

impl BackwardOp for SumAxisBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let g = grad_output.get_f32_data();
        let (outer, len, inner) = split_at_axis(&self.input_shape, self.axis);
        let mut grad = Vec::with_capacity(outer * len * inner);
        for o in 0..outer {
            let block = &g[o * inner..(o + 1) * inner];
            for _ in 0..len {
                grad.extend_from_slice(block);
            }
        }
        Ok(vec![Tensor::new(grad, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Sums along `axis`. With `keep_dim` the axis is kept with size 1.
///
/// # Errors
/// `InvalidAxis` if `axis` is not smaller than the tensor's rank.
pub(crate) fn sum_axis_op(a: &Tensor, axis: usize, keep_dim: bool) -> Result<Tensor, RecurraError> {
    check_cpu(a, "sum_axis")?;
    let (data, shape) = {
        let guard = a.read_data();
        (guard.data.clone(), guard.shape.clone())
    };
    if axis >= shape.len() {
        return Err(RecurraError::InvalidAxis {
            axis,
            rank: shape.len(),
        });
    }
    let (outer, len, inner) = split_at_axis(&shape, axis);
    let mut out = vec![0.0; outer * inner];
    for o in 0..outer {
        for l in 0..len {
            let src = &data[(o * len + l) * inner..(o * len + l + 1) * inner];
            out[o * inner..(o + 1) * inner]
                .iter_mut()
                .zip(src.iter())
                .for_each(|(acc, v)| *acc += v);
        }
    }
    let mut out_shape = shape.clone();
    if keep_dim {
        out_shape[axis] = 1;
    } else {
        out_shape.remove(axis);
    }
    let output = Tensor::new(out, out_shape)?;
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(SumAxisBackward {
                input: a.clone(),
                input_shape: shape,
                axis,
            }),
        );
    }
    Ok(output)
}
