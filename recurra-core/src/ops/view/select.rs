use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::reduction::split_at_axis;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

use super::check_axis;

#[derive(Debug)]
struct SelectBackward {
    input: Tensor,
    input_shape: Vec<usize>,
    dim: usize,
    index: usize,
}

impl BackwardOp for SelectBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let g = grad_output.get_f32_data();
        let (outer, len, inner) = split_at_axis(&self.input_shape, self.dim);
        let mut grad = vec![0.0; outer * len * inner];
        for o in 0..outer {
            let dst = (o * len + self.index) * inner;
            grad[dst..dst + inner].copy_from_slice(&g[o * inner..(o + 1) * inner]);
        }
        Ok(vec![Tensor::new(grad, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Picks position `index` along `dim`, removing that dimension.
///
/// `x.select(0, t)` on a `(T, B, F)` sequence yields the `(B, F)` step `t`.
pub(crate) fn select_op(a: &Tensor, dim: usize, index: usize) -> Result<Tensor, RecurraError> {
    check_cpu(a, "select")?;
    let (data, shape) = {
        let guard = a.read_data();
        (guard.data.clone(), guard.shape.clone())
    };
    check_axis(dim, shape.len())?;
    if index >= shape[dim] {
        return Err(RecurraError::IndexOutOfBounds { index, dim, shape });
    }
    let (outer, len, inner) = split_at_axis(&shape, dim);
    let mut out = Vec::with_capacity(outer * inner);
    for o in 0..outer {
        let src = (o * len + index) * inner;
        out.extend_from_slice(&data[src..src + inner]);
    }
    let mut out_shape = shape.clone();
    out_shape.remove(dim);
    let output = Tensor::new(out, out_shape)?;
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(SelectBackward {
                input: a.clone(),
                input_shape: shape,
                dim,
                index,
            }),
        );
    }
    Ok(output)
}
