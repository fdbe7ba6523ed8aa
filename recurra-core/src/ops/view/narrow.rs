use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::reduction::split_at_axis;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

use super::check_axis;

#[derive(Debug)]
struct NarrowBackward {
    input: Tensor,
    input_shape: Vec<usize>,
    dim: usize,
    start: usize,
    length: usize,
}

impl BackwardOp for NarrowBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let g = grad_output.get_f32_data();
        let (outer, len, inner) = split_at_axis(&self.input_shape, self.dim);
        let block = self.length * inner;
        let mut grad = vec![0.0; outer * len * inner];
        for o in 0..outer {
            let dst = (o * len + self.start) * inner;
            grad[dst..dst + block].copy_from_slice(&g[o * block..(o + 1) * block]);
        }
        Ok(vec![Tensor::new(grad, self.input_shape.clone())?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Keeps `length` positions of `dim` starting at `start`.
///
/// Used to split fused gate pre-activations `(B, G·H)` into per-gate `(B, H)` blocks.
pub(crate) fn narrow_op(
    a: &Tensor,
    dim: usize,
    start: usize,
    length: usize,
) -> Result<Tensor, RecurraError> {
    check_cpu(a, "narrow")?;
    let (data, shape) = {
        let guard = a.read_data();
        (guard.data.clone(), guard.shape.clone())
    };
    check_axis(dim, shape.len())?;
    if start + length > shape[dim] {
        return Err(RecurraError::IndexOutOfBounds {
            index: start + length,
            dim,
            shape,
        });
    }
    let (outer, len, inner) = split_at_axis(&shape, dim);
    let block = length * inner;
    let mut out = Vec::with_capacity(outer * block);
    for o in 0..outer {
        let src = (o * len + start) * inner;
        out.extend_from_slice(&data[src..src + block]);
    }
    let mut out_shape = shape.clone();
    out_shape[dim] = length;
    let output = Tensor::new(out, out_shape)?;
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(NarrowBackward {
                input: a.clone(),
                input_shape: shape,
                dim,
                start,
                length,
            }),
        );
    }
    Ok(output)
}
