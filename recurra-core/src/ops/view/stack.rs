use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

/// Backward operation for `stack_op`: splits the upstream gradient along the
/// stacked dimension, one slice per input.
#[derive(Debug)]
struct StackBackward {
    inputs: Vec<Tensor>,
    input_shape: Vec<usize>,
    dim: usize,
}

impl BackwardOp for StackBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let g = grad_output.get_f32_data();
        let n = self.inputs.len();
        let outer: usize = self.input_shape[..self.dim].iter().product();
        let inner: usize = self.input_shape[self.dim..].iter().product();
        (0..n)
            .map(|i| {
                let mut grad = Vec::with_capacity(outer * inner);
                for o in 0..outer {
                    let src = (o * n + i) * inner;
                    grad.extend_from_slice(&g[src..src + inner]);
                }
                Tensor::new(grad, self.input_shape.clone())
            })
            .collect()
    }

    fn inputs(&self) -> Vec<Tensor> {
        self.inputs.clone()
    }
}

/// Joins equally shaped tensors along a new dimension inserted at `dim`.
///
/// # Errors
/// * `EmptyTensorList` if `tensors` is empty.
/// * `ShapeMismatch` if the shapes differ.
/// * `InvalidAxis` if `dim` exceeds the input rank.
pub(crate) fn stack_op(tensors: &[Tensor], dim: usize) -> Result<Tensor, RecurraError> {
    let first = tensors.first().ok_or(RecurraError::EmptyTensorList)?;
    let input_shape = first.shape();
    if dim > input_shape.len() {
        return Err(RecurraError::InvalidAxis {
            axis: dim,
            rank: input_shape.len() + 1,
        });
    }
    for t in tensors {
        check_cpu(t, "stack")?;
        let shape = t.shape();
        if shape != input_shape {
            return Err(RecurraError::ShapeMismatch {
                expected: input_shape,
                actual: shape,
                operation: "stack".to_string(),
            });
        }
    }

    let n = tensors.len();
    let outer: usize = input_shape[..dim].iter().product();
    let inner: usize = input_shape[dim..].iter().product();
    let buffers: Vec<Vec<f32>> = tensors.iter().map(|t| t.get_f32_data()).collect();
    let mut out = Vec::with_capacity(n * outer * inner);
    for o in 0..outer {
        for buffer in &buffers {
            out.extend_from_slice(&buffer[o * inner..(o + 1) * inner]);
        }
    }
    let mut out_shape = input_shape.clone();
    out_shape.insert(dim, n);
    let output = Tensor::new(out, out_shape)?;
    if tensors.iter().any(|t| t.requires_grad()) {
        attach_grad_fn(
            &output,
            Arc::new(StackBackward {
                inputs: tensors.to_vec(),
                input_shape,
                dim,
            }),
        );
    }
    Ok(output)
}
