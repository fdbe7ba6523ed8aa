use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

use super::matrix_dims;

fn transpose_data(data: &[f32], rows: usize, cols: usize) -> Vec<f32> {
    let mut out = vec![0.0; data.len()];
    for r in 0..rows {
        for c in 0..cols {
            out[c * rows + r] = data[r * cols + c];
        }
    }
    out
}

#[derive(Debug)]
struct TransposeBackward {
    input: Tensor,
    rows: usize,
    cols: usize,
}

impl BackwardOp for TransposeBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        // grad_output is (cols, rows)
        let g = grad_output.get_f32_data();
        Ok(vec![Tensor::new(
            transpose_data(&g, self.cols, self.rows),
            vec![self.rows, self.cols],
        )?])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.input.clone()]
    }
}

/// Swaps the two axes of a rank-2 tensor.
pub(crate) fn transpose_op(a: &Tensor) -> Result<Tensor, RecurraError> {
    check_cpu(a, "transpose")?;
    let (rows, cols) = matrix_dims(a, "transpose")?;
    let output = Tensor::new(transpose_data(&a.get_f32_data(), rows, cols), vec![cols, rows])?;
    if a.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(TransposeBackward {
                input: a.clone(),
                rows,
                cols,
            }),
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use crate::utils::testing::{check_tensor_near, create_test_tensor_with_grad};

    #[test]
    fn test_transpose_forward_backward() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
        let t = a.transpose().unwrap();
        check_tensor_near(&t, &[3, 2], &[1.0, 4.0, 2.0, 5.0, 3.0, 6.0], 1e-6);

        let weights = crate::tensor::from_fn(&[3, 2], |i| i as f32).unwrap();
        t.mul(&weights).unwrap().sum().unwrap().backward(None).unwrap();
        // grad of a[r][c] is weights[c][r]
        check_tensor_near(&a.grad().unwrap(), &[2, 3], &[0.0, 2.0, 4.0, 1.0, 3.0, 5.0], 1e-6);
    }
}
