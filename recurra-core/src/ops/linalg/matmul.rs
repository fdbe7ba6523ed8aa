use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

use super::{matmul_kernel, matmul_nt_kernel, matmul_tn_kernel, matrix_dims};

/// Backward pass for `C = A · B`:
/// `dA = dC · Bᵀ`, `dB = Aᵀ · dC`.
#[derive(Debug)]
struct MatmulBackward {
    a: Tensor,
    b: Tensor,
    m: usize,
    k: usize,
    n: usize,
}

impl BackwardOp for MatmulBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let (m, k, n) = (self.m, self.k, self.n);
        let g = grad_output.get_f32_data();
        let a = self.a.get_f32_data();
        let b = self.b.get_f32_data();
        let grad_a = Tensor::new(matmul_nt_kernel(&g, &b, m, n, k), vec![m, k])?;
        let grad_b = Tensor::new(matmul_tn_kernel(&a, &g, m, k, n), vec![k, n])?;
        Ok(vec![grad_a, grad_b])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Matrix product of two rank-2 tensors.
///
/// # Errors
/// `ShapeMismatch` if either input is not rank 2 or the inner dimensions differ.
pub(crate) fn matmul_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RecurraError> {
    check_cpu(a, "matmul")?;
    check_cpu(b, "matmul")?;
    let (m, k) = matrix_dims(a, "matmul")?;
    let (k2, n) = matrix_dims(b, "matmul")?;
    if k != k2 {
        return Err(RecurraError::ShapeMismatch {
            expected: vec![k, n],
            actual: vec![k2, n],
            operation: "matmul (inner dimensions)".to_string(),
        });
    }
    let data = matmul_kernel(&a.get_f32_data(), &b.get_f32_data(), m, k, n);
    let output = Tensor::new(data, vec![m, n])?;
    if a.requires_grad() || b.requires_grad() {
        attach_grad_fn(
            &output,
            Arc::new(MatmulBackward {
                a: a.clone(),
                b: b.clone(),
                m,
                k,
                n,
            }),
        );
    }
    Ok(output)
}

#[cfg(test)]
#[path = "matmul_test.rs"]
mod tests;
