pub mod linear;
pub mod matmul;
pub mod transpose;

pub(crate) use linear::linear_op;
pub(crate) use matmul::matmul_op;
pub(crate) use transpose::transpose_op;

use crate::error::RecurraError;
use crate::tensor::Tensor;

/// Returns `(rows, cols)` of a rank-2 tensor.
pub(crate) fn matrix_dims(t: &Tensor, op_name: &str) -> Result<(usize, usize), RecurraError> {
    let shape = t.shape();
    if shape.len() != 2 {
        return Err(RecurraError::ShapeMismatch {
            expected: vec![0, 0],
            actual: shape,
            operation: format!("{} (rank-2 input required)", op_name),
        });
    }
    Ok((shape[0], shape[1]))
}

/// `a (m×k) · b (k×n)`.
pub(crate) fn matmul_kernel(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        let row = &mut out[i * n..(i + 1) * n];
        for p in 0..k {
            let a_ip = a[i * k + p];
            if a_ip == 0.0 {
                continue;
            }
            let b_row = &b[p * n..(p + 1) * n];
            row.iter_mut().zip(b_row.iter()).for_each(|(o, &b)| *o += a_ip * b);
        }
    }
    out
}

/// `a (m×k) · bᵀ` where `b` is stored as `n×k`.
pub(crate) fn matmul_nt_kernel(a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0; m * n];
    for i in 0..m {
        let a_row = &a[i * k..(i + 1) * k];
        for j in 0..n {
            let b_row = &b[j * k..(j + 1) * k];
            out[i * n + j] = a_row.iter().zip(b_row.iter()).map(|(x, y)| x * y).sum();
        }
    }
    out
}

/// `aᵀ · b` where `a` is stored as `k×m` and `b` as `k×n`.
pub(crate) fn matmul_tn_kernel(a: &[f32], b: &[f32], k: usize, m: usize, n: usize) -> Vec<f32> {
    let mut out = vec![0.0; m * n];
    for p in 0..k {
        let b_row = &b[p * n..(p + 1) * n];
        for i in 0..m {
            let a_pi = a[p * m + i];
            if a_pi == 0.0 {
                continue;
            }
            let row = &mut out[i * n..(i + 1) * n];
            row.iter_mut().zip(b_row.iter()).for_each(|(o, &b)| *o += a_pi * b);
        }
    }
    out
}
