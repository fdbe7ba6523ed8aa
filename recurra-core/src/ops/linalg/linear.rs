use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::Tensor;

use super::{matmul_kernel, matmul_nt_kernel, matmul_tn_kernel, matrix_dims};

/// Backward pass for `y = x · Wᵀ + b` with `x: (n, in)`, `W: (out, in)`, `b: (out)`.
///
/// `dx = dy · W`, `dW = dyᵀ · x`, `db = Σ_rows dy`.
#[derive(Debug)]
struct LinearBackward {
    input: Tensor,
    weight: Tensor,
    bias: Option<Tensor>,
    rows: usize,
    in_features: usize,
    out_features: usize,
}

impl BackwardOp for LinearBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        let (n, i, o) = (self.rows, self.in_features, self.out_features);
        let g = grad_output.get_f32_data();
        let x = self.input.get_f32_data();
        let w = self.weight.get_f32_data();

        let mut grads = vec![
            Tensor::new(matmul_kernel(&g, &w, n, o, i), vec![n, i])?,
            Tensor::new(matmul_tn_kernel(&g, &x, n, o, i), vec![o, i])?,
        ];
        if self.bias.is_some() {
            let mut db = vec![0.0; o];
            for row in g.chunks(o) {
                db.iter_mut().zip(row.iter()).for_each(|(d, v)| *d += v);
            }
            grads.push(Tensor::new(db, vec![o])?);
        }
        Ok(grads)
    }

    fn inputs(&self) -> Vec<Tensor> {
        let mut inputs = vec![self.input.clone(), self.weight.clone()];
        if let Some(bias) = &self.bias {
            inputs.push(bias.clone());
        }
        inputs
    }
}

/// Affine map `x · Wᵀ + b` over a batch of row vectors.
///
/// # Errors
/// `ShapeMismatch` if `input` is not `(n, in)`, `weight` not `(out, in)` or
/// `bias` not `(out)`.
pub(crate) fn linear_op(
    input: &Tensor,
    weight: &Tensor,
    bias: Option<&Tensor>,
) -> Result<Tensor, RecurraError> {
    check_cpu(input, "linear")?;
    check_cpu(weight, "linear")?;
    let (rows, in_features) = matrix_dims(input, "linear")?;
    let (out_features, weight_in) = matrix_dims(weight, "linear")?;
    if weight_in != in_features {
        return Err(RecurraError::ShapeMismatch {
            expected: vec![rows, weight_in],
            actual: vec![rows, in_features],
            operation: "linear (input features)".to_string(),
        });
    }
    if let Some(b) = bias {
        check_cpu(b, "linear")?;
        if b.shape() != [out_features] {
            return Err(RecurraError::ShapeMismatch {
                expected: vec![out_features],
                actual: b.shape(),
                operation: "linear (bias)".to_string(),
            });
        }
    }

    let mut data = matmul_nt_kernel(
        &input.get_f32_data(),
        &weight.get_f32_data(),
        rows,
        in_features,
        out_features,
    );
    if let Some(b) = bias {
        let b = b.get_f32_data();
        for row in data.chunks_mut(out_features) {
            row.iter_mut().zip(b.iter()).for_each(|(y, b)| *y += b);
        }
    }
    let output = Tensor::new(data, vec![rows, out_features])?;

    let requires_grad = input.requires_grad()
        || weight.requires_grad()
        || bias.map_or(false, |b| b.requires_grad());
    if requires_grad {
        attach_grad_fn(
            &output,
            Arc::new(LinearBackward {
                input: input.clone(),
                weight: weight.clone(),
                bias: bias.cloned(),
                rows,
                in_features,
                out_features,
            }),
        );
    }
    Ok(output)
}

#[cfg(test)]
mod tests {
    use crate::autograd::grad_check::check_grad;
    use crate::error::RecurraError;
    use crate::utils::testing::{check_tensor_near, create_test_tensor};

    #[test]
    fn test_linear_matches_matmul_plus_bias() {
        let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let w = create_test_tensor(vec![1.0, 0.0, 0.5, -1.0, 2.0, 1.0], vec![3, 2]);
        let b = create_test_tensor(vec![0.1, 0.2, 0.3], vec![3]);
        let y = x.linear(&w, Some(&b)).unwrap();
        let expected = x.matmul(&w.transpose().unwrap()).unwrap().add(&b).unwrap();
        check_tensor_near(&y, &[2, 3], &expected.get_f32_data(), 1e-6);
    }

    #[test]
    fn test_linear_gradients() {
        let x = create_test_tensor(vec![0.5, -0.3, 0.8, 0.1, -0.7, 0.2], vec![3, 2]);
        let w = create_test_tensor(vec![0.4, -0.6, 0.9, 0.05], vec![2, 2]);
        let b = create_test_tensor(vec![0.1, -0.2], vec![2]);
        check_grad(|t| t[0].linear(&t[1], Some(&t[2]))?.tanh(), &[x, w, b], 1e-2, 1e-2).unwrap();
    }

    #[test]
    fn test_linear_feature_mismatch() {
        let x = create_test_tensor(vec![1.0; 6], vec![2, 3]);
        let w = create_test_tensor(vec![1.0; 4], vec![2, 2]);
        assert!(matches!(x.linear(&w, None), Err(RecurraError::ShapeMismatch { .. })));
    }
}
