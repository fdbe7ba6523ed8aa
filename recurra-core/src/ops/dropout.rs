use rand::Rng;

use crate::error::RecurraError;
use crate::tensor::{bernoulli, Tensor};

/// Inverted dropout.
///
/// In training mode every element is zeroed with probability `p` and the
/// survivors are scaled by `1 / (1 - p)`, so the expected value is unchanged.
/// The result is built from `mul` and `mul_scalar`, which makes it
/// differentiable with respect to `input`. Outside training mode, or with
/// `p == 0`, the input handle itself is returned.
///
/// # Errors
/// `ConfigurationError` if `p` is outside `[0, 1]`.
pub(crate) fn dropout_op<R: Rng + ?Sized>(
    input: &Tensor,
    p: f32,
    training: bool,
    rng: &mut R,
) -> Result<Tensor, RecurraError> {
    if !(0.0..=1.0).contains(&p) {
        return Err(RecurraError::ConfigurationError(format!(
            "dropout probability has to be between 0 and 1, but got {}",
            p
        )));
    }
    if !training || p == 0.0 {
        return Ok(input.clone());
    }
    if p == 1.0 {
        let mask = Tensor::new(vec![0.0; input.numel()], input.shape())?;
        return input.mul(&mask);
    }
    let mask = bernoulli(&input.shape(), 1.0 - p, rng, input.device())?;
    input.mul(&mask)?.mul_scalar(1.0 / (1.0 - p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::create_test_tensor_with_grad;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dropout_eval_is_identity() {
        let x = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0], vec![3]);
        let y = dropout_op(&x, 0.5, false, &mut StdRng::seed_from_u64(0)).unwrap();
        assert!(y.same_storage(&x));
    }

    #[test]
    fn test_dropout_zeroes_or_scales() {
        let x = create_test_tensor_with_grad(vec![1.0; 1000], vec![1000]);
        let y = dropout_op(&x, 0.2, true, &mut StdRng::seed_from_u64(42)).unwrap();
        let values = y.get_f32_data();
        assert!(values.iter().all(|&v| v == 0.0 || (v - 1.25).abs() < 1e-6));
        let dropped = values.iter().filter(|&&v| v == 0.0).count();
        assert!(dropped > 100 && dropped < 300, "dropped {}", dropped);

        y.sum().unwrap().backward(None).unwrap();
        let grad = x.grad().unwrap().get_f32_data();
        for (g, v) in grad.iter().zip(values.iter()) {
            assert_eq!(*g == 0.0, *v == 0.0);
        }
    }

    #[test]
    fn test_dropout_all() {
        let x = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
        let y = dropout_op(&x, 1.0, true, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(y.get_f32_data(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_dropout_invalid_probability() {
        let x = create_test_tensor_with_grad(vec![1.0], vec![1]);
        let err = dropout_op(&x, 1.5, true, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, RecurraError::ConfigurationError(_)));
    }
}
