use crate::error::RecurraError;
use crate::tensor::Tensor;

/// Compares analytical gradients with central finite differences.
///
/// `func` maps the inputs to an output tensor of any shape; the output is
/// summed to a scalar so every output element receives an upstream gradient
/// of one. For each input element the numerical gradient is
/// `(f(x + eps) - f(x - eps)) / (2 * eps)`.
///
/// The inputs passed in are only read: the check runs on private leaf copies.
///
/// # Errors
/// Returns `RecurraError::BackwardError` describing the first element whose
/// analytical and numerical gradients differ by more than
/// `tolerance * (1 + |numerical|)`, or any error produced by `func`.
pub fn check_grad<F>(
    func: F,
    inputs: &[Tensor],
    epsilon: f32,
    tolerance: f32,
) -> Result<(), RecurraError>
where
    F: Fn(&[Tensor]) -> Result<Tensor, RecurraError>,
{
    if epsilon <= 0.0 {
        return Err(RecurraError::ConfigurationError(format!(
            "check_grad epsilon must be positive, got {}",
            epsilon
        )));
    }

    let leaves: Vec<Tensor> = inputs
        .iter()
        .map(|t| {
            let leaf = t.detach();
            leaf.set_requires_grad(true)?;
            Ok(leaf)
        })
        .collect::<Result<_, RecurraError>>()?;

    let loss = func(&leaves)?.sum()?;
    loss.backward(None)?;

    let base_values: Vec<Vec<f32>> = inputs.iter().map(|t| t.get_f32_data()).collect();
    let shapes: Vec<Vec<usize>> = inputs.iter().map(|t| t.shape()).collect();

    let evaluate = |perturbed_input: usize, element: usize, delta: f32| -> Result<f32, RecurraError> {
        let probes = base_values
            .iter()
            .zip(shapes.iter())
            .enumerate()
            .map(|(i, (values, shape))| {
                let mut values = values.clone();
                if i == perturbed_input {
                    values[element] += delta;
                }
                Tensor::new(values, shape.clone())
            })
            .collect::<Result<Vec<_>, _>>()?;
        func(&probes)?.sum()?.item()
    };

    for (input_index, leaf) in leaves.iter().enumerate() {
        let analytical = match leaf.grad() {
            Some(g) => g.get_f32_data(),
            None => vec![0.0; leaf.numel()],
        };
        for (element, analytic) in analytical.iter().enumerate() {
            let plus = evaluate(input_index, element, epsilon)?;
            let minus = evaluate(input_index, element, -epsilon)?;
            let numerical = (plus - minus) / (2.0 * epsilon);
            if (analytic - numerical).abs() > tolerance * (1.0 + numerical.abs()) {
                return Err(RecurraError::BackwardError(format!(
                    "gradient mismatch for input {} at element {}: analytical {}, numerical {}",
                    input_index, element, analytic, numerical
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::testing::create_test_tensor;

    #[test]
    fn test_check_grad_accepts_correct_gradient() {
        let a = create_test_tensor(vec![0.5, -1.0, 2.0], vec![3]);
        let b = create_test_tensor(vec![1.5, 0.25, -0.5], vec![3]);
        let result = check_grad(|t| t[0].mul(&t[1])?.tanh(), &[a, b], 1e-2, 1e-2);
        assert!(result.is_ok(), "{:?}", result);
    }

    #[test]
    fn test_check_grad_leaves_inputs_untouched() {
        let a = create_test_tensor(vec![0.5, -1.0], vec![2]);
        check_grad(|t| t[0].sigmoid(), &[a.clone()], 1e-2, 1e-2).unwrap();
        assert!(!a.requires_grad());
        assert!(a.grad().is_none());
    }

    #[test]
    fn test_check_grad_rejects_bad_epsilon() {
        let a = create_test_tensor(vec![1.0], vec![1]);
        let err = check_grad(|t| Ok(t[0].clone()), &[a], 0.0, 1e-2).unwrap_err();
        assert!(matches!(err, RecurraError::ConfigurationError(_)));
    }
}
