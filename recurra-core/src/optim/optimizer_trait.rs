use std::fmt::Debug;

use crate::error::RecurraError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// An update rule: how one parameter moves given its gradient.
///
/// Rules keep their per-parameter state (moment estimates, momentum buffers)
/// keyed by the parameter name the [`OptimizerDriver`](super::OptimizerDriver)
/// passes in. They never own parameters.
pub trait Optimizer: Debug + Send {
    /// Called once by the driver before the first `update` of a step.
    fn begin_step(&mut self) {}

    /// Applies the rule in place to `param` using `grad`.
    ///
    /// # Errors
    /// `ShapeMismatch` if `grad` does not match the parameter, or if the state
    /// recorded under `name` was built for a different shape.
    fn update(&mut self, name: &str, param: &Parameter, grad: &Tensor) -> Result<(), RecurraError>;

    /// Returns the current learning rate.
    fn learning_rate(&self) -> f32;

    /// Changes the learning rate used from the next update on.
    ///
    /// # Errors
    /// `ConfigurationError` unless `lr` is positive and finite.
    fn set_learning_rate(&mut self, lr: f32) -> Result<(), RecurraError>;
}

pub(crate) fn check_learning_rate(lr: f32) -> Result<(), RecurraError> {
    if !(lr.is_finite() && lr > 0.0) {
        return Err(RecurraError::ConfigurationError(format!(
            "Learning rate must be positive, got {}",
            lr
        )));
    }
    Ok(())
}

/// Fails unless `grad` has the same shape as `param`.
pub(crate) fn check_grad_shape(name: &str, param: &Parameter, grad: &Tensor) -> Result<(), RecurraError> {
    let (expected, actual) = (param.shape(), grad.shape());
    if expected != actual {
        return Err(RecurraError::ShapeMismatch {
            expected,
            actual,
            operation: format!("optimizer update of '{}'", name),
        });
    }
    Ok(())
}

/// Fails unless the state buffer recorded for `name` still matches the parameter size.
pub(crate) fn check_state_len(name: &str, state_len: usize, param: &Parameter) -> Result<(), RecurraError> {
    if state_len != param.numel() {
        return Err(RecurraError::ShapeMismatch {
            expected: vec![state_len],
            actual: vec![param.numel()],
            operation: format!("optimizer state of '{}'", name),
        });
    }
    Ok(())
}
