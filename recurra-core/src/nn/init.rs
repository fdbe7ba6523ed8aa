//! In-place parameter initialization.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::error::RecurraError;
use crate::tensor::Tensor;

/// Fills the tensor with zeros.
pub fn zeros_(tensor: &Tensor) -> Result<(), RecurraError> {
    tensor.fill_(0.0)
}

/// Fills the tensor with ones.
pub fn ones_(tensor: &Tensor) -> Result<(), RecurraError> {
    tensor.fill_(1.0)
}

/// Fills the tensor with samples from `U(low, high)`.
pub fn uniform_<R: Rng + ?Sized>(
    tensor: &Tensor,
    low: f32,
    high: f32,
    rng: &mut R,
) -> Result<(), RecurraError> {
    if low.is_nan() || high.is_nan() || low >= high {
        return Err(RecurraError::ConfigurationError(format!(
            "uniform_ requires low < high, got [{}, {})",
            low, high
        )));
    }
    let dist = Uniform::new(low, high);
    tensor.fill_with_(|_, _| dist.sample(rng))
}

/// Bound `1/√fan` used by `Linear` and the recurrent cells: `U(-1/√fan, 1/√fan)`.
pub fn default_bound(fan: usize) -> f32 {
    1.0 / (fan.max(1) as f32).sqrt()
}

#[cfg(test)]
#[path = "init_test.rs"]
mod tests;
