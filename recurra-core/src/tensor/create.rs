use rand::Rng;
use rand_distr::{Bernoulli, Distribution, StandardNormal, Uniform};

use crate::device::StorageDevice;
use crate::error::RecurraError;
use crate::tensor::Tensor;

/// Creates a CPU tensor filled with zeros.
pub fn zeros(shape: &[usize]) -> Result<Tensor, RecurraError> {
    full(shape, 0.0)
}

/// Creates a CPU tensor filled with ones.
pub fn ones(shape: &[usize]) -> Result<Tensor, RecurraError> {
    full(shape, 1.0)
}

/// Creates a CPU tensor filled with `value`.
pub fn full(shape: &[usize], value: f32) -> Result<Tensor, RecurraError> {
    full_on(shape, value, StorageDevice::CPU)
}

/// Creates a tensor filled with `value` on `device`.
pub fn full_on(shape: &[usize], value: f32, device: StorageDevice) -> Result<Tensor, RecurraError> {
    let numel: usize = shape.iter().product();
    Tensor::new_on(vec![value; numel], shape.to_vec(), device)
}

/// Creates a tensor of zeros with the shape and device of `tensor`.
pub fn zeros_like(tensor: &Tensor) -> Result<Tensor, RecurraError> {
    full_on(&tensor.shape(), 0.0, tensor.device())
}

/// Creates a tensor of ones with the shape and device of `tensor`.
pub fn ones_like(tensor: &Tensor) -> Result<Tensor, RecurraError> {
    full_on(&tensor.shape(), 1.0, tensor.device())
}

/// Creates a CPU tensor whose element at row-major position `i` is `f(i)`.
pub fn from_fn<F>(shape: &[usize], f: F) -> Result<Tensor, RecurraError>
where
    F: FnMut(usize) -> f32,
{
    let numel: usize = shape.iter().product();
    Tensor::new((0..numel).map(f).collect(), shape.to_vec())
}

/// Samples every element from `U(low, high)`.
pub fn rand_uniform<R: Rng + ?Sized>(
    shape: &[usize],
    low: f32,
    high: f32,
    rng: &mut R,
) -> Result<Tensor, RecurraError> {
    if low.is_nan() || high.is_nan() || low >= high {
        return Err(RecurraError::ConfigurationError(format!(
            "rand_uniform requires low < high, got [{}, {})",
            low, high
        )));
    }
    let dist = Uniform::new(low, high);
    let numel: usize = shape.iter().product();
    Tensor::new((0..numel).map(|_| dist.sample(rng)).collect(), shape.to_vec())
}

/// Samples every element from the standard normal distribution using the thread RNG.
pub fn randn(shape: &[usize]) -> Result<Tensor, RecurraError> {
    randn_with(shape, &mut rand::thread_rng())
}

/// Samples every element from the standard normal distribution.
pub fn randn_with<R: Rng + ?Sized>(shape: &[usize], rng: &mut R) -> Result<Tensor, RecurraError> {
    let numel: usize = shape.iter().product();
    let data = (0..numel)
        .map(|_| StandardNormal.sample(rng))
        .collect::<Vec<f32>>();
    Tensor::new(data, shape.to_vec())
}

/// Samples a tensor of `0.0`/`1.0` values, each one with probability `p`.
pub fn bernoulli<R: Rng + ?Sized>(
    shape: &[usize],
    p: f32,
    rng: &mut R,
    device: StorageDevice,
) -> Result<Tensor, RecurraError> {
    let dist = Bernoulli::new(p as f64).map_err(|e| {
        RecurraError::ConfigurationError(format!("invalid Bernoulli probability {}: {}", p, e))
    })?;
    let numel: usize = shape.iter().product();
    let data = (0..numel)
        .map(|_| if dist.sample(rng) { 1.0 } else { 0.0 })
        .collect();
    Tensor::new_on(data, shape.to_vec(), device)
}

#[cfg(test)]
#[path = "create_test.rs"]
mod tests;
