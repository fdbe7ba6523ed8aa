use rand::Rng;

use crate::error::RecurraError;
use crate::ops;
use crate::tensor::Tensor;

/// Differentiable operations as methods, delegating to the `ops` module.
impl Tensor {
    /// Element-wise addition with broadcasting.
    pub fn add(&self, other: &Tensor) -> Result<Tensor, RecurraError> {
        ops::arithmetic::add_op(self, other)
    }

    /// Element-wise subtraction with broadcasting.
    pub fn sub(&self, other: &Tensor) -> Result<Tensor, RecurraError> {
        ops::arithmetic::sub_op(self, other)
    }

    /// Element-wise multiplication with broadcasting.
    pub fn mul(&self, other: &Tensor) -> Result<Tensor, RecurraError> {
        ops::arithmetic::mul_op(self, other)
    }

    pub fn add_scalar(&self, scalar: f32) -> Result<Tensor, RecurraError> {
        ops::arithmetic::add_scalar_op(self, scalar)
    }

    pub fn mul_scalar(&self, scalar: f32) -> Result<Tensor, RecurraError> {
        ops::arithmetic::mul_scalar_op(self, scalar)
    }

    /// Matrix product of two rank-2 tensors.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, RecurraError> {
        ops::linalg::matmul_op(self, other)
    }

    /// Transpose of a rank-2 tensor.
    pub fn transpose(&self) -> Result<Tensor, RecurraError> {
        ops::linalg::transpose_op(self)
    }

    /// `self · weightᵀ + bias` for `self` of shape `(n, in)` and `weight` of shape `(out, in)`.
    pub fn linear(&self, weight: &Tensor, bias: Option<&Tensor>) -> Result<Tensor, RecurraError> {
        ops::linalg::linear_op(self, weight, bias)
    }

    pub fn tanh(&self) -> Result<Tensor, RecurraError> {
        ops::activation::tanh_op(self)
    }

    pub fn sigmoid(&self) -> Result<Tensor, RecurraError> {
        ops::activation::sigmoid_op(self)
    }

    pub fn relu(&self) -> Result<Tensor, RecurraError> {
        ops::activation::relu_op(self)
    }

    /// Sum of all elements as a rank-0 tensor.
    pub fn sum(&self) -> Result<Tensor, RecurraError> {
        ops::reduction::sum_op(self)
    }

    pub fn sum_axis(&self, axis: usize, keep_dim: bool) -> Result<Tensor, RecurraError> {
        ops::reduction::sum_axis_op(self, axis, keep_dim)
    }

    pub fn mean(&self) -> Result<Tensor, RecurraError> {
        ops::reduction::mean_op(self)
    }

    /// L2 norm over all elements.
    pub fn norm(&self) -> Result<Tensor, RecurraError> {
        ops::reduction::norm_op(self)
    }

    pub fn reshape(&self, new_shape: Vec<usize>) -> Result<Tensor, RecurraError> {
        ops::view::reshape_op(self, new_shape)
    }

    /// Removes `dim` by picking position `index` along it.
    pub fn select(&self, dim: usize, index: usize) -> Result<Tensor, RecurraError> {
        ops::view::select_op(self, dim, index)
    }

    /// Keeps positions `start..start + length` along `dim`.
    pub fn narrow(&self, dim: usize, start: usize, length: usize) -> Result<Tensor, RecurraError> {
        ops::view::narrow_op(self, dim, start, length)
    }

    /// Inverted dropout; identity unless `training` is set.
    pub fn dropout<R: Rng + ?Sized>(
        &self,
        p: f32,
        training: bool,
        rng: &mut R,
    ) -> Result<Tensor, RecurraError> {
        ops::dropout::dropout_op(self, p, training, rng)
    }
}

/// Stacks equally shaped tensors along a new dimension `dim`.
pub fn stack(tensors: &[Tensor], dim: usize) -> Result<Tensor, RecurraError> {
    ops::view::stack_op(tensors, dim)
}
