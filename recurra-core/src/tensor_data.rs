// src/tensor_data.rs
use std::fmt::Debug;
use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::device::StorageDevice;
use crate::error::RecurraError;
use crate::tensor::Tensor;

/// Internal storage and metadata for a Tensor.
///
/// Holds a contiguous, row-major `f32` buffer together with its shape, the
/// device it lives on and the autograd bookkeeping. It is wrapped in
/// `Arc<RwLock<TensorData>>` by [`Tensor`] so handles can be cloned cheaply
/// and metadata (gradient, `requires_grad`) mutated through shared references.
#[derive(Debug)]
pub struct TensorData {
    /// Row-major element buffer.
    pub(crate) data: Vec<f32>,
    /// The shape (dimensions) of the tensor. An empty shape is a scalar.
    pub(crate) shape: Vec<usize>,
    /// The device where the buffer resides.
    pub(crate) device: StorageDevice,

    /// Flag indicating if operations involving this tensor are tracked.
    pub(crate) requires_grad: bool,
    /// Gradient accumulator. Only leaves keep one; `backward()` adds into it
    /// and nothing but an explicit clear resets it.
    pub(crate) grad: Option<Tensor>,
    /// The operation that produced this tensor. Leaves have `None`.
    pub(crate) grad_fn: Option<Arc<dyn BackwardOp>>,
}

impl TensorData {
    /// Creates a new CPU `TensorData` from row-major data and a shape.
    ///
    /// # Errors
    /// Returns `RecurraError::TensorCreationError` if the length of `data` does
    /// not match the number of elements described by `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, RecurraError> {
        let numel: usize = shape.iter().product();
        let data_len = data.len();
        if data_len != numel {
            return Err(RecurraError::TensorCreationError { data_len, shape });
        }
        Ok(TensorData {
            data,
            shape,
            device: StorageDevice::CPU,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    pub fn numel(&self) -> usize {
        self.shape.iter().product()
    }

    /// Calculates the strides required for a contiguous tensor of the given shape.
    pub fn calculate_contiguous_strides(shape: &[usize]) -> Vec<usize> {
        let mut strides = vec![0; shape.len()];
        if shape.is_empty() {
            return strides;
        }
        strides[shape.len() - 1] = 1;
        for i in (0..shape.len() - 1).rev() {
            strides[i] = strides[i + 1] * shape[i + 1];
        }
        strides
    }
}
