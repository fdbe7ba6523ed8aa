use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::autograd::graph::NodeId;
use crate::device::StorageDevice;
use crate::error::RecurraError;
use crate::tensor_data::TensorData;

pub mod autograd_methods;
pub(crate) mod broadcast_utils;
pub mod create;
pub mod inplace_methods;
pub mod op_methods;

pub use create::*;
pub use op_methods::stack;

/// Represents a multi-dimensional array of `f32` values.
///
/// A `Tensor` is a cheap handle: cloning it clones an `Arc`, so two clones
/// observe the same storage, gradient and autograd history. Data is always
/// stored contiguously in row-major order.
#[derive(Clone)]
pub struct Tensor {
    pub(crate) data: Arc<RwLock<TensorData>>,
}

impl Tensor {
    /// Creates a new CPU tensor from a flat `Vec<f32>` and a shape.
    ///
    /// # Errors
    /// Returns `RecurraError::TensorCreationError` if `data.len()` does not
    /// equal the product of `shape`.
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Result<Self, RecurraError> {
        let tensor_data = TensorData::new(data, shape)?;
        Ok(Tensor::from_tensor_data(tensor_data))
    }

    /// Creates a tensor on the given device.
    pub fn new_on(
        data: Vec<f32>,
        shape: Vec<usize>,
        device: StorageDevice,
    ) -> Result<Self, RecurraError> {
        device.ensure_available("Tensor::new_on")?;
        let mut tensor_data = TensorData::new(data, shape)?;
        tensor_data.device = device;
        Ok(Tensor::from_tensor_data(tensor_data))
    }

    /// Creates a rank-0 tensor holding `value`.
    pub fn scalar(value: f32) -> Self {
        Tensor::from_tensor_data(TensorData {
            data: vec![value],
            shape: Vec::new(),
            device: StorageDevice::CPU,
            requires_grad: false,
            grad: None,
            grad_fn: None,
        })
    }

    pub(crate) fn from_tensor_data(tensor_data: TensorData) -> Self {
        Tensor {
            data: Arc::new(RwLock::new(tensor_data)),
        }
    }

    /// Acquires a read lock on the underlying `TensorData`.
    ///
    /// A poisoned lock is recovered: tensor metadata stays valid even if a
    /// panicking thread held the guard.
    pub fn read_data(&self) -> RwLockReadGuard<'_, TensorData> {
        self.data.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquires a write lock on the underlying `TensorData`.
    pub fn write_data(&self) -> RwLockWriteGuard<'_, TensorData> {
        self.data.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn shape(&self) -> Vec<usize> {
        self.read_data().shape.clone()
    }

    pub fn rank(&self) -> usize {
        self.read_data().shape.len()
    }

    pub fn numel(&self) -> usize {
        self.read_data().numel()
    }

    pub fn device(&self) -> StorageDevice {
        self.read_data().device
    }

    /// Returns a copy of the tensor's elements in row-major order.
    pub fn get_f32_data(&self) -> Vec<f32> {
        self.read_data().data.clone()
    }

    /// Returns the single value of a one-element tensor.
    ///
    /// # Errors
    /// Returns `RecurraError::ShapeMismatch` if the tensor holds more or fewer
    /// than one element.
    pub fn item(&self) -> Result<f32, RecurraError> {
        let guard = self.read_data();
        if guard.data.len() != 1 {
            return Err(RecurraError::ShapeMismatch {
                expected: vec![],
                actual: guard.shape.clone(),
                operation: "item".to_string(),
            });
        }
        Ok(guard.data[0])
    }

    /// Identity of the underlying storage, used as a key by the autograd graph.
    pub fn node_id(&self) -> NodeId {
        Arc::as_ptr(&self.data)
    }

    /// Returns `true` if both handles point at the same storage.
    pub fn same_storage(&self, other: &Tensor) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Places the tensor on `device`.
    ///
    /// Moving to the device the tensor already lives on returns the same
    /// handle. Any other device is rejected until it has kernels.
    pub fn to_device(&self, device: StorageDevice) -> Result<Tensor, RecurraError> {
        device.ensure_available("Tensor::to_device")?;
        if self.device() == device {
            return Ok(self.clone());
        }
        Err(RecurraError::DeviceMismatch {
            expected: self.device(),
            actual: device,
            operation: "to_device".to_string(),
        })
    }
}

impl fmt::Debug for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = self.read_data();
        const PREVIEW: usize = 8;
        let preview: Vec<f32> = guard.data.iter().take(PREVIEW).copied().collect();
        let ellipsis = if guard.data.len() > PREVIEW { ", ..." } else { "" };
        write!(
            f,
            "Tensor(shape={:?}, device={:?}, data={:?}{}, requires_grad={}, grad_fn={})",
            guard.shape,
            guard.device,
            preview,
            ellipsis,
            guard.requires_grad,
            if guard.grad_fn.is_some() { "Some" } else { "None" }
        )
    }
}

#[cfg(test)]
#[path = "tensor_test.rs"]
mod tests;
