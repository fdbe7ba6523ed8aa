use std::fmt;
use std::ops::Deref;

use crate::device::StorageDevice;
use crate::error::RecurraError;
use crate::tensor::Tensor;

/// A wrapper around a Tensor indicating it is a learnable parameter of a Module.
///
/// Parameters always have `requires_grad` set, own their gradient accumulator
/// and carry an optional name used for optimizer binding and inspection.
#[derive(Clone)]
pub struct Parameter {
    tensor: Tensor,
    name: Option<String>,
}

impl Parameter {
    /// Wraps `tensor` as a named parameter and enables gradient tracking on it.
    ///
    /// # Errors
    /// `UnsupportedOperation` if `tensor` is not a leaf.
    pub fn new(tensor: Tensor, name: Option<String>) -> Result<Self, RecurraError> {
        tensor.set_requires_grad(true)?;
        Ok(Parameter { tensor, name })
    }

    pub fn new_unnamed(tensor: Tensor) -> Result<Self, RecurraError> {
        Parameter::new(tensor, None)
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn tensor(&self) -> &Tensor {
        &self.tensor
    }

    /// Clears the accumulated gradient.
    pub fn zero_grad(&self) {
        self.tensor.clear_grad();
    }

    /// Overwrites every element with `f(index, numel)`.
    ///
    /// This is the only supported way to edit parameter values outside an
    /// optimizer step; it never exposes the buffer to aliasing.
    pub fn init_with<F>(&self, f: F) -> Result<(), RecurraError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        self.tensor.fill_with_(f)
    }

    /// Places the parameter on `device`. Only the current device is accepted.
    pub fn to_device(&self, device: StorageDevice) -> Result<(), RecurraError> {
        self.tensor.to_device(device).map(|_| ())
    }
}

impl Deref for Parameter {
    type Target = Tensor;

    fn deref(&self) -> &Self::Target {
        &self.tensor
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parameter(name={:?}, {:?})",
            self.name.as_deref().unwrap_or("<unnamed>"),
            self.tensor
        )
    }
}

#[cfg(test)]
#[path = "parameter_test.rs"]
mod tests;
