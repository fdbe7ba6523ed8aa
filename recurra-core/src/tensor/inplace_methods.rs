use crate::error::RecurraError;
use crate::tensor::Tensor;

/// In-place edits of leaf tensors.
///
/// These bypass autograd entirely and are what parameter initialization and
/// optimizer updates are built on. Editing a tensor that was produced by an
/// operation would silently corrupt the recorded graph, so non-leaf tensors
/// are rejected.
impl Tensor {
    fn check_inplace(&self, operation: &str) -> Result<(), RecurraError> {
        if !self.is_leaf() {
            return Err(RecurraError::InplaceModificationError {
                operation: operation.to_string(),
                reason: "tensor is part of a computation graph".to_string(),
            });
        }
        Ok(())
    }

    /// Gives mutable access to the element buffer of a leaf tensor.
    pub fn apply_<F>(&self, f: F) -> Result<(), RecurraError>
    where
        F: FnOnce(&mut [f32]),
    {
        self.check_inplace("apply_")?;
        let mut guard = self.write_data();
        f(&mut guard.data);
        Ok(())
    }

    /// Overwrites every element with `f(index, numel)`.
    pub fn fill_with_<F>(&self, mut f: F) -> Result<(), RecurraError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        self.apply_(|data| {
            let numel = data.len();
            data.iter_mut().enumerate().for_each(|(i, v)| *v = f(i, numel));
        })
    }

    /// Sets every element to `value`.
    pub fn fill_(&self, value: f32) -> Result<(), RecurraError> {
        self.fill_with_(|_, _| value)
    }

    /// Copies `values` into the tensor.
    ///
    /// # Errors
    /// `TensorCreationError` if the length differs from the element count.
    pub fn copy_from_slice_(&self, values: &[f32]) -> Result<(), RecurraError> {
        let numel = self.numel();
        if values.len() != numel {
            return Err(RecurraError::TensorCreationError {
                data_len: values.len(),
                shape: self.shape(),
            });
        }
        self.apply_(|data| data.copy_from_slice(values))
    }
}
