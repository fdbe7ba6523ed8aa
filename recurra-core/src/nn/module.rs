use crate::device::StorageDevice;
use crate::error::RecurraError;
use crate::nn::Parameter;
use crate::tensor::Tensor;

/// The base trait for all neural network modules (layers, containers, models).
///
/// A module owns its parameters exclusively; callers such as the optimizer
/// driver only borrow them through `parameters()` / `named_parameters()` for
/// the duration of a call.
pub trait Module: std::fmt::Debug + Send + Sync {
    /// Performs a forward pass of the module.
    fn forward(&self, input: &Tensor) -> Result<Tensor, RecurraError>;

    /// Returns all learnable parameters of the module, including those of sub-modules.
    fn parameters(&self) -> Vec<&Parameter>;

    /// Returns all learnable parameters with hierarchical names
    /// (e.g. `"recurrent.weight_ih_l0"`). Names are unique within the module.
    fn named_parameters(&self) -> Vec<(String, &Parameter)>;

    /// Returns the direct child modules along with their names.
    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        Vec::new()
    }

    /// Returns the direct child modules.
    fn children(&self) -> Vec<&dyn Module> {
        self.named_children().into_iter().map(|(_, m)| m).collect()
    }

    /// Switches between training and evaluation behavior (dropout).
    ///
    /// Modules without mode-dependent behavior ignore it; containers must
    /// forward it to their children.
    fn set_training(&mut self, _training: bool) {}

    /// `true` unless the module was switched to evaluation mode.
    fn is_training(&self) -> bool {
        true
    }

    /// Clears the accumulated gradient of every parameter.
    fn zero_grad(&self) {
        for param in self.parameters() {
            param.zero_grad();
        }
    }

    /// Total number of scalar parameters.
    fn num_parameters(&self) -> usize {
        self.parameters().iter().map(|p| p.numel()).sum()
    }

    /// Places every parameter on `device`.
    ///
    /// # Errors
    /// `UnsupportedOperation` for devices without kernels.
    fn to_device(&mut self, device: StorageDevice) -> Result<(), RecurraError> {
        for param in self.parameters() {
            param.to_device(device)?;
        }
        Ok(())
    }
}
