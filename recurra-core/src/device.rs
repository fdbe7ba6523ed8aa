use crate::error::RecurraError;
use std::fmt::Debug;

/// Represents the physical location where tensor data is stored.
///
/// This is the single execution context threaded through tensor creation,
/// batch generation and module placement. Computation sequencing never
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StorageDevice {
    /// Data is stored in main system memory (RAM).
    /// This is the default device.
    #[default]
    CPU,
    /// Data is stored on an accelerator.
    ///
    /// Declared so callers can express placement; no kernels target it yet,
    /// so every request for it fails with `UnsupportedOperation`.
    GPU,
}

impl StorageDevice {
    /// Returns `true` if tensors can actually be allocated on this device.
    pub fn is_available(&self) -> bool {
        matches!(self, StorageDevice::CPU)
    }

    /// Fails with `UnsupportedOperation` unless the device is backed by kernels.
    pub fn ensure_available(&self, operation: &str) -> Result<(), RecurraError> {
        if self.is_available() {
            Ok(())
        } else {
            Err(RecurraError::UnsupportedOperation(format!(
                "{} requested on {:?}, but only CPU storage is implemented",
                operation, self
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_device_is_cpu() {
        assert_eq!(StorageDevice::default(), StorageDevice::CPU);
        assert!(StorageDevice::CPU.is_available());
    }

    #[test]
    fn test_gpu_is_rejected() {
        let err = StorageDevice::GPU.ensure_available("zeros").unwrap_err();
        assert!(matches!(err, RecurraError::UnsupportedOperation(_)));
    }
}
