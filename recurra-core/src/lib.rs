//! Tensor storage, reverse-mode autograd and the recurrent layers built on them.
//!
//! The crate is organised leaf-first: [`tensor`] and [`ops`] provide the
//! differentiable primitives, [`nn`] the modules (`Linear`, `Recurrent`,
//! `MSELoss`) and [`optim`] the update rules and the driver that applies them.

pub mod autograd;
pub mod device;
pub mod error;
pub mod nn;
pub mod ops;
pub mod optim;
pub mod tensor;
pub mod tensor_data;
pub mod utils;

// Re-exports so callers can write `recurra_core::Tensor`
pub use device::StorageDevice;
pub use error::RecurraError;
pub use tensor::Tensor;
