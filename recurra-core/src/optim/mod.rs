//! Optimizers for training neural networks.
//!
//! An [`Optimizer`] is an update rule (`Adam`, `Sgd`) holding per-parameter
//! state; the [`OptimizerDriver`] binds a rule to a module's parameters and
//! exposes the `zero_gradients` / `step` cycle.

pub mod adam;
pub mod driver;
pub mod optimizer_trait;
pub mod sgd;

pub use adam::{Adam, AdamOptions};
pub use driver::OptimizerDriver;
pub use optimizer_trait::Optimizer;
pub use sgd::{Sgd, SgdOptions};
