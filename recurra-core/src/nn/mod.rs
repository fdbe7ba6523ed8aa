// src/nn/mod.rs
// Neural network building blocks: parameters, the Module trait, layers and losses.

pub mod init;
pub mod layers;
pub mod losses;
pub mod module; // Trait Module
pub mod parameter; // struct Parameter
pub mod recurrent;

// Re-export common items
pub use layers::linear::Linear;
pub use losses::{MSELoss, Reduction};
pub use module::Module;
pub use parameter::Parameter;
pub use recurrent::{Recurrent, RecurrentOptions, RecurrentOutput};
