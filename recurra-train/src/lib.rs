//! Training harness for Recurra recurrent layers.
//!
//! Trains a small `Linear -> Recurrent -> Linear` model to count the ones in
//! streams of random binary digits, the end-to-end check that forward,
//! backward and the optimizer update agree with each other.

pub mod config;
pub mod error;
pub mod model;
pub mod task;
pub mod trainer;

pub use config::TrainerConfig;
pub use error::TrainError;
pub use model::BitCountModel;
pub use task::{Batch, BitSumTask};
pub use trainer::{train_until_converged, RunningLoss, Trainer, TrainingReport};
