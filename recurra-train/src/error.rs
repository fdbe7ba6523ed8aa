use recurra_core::RecurraError;
use thiserror::Error;

/// Errors raised while setting up or running a training loop.
///
/// Not converging within the epoch budget is not an error; it is reported
/// through [`TrainingReport::converged`](crate::TrainingReport::converged).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrainError {
    #[error(transparent)]
    Core(#[from] RecurraError),

    #[error("Invalid trainer configuration: {0}")]
    InvalidConfig(String),
}
