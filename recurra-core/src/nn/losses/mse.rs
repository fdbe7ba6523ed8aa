use std::fmt;
use std::str::FromStr;

use crate::error::RecurraError;
use crate::tensor::Tensor;

/// Specifies the reduction to apply to the squared errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    #[default]
    Mean,
    Sum,
}

impl FromStr for Reduction {
    type Err = RecurraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mean" => Ok(Reduction::Mean),
            "sum" => Ok(Reduction::Sum),
            _ => Err(RecurraError::ConfigurationError(format!(
                "Unsupported reduction type: {}",
                s
            ))),
        }
    }
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reduction::Mean => write!(f, "mean"),
            Reduction::Sum => write!(f, "sum"),
        }
    }
}

/// Computes the Mean Squared Error loss between input and target tensors.
///
/// The loss is built from differentiable primitives (`sub`, `mul`, `mean`/`sum`),
/// so gradients flow to whichever side requires them.
#[derive(Debug, Clone, Default)]
pub struct MSELoss {
    reduction: Reduction,
}

impl MSELoss {
    pub fn new(reduction: Reduction) -> Self {
        MSELoss { reduction }
    }

    pub fn reduction(&self) -> Reduction {
        self.reduction
    }

    /// Returns the scalar loss.
    ///
    /// # Errors
    /// `ShapeMismatch` if `input` and `target` differ in shape.
    pub fn calculate(&self, input: &Tensor, target: &Tensor) -> Result<Tensor, RecurraError> {
        if input.shape() != target.shape() {
            return Err(RecurraError::ShapeMismatch {
                expected: target.shape(),
                actual: input.shape(),
                operation: "MSELoss::calculate".to_string(),
            });
        }
        let diff = input.sub(target)?;
        let squared = diff.mul(&diff)?;
        match self.reduction {
            Reduction::Mean => squared.mean(),
            Reduction::Sum => squared.sum(),
        }
    }
}

#[cfg(test)]
#[path = "mse_test.rs"]
mod tests;
