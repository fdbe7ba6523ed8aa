use rand::Rng;

use crate::error::RecurraError;
use crate::nn::init::{default_bound, uniform_};
use crate::nn::module::Module;
use crate::nn::parameter::Parameter;
use crate::tensor::{zeros, Tensor};

/// Applies a linear transformation to the incoming data: `y = x·Wᵀ + b`.
///
/// Weight has shape `[out_features, in_features]`, bias `[out_features]`.
/// Inputs of any rank ≥ 1 are accepted as long as their last dimension is
/// `in_features`; leading dimensions are treated as batch dimensions.
#[derive(Debug)]
pub struct Linear {
    weight: Parameter,
    bias: Option<Parameter>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// Creates a new Linear layer initialized from `U(-1/√in, 1/√in)` with the thread RNG.
    pub fn new(in_features: usize, out_features: usize, has_bias: bool) -> Result<Self, RecurraError> {
        Linear::new_with_rng(in_features, out_features, has_bias, &mut rand::thread_rng())
    }

    /// Creates a new Linear layer drawing its initial values from `rng`.
    ///
    /// # Errors
    /// `ConfigurationError` if either feature count is zero.
    pub fn new_with_rng<R: Rng + ?Sized>(
        in_features: usize,
        out_features: usize,
        has_bias: bool,
        rng: &mut R,
    ) -> Result<Self, RecurraError> {
        if in_features == 0 || out_features == 0 {
            return Err(RecurraError::ConfigurationError(format!(
                "Linear requires non-zero features, got in={} out={}",
                in_features, out_features
            )));
        }
        let bound = default_bound(in_features);

        let weight_tensor = zeros(&[out_features, in_features])?;
        uniform_(&weight_tensor, -bound, bound, &mut *rng)?;
        let weight = Parameter::new(weight_tensor, Some("weight".to_string()))?;

        let bias = if has_bias {
            let bias_tensor = zeros(&[out_features])?;
            uniform_(&bias_tensor, -bound, bound, &mut *rng)?;
            Some(Parameter::new(bias_tensor, Some("bias".to_string()))?)
        } else {
            None
        };

        Ok(Linear {
            weight,
            bias,
            in_features,
            out_features,
        })
    }

    pub fn weight(&self) -> &Parameter {
        &self.weight
    }

    pub fn bias(&self) -> Option<&Parameter> {
        self.bias.as_ref()
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }
}

impl Module for Linear {
    fn forward(&self, input: &Tensor) -> Result<Tensor, RecurraError> {
        let shape = input.shape();
        match shape.last() {
            Some(&features) if features == self.in_features => {}
            _ => {
                let mut expected = shape.clone();
                match expected.last_mut() {
                    Some(last) => *last = self.in_features,
                    None => expected.push(self.in_features),
                }
                return Err(RecurraError::ShapeMismatch {
                    expected,
                    actual: shape,
                    operation: "Linear::forward".to_string(),
                });
            }
        }

        let bias = self.bias.as_ref().map(|b| b.tensor());
        if shape.len() == 2 {
            return input.linear(&self.weight, bias);
        }
        // Flatten leading dimensions into one batch axis and restore them afterwards.
        let rows: usize = shape[..shape.len() - 1].iter().product();
        let flat = input.reshape(vec![rows, self.in_features])?;
        let output = flat.linear(&self.weight, bias)?;
        let mut out_shape = shape;
        if let Some(last) = out_shape.last_mut() {
            *last = self.out_features;
        }
        output.reshape(out_shape)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        let mut params = vec![&self.weight];
        if let Some(b) = &self.bias {
            params.push(b);
        }
        params
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let mut params = vec![("weight".to_string(), &self.weight)];
        if let Some(b) = &self.bias {
            params.push(("bias".to_string(), b));
        }
        params
    }
}

#[cfg(test)]
#[path = "linear_test.rs"]
mod tests;
