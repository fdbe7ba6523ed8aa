use std::collections::HashMap;

use log::debug;

use crate::error::RecurraError;
use crate::nn::Parameter;
use crate::optim::optimizer_trait::{check_grad_shape, check_learning_rate, check_state_len, Optimizer};
use crate::tensor::Tensor;

/// Hyperparameters of [`Sgd`].
#[derive(Debug, Clone, PartialEq)]
pub struct SgdOptions {
    pub lr: f32,
    pub momentum: f32,
    pub weight_decay: f32,
    pub nesterov: bool,
}

impl SgdOptions {
    /// Plain gradient descent with learning rate `lr`.
    pub fn new(lr: f32) -> Self {
        SgdOptions {
            lr,
            momentum: 0.0,
            weight_decay: 0.0,
            nesterov: false,
        }
    }

    pub fn momentum(mut self, momentum: f32) -> Self {
        self.momentum = momentum;
        self
    }

    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn nesterov(mut self, nesterov: bool) -> Self {
        self.nesterov = nesterov;
        self
    }

    pub fn validate(&self) -> Result<(), RecurraError> {
        check_learning_rate(self.lr)?;
        if !(self.momentum >= 0.0) {
            return Err(RecurraError::ConfigurationError(format!(
                "Momentum must be non-negative, got {}",
                self.momentum
            )));
        }
        if !(self.weight_decay >= 0.0) {
            return Err(RecurraError::ConfigurationError(format!(
                "Weight decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        if self.nesterov && self.momentum == 0.0 {
            return Err(RecurraError::ConfigurationError(
                "Nesterov momentum requires a momentum > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stochastic gradient descent with optional momentum, Nesterov and L2 weight decay.
#[derive(Debug)]
pub struct Sgd {
    options: SgdOptions,
    momentum_buffers: HashMap<String, Vec<f32>>,
}

impl Sgd {
    pub fn new(options: SgdOptions) -> Result<Self, RecurraError> {
        options.validate()?;
        Ok(Sgd {
            options,
            momentum_buffers: HashMap::new(),
        })
    }

    pub fn options(&self) -> &SgdOptions {
        &self.options
    }
}

impl Optimizer for Sgd {
    fn update(&mut self, name: &str, param: &Parameter, grad: &Tensor) -> Result<(), RecurraError> {
        check_grad_shape(name, param, grad)?;
        let SgdOptions {
            lr,
            momentum,
            weight_decay,
            nesterov,
        } = self.options;

        let mut d_p = grad.get_f32_data();
        if weight_decay != 0.0 {
            let values = param.get_f32_data();
            d_p.iter_mut()
                .zip(values.iter())
                .for_each(|(g, p)| *g += weight_decay * p);
        }

        if momentum != 0.0 {
            let buffer = self
                .momentum_buffers
                .entry(name.to_string())
                .or_insert_with(Vec::new);
            if buffer.is_empty() {
                // The first step seeds the buffer with the gradient itself.
                buffer.extend_from_slice(&d_p);
            } else {
                check_state_len(name, buffer.len(), param)?;
                buffer
                    .iter_mut()
                    .zip(d_p.iter())
                    .for_each(|(b, g)| *b = momentum * *b + g);
            }
            if nesterov {
                d_p.iter_mut()
                    .zip(buffer.iter())
                    .for_each(|(g, b)| *g += momentum * b);
            } else {
                d_p.copy_from_slice(buffer);
            }
        }

        param.apply_(|data| {
            data.iter_mut().zip(d_p.iter()).for_each(|(v, g)| *v -= lr * g);
        })?;
        debug!("Sgd: updated '{}' (lr {})", name, lr);
        Ok(())
    }

    fn learning_rate(&self) -> f32 {
        self.options.lr
    }

    fn set_learning_rate(&mut self, lr: f32) -> Result<(), RecurraError> {
        check_learning_rate(lr)?;
        self.options.lr = lr;
        Ok(())
    }
}

#[cfg(test)]
#[path = "sgd_test.rs"]
mod tests;
