use std::collections::HashMap;

use log::debug;

use crate::error::RecurraError;
use crate::nn::Parameter;
use crate::optim::optimizer_trait::{check_grad_shape, check_learning_rate, check_state_len, Optimizer};
use crate::tensor::Tensor;

/// Hyperparameters of [`Adam`].
#[derive(Debug, Clone, PartialEq)]
pub struct AdamOptions {
    pub lr: f32,
    pub betas: (f32, f32),
    pub eps: f32,
    /// L2 penalty added to the gradient before the moment updates.
    pub weight_decay: f32,
    pub amsgrad: bool,
}

impl Default for AdamOptions {
    fn default() -> Self {
        AdamOptions {
            lr: 1e-3,
            betas: (0.9, 0.999),
            eps: 1e-8,
            weight_decay: 0.0,
            amsgrad: false,
        }
    }
}

impl AdamOptions {
    /// Default hyperparameters with the given learning rate.
    pub fn new(lr: f32) -> Self {
        AdamOptions {
            lr,
            ..AdamOptions::default()
        }
    }

    pub fn betas(mut self, beta1: f32, beta2: f32) -> Self {
        self.betas = (beta1, beta2);
        self
    }

    pub fn eps(mut self, eps: f32) -> Self {
        self.eps = eps;
        self
    }

    pub fn weight_decay(mut self, weight_decay: f32) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn amsgrad(mut self, amsgrad: bool) -> Self {
        self.amsgrad = amsgrad;
        self
    }

    pub fn validate(&self) -> Result<(), RecurraError> {
        check_learning_rate(self.lr)?;
        let (beta1, beta2) = self.betas;
        if !(0.0..1.0).contains(&beta1) {
            return Err(RecurraError::ConfigurationError(format!(
                "Beta1 must be in [0, 1), got {}",
                beta1
            )));
        }
        if !(0.0..1.0).contains(&beta2) {
            return Err(RecurraError::ConfigurationError(format!(
                "Beta2 must be in [0, 1), got {}",
                beta2
            )));
        }
        if !(self.eps > 0.0) {
            return Err(RecurraError::ConfigurationError(format!(
                "Epsilon must be positive, got {}",
                self.eps
            )));
        }
        if !(self.weight_decay >= 0.0) {
            return Err(RecurraError::ConfigurationError(format!(
                "Weight decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }
}

/// Moment estimates of one parameter.
#[derive(Debug, Clone, Default)]
pub struct AdamParamState {
    /// Number of updates applied so far; drives bias correction.
    pub step: u64,
    /// First moment (EMA of gradients).
    pub m: Vec<f32>,
    /// Second moment (EMA of squared gradients).
    pub v: Vec<f32>,
    /// Running maximum of `v`, only maintained with AMSGrad.
    pub v_max: Vec<f32>,
}

/// Adam with bias correction, optional L2 weight decay and AMSGrad.
#[derive(Debug)]
pub struct Adam {
    options: AdamOptions,
    state: HashMap<String, AdamParamState>,
}

impl Adam {
    /// # Errors
    /// `ConfigurationError` if `options` fail validation.
    pub fn new(options: AdamOptions) -> Result<Self, RecurraError> {
        options.validate()?;
        Ok(Adam {
            options,
            state: HashMap::new(),
        })
    }

    pub fn options(&self) -> &AdamOptions {
        &self.options
    }

    /// State recorded for the parameter bound under `name`, if it was updated at least once.
    pub fn state(&self, name: &str) -> Option<&AdamParamState> {
        self.state.get(name)
    }
}

impl Optimizer for Adam {
    fn update(&mut self, name: &str, param: &Parameter, grad: &Tensor) -> Result<(), RecurraError> {
        check_grad_shape(name, param, grad)?;
        let AdamOptions {
            lr,
            betas: (beta1, beta2),
            eps,
            weight_decay,
            amsgrad,
        } = self.options;

        let mut grad_data = grad.get_f32_data();
        if weight_decay != 0.0 {
            let values = param.get_f32_data();
            grad_data
                .iter_mut()
                .zip(values.iter())
                .for_each(|(g, p)| *g += weight_decay * p);
        }

        let numel = param.numel();
        let state = self
            .state
            .entry(name.to_string())
            .or_insert_with(|| AdamParamState {
                step: 0,
                m: vec![0.0; numel],
                v: vec![0.0; numel],
                v_max: if amsgrad { vec![0.0; numel] } else { Vec::new() },
            });
        check_state_len(name, state.m.len(), param)?;
        state.step += 1;

        let bias_correction1 = 1.0 - beta1.powi(state.step as i32);
        let bias_correction2 = 1.0 - beta2.powi(state.step as i32);
        let step_size = lr / bias_correction1;

        for (i, g) in grad_data.iter().enumerate() {
            state.m[i] = beta1 * state.m[i] + (1.0 - beta1) * g;
            state.v[i] = beta2 * state.v[i] + (1.0 - beta2) * g * g;
        }
        if amsgrad {
            if state.v_max.len() != numel {
                state.v_max = vec![0.0; numel];
            }
            for (max, v) in state.v_max.iter_mut().zip(state.v.iter()) {
                *max = max.max(*v);
            }
        }
        let second = if amsgrad { &state.v_max } else { &state.v };
        let first = &state.m;

        param.apply_(|data| {
            for (i, value) in data.iter_mut().enumerate() {
                let denom = (second[i] / bias_correction2).sqrt() + eps;
                *value -= step_size * first[i] / denom;
            }
        })?;
        debug!("Adam: updated '{}' (step {}, lr {})", name, state.step, lr);
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
#[path = "adam_test.rs"]
mod tests;
