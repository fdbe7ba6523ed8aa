use std::collections::HashSet;

use log::{debug, warn};

use crate::error::RecurraError;
use crate::nn::{Module, Parameter};
use crate::optim::Optimizer;

/// Applies an update rule to the parameters of one module.
///
/// The driver binds the module's parameter set by name and shape at
/// construction. It never holds the parameters themselves: every call borrows
/// them from the module and first checks that the module still exposes the
/// bound set.
///
/// ```
/// use recurra_core::nn::{Linear, Module};
/// use recurra_core::optim::{Adam, AdamOptions, OptimizerDriver};
/// use recurra_core::tensor::ones;
///
/// let layer = Linear::new(3, 1, true).unwrap();
/// let mut driver = OptimizerDriver::new(Adam::new(AdamOptions::new(1e-2)).unwrap(), &layer).unwrap();
///
/// driver.zero_gradients(&layer).unwrap();
/// layer.forward(&ones(&[2, 3]).unwrap()).unwrap().sum().unwrap().backward(None).unwrap();
/// driver.step(&layer).unwrap();
/// ```
#[derive(Debug)]
pub struct OptimizerDriver<O: Optimizer> {
    rule: O,
    bindings: Vec<(String, Vec<usize>)>,
}

impl<O: Optimizer> OptimizerDriver<O> {
    /// Binds `rule` to the parameters of `module`.
    ///
    /// # Errors
    /// `ConfigurationError` if the module has no parameters or exposes the
    /// same name twice.
    pub fn new(rule: O, module: &dyn Module) -> Result<Self, RecurraError> {
        let named = module.named_parameters();
        if named.is_empty() {
            return Err(RecurraError::ConfigurationError(
                "optimizer got an empty parameter list".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for (name, _) in named.iter() {
            if !seen.insert(name.as_str()) {
                return Err(RecurraError::ConfigurationError(format!(
                    "parameter name '{}' appears more than once",
                    name
                )));
            }
        }
        let bindings = named.iter().map(|(name, p)| (name.clone(), p.shape())).collect();
        debug!("OptimizerDriver: bound {} parameter(s)", named.len());
        Ok(OptimizerDriver { rule, bindings })
    }

    pub fn rule(&self) -> &O {
        &self.rule
    }

    pub fn rule_mut(&mut self) -> &mut O {
        &mut self.rule
    }

    /// Names of the bound parameters, in binding order.
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.bindings.iter().map(|(name, _)| name.as_str())
    }

    /// Clears the accumulated gradient of every bound parameter.
    pub fn zero_gradients(&self, module: &dyn Module) -> Result<(), RecurraError> {
        let named = module.named_parameters();
        self.verify(&named)?;
        for (_, param) in named {
            param.zero_grad();
        }
        Ok(())
    }

    /// Runs the update rule once over every bound parameter that has a gradient.
    ///
    /// Gradients are not cleared: two calls without a backward pass in
    /// between apply the rule twice to the same gradients.
    pub fn step(&mut self, module: &dyn Module) -> Result<(), RecurraError> {
        let named = module.named_parameters();
        self.verify(&named)?;
        self.rule.begin_step();

        let mut skipped = 0;
        for (name, param) in named.iter() {
            match param.grad() {
                Some(grad) => self.rule.update(name, param, &grad)?,
                None => {
                    debug!("OptimizerDriver: '{}' has no gradient, skipping", name);
                    skipped += 1;
                }
            }
        }
        if skipped > 0 {
            warn!(
                "OptimizerDriver: skipped {} of {} parameter(s) without gradient",
                skipped,
                named.len()
            );
        }
        Ok(())
    }

    fn verify(&self, named: &[(String, &Parameter)]) -> Result<(), RecurraError> {
        if named.len() != self.bindings.len() {
            return Err(RecurraError::ConfigurationError(format!(
                "module exposes {} parameter(s), optimizer is bound to {}",
                named.len(),
                self.bindings.len()
            )));
        }
        for ((name, param), (bound_name, bound_shape)) in named.iter().zip(self.bindings.iter()) {
            if name != bound_name || param.shape() != *bound_shape {
                return Err(RecurraError::ConfigurationError(format!(
                    "module parameter '{}' {:?} does not match bound parameter '{}' {:?}",
                    name,
                    param.shape(),
                    bound_name,
                    bound_shape
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
