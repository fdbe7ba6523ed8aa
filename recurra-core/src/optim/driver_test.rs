use super::*;
use crate::nn::Linear;
use crate::optim::{Adam, AdamOptions, Sgd, SgdOptions};
use crate::tensor::{ones, Tensor};
use crate::utils::testing::create_test_tensor;
use approx::assert_abs_diff_eq;

/// Two scalar parameters; only `used` takes part in `forward`.
#[derive(Debug)]
struct TwoScalars {
    used: Parameter,
    unused: Parameter,
    duplicate_names: bool,
}

impl TwoScalars {
    fn new(value: f32) -> Self {
        let scalar = |name: &str| {
            Parameter::new(create_test_tensor(vec![value], vec![1]), Some(name.to_string())).unwrap()
        };
        TwoScalars {
            used: scalar("used"),
            unused: scalar("unused"),
            duplicate_names: false,
        }
    }
}

impl Module for TwoScalars {
    fn forward(&self, input: &Tensor) -> Result<Tensor, RecurraError> {
        self.used.sub(input)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.used, &self.unused]
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        let second = if self.duplicate_names { "used" } else { "unused" };
        vec![("used".to_string(), &self.used), (second.to_string(), &self.unused)]
    }
}

#[derive(Debug)]
struct Empty;

impl Module for Empty {
    fn forward(&self, input: &Tensor) -> Result<Tensor, RecurraError> {
        Ok(input.clone())
    }

    fn parameters(&self) -> Vec<&Parameter> {
        Vec::new()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        Vec::new()
    }
}

/// `(used - target)^2`
fn squared_error(module: &TwoScalars, target: f32) -> Tensor {
    let diff = module.forward(&create_test_tensor(vec![target], vec![1])).unwrap();
    diff.mul(&diff).unwrap().sum().unwrap()
}

#[test]
fn test_binding_errors() {
    let sgd = || Sgd::new(SgdOptions::new(0.1)).unwrap();
    assert!(matches!(
        OptimizerDriver::new(sgd(), &Empty),
        Err(RecurraError::ConfigurationError(_))
    ));

    let mut module = TwoScalars::new(0.0);
    module.duplicate_names = true;
    assert!(matches!(
        OptimizerDriver::new(sgd(), &module),
        Err(RecurraError::ConfigurationError(_))
    ));

    let driver = OptimizerDriver::new(sgd(), &TwoScalars::new(0.0)).unwrap();
    assert_eq!(driver.bound_names().collect::<Vec<_>>(), vec!["used", "unused"]);
}

#[test]
fn test_step_rejects_a_different_module() {
    let bound = Linear::new(3, 2, true).unwrap();
    let other = Linear::new(4, 2, true).unwrap();
    let mut driver = OptimizerDriver::new(Sgd::new(SgdOptions::new(0.1)).unwrap(), &bound).unwrap();
    assert!(matches!(
        driver.step(&other),
        Err(RecurraError::ConfigurationError(_))
    ));
    assert!(driver.zero_gradients(&TwoScalars::new(0.0)).is_err());
    assert!(driver.step(&bound).is_ok());
}

#[test]
fn test_step_skips_parameters_without_gradient() {
    let _ = env_logger::builder().is_test(true).try_init();
    let module = TwoScalars::new(1.0);
    let mut driver = OptimizerDriver::new(Sgd::new(SgdOptions::new(0.1)).unwrap(), &module).unwrap();

    squared_error(&module, 3.0).backward(None).unwrap();
    driver.step(&module).unwrap();
    // d/dw (w - 3)^2 = -4 at w = 1
    assert_abs_diff_eq!(module.used.get_f32_data()[0], 1.4, epsilon = 1e-6);
    assert_eq!(module.unused.get_f32_data(), vec![1.0]);
}

#[test]
fn test_zero_gradients_and_stale_steps() {
    let module = TwoScalars::new(1.0);
    let mut driver = OptimizerDriver::new(Sgd::new(SgdOptions::new(0.1)).unwrap(), &module).unwrap();

    squared_error(&module, 3.0).backward(None).unwrap();
    driver.step(&module).unwrap();
    // Same stale gradient applied a second time.
    driver.step(&module).unwrap();
    assert_abs_diff_eq!(module.used.get_f32_data()[0], 1.8, epsilon = 1e-6);

    driver.zero_gradients(&module).unwrap();
    assert!(module.used.grad().is_none());
    driver.step(&module).unwrap();
    assert_abs_diff_eq!(module.used.get_f32_data()[0], 1.8, epsilon = 1e-6);
}

#[test]
fn test_gradients_accumulate_without_zeroing() {
    let module = TwoScalars::new(1.0);
    squared_error(&module, 3.0).backward(None).unwrap();
    squared_error(&module, 3.0).backward(None).unwrap();
    assert_eq!(module.used.grad().unwrap().get_f32_data(), vec![-8.0]);
}

#[test]
fn test_sgd_loop_converges() {
    let module = TwoScalars::new(0.0);
    let mut driver = OptimizerDriver::new(Sgd::new(SgdOptions::new(0.1)).unwrap(), &module).unwrap();
    for _ in 0..100 {
        driver.zero_gradients(&module).unwrap();
        squared_error(&module, 3.0).backward(None).unwrap();
        driver.step(&module).unwrap();
    }
    assert_abs_diff_eq!(module.used.get_f32_data()[0], 3.0, epsilon = 1e-4);
}

#[test]
fn test_adam_loop_converges() {
    let module = TwoScalars::new(0.0);
    let mut driver = OptimizerDriver::new(Adam::new(AdamOptions::new(0.1)).unwrap(), &module).unwrap();
    for _ in 0..500 {
        driver.zero_gradients(&module).unwrap();
        squared_error(&module, 3.0).backward(None).unwrap();
        driver.step(&module).unwrap();
    }
    assert_abs_diff_eq!(module.used.get_f32_data()[0], 3.0, epsilon = 0.1);
    assert_eq!(driver.rule().state("used").unwrap().step, 500);
    assert!(driver.rule().state("unused").is_none());
}

#[test]
fn test_rule_mut_changes_learning_rate() {
    let layer = Linear::new(2, 1, false).unwrap();
    let mut driver = OptimizerDriver::new(Adam::new(AdamOptions::default()).unwrap(), &layer).unwrap();
    driver.rule_mut().set_learning_rate(0.5).unwrap();
    assert_eq!(driver.rule().learning_rate(), 0.5);

    layer.forward(&ones(&[1, 2]).unwrap()).unwrap().sum().unwrap().backward(None).unwrap();
    let before = layer.weight().get_f32_data();
    driver.step(&layer).unwrap();
    let after = layer.weight().get_f32_data();
    for (b, a) in before.iter().zip(after.iter()) {
        assert_abs_diff_eq!(b - a, 0.5, epsilon = 1e-4);
    }
}
