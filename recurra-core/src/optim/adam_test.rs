use super::*;
use crate::utils::testing::{check_tensor_near, create_test_tensor};
use approx::assert_abs_diff_eq;

fn param(data: Vec<f32>) -> Parameter {
    let n = data.len();
    Parameter::new(create_test_tensor(data, vec![n]), Some("w".to_string())).unwrap()
}

#[test]
fn test_adam_options_validation() {
    assert!(Adam::new(AdamOptions::default()).is_ok());
    let invalid = [
        AdamOptions::new(0.0),
        AdamOptions::new(-1e-3),
        AdamOptions::new(f32::NAN),
        AdamOptions::new(1e-3).betas(1.0, 0.999),
        AdamOptions::new(1e-3).betas(0.9, -0.1),
        AdamOptions::new(1e-3).eps(0.0),
        AdamOptions::new(1e-3).weight_decay(-0.5),
    ];
    for options in invalid.iter() {
        assert!(
            matches!(Adam::new(options.clone()), Err(RecurraError::ConfigurationError(_))),
            "{:?} should be rejected",
            options
        );
    }
}

#[test]
fn test_first_steps_move_by_learning_rate() {
    // With bias correction, m_hat / sqrt(v_hat) is sign(g) while the gradient is constant.
    let mut adam = Adam::new(AdamOptions::new(0.1)).unwrap();
    let p = param(vec![10.0, -2.0]);
    let grad = create_test_tensor(vec![1.0, -4.0], vec![2]);

    adam.update("w", &p, &grad).unwrap();
    check_tensor_near(&p, &[2], &[9.9, -1.9], 1e-5);
    adam.update("w", &p, &grad).unwrap();
    check_tensor_near(&p, &[2], &[9.8, -1.8], 1e-5);

    let state = adam.state("w").unwrap();
    assert_eq!(state.step, 2);
    assert_abs_diff_eq!(state.m[0], 0.19, epsilon = 1e-6);
    assert!(state.v_max.is_empty());
}

#[test]
fn test_weight_decay_acts_without_gradient() {
    let mut adam = Adam::new(AdamOptions::new(0.05).weight_decay(0.5)).unwrap();
    let p = param(vec![1.0]);
    adam.update("w", &p, &create_test_tensor(vec![0.0], vec![1])).unwrap();
    check_tensor_near(&p, &[1], &[0.95], 1e-5);
}

#[test]
fn test_amsgrad_tracks_second_moment_maximum() {
    let mut adam = Adam::new(AdamOptions::new(0.01).amsgrad(true)).unwrap();
    let p = param(vec![0.0, 0.0]);
    adam.update("w", &p, &create_test_tensor(vec![3.0, 1.0], vec![2])).unwrap();
    adam.update("w", &p, &create_test_tensor(vec![0.0, 0.0], vec![2])).unwrap();
    let state = adam.state("w").unwrap();
    for (max, v) in state.v_max.iter().zip(state.v.iter()) {
        assert!(max >= v);
    }
    assert_abs_diff_eq!(state.v_max[0], 0.009, epsilon = 1e-6);
}

#[test]
fn test_state_is_kept_per_name() {
    let mut adam = Adam::new(AdamOptions::new(0.1)).unwrap();
    let a = param(vec![1.0]);
    let b = param(vec![1.0]);
    let g = create_test_tensor(vec![1.0], vec![1]);
    adam.update("a", &a, &g).unwrap();
    adam.update("a", &a, &g).unwrap();
    adam.update("b", &b, &g).unwrap();
    assert_eq!(adam.state("a").unwrap().step, 2);
    assert_eq!(adam.state("b").unwrap().step, 1);
    assert!(adam.state("c").is_none());
}

#[test]
fn test_shape_errors() {
    let mut adam = Adam::new(AdamOptions::new(0.1)).unwrap();
    let p = param(vec![1.0, 2.0]);
    let bad_grad = create_test_tensor(vec![1.0, 2.0, 3.0], vec![3]);
    assert!(matches!(
        adam.update("w", &p, &bad_grad),
        Err(RecurraError::ShapeMismatch { .. })
    ));

    adam.update("w", &p, &create_test_tensor(vec![1.0, 1.0], vec![2])).unwrap();
    let resized = param(vec![1.0, 2.0, 3.0]);
    assert!(matches!(
        adam.update("w", &resized, &bad_grad),
        Err(RecurraError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_learning_rate_accessors() {
    let mut adam = Adam::new(AdamOptions::new(0.1)).unwrap();
    assert_eq!(adam.learning_rate(), 0.1);
    adam.set_learning_rate(0.01).unwrap();
    assert_eq!(adam.learning_rate(), 0.01);
    assert!(adam.set_learning_rate(0.0).is_err());
    assert_eq!(adam.options().lr, 0.01);
}
