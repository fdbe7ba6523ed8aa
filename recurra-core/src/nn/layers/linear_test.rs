use super::*;
use crate::utils::testing::{check_tensor_near, create_test_tensor};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fixed_linear() -> Linear {
    let layer = Linear::new_with_rng(2, 3, true, &mut StdRng::seed_from_u64(0)).unwrap();
    layer
        .weight()
        .tensor()
        .copy_from_slice_(&[1.0, 0.0, 0.0, 1.0, 1.0, 1.0])
        .unwrap();
    layer.bias().unwrap().tensor().copy_from_slice_(&[0.5, -0.5, 0.0]).unwrap();
    layer
}

#[test]
fn test_linear_creation() {
    let layer = Linear::new(4, 8, true).unwrap();
    assert_eq!(layer.weight().shape(), vec![8, 4]);
    assert_eq!(layer.bias().unwrap().shape(), vec![8]);
    assert!(layer.weight().requires_grad());
    assert!(layer.weight().get_f32_data().iter().all(|v| v.abs() <= 0.5));

    let no_bias = Linear::new(4, 8, false).unwrap();
    assert_eq!(no_bias.parameters().len(), 1);
    assert!(Linear::new(0, 8, true).is_err());
}

#[test]
fn test_linear_forward_2d() {
    let layer = fixed_linear();
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let y = layer.forward(&x).unwrap();
    check_tensor_near(&y, &[2, 3], &[1.5, 1.5, 3.0, 3.5, 3.5, 7.0], 1e-6);
}

#[test]
fn test_linear_forward_rank3_flattens_batch_dims() {
    let layer = fixed_linear();
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 1, 2]);
    let y = layer.forward(&x).unwrap();
    check_tensor_near(&y, &[2, 1, 3], &[1.5, 1.5, 3.0, 3.5, 3.5, 7.0], 1e-6);
}

#[test]
fn test_linear_backward_reaches_parameters() {
    let layer = fixed_linear();
    let x = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    layer.forward(&x).unwrap().sum().unwrap().backward(None).unwrap();
    check_tensor_near(&layer.weight().grad().unwrap(), &[3, 2], &[4.0, 6.0, 4.0, 6.0, 4.0, 6.0], 1e-6);
    check_tensor_near(&layer.bias().unwrap().grad().unwrap(), &[3], &[2.0, 2.0, 2.0], 1e-6);
}

#[test]
fn test_linear_feature_mismatch() {
    let layer = fixed_linear();
    let x = create_test_tensor(vec![1.0; 3], vec![1, 3]);
    assert!(matches!(layer.forward(&x), Err(RecurraError::ShapeMismatch { .. })));
}

#[test]
fn test_named_parameters() {
    let layer = fixed_linear();
    let names: Vec<String> = layer.named_parameters().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["weight", "bias"]);
}
