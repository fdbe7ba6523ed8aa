use crate::autograd::grad_check::check_grad;
use crate::error::RecurraError;
use crate::utils::testing::{check_tensor_near, create_test_tensor, create_test_tensor_with_grad};

#[test]
fn test_add_same_shape() {
    let a = create_test_tensor(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    let b = create_test_tensor(vec![10.0, 20.0, 30.0, 40.0], vec![2, 2]);
    let c = a.add(&b).unwrap();
    check_tensor_near(&c, &[2, 2], &[11.0, 22.0, 33.0, 44.0], 1e-6);
    assert!(!c.requires_grad());
}

#[test]
fn test_add_bias_broadcast_backward() {
    let x = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    let bias = create_test_tensor_with_grad(vec![0.1, 0.2, 0.3], vec![3]);
    let y = x.add(&bias).unwrap();
    assert!(y.requires_grad());

    y.sum().unwrap().backward(None).unwrap();
    check_tensor_near(&x.grad().unwrap(), &[2, 3], &[1.0; 6], 1e-6);
    check_tensor_near(&bias.grad().unwrap(), &[3], &[2.0, 2.0, 2.0], 1e-6);
}

#[test]
fn test_add_same_tensor_twice_accumulates() {
    let a = create_test_tensor_with_grad(vec![1.0, 2.0], vec![2]);
    let y = a.add(&a).unwrap();
    y.sum().unwrap().backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2], &[2.0, 2.0], 1e-6);
}

#[test]
fn test_add_incompatible_shapes() {
    let a = create_test_tensor(vec![1.0; 6], vec![2, 3]);
    let b = create_test_tensor(vec![1.0; 2], vec![2]);
    assert!(matches!(a.add(&b), Err(RecurraError::BroadcastError { .. })));
}

#[test]
fn test_add_scalar() {
    let a = create_test_tensor_with_grad(vec![1.0, -1.0], vec![2]);
    let y = a.add_scalar(0.5).unwrap();
    check_tensor_near(&y, &[2], &[1.5, -0.5], 1e-6);
    y.sum().unwrap().backward(None).unwrap();
    check_tensor_near(&a.grad().unwrap(), &[2], &[1.0, 1.0], 1e-6);
}

#[test]
fn test_add_grad_check_with_broadcast() {
    let a = create_test_tensor(vec![0.1, -0.4, 0.9, 1.3], vec![2, 2]);
    let b = create_test_tensor(vec![0.7, -0.2], vec![1, 2]);
    check_grad(|t| t[0].add(&t[1])?.tanh(), &[a, b], 1e-2, 1e-2).unwrap();
}
