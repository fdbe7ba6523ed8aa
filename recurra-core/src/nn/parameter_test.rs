use super::*;
use crate::utils::testing::create_test_tensor;

#[test]
fn test_parameter_requires_grad_and_name() {
    let p = Parameter::new(create_test_tensor(vec![1.0, 2.0], vec![2]), Some("bias".to_string()))
        .unwrap();
    assert!(p.requires_grad());
    assert_eq!(p.name(), Some("bias"));
    assert_eq!(p.shape(), vec![2]);
    assert!(format!("{:?}", p).contains("bias"));

    let unnamed = Parameter::new_unnamed(create_test_tensor(vec![0.0], vec![1])).unwrap();
    assert_eq!(unnamed.name(), None);
}

#[test]
fn test_parameter_rejects_non_leaf() {
    let x = create_test_tensor(vec![1.0], vec![1]);
    x.set_requires_grad(true).unwrap();
    let y = x.tanh().unwrap();
    assert!(Parameter::new_unnamed(y).is_err());
}

#[test]
fn test_zero_grad_clears_accumulator() {
    let p = Parameter::new_unnamed(create_test_tensor(vec![1.0, 2.0], vec![2])).unwrap();
    p.mul_scalar(2.0).unwrap().sum().unwrap().backward(None).unwrap();
    assert!(p.grad().is_some());
    p.zero_grad();
    assert!(p.grad().is_none());
}

#[test]
fn test_init_with_index_over_numel() {
    let p = Parameter::new_unnamed(create_test_tensor(vec![0.0; 4], vec![2, 2])).unwrap();
    p.init_with(|i, n| i as f32 / n as f32).unwrap();
    assert_eq!(p.get_f32_data(), vec![0.0, 0.25, 0.5, 0.75]);
    assert!(p.requires_grad());
}

#[test]
fn test_clone_shares_storage() {
    let p = Parameter::new_unnamed(create_test_tensor(vec![1.0], vec![1])).unwrap();
    let q = p.clone();
    q.init_with(|_, _| 5.0).unwrap();
    assert_eq!(p.get_f32_data(), vec![5.0]);
}

#[test]
fn test_to_device() {
    let p = Parameter::new_unnamed(create_test_tensor(vec![1.0], vec![1])).unwrap();
    assert!(p.to_device(StorageDevice::CPU).is_ok());
    assert!(p.to_device(StorageDevice::GPU).is_err());
}
