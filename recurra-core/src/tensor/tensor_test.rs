use super::*;
use crate::utils::testing::create_test_tensor;

#[test]
fn test_new_checks_element_count() {
    let err = Tensor::new(vec![1.0, 2.0, 3.0], vec![2, 2]).unwrap_err();
    assert_eq!(
        err,
        RecurraError::TensorCreationError {
            data_len: 3,
            shape: vec![2, 2]
        }
    );
}

#[test]
fn test_metadata_accessors() {
    let t = create_test_tensor(vec![1.0; 24], vec![2, 3, 4]);
    assert_eq!(t.shape(), vec![2, 3, 4]);
    assert_eq!(t.rank(), 3);
    assert_eq!(t.numel(), 24);
    assert_eq!(t.device(), StorageDevice::CPU);
    assert!(!t.requires_grad());
    assert!(t.is_leaf());
}

#[test]
fn test_scalar_and_item() {
    let s = Tensor::scalar(2.5);
    assert!(s.shape().is_empty());
    assert_eq!(s.item().unwrap(), 2.5);
    let v = create_test_tensor(vec![1.0, 2.0], vec![2]);
    assert!(matches!(v.item(), Err(RecurraError::ShapeMismatch { .. })));
}

#[test]
fn test_clone_shares_storage_detach_does_not() {
    let t = create_test_tensor(vec![1.0, 2.0], vec![2]);
    let c = t.clone();
    assert!(c.same_storage(&t));
    let d = t.detach();
    assert!(!d.same_storage(&t));
    assert_eq!(d.get_f32_data(), t.get_f32_data());
}

#[test]
fn test_to_device() {
    let t = create_test_tensor(vec![1.0], vec![1]);
    assert!(t.to_device(StorageDevice::CPU).unwrap().same_storage(&t));
    assert!(matches!(
        t.to_device(StorageDevice::GPU),
        Err(RecurraError::UnsupportedOperation(_))
    ));
    assert!(Tensor::new_on(vec![1.0], vec![1], StorageDevice::GPU).is_err());
}

#[test]
fn test_debug_format_truncates() {
    let t = create_test_tensor((0..20).map(|i| i as f32).collect(), vec![20]);
    let s = format!("{:?}", t);
    assert!(s.contains("shape=[20]"));
    assert!(s.contains("..."));
}
