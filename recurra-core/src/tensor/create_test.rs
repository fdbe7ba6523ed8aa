use super::*;
use crate::device::StorageDevice;
use crate::error::RecurraError;
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn test_zeros_and_ones() {
    let z = zeros(&[2, 3]).unwrap();
    assert_eq!(z.shape(), vec![2, 3]);
    assert!(z.get_f32_data().iter().all(|&v| v == 0.0));
    let o = ones(&[4]).unwrap();
    assert_eq!(o.get_f32_data(), vec![1.0; 4]);
    assert!(!o.requires_grad());
}

#[test]
fn test_full_on_gpu_is_unsupported() {
    let err = full_on(&[2], 1.0, StorageDevice::GPU).unwrap_err();
    assert!(matches!(err, RecurraError::UnsupportedOperation(_)));
}

#[test]
fn test_from_fn_uses_row_major_index() {
    let t = from_fn(&[2, 2], |i| i as f32 * 10.0).unwrap();
    assert_eq!(t.get_f32_data(), vec![0.0, 10.0, 20.0, 30.0]);
}

#[test]
fn test_rand_uniform_bounds() {
    let mut rng = StdRng::seed_from_u64(7);
    let t = rand_uniform(&[100], -0.5, 0.5, &mut rng).unwrap();
    assert!(t.get_f32_data().iter().all(|&v| (-0.5..0.5).contains(&v)));
    assert!(rand_uniform(&[1], 1.0, 1.0, &mut rng).is_err());
}

#[test]
fn test_randn_is_seedable() {
    let a = randn_with(&[8], &mut StdRng::seed_from_u64(3)).unwrap();
    let b = randn_with(&[8], &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(a.get_f32_data(), b.get_f32_data());
    assert_eq!(randn(&[10, 16, 4]).unwrap().shape(), vec![10, 16, 4]);
}

#[test]
fn test_bernoulli_values_are_binary() {
    let mut rng = StdRng::seed_from_u64(11);
    let t = bernoulli(&[5, 16, 1], 0.5, &mut rng, StorageDevice::CPU).unwrap();
    let data = t.get_f32_data();
    assert!(data.iter().all(|&v| v == 0.0 || v == 1.0));
    assert!(data.iter().any(|&v| v == 1.0));
    assert!(data.iter().any(|&v| v == 0.0));
}

#[test]
fn test_bernoulli_rejects_invalid_probability() {
    let mut rng = StdRng::seed_from_u64(0);
    let err = bernoulli(&[2], 1.5, &mut rng, StorageDevice::CPU).unwrap_err();
    assert!(matches!(err, RecurraError::ConfigurationError(_)));
}
