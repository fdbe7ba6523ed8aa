use recurra_core::nn::recurrent::{Recurrent, RecurrentOptions};
use recurra_core::tensor::{from_fn, Tensor};
use recurra_core::RecurraError;

// Helpers shared by the integration test binaries. Not every binary uses all of them.

/// Initializes `env_logger` once per test binary.
#[allow(dead_code)]
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[allow(dead_code)]
pub fn create_test_tensor(data: Vec<f32>, shape: Vec<usize>) -> Tensor {
    Tensor::new(data, shape).expect("Test tensor creation failed")
}

/// `(N - i) / N` over a tensor of `N` elements.
#[allow(dead_code)]
pub fn descending_ramp(shape: &[usize]) -> Tensor {
    let n: usize = shape.iter().product();
    from_fn(shape, |i| (n - i) as f32 / n as f32).expect("ramp creation failed")
}

/// A layer whose parameters are all `index / numel`.
#[allow(dead_code)]
pub fn ramp_initialized(options: RecurrentOptions) -> Result<Recurrent, RecurraError> {
    let layer = Recurrent::new(options)?;
    layer.init_parameters_with(|i, n| i as f32 / n as f32)?;
    Ok(layer)
}

#[allow(dead_code)]
pub fn assert_all_close(actual: &[f32], expected: &[f32], tolerance: f32) {
    assert_eq!(actual.len(), expected.len(), "length mismatch");
    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            (a - e).abs() <= tolerance,
            "element {}: actual {} expected {} (tolerance {})",
            i,
            a,
            e,
            tolerance
        );
    }
}
