//! # Tensor Operations Module
//!
//! Every differentiable operation follows the same layout: a `pub(crate)`
//! forward function named `xxx_op` that validates its inputs, computes the
//! result on the CPU buffer and, when any input requires grad, attaches an
//! `XxxBackward` struct implementing [`BackwardOp`] to the output. Public entry
//! points are the methods on [`Tensor`] in `tensor::op_methods`.

use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::device::StorageDevice;
use crate::error::RecurraError;
use crate::tensor::Tensor;

pub mod activation;
pub mod arithmetic;
pub mod dropout;
pub mod linalg;
pub mod reduction;
pub mod view;

/// Fails with `DeviceMismatch` unless `tensor` lives on the CPU.
pub(crate) fn check_cpu(tensor: &Tensor, op_name: &str) -> Result<(), RecurraError> {
    let device = tensor.device();
    if device != StorageDevice::CPU {
        return Err(RecurraError::DeviceMismatch {
            expected: StorageDevice::CPU,
            actual: device,
            operation: op_name.to_string(),
        });
    }
    Ok(())
}

/// Marks `output` as produced by `grad_fn`.
pub(crate) fn attach_grad_fn(output: &Tensor, grad_fn: Arc<dyn BackwardOp>) {
    let mut guard = output.write_data();
    guard.requires_grad = true;
    guard.grad_fn = Some(grad_fn);
}

/// Applies an element-wise function and wires up its backward pass.
///
/// `backward_builder` receives the input handle and a detached copy of the
/// output, so backward ops that need the forward result (tanh, sigmoid) do not
/// hold a reference cycle through the output tensor.
pub(crate) fn apply_unary_op<F, B>(
    a: &Tensor,
    op: F,
    backward_builder: B,
    op_name: &str,
) -> Result<Tensor, RecurraError>
where
    F: Fn(f32) -> f32,
    B: FnOnce(Tensor, Tensor) -> Arc<dyn BackwardOp>,
{
    check_cpu(a, op_name)?;
    let (output_data, shape, requires_grad) = {
        let guard = a.read_data();
        let data: Vec<f32> = guard.data.iter().map(|&x| op(x)).collect();
        (data, guard.shape.clone(), guard.requires_grad)
    };
    let output = Tensor::new(output_data, shape)?;
    if requires_grad {
        let grad_fn = backward_builder(a.clone(), output.detach());
        attach_grad_fn(&output, grad_fn);
    }
    Ok(output)
}

/// Element-wise product of two equally shaped buffers, as a gradient tensor.
pub(crate) fn elementwise_grad<F>(
    grad_output: &Tensor,
    saved: &Tensor,
    f: F,
) -> Result<Tensor, RecurraError>
where
    F: Fn(f32, f32) -> f32,
{
    let g = grad_output.read_data();
    let s = saved.read_data();
    if g.shape != s.shape {
        return Err(RecurraError::ShapeMismatch {
            expected: s.shape.clone(),
            actual: g.shape.clone(),
            operation: "elementwise backward".to_string(),
        });
    }
    let data = g.data.iter().zip(s.data.iter()).map(|(&g, &s)| f(g, s)).collect();
    Tensor::new(data, s.shape.clone())
}
