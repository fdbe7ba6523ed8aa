use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::ops::{attach_grad_fn, check_cpu};
use crate::tensor::broadcast_utils::{broadcast_binary, broadcast_shapes, reduce_to_shape};
use crate::tensor::Tensor;

pub mod add;
pub mod mul;
pub mod sub;

pub(crate) use add::{add_op, add_scalar_op};
pub(crate) use mul::{mul_op, mul_scalar_op};
pub(crate) use sub::sub_op;

/// Shared forward path of the broadcasting binary operations.
///
/// `backward_builder` receives both input handles and the output shape.
pub(crate) fn broadcast_binary_op<F, B>(
    a: &Tensor,
    b: &Tensor,
    op: F,
    backward_builder: B,
    op_name: &str,
) -> Result<Tensor, RecurraError>
where
    F: Fn(f32, f32) -> f32,
    B: FnOnce(Tensor, Tensor, Vec<usize>) -> Arc<dyn BackwardOp>,
{
    check_cpu(a, op_name)?;
    check_cpu(b, op_name)?;
    // Guards are taken one at a time: `a` and `b` may share storage.
    let (a_data, a_shape) = {
        let guard = a.read_data();
        (guard.data.clone(), guard.shape.clone())
    };
    let requires_grad = a.requires_grad() || b.requires_grad();
    let (output_data, output_shape) = {
        let b_guard = b.read_data();
        let output_shape = broadcast_shapes(&a_shape, &b_guard.shape)?;
        let data = broadcast_binary(&a_data, &a_shape, &b_guard.data, &b_guard.shape, &output_shape, op);
        (data, output_shape)
    };
    let output = Tensor::new(output_data, output_shape.clone())?;
    if requires_grad {
        attach_grad_fn(&output, backward_builder(a.clone(), b.clone(), output_shape));
    }
    Ok(output)
}

/// Sums an upstream gradient down to `target_shape` and scales it.
pub(crate) fn reduce_gradient(
    grad_output: &Tensor,
    target_shape: &[usize],
    scale: f32,
) -> Result<Tensor, RecurraError> {
    let guard = grad_output.read_data();
    let mut reduced = reduce_to_shape(&guard.data, &guard.shape, target_shape);
    if scale != 1.0 {
        reduced.iter_mut().for_each(|v| *v *= scale);
    }
    Tensor::new(reduced, target_shape.to_vec())
}
