use std::sync::Arc;

use crate::autograd::BackwardOp;
use crate::error::RecurraError;
use crate::tensor::Tensor;

use super::{broadcast_binary_op, reduce_gradient};

#[derive(Debug)]
struct SubBackward {
    a: Tensor,
    b: Tensor,
    a_shape: Vec<usize>,
    b_shape: Vec<usize>,
}

impl BackwardOp for SubBackward {
    fn backward(&self, grad_output: &Tensor) -> Result<Vec<Tensor>, RecurraError> {
        Ok(vec![
            reduce_gradient(grad_output, &self.a_shape, 1.0)?,
            reduce_gradient(grad_output, &self.b_shape, -1.0)?,
        ])
    }

    fn inputs(&self) -> Vec<Tensor> {
        vec![self.a.clone(), self.b.clone()]
    }
}

/// Element-wise subtraction `a - b` with broadcasting.
pub(crate) fn sub_op(a: &Tensor, b: &Tensor) -> Result<Tensor, RecurraError> {
    broadcast_binary_op(
        a,
        b,
        |x, y| x - y,
        |a, b, _| {
            let a_shape = a.shape();
            let b_shape = b.shape();
            Arc::new(SubBackward { a, b, a_shape, b_shape })
        },
        "sub",
    )
}

#[cfg(test)]
mod tests {
    use crate::utils::testing::{check_tensor_near, create_test_tensor_with_grad};

    #[test]
    fn test_sub_broadcast_backward() {
        let a = create_test_tensor_with_grad(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
        let b = create_test_tensor_with_grad(vec![0.5, 1.5], vec![2]);
        let c = a.sub(&b).unwrap();
        check_tensor_near(&c, &[2, 2], &[0.5, 0.5, 2.5, 2.5], 1e-6);

        c.sum().unwrap().backward(None).unwrap();
        check_tensor_near(&a.grad().unwrap(), &[2, 2], &[1.0; 4], 1e-6);
        check_tensor_near(&b.grad().unwrap(), &[2], &[-2.0, -2.0], 1e-6);
    }
}
