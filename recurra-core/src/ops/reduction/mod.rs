pub mod mean;
pub mod norm;
pub mod sum;

pub(crate) use mean::mean_op;
pub(crate) use norm::norm_op;
pub(crate) use sum::{sum_axis_op, sum_op};

/// Splits `shape` around `axis` into `(outer, axis_len, inner)` element counts.
pub(crate) fn split_at_axis(shape: &[usize], axis: usize) -> (usize, usize, usize) {
    let outer = shape[..axis].iter().product();
    let inner = shape[axis + 1..].iter().product();
    (outer, shape[axis], inner)
}

#[cfg(test)]
#[path = "reduction_test.rs"]
mod tests;
