use crate::error::RecurraError;
use crate::tensor_data::TensorData;

/// Computes the broadcast shape of two shapes following NumPy rules.
///
/// Shapes are aligned on their trailing dimensions; a dimension of size 1
/// stretches to match the other.
pub(crate) fn broadcast_shapes(shape1: &[usize], shape2: &[usize]) -> Result<Vec<usize>, RecurraError> {
    let rank = shape1.len().max(shape2.len());
    let mut result = vec![0; rank];
    for i in 0..rank {
        let d1 = dim_from_end(shape1, rank - 1 - i);
        let d2 = dim_from_end(shape2, rank - 1 - i);
        result[i] = match (d1, d2) {
            (a, b) if a == b => a,
            (1, b) => b,
            (a, 1) => a,
            _ => {
                return Err(RecurraError::BroadcastError {
                    shape1: shape1.to_vec(),
                    shape2: shape2.to_vec(),
                })
            }
        };
    }
    Ok(result)
}

fn dim_from_end(shape: &[usize], from_end: usize) -> usize {
    if from_end < shape.len() {
        shape[shape.len() - 1 - from_end]
    } else {
        1
    }
}

/// Strides that read `shape`-laid-out data while iterating over `target`.
///
/// Broadcast (size 1) and missing leading dimensions get stride 0.
pub(crate) fn broadcast_strides(shape: &[usize], target: &[usize]) -> Vec<usize> {
    let own = TensorData::calculate_contiguous_strides(shape);
    let offset = target.len() - shape.len();
    (0..target.len())
        .map(|i| {
            if i < offset || shape[i - offset] == 1 {
                0
            } else {
                own[i - offset]
            }
        })
        .collect()
}

/// Maps a linear index in `target` to an offset using broadcast strides.
fn broadcast_offset(mut linear: usize, target: &[usize], strides: &[usize]) -> usize {
    let mut offset = 0;
    for d in (0..target.len()).rev() {
        let dim = target[d];
        if dim == 0 {
            return 0;
        }
        offset += (linear % dim) * strides[d];
        linear /= dim;
    }
    offset
}

/// Applies `op` element-wise over the broadcast of two buffers.
pub(crate) fn broadcast_binary<F>(
    a: &[f32],
    a_shape: &[usize],
    b: &[f32],
    b_shape: &[usize],
    out_shape: &[usize],
    op: F,
) -> Vec<f32>
where
    F: Fn(f32, f32) -> f32,
{
    if a_shape == b_shape {
        return a.iter().zip(b.iter()).map(|(&x, &y)| op(x, y)).collect();
    }
    let numel: usize = out_shape.iter().product();
    let a_strides = broadcast_strides(a_shape, out_shape);
    let b_strides = broadcast_strides(b_shape, out_shape);
    (0..numel)
        .map(|i| {
            let x = a[broadcast_offset(i, out_shape, &a_strides)];
            let y = b[broadcast_offset(i, out_shape, &b_strides)];
            op(x, y)
        })
        .collect()
}

/// Sums a gradient laid out as `grad_shape` back down to `target_shape`.
///
/// This is the adjoint of broadcasting `target_shape` up to `grad_shape`.
pub(crate) fn reduce_to_shape(grad: &[f32], grad_shape: &[usize], target_shape: &[usize]) -> Vec<f32> {
    if grad_shape == target_shape {
        return grad.to_vec();
    }
    let target_numel: usize = target_shape.iter().product();
    let mut reduced = vec![0.0; target_numel];
    let strides = broadcast_strides(target_shape, grad_shape);
    for (i, g) in grad.iter().enumerate() {
        reduced[broadcast_offset(i, grad_shape, &strides)] += g;
    }
    reduced
}
