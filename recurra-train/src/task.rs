//! The streaming binary-digit-sum task.

use rand::Rng;
use recurra_core::tensor::bernoulli;
use recurra_core::{RecurraError, StorageDevice, Tensor};

/// One training batch.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Digits in `{0, 1}`, shaped `(seq_len, batch, 1)`.
    pub input: Tensor,
    /// Number of ones in each sequence, shaped `(batch, 1)`.
    pub target: Tensor,
}

/// Generates sequences of i.i.d. binary digits whose label is their count of ones.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BitSumTask {
    pub seq_len: usize,
    pub batch_size: usize,
    /// Probability of a digit being one.
    pub p: f32,
}

impl BitSumTask {
    pub fn new(seq_len: usize, batch_size: usize) -> Self {
        BitSumTask {
            seq_len,
            batch_size,
            p: 0.5,
        }
    }

    /// Draws a fresh batch on `device`.
    ///
    /// The target is computed from the sampled digits without gradient tracking.
    pub fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        device: StorageDevice,
    ) -> Result<Batch, RecurraError> {
        let input = bernoulli(&[self.seq_len, self.batch_size, 1], self.p, rng, device)?;
        let target = input.sum_axis(0, false)?.detach();
        Ok(Batch { input, target })
    }
}
