use recurra_core::nn::recurrent::{Nonlinearity, RecurrentMode, RecurrentOptions};
use recurra_core::StorageDevice;

use crate::error::TrainError;

/// Everything the bit-sum harness needs to build and train a model.
///
/// Defaults describe the reference run: two stacked layers of 32 units, Adam
/// at `1e-2`, batches of 16 sequences of 5 digits, and success once the
/// running loss drops to `0.01` within 1500 epochs.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub mode: RecurrentMode,
    pub nonlinearity: Nonlinearity,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub dropout: f32,
    pub batch_size: usize,
    pub seq_len: usize,
    pub learning_rate: f32,
    /// Running-loss value at or below which training counts as converged.
    pub threshold: f32,
    pub max_epoch: usize,
    /// Weight of the previous running loss in the moving average.
    pub ema_decay: f32,
    /// Emit an `info!` line every `log_every` epochs; `0` disables progress lines.
    pub log_every: usize,
    /// Seeds parameter initialization and batch sampling. `None` draws from entropy.
    pub seed: Option<u64>,
    pub device: StorageDevice,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            mode: RecurrentMode::Lstm,
            nonlinearity: Nonlinearity::Tanh,
            hidden_size: 32,
            num_layers: 2,
            dropout: 0.0,
            batch_size: 16,
            seq_len: 5,
            learning_rate: 1e-2,
            threshold: 1e-2,
            max_epoch: 1500,
            ema_decay: 0.99,
            log_every: 100,
            seed: None,
            device: StorageDevice::CPU,
        }
    }
}

impl TrainerConfig {
    pub fn new(mode: RecurrentMode) -> Self {
        TrainerConfig {
            mode,
            ..TrainerConfig::default()
        }
    }

    pub fn lstm() -> Self {
        TrainerConfig::new(RecurrentMode::Lstm)
    }

    pub fn gru() -> Self {
        TrainerConfig::new(RecurrentMode::Gru)
    }

    pub fn rnn_tanh() -> Self {
        TrainerConfig::new(RecurrentMode::Rnn)
    }

    pub fn rnn_relu() -> Self {
        TrainerConfig {
            nonlinearity: Nonlinearity::Relu,
            ..TrainerConfig::new(RecurrentMode::Rnn)
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_max_epoch(mut self, max_epoch: usize) -> Self {
        self.max_epoch = max_epoch;
        self
    }

    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_log_every(mut self, log_every: usize) -> Self {
        self.log_every = log_every;
        self
    }

    /// Options of the recurrent core. It consumes the `tanh`-squashed input
    /// projection, so its input size equals the hidden size.
    pub fn recurrent_options(&self) -> RecurrentOptions {
        RecurrentOptions::new(self.mode, self.hidden_size, self.hidden_size)
            .layers(self.num_layers)
            .nonlinearity(self.nonlinearity)
            .dropout(self.dropout)
    }

    /// # Errors
    /// `InvalidConfig` for empty batches or sequences, a non-positive learning
    /// rate or threshold, or a decay outside `(0, 1)`; `Core` if the recurrent
    /// options are rejected.
    pub fn validate(&self) -> Result<(), TrainError> {
        if self.batch_size == 0 || self.seq_len == 0 {
            return Err(TrainError::InvalidConfig(format!(
                "batch_size and seq_len must be positive, got {} and {}",
                self.batch_size, self.seq_len
            )));
        }
        if !(self.learning_rate > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.threshold > 0.0) {
            return Err(TrainError::InvalidConfig(format!(
                "threshold must be positive, got {}",
                self.threshold
            )));
        }
        if !(self.ema_decay > 0.0 && self.ema_decay < 1.0) {
            return Err(TrainError::InvalidConfig(format!(
                "ema_decay must be in (0, 1), got {}",
                self.ema_decay
            )));
        }
        self.recurrent_options().validate()?;
        Ok(())
    }
}
