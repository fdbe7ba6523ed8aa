use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;
use recurra_core::nn::{MSELoss, Module, Reduction};
use recurra_core::optim::{Adam, AdamOptions, OptimizerDriver};

use crate::config::TrainerConfig;
use crate::error::TrainError;
use crate::model::BitCountModel;
use crate::task::BitSumTask;

/// Exponential moving average of the training loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningLoss {
    value: f32,
    decay: f32,
}

impl RunningLoss {
    pub fn new(initial: f32, decay: f32) -> Self {
        RunningLoss { value: initial, decay }
    }

    /// `value = decay * value + (1 - decay) * loss`; returns the new value.
    pub fn update(&mut self, loss: f32) -> f32 {
        self.value = self.decay * self.value + (1.0 - self.decay) * loss;
        self.value
    }

    pub fn value(&self) -> f32 {
        self.value
    }
}

/// Outcome of [`Trainer::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingReport {
    pub converged: bool,
    /// Number of optimization steps taken.
    pub epochs: usize,
    pub running_loss: f32,
    pub last_loss: f32,
}

/// Trains a [`BitCountModel`] on [`BitSumTask`] batches until the running
/// loss reaches the threshold or the epoch budget runs out.
#[derive(Debug)]
pub struct Trainer {
    config: TrainerConfig,
    model: BitCountModel,
    driver: OptimizerDriver<Adam>,
    task: BitSumTask,
    loss_fn: MSELoss,
    rng: StdRng,
    running: RunningLoss,
    epoch: usize,
}

impl Trainer {
    /// Builds the model and optimizer described by `config`.
    pub fn new(config: TrainerConfig) -> Result<Self, TrainError> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut model = BitCountModel::new(&config, &mut rng)?;
        model.to_device(config.device)?;
        let driver = OptimizerDriver::new(Adam::new(AdamOptions::new(config.learning_rate))?, &model)?;
        debug!(
            "Trainer: {} model with {} parameters",
            config.mode,
            model.num_parameters()
        );
        Ok(Trainer {
            task: BitSumTask::new(config.seq_len, config.batch_size),
            loss_fn: MSELoss::new(Reduction::Mean),
            running: RunningLoss::new(1.0, config.ema_decay),
            epoch: 0,
            config,
            model,
            driver,
            rng,
        })
    }

    pub fn model(&self) -> &BitCountModel {
        &self.model
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    pub fn running_loss(&self) -> f32 {
        self.running.value()
    }

    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// One forward/backward/update cycle on a fresh batch. Returns the batch loss.
    pub fn train_step(&mut self) -> Result<f32, TrainError> {
        let batch = self.task.sample(&mut self.rng, self.config.device)?;
        let prediction = self.model.forward(&batch.input)?;
        let loss = self.loss_fn.calculate(&prediction, &batch.target)?;

        self.driver.zero_gradients(&self.model)?;
        loss.backward(None)?;
        self.driver.step(&self.model)?;

        let value = loss.item()?;
        self.running.update(value);
        Ok(value)
    }

    /// Steps until `running_loss <= threshold`, giving up once the epoch
    /// counter exceeds `max_epoch`.
    pub fn run(&mut self) -> Result<TrainingReport, TrainError> {
        let mut last_loss = f32::NAN;
        let mut steps = 0;
        while self.running.value() > self.config.threshold {
            last_loss = self.train_step()?;
            steps += 1;
            if self.config.log_every > 0 && self.epoch % self.config.log_every == 0 {
                info!(
                    "{} epoch {}: loss {:.4}, running loss {:.4}",
                    self.config.mode,
                    self.epoch,
                    last_loss,
                    self.running.value()
                );
            }
            if self.epoch > self.config.max_epoch {
                info!(
                    "{} did not converge within {} epochs (running loss {:.4})",
                    self.config.mode,
                    self.config.max_epoch,
                    self.running.value()
                );
                return Ok(self.report(false, steps, last_loss));
            }
            self.epoch += 1;
        }
        info!(
            "{} converged after {} epochs (running loss {:.4})",
            self.config.mode,
            self.epoch,
            self.running.value()
        );
        Ok(self.report(true, steps, last_loss))
    }

    fn report(&self, converged: bool, epochs: usize, last_loss: f32) -> TrainingReport {
        TrainingReport {
            converged,
            epochs,
            running_loss: self.running.value(),
            last_loss,
        }
    }
}

/// Trains a fresh model and reports whether it converged within the budget.
pub fn train_until_converged(config: TrainerConfig) -> Result<bool, TrainError> {
    Ok(Trainer::new(config)?.run()?.converged)
}
