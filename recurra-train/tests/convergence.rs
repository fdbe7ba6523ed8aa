use recurra_train::{train_until_converged, TrainError, Trainer, TrainerConfig};

mod common;
use common::init_logging;

// Two stacked layers of 32 units, batches of 16 sequences of length 5: the
// running loss must reach 0.01 within 1500 epochs for every variant.

fn converges(config: TrainerConfig) -> Result<bool, TrainError> {
    init_logging();
    train_until_converged(config.with_log_every(250))
}

#[test]
fn test_rnn_tanh_converges() -> Result<(), TrainError> {
    assert!(converges(TrainerConfig::rnn_tanh().with_seed(0))?);
    Ok(())
}

#[test]
fn test_rnn_relu_converges() -> Result<(), TrainError> {
    assert!(converges(TrainerConfig::rnn_relu().with_seed(0))?);
    Ok(())
}

#[test]
fn test_gru_converges() -> Result<(), TrainError> {
    assert!(converges(TrainerConfig::gru().with_seed(0))?);
    Ok(())
}

#[test]
fn test_lstm_converges() -> Result<(), TrainError> {
    init_logging();
    let mut trainer = Trainer::new(TrainerConfig::lstm().with_seed(0).with_log_every(250))?;
    let report = trainer.run()?;
    assert!(report.converged, "{:?}", report);
    assert!(report.running_loss <= 0.01);
    assert!(report.epochs <= 1501);
    Ok(())
}
