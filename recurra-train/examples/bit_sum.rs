//! # Counting ones in binary streams
//!
//! Trains `Linear -> Recurrent -> Linear` to output how many ones a random
//! digit sequence contains, and prints whether the running loss reached the
//! threshold within the epoch budget.
//!
//! ## Running
//! `RUST_LOG=info cargo run --example bit_sum -- [rnn|rnn-relu|gru|lstm] [seed]`

use recurra_train::{TrainError, Trainer, TrainerConfig};

fn main() -> Result<(), TrainError> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let variant = args.next().unwrap_or_else(|| "lstm".to_string());
    let mut config = match variant.as_str() {
        "rnn" | "rnn-tanh" => TrainerConfig::rnn_tanh(),
        "rnn-relu" => TrainerConfig::rnn_relu(),
        other => TrainerConfig::new(other.parse()?),
    };
    if let Some(seed) = args.next() {
        let seed = seed
            .parse::<u64>()
            .map_err(|e| TrainError::InvalidConfig(format!("seed '{}': {}", seed, e)))?;
        config = config.with_seed(seed);
    }

    let mut trainer = Trainer::new(config)?;
    let report = trainer.run()?;
    println!(
        "{} {} after {} epochs: running loss {:.4}, last batch loss {:.4}",
        trainer.config().mode,
        if report.converged { "converged" } else { "did not converge" },
        report.epochs,
        report.running_loss,
        report.last_loss
    );
    Ok(())
}
