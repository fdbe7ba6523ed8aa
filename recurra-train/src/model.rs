use rand::Rng;
use recurra_core::nn::recurrent::Recurrent;
use recurra_core::nn::{Linear, Module, Parameter};
use recurra_core::{RecurraError, Tensor};

use crate::config::TrainerConfig;

/// Maps a digit sequence `(T, B, 1)` to one prediction per sequence `(B, 1)`.
///
/// `Linear(1, H) -> tanh -> Recurrent -> last time step -> Linear(H, 1)`.
#[derive(Debug)]
pub struct BitCountModel {
    input_proj: Linear,
    recurrent: Recurrent,
    output_proj: Linear,
}

impl BitCountModel {
    pub fn new<R: Rng + ?Sized>(config: &TrainerConfig, rng: &mut R) -> Result<Self, RecurraError> {
        let hidden = config.hidden_size;
        Ok(BitCountModel {
            input_proj: Linear::new_with_rng(1, hidden, true, &mut *rng)?,
            recurrent: Recurrent::new_with_rng(config.recurrent_options(), &mut *rng)?,
            output_proj: Linear::new_with_rng(hidden, 1, true, &mut *rng)?,
        })
    }

    pub fn recurrent(&self) -> &Recurrent {
        &self.recurrent
    }
}

impl Module for BitCountModel {
    fn forward(&self, input: &Tensor) -> Result<Tensor, RecurraError> {
        let seq_len = input.shape().first().copied().unwrap_or(0);
        if input.rank() != 3 || seq_len == 0 {
            return Err(RecurraError::ShapeMismatch {
                expected: vec![seq_len.max(1), input.shape().get(1).copied().unwrap_or(1), 1],
                actual: input.shape(),
                operation: "BitCountModel::forward".to_string(),
            });
        }
        let projected = self.input_proj.forward(input)?.tanh()?;
        let sequence = self.recurrent.forward(&projected)?;
        let last = sequence.select(0, seq_len - 1)?;
        self.output_proj.forward(&last)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.named_parameters().into_iter().map(|(_, p)| p).collect()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.named_children()
            .into_iter()
            .flat_map(|(prefix, child)| {
                child
                    .named_parameters()
                    .into_iter()
                    .map(move |(name, p)| (format!("{}.{}", prefix, name), p))
            })
            .collect()
    }

    fn named_children(&self) -> Vec<(String, &dyn Module)> {
        vec![
            ("input_proj".to_string(), &self.input_proj as &dyn Module),
            ("recurrent".to_string(), &self.recurrent as &dyn Module),
            ("output_proj".to_string(), &self.output_proj as &dyn Module),
        ]
    }

    fn set_training(&mut self, training: bool) {
        self.input_proj.set_training(training);
        self.recurrent.set_training(training);
        self.output_proj.set_training(training);
    }

    fn is_training(&self) -> bool {
        self.recurrent.is_training()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use recurra_core::tensor::zeros;

    fn model(config: &TrainerConfig) -> BitCountModel {
        BitCountModel::new(config, &mut StdRng::seed_from_u64(5)).unwrap()
    }

    #[test]
    fn test_forward_shape() {
        let config = TrainerConfig { hidden_size: 8, ..TrainerConfig::gru() };
        let out = model(&config).forward(&zeros(&[5, 16, 1]).unwrap()).unwrap();
        assert_eq!(out.shape(), vec![16, 1]);
    }

    #[test]
    fn test_parameter_names_are_prefixed() {
        let config = TrainerConfig { hidden_size: 4, num_layers: 1, ..TrainerConfig::rnn_tanh() };
        let m = model(&config);
        let names: Vec<String> = m.named_parameters().into_iter().map(|(n, _)| n).collect();
        assert_eq!(
            names,
            vec![
                "input_proj.weight",
                "input_proj.bias",
                "recurrent.weight_ih_l0",
                "recurrent.weight_hh_l0",
                "recurrent.bias_ih_l0",
                "recurrent.bias_hh_l0",
                "output_proj.weight",
                "output_proj.bias",
            ]
        );
        assert_eq!(m.parameters().len(), 8);
        assert_eq!(m.children().len(), 3);
    }

    #[test]
    fn test_set_training_reaches_recurrent_core() {
        let mut m = model(&TrainerConfig::lstm());
        m.set_training(false);
        assert!(!m.recurrent().is_training());
        assert!(!m.is_training());
    }

    #[test]
    fn test_rejects_empty_sequences() {
        let m = model(&TrainerConfig::lstm());
        assert!(m.forward(&zeros(&[0, 4, 1]).unwrap()).is_err());
        assert!(m.forward(&zeros(&[4, 1]).unwrap()).is_err());
    }
}
