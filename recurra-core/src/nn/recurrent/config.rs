use std::fmt;
use std::str::FromStr;

use crate::error::RecurraError;

use super::cell::CellKind;

/// Recurrent variant selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecurrentMode {
    Rnn,
    Gru,
    Lstm,
}

impl RecurrentMode {
    /// Number of fused gate blocks in the weight matrices (`G`).
    pub fn gate_count(self) -> usize {
        match self {
            RecurrentMode::Rnn => 1,
            RecurrentMode::Gru => 3,
            RecurrentMode::Lstm => 4,
        }
    }

    /// `true` for variants that carry a cell component next to the hidden state.
    pub fn has_cell_state(self) -> bool {
        matches!(self, RecurrentMode::Lstm)
    }
}

impl FromStr for RecurrentMode {
    type Err = RecurraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rnn" => Ok(RecurrentMode::Rnn),
            "gru" => Ok(RecurrentMode::Gru),
            "lstm" => Ok(RecurrentMode::Lstm),
            _ => Err(RecurraError::ConfigurationError(format!(
                "Unknown recurrent mode '{}', expected one of rnn, gru, lstm",
                s
            ))),
        }
    }
}

impl fmt::Display for RecurrentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecurrentMode::Rnn => "RNN",
            RecurrentMode::Gru => "GRU",
            RecurrentMode::Lstm => "LSTM",
        };
        write!(f, "{}", name)
    }
}

/// Activation of the plain RNN cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Nonlinearity {
    #[default]
    Tanh,
    Relu,
}

impl FromStr for Nonlinearity {
    type Err = RecurraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tanh" => Ok(Nonlinearity::Tanh),
            "relu" => Ok(Nonlinearity::Relu),
            _ => Err(RecurraError::ConfigurationError(format!(
                "Unknown nonlinearity '{}', expected tanh or relu",
                s
            ))),
        }
    }
}

impl fmt::Display for Nonlinearity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Nonlinearity::Tanh => write!(f, "tanh"),
            Nonlinearity::Relu => write!(f, "relu"),
        }
    }
}

/// Configuration of a stacked recurrent layer.
///
/// Built with the `rnn` / `gru` / `lstm` constructors and the chainable
/// setters, then frozen inside [`Recurrent`](super::Recurrent) after
/// [`validate`](RecurrentOptions::validate) succeeds.
///
/// ```
/// use recurra_core::nn::recurrent::RecurrentOptions;
///
/// let options = RecurrentOptions::lstm(128, 64).layers(3).dropout(0.2);
/// assert!(options.validate().is_ok());
/// assert_eq!(options.state_shape(16), vec![2, 3, 16, 64]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecurrentOptions {
    pub mode: RecurrentMode,
    pub input_size: usize,
    pub hidden_size: usize,
    pub num_layers: usize,
    pub nonlinearity: Nonlinearity,
    /// Dropout applied to the output of every layer but the last, in training mode.
    pub dropout: f32,
}

impl RecurrentOptions {
    pub fn new(mode: RecurrentMode, input_size: usize, hidden_size: usize) -> Self {
        RecurrentOptions {
            mode,
            input_size,
            hidden_size,
            num_layers: 1,
            nonlinearity: Nonlinearity::Tanh,
            dropout: 0.0,
        }
    }

    pub fn rnn(input_size: usize, hidden_size: usize) -> Self {
        RecurrentOptions::new(RecurrentMode::Rnn, input_size, hidden_size)
    }

    pub fn gru(input_size: usize, hidden_size: usize) -> Self {
        RecurrentOptions::new(RecurrentMode::Gru, input_size, hidden_size)
    }

    pub fn lstm(input_size: usize, hidden_size: usize) -> Self {
        RecurrentOptions::new(RecurrentMode::Lstm, input_size, hidden_size)
    }

    pub fn layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    pub fn dropout(mut self, p: f32) -> Self {
        self.dropout = p;
        self
    }

    pub fn nonlinearity(mut self, nonlinearity: Nonlinearity) -> Self {
        self.nonlinearity = nonlinearity;
        self
    }

    pub fn relu(self) -> Self {
        self.nonlinearity(Nonlinearity::Relu)
    }

    pub fn tanh(self) -> Self {
        self.nonlinearity(Nonlinearity::Tanh)
    }

    /// Checks the configuration.
    ///
    /// # Errors
    /// `ConfigurationError` for zero sizes, zero layers, a dropout probability
    /// outside `[0, 1]`, or a ReLU nonlinearity on a gated variant.
    pub fn validate(&self) -> Result<(), RecurraError> {
        if self.input_size == 0 || self.hidden_size == 0 {
            return Err(RecurraError::ConfigurationError(format!(
                "{} sizes must be non-zero, got input_size={} hidden_size={}",
                self.mode, self.input_size, self.hidden_size
            )));
        }
        if self.num_layers == 0 {
            return Err(RecurraError::ConfigurationError(format!(
                "{} needs at least one layer",
                self.mode
            )));
        }
        if !(0.0..=1.0).contains(&self.dropout) {
            return Err(RecurraError::ConfigurationError(format!(
                "dropout should be a number in range [0, 1] representing the probability of an element being zeroed, got {}",
                self.dropout
            )));
        }
        if self.mode != RecurrentMode::Rnn && self.nonlinearity != Nonlinearity::Tanh {
            return Err(RecurraError::ConfigurationError(format!(
                "nonlinearity {} is only supported by plain RNN, not {}",
                self.nonlinearity, self.mode
            )));
        }
        Ok(())
    }

    /// The per-step transition every layer of this configuration uses.
    pub fn cell_kind(&self) -> CellKind {
        match self.mode {
            RecurrentMode::Rnn => CellKind::Rnn(self.nonlinearity),
            RecurrentMode::Gru => CellKind::Gru,
            RecurrentMode::Lstm => CellKind::Lstm,
        }
    }

    /// Input feature size of layer `layer`: `input_size` for the first, `hidden_size` above it.
    pub fn layer_input_size(&self, layer: usize) -> usize {
        if layer == 0 {
            self.input_size
        } else {
            self.hidden_size
        }
    }

    /// Shape of the packed state for `batch`:
    /// `(layers, batch, hidden)`, or `(2, layers, batch, hidden)` for LSTM.
    pub fn state_shape(&self, batch: usize) -> Vec<usize> {
        let base = vec![self.num_layers, batch, self.hidden_size];
        if self.mode.has_cell_state() {
            let mut shape = vec![2];
            shape.extend(base);
            shape
        } else {
            base
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_and_setters() {
        let o = RecurrentOptions::rnn(4, 8);
        assert_eq!(o.num_layers, 1);
        assert_eq!(o.nonlinearity, Nonlinearity::Tanh);
        assert_eq!(o.dropout, 0.0);

        let o = o.layers(2).dropout(0.5).relu();
        assert_eq!(o.num_layers, 2);
        assert_eq!(o.dropout, 0.5);
        assert_eq!(o.cell_kind(), CellKind::Rnn(Nonlinearity::Relu));
        assert!(o.validate().is_ok());
        assert_eq!(o.tanh().nonlinearity, Nonlinearity::Tanh);
    }

    #[test]
    fn test_state_shapes() {
        assert_eq!(RecurrentOptions::gru(1, 32).layers(2).state_shape(16), vec![2, 16, 32]);
        assert_eq!(
            RecurrentOptions::lstm(1, 32).layers(2).state_shape(16),
            vec![2, 2, 16, 32]
        );
    }

    #[test]
    fn test_layer_input_size() {
        let o = RecurrentOptions::lstm(128, 64).layers(3);
        assert_eq!(o.layer_input_size(0), 128);
        assert_eq!(o.layer_input_size(2), 64);
    }

    #[test]
    fn test_validation_errors() {
        let invalid = [
            RecurrentOptions::rnn(0, 4),
            RecurrentOptions::rnn(4, 0),
            RecurrentOptions::gru(4, 4).layers(0),
            RecurrentOptions::lstm(4, 4).dropout(1.5),
            RecurrentOptions::lstm(4, 4).dropout(-0.1),
            RecurrentOptions::lstm(4, 4).dropout(f32::NAN),
            RecurrentOptions::gru(4, 4).relu(),
            RecurrentOptions::lstm(4, 4).relu(),
        ];
        for options in invalid.iter() {
            assert!(
                matches!(options.validate(), Err(RecurraError::ConfigurationError(_))),
                "{:?} should be rejected",
                options
            );
        }
        assert!(RecurrentOptions::lstm(4, 4).dropout(1.0).validate().is_ok());
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!("LSTM".parse::<RecurrentMode>().unwrap(), RecurrentMode::Lstm);
        assert_eq!("gru".parse::<RecurrentMode>().unwrap(), RecurrentMode::Gru);
        assert!("transformer".parse::<RecurrentMode>().is_err());
        assert_eq!("relu".parse::<Nonlinearity>().unwrap(), Nonlinearity::Relu);
        assert!("gelu".parse::<Nonlinearity>().is_err());
        assert_eq!(RecurrentMode::Gru.gate_count(), 3);
        assert_eq!(RecurrentMode::Lstm.to_string(), "LSTM");
    }
}
