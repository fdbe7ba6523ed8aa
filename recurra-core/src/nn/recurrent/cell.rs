use rand::Rng;

use crate::error::RecurraError;
use crate::nn::init::{default_bound, uniform_};
use crate::nn::Parameter;
use crate::tensor::{zeros, Tensor};

use super::config::{Nonlinearity, RecurrentMode};

/// The per-time-step transition of one recurrent variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellKind {
    /// `h' = f(W_ih x + b_ih + W_hh h + b_hh)`.
    Rnn(Nonlinearity),
    /// Gated recurrent unit, gate order `r, z, n`.
    Gru,
    /// Long short-term memory, gate order `i, f, g, o`.
    Lstm,
}

impl CellKind {
    pub fn mode(&self) -> RecurrentMode {
        match self {
            CellKind::Rnn(_) => RecurrentMode::Rnn,
            CellKind::Gru => RecurrentMode::Gru,
            CellKind::Lstm => RecurrentMode::Lstm,
        }
    }

    pub fn gate_count(&self) -> usize {
        self.mode().gate_count()
    }

    pub fn has_cell_state(&self) -> bool {
        self.mode().has_cell_state()
    }
}

/// State carried between time steps by a single layer. Every component is `(batch, hidden)`.
#[derive(Debug, Clone)]
pub enum CellState {
    Hidden(Tensor),
    HiddenCell(Tensor, Tensor),
}

impl CellState {
    /// The hidden component, which is also the layer's per-step output.
    pub fn hidden(&self) -> &Tensor {
        match self {
            CellState::Hidden(h) | CellState::HiddenCell(h, _) => h,
        }
    }

    pub fn cell(&self) -> Option<&Tensor> {
        match self {
            CellState::Hidden(_) => None,
            CellState::HiddenCell(_, c) => Some(c),
        }
    }

    fn components(&self) -> Vec<&Tensor> {
        match self {
            CellState::Hidden(h) => vec![h],
            CellState::HiddenCell(h, c) => vec![h, c],
        }
    }
}

/// One layer's recurrent transition and its parameters.
///
/// Weights are stored fused across gates: `weight_ih` is `[G·H, I]`,
/// `weight_hh` is `[G·H, H]` and both biases are `[G·H]`, with `G` given by
/// [`CellKind::gate_count`]. Gate `k` occupies rows `k·H..(k+1)·H`.
#[derive(Debug)]
pub struct RecurrentCell {
    kind: CellKind,
    input_size: usize,
    hidden_size: usize,
    weight_ih: Parameter,
    weight_hh: Parameter,
    bias_ih: Parameter,
    bias_hh: Parameter,
}

impl RecurrentCell {
    /// Creates a cell with every parameter drawn from `U(-1/√H, 1/√H)`.
    ///
    /// # Errors
    /// `ConfigurationError` if either size is zero.
    pub fn new<R: Rng + ?Sized>(
        kind: CellKind,
        input_size: usize,
        hidden_size: usize,
        rng: &mut R,
    ) -> Result<Self, RecurraError> {
        if input_size == 0 || hidden_size == 0 {
            return Err(RecurraError::ConfigurationError(format!(
                "recurrent cell sizes must be non-zero, got input_size={} hidden_size={}",
                input_size, hidden_size
            )));
        }
        let gates = kind.gate_count() * hidden_size;
        let bound = default_bound(hidden_size);
        let mut param = |shape: &[usize], name: &str| -> Result<Parameter, RecurraError> {
            let tensor = zeros(shape)?;
            uniform_(&tensor, -bound, bound, &mut *rng)?;
            Parameter::new(tensor, Some(name.to_string()))
        };
        Ok(RecurrentCell {
            kind,
            input_size,
            hidden_size,
            weight_ih: param(&[gates, input_size], "weight_ih")?,
            weight_hh: param(&[gates, hidden_size], "weight_hh")?,
            bias_ih: param(&[gates], "bias_ih")?,
            bias_hh: param(&[gates], "bias_hh")?,
        })
    }

    pub fn kind(&self) -> CellKind {
        self.kind
    }

    pub fn input_size(&self) -> usize {
        self.input_size
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn gate_count(&self) -> usize {
        self.kind.gate_count()
    }

    /// Shape of each state component for `batch`.
    pub fn state_shape(&self, batch: usize) -> Vec<usize> {
        vec![batch, self.hidden_size]
    }

    /// The all-zeros state used when the caller supplies none.
    pub fn zero_state(&self, batch: usize) -> Result<CellState, RecurraError> {
        let shape = self.state_shape(batch);
        Ok(if self.kind.has_cell_state() {
            CellState::HiddenCell(zeros(&shape)?, zeros(&shape)?)
        } else {
            CellState::Hidden(zeros(&shape)?)
        })
    }

    /// Parameters in `weight_ih, weight_hh, bias_ih, bias_hh` order.
    pub fn parameters(&self) -> Vec<&Parameter> {
        vec![&self.weight_ih, &self.weight_hh, &self.bias_ih, &self.bias_hh]
    }

    /// Parameters named with the layer suffix, e.g. `weight_ih_l0`.
    pub fn named_parameters(&self, layer: usize) -> Vec<(String, &Parameter)> {
        self.parameters()
            .into_iter()
            .map(|p| (format!("{}_l{}", p.name().unwrap_or("param"), layer), p))
            .collect()
    }

    /// Advances the state by one time step.
    ///
    /// # Arguments
    /// * `input`: `x_t` of shape `(batch, input_size)`.
    /// * `state`: `s_{t-1}`, whose components are `(batch, hidden_size)`.
    ///
    /// # Errors
    /// `ShapeMismatch` if the input feature size differs from the cell's, if
    /// the state's batch size differs from the input's, or if the state kind
    /// does not match the variant.
    pub fn step(&self, input: &Tensor, state: &CellState) -> Result<CellState, RecurraError> {
        let batch = self.check_step_shapes(input, state)?;
        let h = state.hidden();
        let hidden = self.hidden_size;
        let gi = input.linear(&self.weight_ih, Some(self.bias_ih.tensor()))?;
        let gh = h.linear(&self.weight_hh, Some(self.bias_hh.tensor()))?;
        let gate = |t: &Tensor, k: usize| t.narrow(1, k * hidden, hidden);

        let next = match (self.kind, state) {
            (CellKind::Rnn(nonlinearity), CellState::Hidden(_)) => {
                let pre = gi.add(&gh)?;
                let h_next = match nonlinearity {
                    Nonlinearity::Tanh => pre.tanh()?,
                    Nonlinearity::Relu => pre.relu()?,
                };
                CellState::Hidden(h_next)
            }
            (CellKind::Gru, CellState::Hidden(_)) => {
                let r = gate(&gi, 0)?.add(&gate(&gh, 0)?)?.sigmoid()?;
                let z = gate(&gi, 1)?.add(&gate(&gh, 1)?)?.sigmoid()?;
                let n = gate(&gi, 2)?.add(&r.mul(&gate(&gh, 2)?)?)?.tanh()?;
                // (1 - z) ⊙ n + z ⊙ h
                let h_next = n.add(&z.mul(&h.sub(&n)?)?)?;
                CellState::Hidden(h_next)
            }
            (CellKind::Lstm, CellState::HiddenCell(_, c)) => {
                let pre = gi.add(&gh)?;
                let i = gate(&pre, 0)?.sigmoid()?;
                let f = gate(&pre, 1)?.sigmoid()?;
                let g = gate(&pre, 2)?.tanh()?;
                let o = gate(&pre, 3)?.sigmoid()?;
                let c_next = f.mul(c)?.add(&i.mul(&g)?)?;
                let h_next = o.mul(&c_next.tanh()?)?;
                CellState::HiddenCell(h_next, c_next)
            }
            _ => {
                return Err(RecurraError::ShapeMismatch {
                    expected: self.component_shape(batch),
                    actual: component_shape_of(state, batch, hidden),
                    operation: format!("{:?} cell step (state components)", self.kind),
                })
            }
        };
        Ok(next)
    }

    /// Validates `input` and `state`, returning the batch size.
    fn check_step_shapes(&self, input: &Tensor, state: &CellState) -> Result<usize, RecurraError> {
        let input_shape = input.shape();
        if input_shape.len() != 2 || input_shape[1] != self.input_size {
            let batch = input_shape.first().copied().unwrap_or(0);
            return Err(RecurraError::ShapeMismatch {
                expected: vec![batch, self.input_size],
                actual: input_shape,
                operation: format!("{:?} cell step (input)", self.kind),
            });
        }
        let batch = input_shape[0];
        let expected = self.state_shape(batch);
        for component in state.components() {
            let actual = component.shape();
            if actual != expected {
                return Err(RecurraError::ShapeMismatch {
                    expected,
                    actual,
                    operation: format!("{:?} cell step (state)", self.kind),
                });
            }
        }
        Ok(batch)
    }

    /// `(components, batch, hidden)` as expected by this cell.
    fn component_shape(&self, batch: usize) -> Vec<usize> {
        let components = if self.kind.has_cell_state() { 2 } else { 1 };
        vec![components, batch, self.hidden_size]
    }
}

fn component_shape_of(state: &CellState, batch: usize, hidden: usize) -> Vec<usize> {
    vec![state.components().len(), batch, hidden]
}

#[cfg(test)]
#[path = "cell_test.rs"]
mod tests;
