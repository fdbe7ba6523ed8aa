use log::{debug, warn};
use rand::Rng;

use crate::error::RecurraError;
use crate::nn::{Module, Parameter};
use crate::tensor::{stack, zeros, Tensor};

use super::cell::{CellState, RecurrentCell};
use super::config::RecurrentOptions;

/// Result of a stacked recurrent forward pass.
#[derive(Debug, Clone)]
pub struct RecurrentOutput {
    /// Last layer's hidden state at every time step, `(T, B, H)`.
    pub output: Tensor,
    /// Final state of every layer, `(L, B, H)` or `(2, L, B, H)` for LSTM.
    pub state: Tensor,
}

/// `L` recurrent cells stacked vertically and scanned over the time axis.
///
/// Layer `l > 0` consumes the full output sequence of layer `l - 1`. In
/// training mode the output of every layer but the last goes through dropout
/// before it is handed upwards.
#[derive(Debug)]
pub struct Recurrent {
    options: RecurrentOptions,
    cells: Vec<RecurrentCell>,
    training: bool,
}

impl Recurrent {
    /// Builds the layer with parameters drawn from the thread RNG.
    ///
    /// # Errors
    /// `ConfigurationError` if `options` fail validation.
    pub fn new(options: RecurrentOptions) -> Result<Self, RecurraError> {
        Recurrent::new_with_rng(options, &mut rand::thread_rng())
    }

    pub fn new_with_rng<R: Rng + ?Sized>(
        options: RecurrentOptions,
        rng: &mut R,
    ) -> Result<Self, RecurraError> {
        options.validate()?;
        let kind = options.cell_kind();
        let cells = (0..options.num_layers)
            .map(|layer| {
                RecurrentCell::new(kind, options.layer_input_size(layer), options.hidden_size, &mut *rng)
            })
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Created {} with {} layer(s): input_size={}, hidden_size={}, dropout={}",
            options.mode, options.num_layers, options.input_size, options.hidden_size, options.dropout
        );
        Ok(Recurrent {
            options,
            cells,
            training: true,
        })
    }

    pub fn options(&self) -> &RecurrentOptions {
        &self.options
    }

    pub fn cells(&self) -> &[RecurrentCell] {
        &self.cells
    }

    pub fn state_shape(&self, batch: usize) -> Vec<usize> {
        self.options.state_shape(batch)
    }

    /// Packed all-zeros state for `batch`.
    pub fn zero_state(&self, batch: usize) -> Result<Tensor, RecurraError> {
        zeros(&self.state_shape(batch))
    }

    pub fn train(&mut self) {
        self.training = true;
    }

    pub fn eval(&mut self) {
        self.training = false;
    }

    /// Overwrites every parameter with `f(index, numel)`, one call sequence per
    /// parameter, visiting parameters in [`Module::parameters`] order.
    pub fn init_parameters_with<F>(&self, mut f: F) -> Result<(), RecurraError>
    where
        F: FnMut(usize, usize) -> f32,
    {
        for param in self.parameters() {
            param.init_with(&mut f)?;
        }
        Ok(())
    }

    /// Runs the sequence through every layer.
    ///
    /// # Arguments
    /// * `input`: `(T, B, input_size)`.
    /// * `state`: optional initial state shaped like [`Recurrent::state_shape`];
    ///   zeros are used when absent.
    ///
    /// # Errors
    /// `ShapeMismatch` when the input is not rank 3, its feature size differs
    /// from `input_size`, or `state` does not match the configuration.
    pub fn forward_with_state(
        &self,
        input: &Tensor,
        state: Option<&Tensor>,
    ) -> Result<RecurrentOutput, RecurraError> {
        let shape = input.shape();
        if shape.len() != 3 || shape[2] != self.options.input_size {
            let mut expected = shape.iter().take(2).copied().collect::<Vec<_>>();
            expected.resize(2, 0);
            expected.push(self.options.input_size);
            return Err(RecurraError::ShapeMismatch {
                expected,
                actual: shape,
                operation: format!("{} forward (input)", self.options.mode),
            });
        }
        let (seq_len, batch) = (shape[0], shape[1]);

        let expected_state = self.state_shape(batch);
        if let Some(s) = state {
            let actual = s.shape();
            if actual != expected_state {
                return Err(RecurraError::ShapeMismatch {
                    expected: expected_state,
                    actual,
                    operation: format!("{} forward (initial state)", self.options.mode),
                });
            }
        }

        if seq_len == 0 {
            warn!(
                "{} forward called with a zero-length sequence (batch={}); returning the initial state",
                self.options.mode, batch
            );
            let output = zeros(&[0, batch, self.options.hidden_size])?;
            let state = match state {
                Some(s) => s.clone(),
                None => zeros(&expected_state)?,
            };
            return Ok(RecurrentOutput { output, state });
        }

        debug!(
            "{} forward: seq_len={}, batch={}, layers={}, training={}",
            self.options.mode, seq_len, batch, self.options.num_layers, self.training
        );

        let apply_dropout = self.training && self.options.dropout > 0.0;
        let mut rng = rand::thread_rng();
        let mut sequence = (0..seq_len)
            .map(|t| input.select(0, t))
            .collect::<Result<Vec<_>, _>>()?;
        let mut final_states = Vec::with_capacity(self.cells.len());

        for (layer, cell) in self.cells.iter().enumerate() {
            let mut current = self.initial_cell_state(cell, state, layer, batch)?;
            let mut outputs = Vec::with_capacity(seq_len);
            for x_t in &sequence {
                current = cell.step(x_t, &current)?;
                outputs.push(current.hidden().clone());
            }
            final_states.push(current);

            let is_last = layer + 1 == self.cells.len();
            sequence = if apply_dropout && !is_last {
                outputs
                    .iter()
                    .map(|h| h.dropout(self.options.dropout, true, &mut rng))
                    .collect::<Result<Vec<_>, _>>()?
            } else {
                outputs
            };
        }

        Ok(RecurrentOutput {
            output: stack(&sequence, 0)?,
            state: self.pack_state(&final_states)?,
        })
    }

    /// Layer `layer`'s slice of the caller's packed state, or zeros.
    fn initial_cell_state(
        &self,
        cell: &RecurrentCell,
        state: Option<&Tensor>,
        layer: usize,
        batch: usize,
    ) -> Result<CellState, RecurraError> {
        match state {
            None => cell.zero_state(batch),
            Some(s) if self.options.mode.has_cell_state() => Ok(CellState::HiddenCell(
                s.select(0, 0)?.select(0, layer)?,
                s.select(0, 1)?.select(0, layer)?,
            )),
            Some(s) => Ok(CellState::Hidden(s.select(0, layer)?)),
        }
    }

    fn pack_state(&self, finals: &[CellState]) -> Result<Tensor, RecurraError> {
        let hidden: Vec<Tensor> = finals.iter().map(|s| s.hidden().clone()).collect();
        if !self.options.mode.has_cell_state() {
            return stack(&hidden, 0);
        }
        let cell = finals
            .iter()
            .map(|s| {
                s.cell().cloned().ok_or_else(|| {
                    RecurraError::InternalError("LSTM layer produced a state without a cell component".to_string())
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        stack(&[stack(&hidden, 0)?, stack(&cell, 0)?], 0)
    }
}

impl Module for Recurrent {
    fn forward(&self, input: &Tensor) -> Result<Tensor, RecurraError> {
        self.forward_with_state(input, None).map(|out| out.output)
    }

    fn parameters(&self) -> Vec<&Parameter> {
        self.cells.iter().flat_map(|cell| cell.parameters()).collect()
    }

    fn named_parameters(&self) -> Vec<(String, &Parameter)> {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(layer, cell)| cell.named_parameters(layer))
            .collect()
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }
}

#[cfg(test)]
#[path = "layer_test.rs"]
mod tests;
