//! Recurrent layers: plain RNN (tanh or ReLU), GRU and LSTM.
//!
//! [`RecurrentOptions`] describes the stack, [`Recurrent`] owns one
//! [`RecurrentCell`] per layer and scans them over the time axis.

pub mod cell;
pub mod config;
pub mod layer;

pub use cell::{CellKind, CellState, RecurrentCell};
pub use config::{Nonlinearity, RecurrentMode, RecurrentOptions};
pub use layer::{Recurrent, RecurrentOutput};
