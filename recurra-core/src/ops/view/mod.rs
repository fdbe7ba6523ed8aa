//! Shape-manipulating operations.
//!
//! Storage is always contiguous, so every view op materializes its result;
//! the backward passes scatter the upstream gradient back into the input layout.

pub mod narrow;
pub mod reshape;
pub mod select;
pub mod stack;

pub(crate) use narrow::narrow_op;
pub(crate) use reshape::reshape_op;
pub(crate) use select::select_op;
pub(crate) use stack::stack_op;

use crate::error::RecurraError;

pub(crate) fn check_axis(axis: usize, rank: usize) -> Result<(), RecurraError> {
    if axis >= rank {
        return Err(RecurraError::InvalidAxis { axis, rank });
    }
    Ok(())
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
