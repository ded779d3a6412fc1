//! Qubit symbol types shared by every protocol stage.
//!
//! A run is described by two parallel sequences per party: the bit
//! values (with `?` marking photons that never arrived) and the
//! preparation/measurement bases. Stages consume a sequence and produce
//! a new one; nothing mutates a sequence after construction.

mod basis;
mod sequence;

pub use basis::{Basis, BasisSequence};
pub use sequence::{Bit, BitSequence};

use thiserror::Error;

/// Errors raised while building or pairing sequences.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("invalid bit symbol '{0}' (expected 0, 1 or ?)")]
    InvalidBit(char),
    #[error("invalid basis symbol '{0}' (expected + or x)")]
    InvalidBasis(char),
    #[error("sequence length mismatch: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// Checks that two paired sequences have equal length.
pub fn ensure_paired(left: usize, right: usize) -> Result<(), SequenceError> {
    if left != right {
        return Err(SequenceError::LengthMismatch { left, right });
    }
    Ok(())
}
