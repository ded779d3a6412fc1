//! Quantum channel and attacker models.
//!
//! The channel loses and flips symbols depending on fiber distance and
//! noise; the optional eavesdropper sits after it and re-prepares what
//! it measured. Neither model is a faithful detector simulation.

mod eavesdropper;
mod transmission;

pub use eavesdropper::{
    AttackKind, EavesdropperModel, Interception, INTERCEPT_RESEND_DETECTION_PROBABILITY,
};
pub use transmission::{ChannelModel, Transmission, MAX_LOSS_PROBABILITY};

use thiserror::Error;

/// Channel configuration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChannelError {
    #[error("channel {parameter} must be a finite number, got {value}")]
    NonFinite { parameter: &'static str, value: f64 },
}
