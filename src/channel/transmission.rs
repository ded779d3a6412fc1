//! Lossy, noisy quantum channel.

use super::ChannelError;
use crate::bits::{Bit, BitSequence};
use crate::randomness::ClassicalRng;

/// Ceiling on the per-photon loss probability.
pub const MAX_LOSS_PROBABILITY: f64 = 0.8;

/// Output of a channel transmission.
#[derive(Debug, Clone)]
pub struct Transmission {
    /// Received symbols (`?` where the photon was lost).
    pub received: BitSequence,
    /// Flipped symbols divided by total length.
    pub error_rate: f64,
    pub flips: usize,
    pub losses: usize,
}

/// Distance- and noise-dependent channel.
///
/// Each symbol is an independent trial: lost with probability
/// `min(0.2·distance/100 + noise, 0.8)`, otherwise flipped with
/// probability `noise`, otherwise passed through.
#[derive(Debug, Clone, Copy)]
pub struct ChannelModel {
    distance: f64,
    noise: f64,
}

impl ChannelModel {
    /// Creates a channel. Values are not clamped; only non-finite input
    /// is rejected.
    pub fn new(distance: f64, noise: f64) -> Result<Self, ChannelError> {
        if !distance.is_finite() {
            return Err(ChannelError::NonFinite {
                parameter: "distance",
                value: distance,
            });
        }
        if !noise.is_finite() {
            return Err(ChannelError::NonFinite {
                parameter: "noise",
                value: noise,
            });
        }
        Ok(Self { distance, noise })
    }

    /// Per-symbol loss probability.
    pub fn loss_probability(&self) -> f64 {
        (0.2 * (self.distance / 100.0) + self.noise).min(MAX_LOSS_PROBABILITY)
    }

    /// Sends `bits` through the channel.
    pub fn transmit(&self, bits: &BitSequence, rng: &mut ClassicalRng) -> Transmission {
        let loss = self.loss_probability();
        let mut flips = 0;
        let mut losses = 0;

        let received: BitSequence = bits
            .iter()
            .map(|bit| {
                if rng.unit() < loss {
                    losses += 1;
                    Bit::Lost
                } else if rng.unit() < self.noise {
                    flips += 1;
                    bit.flipped()
                } else {
                    bit
                }
            })
            .collect();

        let error_rate = if bits.is_empty() {
            0.0
        } else {
            flips as f64 / bits.len() as f64
        };

        tracing::debug!(
            loss_probability = loss,
            flips,
            losses,
            error_rate,
            "Channel transmission complete"
        );

        Transmission {
            received,
            error_rate,
            flips,
            losses,
        }
    }
}
