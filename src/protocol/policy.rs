//! QBER threshold for the security verdict.

use serde::{Deserialize, Serialize};

/// Standard BB84 QBER bound.
pub const DEFAULT_QBER_THRESHOLD: f64 = 0.11;

/// Single-sample security decision on the QBER.
///
/// No hysteresis and no confidence interval: a run is secure iff its
/// QBER is strictly below the threshold.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Maximum acceptable QBER (exclusive).
    pub threshold: f64,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_QBER_THRESHOLD,
        }
    }
}

impl SecurityPolicy {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// Returns true if `qber` is strictly below the threshold.
    #[inline]
    pub fn is_secure(&self, qber: f64) -> bool {
        qber < self.threshold
    }

    /// Checks `qber`, returning the violation if it is not secure.
    pub fn check(&self, qber: f64) -> Result<(), PolicyViolation> {
        if self.is_secure(qber) {
            Ok(())
        } else {
            Err(PolicyViolation::QberTooHigh {
                observed: qber,
                threshold: self.threshold,
            })
        }
    }
}

/// Policy violation types.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PolicyViolation {
    #[error("QBER {observed:.3} is not below threshold {threshold}")]
    QberTooHigh { observed: f64, threshold: f64 },
}
