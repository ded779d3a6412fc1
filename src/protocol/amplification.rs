//! Privacy amplification by truncation.

use crate::bits::BitSequence;
use serde::{Deserialize, Serialize};

/// Default share of the key kept by amplification.
pub const DEFAULT_AMPLIFICATION_FACTOR: f64 = 0.5;

/// Amplification method requested for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyAmplification {
    None,
    #[default]
    Standard,
}

/// Keeps the first `max(1, floor(len·factor))` symbols.
///
/// An empty key stays empty. This is a deterministic prefix, not a
/// universal-hash compression.
pub fn amplify(key: &BitSequence, factor: f64) -> BitSequence {
    if key.is_empty() {
        return BitSequence::empty();
    }
    let len = ((key.len() as f64 * factor).floor() as usize).max(1);
    key.prefix(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_halves_key() {
        let key: BitSequence = "0110101".parse().unwrap();
        assert_eq!(amplify(&key, 0.5).to_string(), "011");
    }

    #[test]
    fn test_keeps_at_least_one_symbol() {
        let key: BitSequence = "1".parse().unwrap();
        assert_eq!(amplify(&key, 0.5).to_string(), "1");
    }

    #[test]
    fn test_empty_stays_empty() {
        assert!(amplify(&BitSequence::empty(), 0.5).is_empty());
    }
}
