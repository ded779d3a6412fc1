//! Simplified error reconciliation.

use crate::bits::BitSequence;
use serde::{Deserialize, Serialize};

/// Reconciliation method requested for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCorrection {
    None,
    #[default]
    Cascade,
}

/// Output of reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub alice: BitSequence,
    pub bob: BitSequence,
    /// Mismatches that a real parity-check protocol would have fixed.
    pub corrected: usize,
}

/// Forced-equality reconciler.
///
/// Counts the mismatched positions and then sets Bob's key to Alice's
/// whenever Alice's key is non-empty. No parity exchange happens, so
/// `bob` is not independently verified.
pub fn reconcile(alice_key: &BitSequence, bob_key: &BitSequence) -> Reconciled {
    let corrected = alice_key.hamming_distance(bob_key);
    let bob = if alice_key.is_empty() {
        bob_key.clone()
    } else {
        alice_key.clone()
    };

    Reconciled {
        alice: alice_key.clone(),
        bob,
        corrected,
    }
}

/// Applies `method`, passing keys through unchanged for
/// [`ErrorCorrection::None`].
pub fn apply(method: ErrorCorrection, alice_key: &BitSequence, bob_key: &BitSequence) -> Reconciled {
    match method {
        ErrorCorrection::Cascade => reconcile(alice_key, bob_key),
        ErrorCorrection::None => Reconciled {
            alice: alice_key.clone(),
            bob: bob_key.clone(),
            corrected: 0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_equalizes() {
        let a: BitSequence = "01101".parse().unwrap();
        let b: BitSequence = "11100".parse().unwrap();
        let out = reconcile(&a, &b);

        assert_eq!(out.corrected, 2);
        assert_eq!(out.alice, a);
        assert_eq!(out.bob, a);
    }

    #[test]
    fn test_empty_alice_key_leaves_bob() {
        let b: BitSequence = "1".parse().unwrap();
        let out = reconcile(&BitSequence::empty(), &b);
        assert_eq!(out.bob, b);
        assert_eq!(out.corrected, 0);
    }

    #[test]
    fn test_none_passes_through() {
        let a: BitSequence = "01".parse().unwrap();
        let b: BitSequence = "11".parse().unwrap();
        let out = apply(ErrorCorrection::None, &a, &b);
        assert_eq!(out.bob, b);
        assert_eq!(out.corrected, 0);
    }
}
