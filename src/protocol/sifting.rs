//! Basis sifting and error-rate estimation.

use crate::bits::{ensure_paired, BasisSequence, BitSequence, SequenceError};

/// Sifted key pair, equal length by construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiftedKeys {
    pub alice: BitSequence,
    pub bob: BitSequence,
}

impl SiftedKeys {
    #[inline]
    pub fn len(&self) -> usize {
        self.alice.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.alice.is_empty()
    }
}

/// Keeps position `i` iff both parties used the same basis and Bob
/// detected something. Order is preserved.
pub fn sift(
    alice_bits: &BitSequence,
    alice_bases: &BasisSequence,
    bob_bits: &BitSequence,
    bob_bases: &BasisSequence,
) -> Result<SiftedKeys, SequenceError> {
    ensure_paired(alice_bits.len(), alice_bases.len())?;
    ensure_paired(bob_bits.len(), bob_bases.len())?;

    let (alice, bob): (Vec<_>, Vec<_>) = alice_bits
        .iter()
        .zip(alice_bases.iter())
        .zip(bob_bits.iter().zip(bob_bases.iter()))
        .filter(|((_, a_basis), (b_bit, b_basis))| a_basis == b_basis && b_bit.is_detected())
        .map(|((a_bit, _), (b_bit, _))| (a_bit, b_bit))
        .unzip();

    Ok(SiftedKeys {
        alice: BitSequence::new(alice),
        bob: BitSequence::new(bob),
    })
}

/// Quantum bit error rate between two sifted keys.
///
/// Mismatches over the common prefix divided by `alice_key`'s length.
/// An empty key on either side gives 1.0.
pub fn qber(alice_key: &BitSequence, bob_key: &BitSequence) -> f64 {
    if alice_key.is_empty() || bob_key.is_empty() {
        return 1.0;
    }
    alice_key.hamming_distance(bob_key) as f64 / alice_key.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(bits: &str, bases: &str) -> (BitSequence, BasisSequence) {
        (bits.parse().unwrap(), bases.parse().unwrap())
    }

    #[test]
    fn test_sift_keeps_matching_detected_positions() {
        let (a_bits, a_bases) = parse("0110", "+x+x");
        let (b_bits, b_bases) = parse("01?0", "++xx");
        let keys = sift(&a_bits, &a_bases, &b_bits, &b_bases).unwrap();

        // Position 0 matches; 1 and 2 differ in basis; 3 matches.
        assert_eq!(keys.alice.to_string(), "00");
        assert_eq!(keys.bob.to_string(), "00");
    }

    #[test]
    fn test_sift_drops_lost_symbols() {
        let (a_bits, a_bases) = parse("11", "++");
        let (b_bits, b_bases) = parse("?1", "++");
        let keys = sift(&a_bits, &a_bases, &b_bits, &b_bases).unwrap();
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn test_sift_rejects_unpaired_input() {
        let (a_bits, a_bases) = parse("011", "+x");
        let (b_bits, b_bases) = parse("01", "+x");
        assert!(sift(&a_bits, &a_bases, &b_bits, &b_bases).is_err());
    }

    #[test]
    fn test_qber_values() {
        let a: BitSequence = "0101".parse().unwrap();
        let b: BitSequence = "0111".parse().unwrap();
        assert_eq!(qber(&a, &a), 0.0);
        assert_eq!(qber(&a, &b), 0.25);
    }

    #[test]
    fn test_qber_empty_is_maximal() {
        let a: BitSequence = "01".parse().unwrap();
        assert_eq!(qber(&BitSequence::empty(), &BitSequence::empty()), 1.0);
        assert_eq!(qber(&a, &BitSequence::empty()), 1.0);
    }
}
