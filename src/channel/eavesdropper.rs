//! Intercept-resend attacker model.

use crate::bits::{ensure_paired, BasisSequence, Bit, BitSequence, SequenceError};
use crate::randomness::ClassicalRng;
use serde::{Deserialize, Serialize};

/// Expected share of sifted bits an intercept-resend attack disturbs.
///
/// Reported as-is; it is never re-estimated from a run.
pub const INTERCEPT_RESEND_DETECTION_PROBABILITY: f64 = 0.25;

/// Attack selected for a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    #[default]
    None,
    InterceptResend,
}

/// What the receiver sees after the attacker acted.
#[derive(Debug, Clone)]
pub struct Interception {
    pub forwarded: BitSequence,
    /// Empty when there was no attack.
    pub eve_bases: BasisSequence,
    pub detection_probability: f64,
}

/// Eavesdropper sitting between channel and receiver.
#[derive(Debug, Clone, Copy)]
pub struct EavesdropperModel {
    kind: AttackKind,
}

impl EavesdropperModel {
    pub fn new(kind: AttackKind) -> Self {
        Self { kind }
    }

    #[inline]
    pub fn kind(&self) -> AttackKind {
        self.kind
    }

    /// Applies the attack to `bits`, which were prepared in
    /// `sender_bases`.
    ///
    /// With intercept-resend, Eve measures every position in a random
    /// basis: a matching basis forwards the original symbol, a mismatch
    /// forwards a uniformly random bit. Lost symbols stay lost on the
    /// matching-basis path.
    pub fn attack(
        &self,
        bits: &BitSequence,
        sender_bases: &BasisSequence,
        rng: &mut ClassicalRng,
    ) -> Result<Interception, SequenceError> {
        ensure_paired(bits.len(), sender_bases.len())?;

        match self.kind {
            AttackKind::None => Ok(Interception {
                forwarded: bits.clone(),
                eve_bases: BasisSequence::empty(),
                detection_probability: 0.0,
            }),
            AttackKind::InterceptResend => {
                let eve_bases = rng.bases(bits.len());
                let forwarded: BitSequence = bits
                    .iter()
                    .zip(sender_bases.iter().zip(eve_bases.iter()))
                    .map(|(bit, (sender, eve))| {
                        if sender == eve {
                            bit
                        } else {
                            Bit::from_bool(rng.unit() < 0.5)
                        }
                    })
                    .collect();

                tracing::debug!(
                    matched_bases = eve_bases.matches(sender_bases),
                    total = bits.len(),
                    "Intercept-resend attack applied"
                );

                Ok(Interception {
                    forwarded,
                    eve_bases,
                    detection_probability: INTERCEPT_RESEND_DETECTION_PROBABILITY,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_attack_passes_through() {
        let bits: BitSequence = "0110".parse().unwrap();
        let bases: BasisSequence = "+x+x".parse().unwrap();
        let out = EavesdropperModel::new(AttackKind::None)
            .attack(&bits, &bases, &mut ClassicalRng::seed_from_u64(1))
            .unwrap();

        assert_eq!(out.forwarded, bits);
        assert!(out.eve_bases.is_empty());
        assert_eq!(out.detection_probability, 0.0);
    }

    #[test]
    fn test_intercept_resend_keeps_matching_positions() {
        let mut rng = ClassicalRng::seed_from_u64(8);
        let bits = rng.bits(200);
        let bases = rng.bases(200);
        let out = EavesdropperModel::new(AttackKind::InterceptResend)
            .attack(&bits, &bases, &mut rng)
            .unwrap();

        assert_eq!(out.forwarded.len(), 200);
        assert_eq!(out.eve_bases.len(), 200);
        assert_eq!(out.detection_probability, 0.25);
        for i in 0..200 {
            if out.eve_bases.get(i) == bases.get(i) {
                assert_eq!(out.forwarded.get(i), bits.get(i));
            }
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let bits: BitSequence = "01".parse().unwrap();
        let bases: BasisSequence = "+".parse().unwrap();
        let result = EavesdropperModel::new(AttackKind::InterceptResend).attack(
            &bits,
            &bases,
            &mut ClassicalRng::seed_from_u64(1),
        );
        assert!(matches!(result, Err(SequenceError::LengthMismatch { .. })));
    }
}
