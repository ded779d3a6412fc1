//! Bit sequence type for prepared, transmitted and sifted qubits.

use super::SequenceError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A single transmitted symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bit {
    Zero,
    One,
    /// The photon was lost in the channel; nothing was detected.
    Lost,
}

impl Bit {
    /// Converts a classical value into a bit.
    #[inline]
    pub fn from_bool(value: bool) -> Self {
        if value {
            Bit::One
        } else {
            Bit::Zero
        }
    }

    /// Returns the flipped value. A lost symbol stays lost.
    #[inline]
    pub fn flipped(self) -> Self {
        match self {
            Bit::Zero => Bit::One,
            Bit::One => Bit::Zero,
            Bit::Lost => Bit::Lost,
        }
    }

    /// Returns true if the symbol was detected.
    #[inline]
    pub fn is_detected(self) -> bool {
        self != Bit::Lost
    }

    /// Returns the wire symbol.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::Lost => '?',
        }
    }
}

impl TryFrom<char> for Bit {
    type Error = SequenceError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '0' => Ok(Bit::Zero),
            '1' => Ok(Bit::One),
            '?' => Ok(Bit::Lost),
            other => Err(SequenceError::InvalidBit(other)),
        }
    }
}

/// An ordered, immutable sequence of bit symbols.
///
/// Length equals the number of prepared qubits for raw sequences, or
/// the number of retained positions for sifted keys.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitSequence {
    bits: Vec<Bit>,
}

impl BitSequence {
    /// Creates a sequence from raw symbols.
    pub fn new(bits: Vec<Bit>) -> Self {
        Self { bits }
    }

    /// Creates an empty sequence.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the symbols.
    #[inline]
    pub fn as_slice(&self) -> &[Bit] {
        &self.bits
    }

    /// Returns the number of symbols.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns the symbol at `index`.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Bit> {
        self.bits.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Bit> + '_ {
        self.bits.iter().copied()
    }

    /// Returns the first `len` symbols as a new sequence.
    pub fn prefix(&self, len: usize) -> Self {
        Self::new(self.bits[..len.min(self.bits.len())].to_vec())
    }

    /// Counts lost symbols.
    pub fn lost_count(&self) -> usize {
        self.bits.iter().filter(|b| !b.is_detected()).count()
    }

    /// Number of positions where the two sequences differ, over the
    /// common prefix.
    pub fn hamming_distance(&self, other: &BitSequence) -> usize {
        self.bits
            .iter()
            .zip(other.bits.iter())
            .filter(|(a, b)| a != b)
            .count()
    }
}

impl FromIterator<Bit> for BitSequence {
    fn from_iter<I: IntoIterator<Item = Bit>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromStr for BitSequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars().map(Bit::try_from).collect()
    }
}

impl fmt::Display for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in &self.bits {
            write!(f, "{}", bit.symbol())?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitSequence")
            .field("len", &self.bits.len())
            .field("symbols", &self.to_string())
            .finish()
    }
}

impl Serialize for BitSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
