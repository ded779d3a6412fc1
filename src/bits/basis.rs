//! Preparation and measurement bases.

use super::SequenceError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One of the two conjugate BB84 bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Basis {
    /// `+` basis.
    Rectilinear,
    /// `x` basis.
    Diagonal,
}

impl Basis {
    /// Returns the wire symbol.
    #[inline]
    pub fn symbol(self) -> char {
        match self {
            Basis::Rectilinear => '+',
            Basis::Diagonal => 'x',
        }
    }

    #[inline]
    pub fn from_bool(diagonal: bool) -> Self {
        if diagonal {
            Basis::Diagonal
        } else {
            Basis::Rectilinear
        }
    }
}

impl TryFrom<char> for Basis {
    type Error = SequenceError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        match c {
            '+' => Ok(Basis::Rectilinear),
            'x' | 'X' | '×' => Ok(Basis::Diagonal),
            other => Err(SequenceError::InvalidBasis(other)),
        }
    }
}

/// An ordered, immutable sequence of bases, paired with a
/// [`BitSequence`](super::BitSequence) of the same length.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BasisSequence {
    bases: Vec<Basis>,
}

impl BasisSequence {
    pub fn new(bases: Vec<Basis>) -> Self {
        Self { bases }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Basis] {
        &self.bases
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<Basis> {
        self.bases.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = Basis> + '_ {
        self.bases.iter().copied()
    }

    /// Number of positions where both sequences use the same basis.
    pub fn matches(&self, other: &BasisSequence) -> usize {
        self.bases
            .iter()
            .zip(other.bases.iter())
            .filter(|(a, b)| a == b)
            .count()
    }
}

impl FromIterator<Basis> for BasisSequence {
    fn from_iter<I: IntoIterator<Item = Basis>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromStr for BasisSequence {
    type Err = SequenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars().map(Basis::try_from).collect()
    }
}

impl fmt::Display for BasisSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for basis in &self.bases {
            write!(f, "{}", basis.symbol())?;
        }
        Ok(())
    }
}

impl fmt::Debug for BasisSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasisSequence")
            .field("len", &self.bases.len())
            .field("symbols", &self.to_string())
            .finish()
    }
}

impl Serialize for BasisSequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
