use crate::crypto::hash::HashValue;
use bitvec::prelude::*;

/// A fixed-width bit string read most significant bit first.
///
/// Tree walkers use it to turn a leaf index or a key into a path:
/// `bits()` goes root to leaf, `bits_rev()` goes leaf to root. Both
/// yield `(position, bit)` pairs where the position counts up from 0
/// in iteration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitPath {
    bits: BitVec<u8, Msb0>,
}

impl BitPath {
    /// A 64-bit path over a leaf index.
    pub fn from_u64(value: u64) -> Self {
        Self::from_bytes(&value.to_be_bytes())
    }

    /// A path over arbitrary bytes; capacity is `8 * bytes.len()`.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bits: BitVec::from_slice(bytes),
        }
    }

    /// A 256-bit path over a hash key.
    pub fn from_hash(hash: &HashValue) -> Self {
        Self::from_bytes(hash.as_ref())
    }

    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    pub fn leading_zero_count(&self) -> usize {
        self.bits.leading_zeros()
    }

    pub fn trailing_zero_count(&self) -> usize {
        self.bits.trailing_zeros()
    }

    pub fn one_count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Bit at `index`, where index 0 is the most significant bit.
    pub fn get(&self, index: usize) -> Option<bool> {
        self.bits.get(index).map(|bit| *bit)
    }

    /// Most significant bit first.
    pub fn bits(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.bits.iter().by_vals().enumerate()
    }

    /// Least significant bit first.
    pub fn bits_rev(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.bits.iter().by_vals().rev().enumerate()
    }
}
