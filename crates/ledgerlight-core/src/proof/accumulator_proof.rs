use crate::crypto::bitpath::BitPath;
use crate::crypto::hash::{HashValue, ACCUMULATOR_PLACEHOLDER_HASH};
use crate::proof::accumulator::{
    AccumulatorHasher, EventAccumulatorHasher, TransactionAccumulatorHasher,
    MAX_ACCUMULATOR_PROOF_DEPTH,
};
use crate::proof::error::ProofError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Proof that a leaf sits at a given index of an accumulator.
///
/// Siblings are ordered from the root level down to the leaf level,
/// including placeholder siblings of empty right subtrees.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AccumulatorProof<H> {
    siblings: Vec<HashValue>,
    #[serde(skip)]
    hasher: PhantomData<H>,
}

pub type TransactionAccumulatorProof = AccumulatorProof<TransactionAccumulatorHasher>;
pub type EventAccumulatorProof = AccumulatorProof<EventAccumulatorHasher>;

impl<H: AccumulatorHasher> AccumulatorProof<H> {
    pub fn new(siblings: Vec<HashValue>) -> Self {
        Self {
            siblings,
            hasher: PhantomData,
        }
    }

    /// Expand the compressed wire form.
    ///
    /// `bitmap` is read from the most significant bit with its leading zeros
    /// skipped; each one bit takes the next non-default sibling and each zero
    /// bit stands for a placeholder.
    pub fn from_bitmap(bitmap: u64, non_default_siblings: Vec<HashValue>) -> Result<Self, ProofError> {
        let path = BitPath::from_u64(bitmap);
        if path.one_count() != non_default_siblings.len() {
            return Err(ProofError::BitmapFormatError {
                reason: format!(
                    "bitmap has {} set bits but {} non-default siblings were given",
                    path.one_count(),
                    non_default_siblings.len()
                ),
            });
        }

        let mut non_default = non_default_siblings.into_iter();
        let siblings = path
            .bits()
            .skip(path.leading_zero_count())
            .filter_map(|(_, bit)| {
                if bit {
                    non_default.next()
                } else {
                    Some(ACCUMULATOR_PLACEHOLDER_HASH)
                }
            })
            .collect();
        Ok(Self::new(siblings))
    }

    pub fn siblings(&self) -> &[HashValue] {
        &self.siblings
    }

    /// Verify that `leaf_hash` is the leaf at `leaf_index` of the accumulator
    /// whose root is `expected_root`.
    pub fn verify(
        &self,
        leaf_index: u64,
        leaf_hash: HashValue,
        expected_root: HashValue,
    ) -> Result<(), ProofError> {
        if self.siblings.len() > MAX_ACCUMULATOR_PROOF_DEPTH {
            return Err(ProofError::TooManySiblings {
                got: self.siblings.len(),
                max: MAX_ACCUMULATOR_PROOF_DEPTH,
            });
        }
        // Index bits above the proof's depth would never be hashed
        if leaf_index.checked_shr(self.siblings.len() as u32).unwrap_or(0) != 0 {
            return Err(ProofError::IndexBeyondProof {
                index: leaf_index,
                depth: self.siblings.len(),
            });
        }

        // Walk up from the leaf: a set index bit means we are a right child
        let computed = BitPath::from_u64(leaf_index)
            .bits_rev()
            .zip(self.siblings.iter().rev())
            .fold(leaf_hash, |current, ((_, bit), sibling)| {
                if bit {
                    H::hash_internal(sibling, &current)
                } else {
                    H::hash_internal(&current, sibling)
                }
            });

        if computed != expected_root {
            return Err(ProofError::root_mismatch(&computed, &expected_root));
        }
        Ok(())
    }
}

impl<H> fmt::Debug for AccumulatorProof<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccumulatorProof {{ siblings: {:?} }}", self.siblings)
    }
}

impl<H> PartialEq for AccumulatorProof<H> {
    fn eq(&self, other: &Self) -> bool {
        self.siblings == other.siblings
    }
}

impl<H> Eq for AccumulatorProof<H> {}
