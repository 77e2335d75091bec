use crate::crypto::bitpath::BitPath;
use crate::crypto::hash::HashValue;
use crate::proof::accumulator::{
    AccumulatorHasher, EventAccumulatorHasher, TransactionAccumulatorHasher,
    MAX_ACCUMULATOR_PROOF_DEPTH,
};
use crate::proof::error::{ProofError, SiblingSide};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// Proof that a run of consecutive leaves sits in an accumulator.
///
/// For leaves `[a, b, c]` in the tree below, the proof carries `X` on
/// the left and `Z`, `Y` on the right:
///
/// ```text
///              root
///          /          \
///        X              o
///      /   \         /     \
///     o     o       o       Y
///    / \   / \     / \
///   o   o a   b   c   Z
/// ```
///
/// Both lists are ordered from the root level down to the leaf level.
#[derive(Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct AccumulatorRangeProof<H> {
    left_siblings: Vec<HashValue>,
    right_siblings: Vec<HashValue>,
    #[serde(skip)]
    hasher: PhantomData<H>,
}

pub type TransactionAccumulatorRangeProof = AccumulatorRangeProof<TransactionAccumulatorHasher>;
pub type EventAccumulatorRangeProof = AccumulatorRangeProof<EventAccumulatorHasher>;

impl<H: AccumulatorHasher> AccumulatorRangeProof<H> {
    pub fn new(left_siblings: Vec<HashValue>, right_siblings: Vec<HashValue>) -> Self {
        Self {
            left_siblings,
            right_siblings,
            hasher: PhantomData,
        }
    }

    /// A proof for an empty run of leaves.
    pub fn new_empty() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn left_siblings(&self) -> &[HashValue] {
        &self.left_siblings
    }

    pub fn right_siblings(&self) -> &[HashValue] {
        &self.right_siblings
    }

    /// Verify that `leaf_hashes` are the leaves starting at `first_index` of
    /// the accumulator whose root is `expected_root`.
    ///
    /// An empty run verifies only with empty sibling lists.
    pub fn verify(
        &self,
        first_index: u64,
        leaf_hashes: &[HashValue],
        expected_root: HashValue,
    ) -> Result<(), ProofError> {
        if leaf_hashes.is_empty() {
            if self.left_siblings.is_empty() && self.right_siblings.is_empty() {
                return Ok(());
            }
            return Err(ProofError::EmptyRangeMismatch {
                left: self.left_siblings.len(),
                right: self.right_siblings.len(),
            });
        }

        for siblings in [&self.left_siblings, &self.right_siblings] {
            if siblings.len() > MAX_ACCUMULATOR_PROOF_DEPTH {
                return Err(ProofError::TooManySiblings {
                    got: siblings.len(),
                    max: MAX_ACCUMULATOR_PROOF_DEPTH,
                });
            }
        }

        let last_index = u64::try_from(leaf_hashes.len() - 1)
            .ok()
            .and_then(|offset| first_index.checked_add(offset))
            .ok_or(ProofError::RangeOverflow {
                first_index,
                len: leaf_hashes.len(),
            })?;

        let mut left = self.left_siblings.iter().rev();
        let mut right = self.right_siblings.iter().rev();
        let mut frontier = leaf_hashes.to_vec();

        let first_path = BitPath::from_u64(first_index);
        let last_path = BitPath::from_u64(last_index);
        for ((level, first_bit), (_, last_bit)) in first_path.bits_rev().zip(last_path.bits_rev()) {
            if frontier.len() == 1 && left.len() == 0 && right.len() == 0 {
                break;
            }

            // The first node is a right child: pull in its left neighbour
            if first_bit {
                let sibling = left.next().ok_or(ProofError::MissingSibling {
                    side: SiblingSide::Left,
                    level,
                })?;
                frontier.insert(0, *sibling);
            }
            // The last node is a left child: pull in its right neighbour
            if !last_bit {
                let sibling = right.next().ok_or(ProofError::MissingSibling {
                    side: SiblingSide::Right,
                    level,
                })?;
                frontier.push(*sibling);
            }

            if frontier.len() % 2 != 0 {
                return Err(ProofError::UnexpectedFrontierSize {
                    size: frontier.len(),
                });
            }
            frontier = frontier
                .chunks_exact(2)
                .map(|pair| H::hash_internal(&pair[0], &pair[1]))
                .collect();
        }

        if left.len() != 0 || right.len() != 0 {
            return Err(ProofError::UnusedSiblings {
                unused: left.len() + right.len(),
            });
        }

        match frontier.as_slice() {
            [root] if *root == expected_root => Ok(()),
            [root] => Err(ProofError::root_mismatch(root, &expected_root)),
            _ => Err(ProofError::UnexpectedFrontierSize {
                size: frontier.len(),
            }),
        }
    }
}

impl<H> fmt::Debug for AccumulatorRangeProof<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "AccumulatorRangeProof {{ left_siblings: {:?}, right_siblings: {:?} }}",
            self.left_siblings, self.right_siblings
        )
    }
}

impl<H> PartialEq for AccumulatorRangeProof<H> {
    fn eq(&self, other: &Self) -> bool {
        self.left_siblings == other.left_siblings && self.right_siblings == other.right_siblings
    }
}

impl<H> Eq for AccumulatorRangeProof<H> {}
