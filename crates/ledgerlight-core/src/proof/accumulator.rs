use crate::crypto::hash::{hash_pair, HashDomain, HashValue, ACCUMULATOR_PLACEHOLDER_HASH};
use crate::proof::error::ProofError;
use std::fmt;
use std::marker::PhantomData;

/// Leaf indices are 64-bit, and leaves can only fill half of that space.
pub const MAX_ACCUMULATOR_LEAVES: u64 = 1 << 63;

/// A leaf index has 64 bits, so a proof never needs more siblings than that.
pub const MAX_ACCUMULATOR_PROOF_DEPTH: usize = 64;

/// Node hasher of one accumulator kind.
pub trait AccumulatorHasher: Clone + Copy + Default + fmt::Debug + Send + Sync + 'static {
    const DOMAIN: HashDomain;

    fn hash_internal(left: &HashValue, right: &HashValue) -> HashValue {
        hash_pair(Self::DOMAIN, left, right)
    }
}

/// Ledger-wide accumulator over transaction info hashes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransactionAccumulatorHasher;

impl AccumulatorHasher for TransactionAccumulatorHasher {
    const DOMAIN: HashDomain = HashDomain::TransactionAccumulator;
}

/// Per-transaction accumulator over contract event hashes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EventAccumulatorHasher;

impl AccumulatorHasher for EventAccumulatorHasher {
    const DOMAIN: HashDomain = HashDomain::EventAccumulator;
}

/// Append-only Merkle accumulator kept as its frozen subtree roots.
///
/// A subtree is frozen once it is full. With `num_leaves` leaves there is
/// exactly one frozen subtree per set bit of `num_leaves`, largest (leftmost)
/// first. The root hash pads the tree on the right with placeholder hashes.
#[derive(Clone, PartialEq, Eq)]
pub struct Accumulator<H> {
    frozen_subtree_roots: Vec<HashValue>,
    num_leaves: u64,
    hasher: PhantomData<H>,
}

pub type TransactionAccumulator = Accumulator<TransactionAccumulatorHasher>;
pub type EventAccumulator = Accumulator<EventAccumulatorHasher>;

impl<H: AccumulatorHasher> Accumulator<H> {
    /// An accumulator with no leaves.
    pub fn new() -> Self {
        Self {
            frozen_subtree_roots: Vec::new(),
            num_leaves: 0,
            hasher: PhantomData,
        }
    }

    /// Restore an accumulator from its frozen subtree roots.
    /// Fails unless there is one subtree per set bit of `num_leaves`.
    pub fn from_frozen(
        frozen_subtree_roots: Vec<HashValue>,
        num_leaves: u64,
    ) -> Result<Self, ProofError> {
        if num_leaves > MAX_ACCUMULATOR_LEAVES {
            return Err(ProofError::TooManyLeaves {
                existing: 0,
                new: num_leaves,
                max: MAX_ACCUMULATOR_LEAVES,
            });
        }
        let expected = num_leaves.count_ones() as usize;
        if frozen_subtree_roots.len() != expected {
            return Err(ProofError::InvalidState {
                reason: format!(
                    "{} leaves need {} frozen subtrees, got {}",
                    num_leaves,
                    expected,
                    frozen_subtree_roots.len()
                ),
            });
        }
        Ok(Self {
            frozen_subtree_roots,
            num_leaves,
            hasher: PhantomData,
        })
    }

    /// Build an accumulator by appending every leaf in order.
    pub fn from_leaves(leaves: &[HashValue]) -> Result<Self, ProofError> {
        let mut acc = Self::new();
        for leaf in leaves {
            acc.append_leaf(*leaf)?;
        }
        Ok(acc)
    }

    pub fn num_leaves(&self) -> u64 {
        self.num_leaves
    }

    pub fn frozen_subtree_roots(&self) -> &[HashValue] {
        &self.frozen_subtree_roots
    }

    /// Root hash of the accumulator.
    ///
    /// Folds from the rightmost frozen subtree leftwards. The bits of
    /// `num_leaves` (trailing zeros dropped) say at each level whether a
    /// frozen subtree sits on the left or the right half is padding.
    pub fn root_hash(&self) -> HashValue {
        match self.frozen_subtree_roots.as_slice() {
            [] => return ACCUMULATOR_PLACEHOLDER_HASH,
            [only] => return *only,
            _ => {}
        }

        let mut subtrees = self.frozen_subtree_roots.iter().rev();
        let mut bitmap = self.num_leaves >> self.num_leaves.trailing_zeros();
        let mut current = ACCUMULATOR_PLACEHOLDER_HASH;
        while bitmap > 0 {
            current = if bitmap & 1 != 0 {
                let Some(subtree) = subtrees.next() else {
                    break;
                };
                H::hash_internal(subtree, &current)
            } else {
                H::hash_internal(&current, &ACCUMULATOR_PLACEHOLDER_HASH)
            };
            bitmap >>= 1;
        }
        current
    }

    /// Append one leaf, merging every subtree that becomes full.
    /// On error the accumulator is left unchanged.
    pub fn append_leaf(&mut self, leaf_hash: HashValue) -> Result<(), ProofError> {
        if self.num_leaves >= MAX_ACCUMULATOR_LEAVES {
            return Err(ProofError::TooManyLeaves {
                existing: self.num_leaves,
                new: 1,
                max: MAX_ACCUMULATOR_LEAVES,
            });
        }

        // Each trailing one bit of the old count is a subtree the new leaf completes
        let merges = self.num_leaves.trailing_ones() as usize;
        if self.frozen_subtree_roots.len() < merges {
            return Err(ProofError::InvalidState {
                reason: format!(
                    "appending leaf {} needs {} merges but only {} frozen subtrees exist",
                    self.num_leaves,
                    merges,
                    self.frozen_subtree_roots.len()
                ),
            });
        }

        let mut current = leaf_hash;
        for _ in 0..merges {
            if let Some(left) = self.frozen_subtree_roots.pop() {
                current = H::hash_internal(&left, &current);
            }
        }
        self.frozen_subtree_roots.push(current);
        self.num_leaves += 1;
        Ok(())
    }

    /// Append `num_new_leaves` leaves given as the frozen subtrees they form
    /// once appended, without rehashing individual leaves.
    ///
    /// The first subtrees fill up the existing rightmost frozen subtrees and
    /// merge upwards; the rest are appended as-is and must match the binary
    /// decomposition of the leaves that remain. On error the accumulator is
    /// left unchanged.
    pub fn append_subtrees(
        &mut self,
        subtrees: &[HashValue],
        num_new_leaves: u64,
    ) -> Result<(), ProofError> {
        if num_new_leaves > MAX_ACCUMULATOR_LEAVES - self.num_leaves {
            return Err(ProofError::TooManyLeaves {
                existing: self.num_leaves,
                new: num_new_leaves,
                max: MAX_ACCUMULATOR_LEAVES,
            });
        }
        if num_new_leaves == 0 {
            if subtrees.is_empty() {
                return Ok(());
            }
            return Err(ProofError::TooManySubtrees {
                num_new_leaves,
                extra: subtrees.len(),
            });
        }

        let mut frozen = self.frozen_subtree_roots.clone();
        let mut num_leaves = self.num_leaves;
        let mut remaining = num_new_leaves;
        let mut new_subtrees = subtrees.iter();

        while num_leaves != 0 {
            let rightmost_size = 1u64 << num_leaves.trailing_zeros();
            if rightmost_size > remaining {
                break;
            }
            let mut current = *new_subtrees
                .next()
                .ok_or(ProofError::TooFewSubtrees { num_new_leaves })?;
            let mut mask = rightmost_size;
            while num_leaves & mask != 0 {
                let left = frozen.pop().ok_or_else(|| ProofError::InvalidState {
                    reason: format!("{} leaves but frozen subtrees ran out", num_leaves),
                })?;
                current = H::hash_internal(&left, &current);
                mask <<= 1;
            }
            frozen.push(current);
            num_leaves += rightmost_size;
            remaining -= rightmost_size;
        }

        let rest: Vec<HashValue> = new_subtrees.copied().collect();
        let needed = remaining.count_ones() as usize;
        if rest.len() < needed {
            return Err(ProofError::TooFewSubtrees { num_new_leaves });
        }
        if rest.len() > needed {
            return Err(ProofError::TooManySubtrees {
                num_new_leaves,
                extra: rest.len() - needed,
            });
        }
        frozen.extend(rest);

        self.frozen_subtree_roots = frozen;
        self.num_leaves = num_leaves + remaining;
        Ok(())
    }
}

impl<H: AccumulatorHasher> Default for Accumulator<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> fmt::Debug for Accumulator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Accumulator {{ num_leaves: {}, frozen_subtree_roots: {:?} }}",
            self.num_leaves, self.frozen_subtree_roots
        )
    }
}
