use thiserror::Error;

/// Which sibling list of a range proof ran dry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiblingSide {
    Left,
    Right,
}

impl std::fmt::Display for SiblingSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SiblingSide::Left => f.write_str("left"),
            SiblingSide::Right => f.write_str("right"),
        }
    }
}

/// Errors during accumulator and sparse Merkle proof verification.
/// Each variant is specific enough to diagnose exactly what went wrong.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofError {
    #[error("Invalid accumulator state: {reason}")]
    InvalidState { reason: String },

    #[error("Too many leaves: {existing} existing + {new} new exceeds the maximum of {max}")]
    TooManyLeaves { existing: u64, new: u64, max: u64 },

    #[error("Too few subtrees to cover {num_new_leaves} new leaves")]
    TooFewSubtrees { num_new_leaves: u64 },

    #[error("Too many subtrees: {extra} left over after covering {num_new_leaves} new leaves")]
    TooManySubtrees { num_new_leaves: u64, extra: usize },

    #[error("Proof verification failed: computed root {computed} does not match expected root {expected}")]
    RootMismatch { computed: String, expected: String },

    #[error("Proof has {got} siblings, more than the maximum of {max}")]
    TooManySiblings { got: usize, max: usize },

    #[error("Leaf index {index} does not fit a proof of depth {depth}")]
    IndexBeyondProof { index: u64, depth: usize },

    #[error("Range proof has {unused} siblings left over after reaching the root")]
    UnusedSiblings { unused: usize },

    #[error("Malformed sibling bitmap: {reason}")]
    BitmapFormatError { reason: String },

    #[error("Adjacent leaf shares only {common_bits} bits with the key but the proof has {siblings} siblings")]
    ImpossibleAdjacentLeaf { common_bits: usize, siblings: usize },

    #[error("Key {key} exists in the proof, cannot prove non-inclusion")]
    KeyExistsInProof { key: String },

    #[error("Proof carries no leaf, cannot prove inclusion")]
    MissingLeaf,

    #[error("Proof leaf does not match the element being proven")]
    LeafMismatch,

    #[error("Empty range must come with empty sibling lists, got {left} left and {right} right siblings")]
    EmptyRangeMismatch { left: usize, right: usize },

    #[error("Range proof is missing a {side} sibling at level {level}")]
    MissingSibling { side: SiblingSide, level: usize },

    #[error("Range proof frontier has {size} hashes where a pairwise fold needs an even count ending in one")]
    UnexpectedFrontierSize { size: usize },

    #[error("Range from index {first_index} with {len} leaves overflows the leaf index space")]
    RangeOverflow { first_index: u64, len: usize },
}

impl ProofError {
    pub(crate) fn root_mismatch(
        computed: &crate::crypto::hash::HashValue,
        expected: &crate::crypto::hash::HashValue,
    ) -> Self {
        ProofError::RootMismatch {
            computed: computed.to_hex(),
            expected: expected.to_hex(),
        }
    }
}
