use crate::crypto::bitpath::BitPath;
use crate::crypto::hash::{
    hash_pair, HashDomain, HashValue, HASH_LENGTH, SPARSE_MERKLE_PLACEHOLDER_HASH,
};
use crate::proof::error::ProofError;
use serde::{Deserialize, Serialize};

/// Keys are 256-bit hashes, so the tree is 256 levels deep.
pub const SPARSE_MERKLE_DEPTH: usize = HASH_LENGTH * 8;

/// A leaf of the sparse Merkle tree: a key and the hash of its value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMerkleLeafNode {
    key: HashValue,
    value_hash: HashValue,
}

impl SparseMerkleLeafNode {
    pub fn new(key: HashValue, value_hash: HashValue) -> Self {
        Self { key, value_hash }
    }

    pub fn key(&self) -> HashValue {
        self.key
    }

    pub fn value_hash(&self) -> HashValue {
        self.value_hash
    }

    pub fn hash(&self) -> HashValue {
        hash_pair(HashDomain::SparseMerkleLeaf, &self.key, &self.value_hash)
    }
}

/// Proof of inclusion or non-inclusion of a key in a sparse Merkle tree.
///
/// Siblings run from the root down to the level where the proven leaf (or
/// the empty subtree) sits. Deeper levels are never materialized: a leaf
/// alone in its subtree floats up to the first level where it has a
/// non-empty sibling.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseMerkleProof {
    leaf: Option<SparseMerkleLeafNode>,
    siblings: Vec<HashValue>,
}

impl SparseMerkleProof {
    pub fn new(leaf: Option<SparseMerkleLeafNode>, siblings: Vec<HashValue>) -> Self {
        Self { leaf, siblings }
    }

    /// Expand the compressed wire form.
    ///
    /// Bit `i` of `bitmap` (most significant bit of the first byte is bit 0)
    /// says whether the sibling at depth `i` is non-default. The bitmap ends
    /// at the byte holding the last set bit; a trailing zero byte would be an
    /// over-long encoding.
    pub fn from_bitmap(
        leaf: Option<SparseMerkleLeafNode>,
        bitmap: &[u8],
        non_default_siblings: Vec<HashValue>,
    ) -> Result<Self, ProofError> {
        if bitmap.len() > HASH_LENGTH {
            return Err(ProofError::BitmapFormatError {
                reason: format!("bitmap has {} bytes, at most {} allowed", bitmap.len(), HASH_LENGTH),
            });
        }
        if bitmap.last() == Some(&0) {
            return Err(ProofError::BitmapFormatError {
                reason: "bitmap ends with a zero byte".to_string(),
            });
        }

        let path = BitPath::from_bytes(bitmap);
        if path.one_count() != non_default_siblings.len() {
            return Err(ProofError::BitmapFormatError {
                reason: format!(
                    "bitmap has {} set bits but {} non-default siblings were given",
                    path.one_count(),
                    non_default_siblings.len()
                ),
            });
        }

        let depth = path.capacity() - path.trailing_zero_count();
        let mut non_default = non_default_siblings.into_iter();
        let siblings = path
            .bits()
            .take(depth)
            .filter_map(|(_, bit)| {
                if bit {
                    non_default.next()
                } else {
                    Some(SPARSE_MERKLE_PLACEHOLDER_HASH)
                }
            })
            .collect();
        Ok(Self::new(leaf, siblings))
    }

    pub fn leaf(&self) -> Option<&SparseMerkleLeafNode> {
        self.leaf.as_ref()
    }

    pub fn siblings(&self) -> &[HashValue] {
        &self.siblings
    }

    /// Verify that `element` is in the tree whose root is `expected_root`.
    pub fn verify_inclusion(
        &self,
        element: &SparseMerkleLeafNode,
        expected_root: HashValue,
    ) -> Result<(), ProofError> {
        let leaf = self.leaf.as_ref().ok_or(ProofError::MissingLeaf)?;
        if leaf != element {
            return Err(ProofError::LeafMismatch);
        }
        self.verify_walk(&element.key, leaf.hash(), expected_root)
    }

    /// Verify that no leaf with `key` is in the tree whose root is `expected_root`.
    ///
    /// Either the key's subtree is empty (no leaf in the proof) or it holds
    /// exactly one other leaf, which must share the key's path down to the
    /// depth of the proof.
    pub fn verify_non_inclusion(
        &self,
        key: &HashValue,
        expected_root: HashValue,
    ) -> Result<(), ProofError> {
        let start = match &self.leaf {
            Some(leaf) => {
                if leaf.key == *key {
                    return Err(ProofError::KeyExistsInProof { key: key.to_hex() });
                }
                let common_bits = key.common_prefix_bits_len(&leaf.key);
                if common_bits < self.siblings.len() {
                    return Err(ProofError::ImpossibleAdjacentLeaf {
                        common_bits,
                        siblings: self.siblings.len(),
                    });
                }
                leaf.hash()
            }
            None => SPARSE_MERKLE_PLACEHOLDER_HASH,
        };
        self.verify_walk(key, start, expected_root)
    }

    /// Hash from the proof's deepest level up to the root along `key`'s path.
    fn verify_walk(
        &self,
        key: &HashValue,
        start: HashValue,
        expected_root: HashValue,
    ) -> Result<(), ProofError> {
        if self.siblings.len() > SPARSE_MERKLE_DEPTH {
            return Err(ProofError::TooManySiblings {
                got: self.siblings.len(),
                max: SPARSE_MERKLE_DEPTH,
            });
        }

        // Skip the key bits below the proof's depth
        let computed = BitPath::from_hash(key)
            .bits_rev()
            .skip(SPARSE_MERKLE_DEPTH - self.siblings.len())
            .zip(self.siblings.iter().rev())
            .fold(start, |current, ((_, bit), sibling)| {
                if bit {
                    hash_pair(HashDomain::SparseMerkleInternal, sibling, &current)
                } else {
                    hash_pair(HashDomain::SparseMerkleInternal, &current, sibling)
                }
            });

        if computed != expected_root {
            return Err(ProofError::root_mismatch(&computed, &expected_root));
        }
        Ok(())
    }
}
