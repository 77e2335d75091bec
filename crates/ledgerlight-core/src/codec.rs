//! Canonical binary encoding.
//!
//! Every hashed or persisted record goes through these functions so the
//! bytes are deterministic: little-endian fixed-width integers, `u64`
//! length prefixes and enum variants tagged by declaration index.

use crate::crypto::hash::{hasher_for, CryptoHash, HashDomain, HashValue};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("Canonical codec error: {reason}")]
pub struct CodecError {
    pub reason: String,
}

impl From<bincode::Error> for CodecError {
    fn from(e: bincode::Error) -> Self {
        Self {
            reason: e.to_string(),
        }
    }
}

pub fn to_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serialize(value)?)
}

pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(bytes)?)
}

/// Hash the canonical encoding of `value` under `domain`.
///
/// Records hashed here are plain data (integers, byte arrays, vectors,
/// maps with ordered keys); encoding them into a hasher cannot fail.
pub fn canonical_hash<T: Serialize + ?Sized>(domain: HashDomain, value: &T) -> HashValue {
    let mut hasher = hasher_for(domain);
    bincode::serialize_into(&mut hasher, value)
        .expect("canonical encoding of an in-memory record into a hasher is infallible");
    hasher.finish()
}

/// Implement [`CryptoHash`] for a serde record under a fixed domain.
macro_rules! impl_crypto_hash {
    ($ty:ty, $domain:expr) => {
        impl $crate::crypto::hash::CryptoHash for $ty {
            fn hash(&self) -> $crate::crypto::hash::HashValue {
                $crate::codec::canonical_hash($domain, self)
            }
        }
    };
}

pub(crate) use impl_crypto_hash;

/// Hashes of a slice of records, in order.
pub fn hash_all<T: CryptoHash>(items: &[T]) -> Vec<HashValue> {
    items.iter().map(CryptoHash::hash).collect()
}
