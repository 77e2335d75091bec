use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use thiserror::Error;
use tiny_keccak::{Hasher, Sha3};

/// Number of bytes in a hash value.
pub const HASH_LENGTH: usize = 32;

/// Suffix appended to every domain tag before it is hashed into a seed.
pub const DOMAIN_SUFFIX: &[u8] = b"@@$$LIBRA$$@@";

/// Hash of an empty accumulator subtree.
pub const ACCUMULATOR_PLACEHOLDER_HASH: HashValue = placeholder(b"ACCUMULATOR_PLACEHOLDER_HASH");

/// Hash of an empty sparse Merkle subtree.
pub const SPARSE_MERKLE_PLACEHOLDER_HASH: HashValue =
    placeholder(b"SPARSE_MERKLE_PLACEHOLDER_HASH");

#[derive(Debug, Error)]
pub enum HashValueError {
    #[error("Invalid hash length: expected {HASH_LENGTH} bytes, got {got}")]
    InvalidLength { got: usize },

    #[error("Invalid hash hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

/// A 32-byte digest identifying a record or a tree node.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct HashValue(pub [u8; HASH_LENGTH]);

impl HashValue {
    pub const fn new(bytes: [u8; HASH_LENGTH]) -> Self {
        Self(bytes)
    }

    pub fn zero() -> Self {
        Self([0u8; HASH_LENGTH])
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashValueError> {
        if bytes.len() != HASH_LENGTH {
            return Err(HashValueError::InvalidLength { got: bytes.len() });
        }
        let mut arr = [0u8; HASH_LENGTH];
        arr.copy_from_slice(bytes);
        Ok(Self(arr))
    }

    /// Parse a hash from hex text, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, HashValueError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn as_bytes(&self) -> &[u8; HASH_LENGTH] {
        &self.0
    }

    /// Number of leading bits shared with `other`, counted from the most significant bit.
    pub fn common_prefix_bits_len(&self, other: &HashValue) -> usize {
        for (i, (a, b)) in self.0.iter().zip(other.0.iter()).enumerate() {
            let diff = a ^ b;
            if diff != 0 {
                return i * 8 + diff.leading_zeros() as usize;
            }
        }
        HASH_LENGTH * 8
    }
}

impl AsRef<[u8]> for HashValue {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashValue({})", self.to_hex())
    }
}

impl fmt::Display for HashValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for HashValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for HashValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            Self::from_hex(&s).map_err(serde::de::Error::custom)
        } else {
            <[u8; HASH_LENGTH]>::deserialize(deserializer).map(Self)
        }
    }
}

/// The record kinds that get their own hash domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HashDomain {
    AccessPath,
    AccountAddress,
    LedgerInfo,
    TransactionAccumulator,
    EventAccumulator,
    SparseMerkleInternal,
    SparseMerkleLeaf,
    AccountStateBlob,
    TransactionInfo,
    RawTransaction,
    SignedTransaction,
    ContractEvent,
    StructTag,
    Waypoint,
}

impl HashDomain {
    /// The tag hashed together with [`DOMAIN_SUFFIX`] to seed this domain.
    pub fn tag(&self) -> &'static [u8] {
        match self {
            HashDomain::AccessPath => b"VM_ACCESS_PATH",
            HashDomain::AccountAddress => b"AccountAddress",
            HashDomain::LedgerInfo => b"LedgerInfo",
            HashDomain::TransactionAccumulator => b"TransactionAccumulator",
            HashDomain::EventAccumulator => b"EventAccumulator",
            HashDomain::SparseMerkleInternal => b"SparseMerkleInternal",
            HashDomain::SparseMerkleLeaf => b"SparseMerkleLeaf",
            HashDomain::AccountStateBlob => b"AccountStateBlob",
            HashDomain::TransactionInfo => b"TransactionInfo",
            HashDomain::RawTransaction => b"RawTransaction",
            HashDomain::SignedTransaction => b"SignedTransaction",
            HashDomain::ContractEvent => b"ContractEvent",
            HashDomain::StructTag => b"StructTag",
            HashDomain::Waypoint => b"WaypointLedgerInfo",
        }
    }
}

/// SHA3-256 hasher whose initial state is the domain seed.
///
/// Every fresh hasher starts from `SHA3-256(tag || DOMAIN_SUFFIX)` already
/// absorbed, so equal byte strings written under different domains never
/// produce the same digest.
#[derive(Clone)]
pub struct DomainHasher {
    seeded: Sha3,
    state: Sha3,
}

impl DomainHasher {
    pub fn update(&mut self, data: &[u8]) {
        self.state.update(data);
    }

    pub fn finish(self) -> HashValue {
        let mut out = [0u8; HASH_LENGTH];
        self.state.finalize(&mut out);
        HashValue(out)
    }

    /// Restore the seeded state, dropping everything written since.
    pub fn reset(&mut self) {
        self.state = self.seeded.clone();
    }
}

impl io::Write for DomainHasher {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Create a fresh hasher seeded for `domain`.
pub fn hasher_for(domain: HashDomain) -> DomainHasher {
    let seed = sha3_256(&[domain.tag(), DOMAIN_SUFFIX]);
    let mut seeded = Sha3::v256();
    seeded.update(&seed.0);
    DomainHasher {
        state: seeded.clone(),
        seeded,
    }
}

/// Hash raw bytes under `domain`.
pub fn hash_bytes(domain: HashDomain, data: &[u8]) -> HashValue {
    let mut hasher = hasher_for(domain);
    hasher.update(data);
    hasher.finish()
}

/// Hash two child nodes into their parent under `domain`.
pub fn hash_pair(domain: HashDomain, left: &HashValue, right: &HashValue) -> HashValue {
    let mut hasher = hasher_for(domain);
    hasher.update(&left.0);
    hasher.update(&right.0);
    hasher.finish()
}

/// Records that have a canonical domain-separated hash.
pub trait CryptoHash {
    fn hash(&self) -> HashValue;
}

/// Plain SHA3-256 over the concatenation of `parts`.
pub fn sha3_256(parts: &[&[u8]]) -> HashValue {
    let mut hasher = Sha3::v256();
    for part in parts {
        hasher.update(part);
    }
    let mut out = [0u8; HASH_LENGTH];
    hasher.finalize(&mut out);
    HashValue(out)
}

// --- Helper functions ---

const fn placeholder(name: &[u8]) -> HashValue {
    let mut out = [0u8; HASH_LENGTH];
    let mut i = 0;
    while i < name.len() {
        out[i] = name[i];
        i += 1;
    }
    HashValue(out)
}
