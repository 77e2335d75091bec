use crate::codec::{self, impl_crypto_hash, CodecError};
use crate::crypto::hash::{hash_bytes, CryptoHash, HashDomain, HashValue, HASH_LENGTH};
use crate::types::address::AccountAddress;
use crate::types::event::EventHandle;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// First byte of a code access path.
pub const CODE_TAG: u8 = 0;

/// First byte of a resource access path.
pub const RESOURCE_TAG: u8 = 1;

/// Module that publishes the account resource.
pub const ACCOUNT_MODULE_NAME: &str = "LibraAccount";

/// Struct name of the account resource.
pub const ACCOUNT_RESOURCE_NAME: &str = "T";

/// A type argument of a Move struct. Variant indices are hashed.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    Bool,
    U8,
    U64,
    U128,
    Address,
    Vector(Box<TypeTag>),
    Struct(StructTag),
}

/// Fully qualified name of a Move struct, used as the root of resource paths.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StructTag {
    pub address: AccountAddress,
    pub module: String,
    pub name: String,
    pub type_params: Vec<TypeTag>,
}

impl_crypto_hash!(StructTag, HashDomain::StructTag);

impl StructTag {
    pub fn new(address: AccountAddress, module: &str, name: &str) -> Self {
        Self {
            address,
            module: module.to_string(),
            name: name.to_string(),
            type_params: Vec::new(),
        }
    }

    /// Key of this resource inside an account blob: the resource tag byte
    /// followed by the struct tag hash.
    pub fn resource_path(&self) -> Vec<u8> {
        let mut path = Vec::with_capacity(1 + HASH_LENGTH);
        path.push(RESOURCE_TAG);
        path.extend_from_slice(self.hash().as_ref());
        path
    }
}

/// The `0x0.LibraAccount.T` struct tag.
pub fn account_resource_tag() -> StructTag {
    StructTag::new(AccountAddress::default(), ACCOUNT_MODULE_NAME, ACCOUNT_RESOURCE_NAME)
}

/// Blob key of the account resource.
pub fn account_resource_path() -> Vec<u8> {
    account_resource_tag().resource_path()
}

/// A location in global storage: an account and a path inside its blob.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccessPath {
    pub address: AccountAddress,
    pub path: Vec<u8>,
}

impl_crypto_hash!(AccessPath, HashDomain::AccessPath);

impl AccessPath {
    pub fn new(address: AccountAddress, path: Vec<u8>) -> Self {
        Self { address, path }
    }

    /// Path of a resource published under `address`.
    pub fn resource(address: AccountAddress, tag: &StructTag) -> Self {
        Self::new(address, tag.resource_path())
    }
}

/// The account resource: balance, sequence number and event counters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountResource {
    pub authentication_key: Vec<u8>,
    pub balance: u64,
    pub received_events: EventHandle,
    pub sent_events: EventHandle,
    pub sequence_number: u64,
}

impl AccountResource {
    pub fn received_events_count(&self) -> u64 {
        self.received_events.count
    }

    pub fn sent_events_count(&self) -> u64 {
        self.sent_events.count
    }
}

/// Raw encoded account state, the value stored in the state tree.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStateBlob(pub Vec<u8>);

impl AccountStateBlob {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Decode the resource map.
    pub fn decode(&self) -> Result<AccountBlob, CodecError> {
        codec::from_bytes(&self.0)
    }
}

impl CryptoHash for AccountStateBlob {
    fn hash(&self) -> HashValue {
        hash_bytes(HashDomain::AccountStateBlob, &self.0)
    }
}

impl std::fmt::Debug for AccountStateBlob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccountStateBlob({} bytes, hash: {})", self.0.len(), self.hash())
    }
}

/// Decoded account state: resources keyed by their access path.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBlob {
    resources: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl AccountBlob {
    pub fn new(resources: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        Self { resources }
    }

    pub fn resource(&self, path: &[u8]) -> Option<&[u8]> {
        self.resources.get(path).map(Vec::as_slice)
    }

    /// Paths of every resource in the blob, in key order.
    pub fn resource_paths(&self) -> impl Iterator<Item = &[u8]> {
        self.resources.keys().map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Encode into the raw blob stored in the state tree.
    pub fn to_state_blob(&self) -> Result<AccountStateBlob, CodecError> {
        codec::to_bytes(self).map(AccountStateBlob)
    }

    /// Decode the account resource, if the blob holds one.
    pub fn account_resource(&self) -> Result<Option<AccountResource>, CodecError> {
        self.resource(&account_resource_path())
            .map(codec::from_bytes)
            .transpose()
    }
}
