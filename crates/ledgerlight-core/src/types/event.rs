use crate::codec::impl_crypto_hash;
use crate::crypto::hash::{CryptoHash, HashDomain, HashValue};
use crate::proof::accumulator::EventAccumulator;
use crate::proof::error::ProofError;
use serde::{Deserialize, Serialize};

/// Identifies an event stream, usually owned by an account resource.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventKey(pub Vec<u8>);

/// Handle to an event stream: its key and how many events it has emitted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventHandle {
    pub count: u64,
    pub key: EventKey,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractEventV0 {
    pub key: EventKey,
    pub sequence_number: u64,
    pub data: Vec<u8>,
}

/// An event emitted by a transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    V0(ContractEventV0),
}

impl_crypto_hash!(ContractEvent, HashDomain::ContractEvent);

impl ContractEvent {
    pub fn new(key: EventKey, sequence_number: u64, data: Vec<u8>) -> Self {
        ContractEvent::V0(ContractEventV0 {
            key,
            sequence_number,
            data,
        })
    }

    pub fn key(&self) -> &EventKey {
        match self {
            ContractEvent::V0(e) => &e.key,
        }
    }

    pub fn sequence_number(&self) -> u64 {
        match self {
            ContractEvent::V0(e) => e.sequence_number,
        }
    }

    pub fn data(&self) -> &[u8] {
        match self {
            ContractEvent::V0(e) => &e.data,
        }
    }
}

/// Root of the event accumulator over `events`, as committed in a
/// transaction info. No events gives the placeholder hash.
pub fn event_root_hash(events: &[ContractEvent]) -> Result<HashValue, ProofError> {
    let mut acc = EventAccumulator::new();
    for event in events {
        acc.append_leaf(event.hash())?;
    }
    Ok(acc.root_hash())
}
