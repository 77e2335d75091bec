use crate::crypto::hash::CryptoHash;
use crate::proof::accumulator_proof::EventAccumulatorProof;
use crate::proven::error::ProvenError;
use crate::proven::ledger_info::ProvenLedgerInfo;
use crate::proven::transaction_info::TransactionInfoWithProof;
use crate::proven::Proven;
use crate::types::event::ContractEvent;
use serde::{Deserialize, Serialize};

/// An event as served by a remote node, with the proof chaining it to
/// the ledger through its transaction's info.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithProof {
    pub transaction_version: u64,
    pub event_index: u64,
    pub event: ContractEvent,
    pub transaction_info_with_proof: TransactionInfoWithProof,
    pub transaction_info_to_event_proof: EventAccumulatorProof,
}

/// An event together with where it was emitted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventAt {
    transaction_version: u64,
    event_index: u64,
    event: ContractEvent,
}

pub type ProvenEvent = Proven<EventAt>;

impl EventWithProof {
    pub fn verify(&self, ledger_info: &ProvenLedgerInfo) -> Result<ProvenEvent, ProvenError> {
        let info = &self.transaction_info_with_proof.transaction_info;
        self.transaction_info_to_event_proof.verify(
            self.event_index,
            self.event.hash(),
            info.event_root_hash,
        )?;
        self.transaction_info_with_proof
            .verify(ledger_info, self.transaction_version)?;

        Ok(Proven::new(
            EventAt {
                transaction_version: self.transaction_version,
                event_index: self.event_index,
                event: self.event.clone(),
            },
            ledger_info.clone(),
        ))
    }
}

impl EventAt {
    pub fn transaction_version(&self) -> u64 {
        self.transaction_version
    }

    pub fn event_index(&self) -> u64 {
        self.event_index
    }

    pub fn event(&self) -> &ContractEvent {
        &self.event
    }
}
