use crate::crypto::hash::CryptoHash;
use crate::proof::accumulator_proof::TransactionAccumulatorProof;
use crate::proven::error::ProvenError;
use crate::proven::ledger_info::ProvenLedgerInfo;
use crate::types::transaction::TransactionInfo;
use serde::{Deserialize, Serialize};

/// A transaction info and the proof that it sits at some version of the
/// transaction accumulator. Every per-version proof ends in one of these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfoWithProof {
    pub ledger_info_to_transaction_info_proof: TransactionAccumulatorProof,
    pub transaction_info: TransactionInfo,
}

impl TransactionInfoWithProof {
    pub fn new(
        ledger_info_to_transaction_info_proof: TransactionAccumulatorProof,
        transaction_info: TransactionInfo,
    ) -> Self {
        Self {
            ledger_info_to_transaction_info_proof,
            transaction_info,
        }
    }

    /// Verify that the transaction info is the leaf at `version` of the
    /// accumulator committed by `ledger_info`.
    pub fn verify(&self, ledger_info: &ProvenLedgerInfo, version: u64) -> Result<(), ProvenError> {
        if version > ledger_info.version() {
            return Err(ProvenError::VersionExceedsCheckpoint {
                version,
                ledger_version: ledger_info.version(),
            });
        }
        self.ledger_info_to_transaction_info_proof.verify(
            version,
            self.transaction_info.hash(),
            ledger_info.transaction_accumulator_hash(),
        )?;
        Ok(())
    }
}
