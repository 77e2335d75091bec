use crate::crypto::hash::HashValue;
use crate::proof::accumulator::TransactionAccumulator;
use crate::proof::error::ProofError;
use crate::proven::ledger_info::ProvenLedgerInfo;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The frozen subtrees of the transactions a client has not seen yet, up to
/// a new ledger version.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConsistencyProof {
    pub subtrees: Vec<HashValue>,
}

impl LedgerConsistencyProof {
    pub fn new(subtrees: Vec<HashValue>) -> Self {
        Self { subtrees }
    }

    /// Extend `known` up to `ledger_info.version()` and check the result
    /// against the ledger's accumulator root.
    ///
    /// Proves the ledger only appended to what the client already trusted.
    /// `known` itself is left untouched.
    pub fn extend(
        &self,
        known: &TransactionAccumulator,
        ledger_info: &ProvenLedgerInfo,
    ) -> Result<TransactionAccumulator, ProofError> {
        let target_leaves = ledger_info.version().checked_add(1).ok_or_else(|| {
            ProofError::InvalidState {
                reason: format!("ledger version {} has no leaf count", ledger_info.version()),
            }
        })?;
        let num_new_leaves =
            target_leaves
                .checked_sub(known.num_leaves())
                .ok_or_else(|| ProofError::InvalidState {
                    reason: format!(
                        "ledger has {} leaves but {} are already known",
                        target_leaves,
                        known.num_leaves()
                    ),
                })?;

        let mut extended = known.clone();
        extended.append_subtrees(&self.subtrees, num_new_leaves)?;

        let root = extended.root_hash();
        let expected = ledger_info.transaction_accumulator_hash();
        if root != expected {
            return Err(ProofError::root_mismatch(&root, &expected));
        }

        debug!(
            from = known.num_leaves(),
            to = extended.num_leaves(),
            subtrees = self.subtrees.len(),
            "accumulator extended"
        );
        Ok(extended)
    }
}
