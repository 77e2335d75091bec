use crate::consensus::validator_verifier::VerificationError;
use crate::proof::error::ProofError;
use thiserror::Error;

/// Errors while advancing or restoring a client's trusted state.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Invalid persisted client state: {reason}")]
    InvalidPersistedState { reason: String },

    #[error("Ledger version {ledger_version} is older than the known version {known_version}")]
    StaleLedgerInfo {
        known_version: u64,
        ledger_version: u64,
    },

    #[error("Ledger info of epoch {epoch} needs a validator change proof")]
    EpochChangeRequired { epoch: u64 },

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error("Client state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
