use crate::codec::CodecError;
use crate::consensus::validator_verifier::VerificationError;
use crate::crypto::signature::SignatureError;
use crate::proof::error::ProofError;
use thiserror::Error;

/// Errors while proving data returned by a remote node against a verified
/// ledger info.
#[derive(Debug, Error)]
pub enum ProvenError {
    #[error(transparent)]
    Proof(#[from] ProofError),

    #[error(transparent)]
    Verification(#[from] VerificationError),

    #[error("Version {version} is beyond the verified ledger version {ledger_version}")]
    VersionExceedsCheckpoint { version: u64, ledger_version: u64 },

    #[error("Transaction versions are not contiguous: expected {expected}, got {got}")]
    NonContiguousVersions { expected: u64, got: u64 },

    #[error("Transaction {version} hashes to {computed} but its info commits to {expected}")]
    TransactionHashMismatch {
        version: u64,
        computed: String,
        expected: String,
    },

    #[error("Events of transaction {version} have root {computed} but its info commits to {expected}")]
    EventRootHashMismatch {
        version: u64,
        computed: String,
        expected: String,
    },

    #[error("Invalid sender signature on transaction {version}: {reason}")]
    InvalidSenderSignature { version: u64, reason: SignatureError },

    #[error("Length mismatch: {expected} {what} expected, got {got}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("Resource not found at path {path}")]
    ResourceNotFound { path: String },

    #[error(transparent)]
    Codec(#[from] CodecError),
}
