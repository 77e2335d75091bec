//! # Ledgerlight Core
//!
//! Pure Rust light client verification for a replicated, validator-signed
//! ledger.
//!
//! This crate contains **no networking code**. Everything a remote node
//! returns is treated as untrusted input and passes through these
//! verification functions before any of it is exposed.
//!
//! ## Trust Model
//!
//! - **Ledger infos** (`consensus` module): A ledger info is trusted once
//!   validators holding more than 2/3 of the epoch's voting power signed it
//!   with BLS12-381, or once it matches a waypoint the user supplied.
//!
//! - **Ledger data** (`proof` and `proven` modules): Transactions, events and
//!   account states are checked with accumulator and sparse Merkle proofs
//!   against a trusted ledger info. Zero trust assumptions beyond that
//!   ledger info.
//!
//! - **Client sync** (`sync` module): A client only moves forward, and every
//!   new ledger info must extend the accumulator it already trusts.
//!
//! ## Usage
//!
//! ```ignore
//! use ledgerlight_core::sync::{LightClient, LedgerUpdate};
//! use ledgerlight_core::consensus::Waypoint;
//!
//! let client = LightClient::new(waypoint.into());
//! let ledger_info = client.update_to_latest_ledger(&update)?;
//! let account = account_with_proof.verify(address, &ledger_info)?;
//! ```

pub mod codec;
pub mod consensus;
pub mod crypto;
pub mod proof;
pub mod proven;
pub mod sync;
pub mod types;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types for convenience
pub use consensus::{
    epoch_change::{EpochChange, ValidatorChangeProof},
    validator_verifier::{ValidatorVerifier, VerificationError},
    verifier::{LedgerInfoVerifier, TrustAnchor},
    waypoint::{Waypoint, WaypointFormatError},
};
pub use crypto::hash::{CryptoHash, HashValue};
pub use proof::error::ProofError;
pub use proven::{error::ProvenError, ledger_info::ProvenLedgerInfo, Proven};
pub use sync::{
    client::{LedgerUpdate, LightClient},
    error::SyncError,
    state::{ClientState, SyncState},
};
pub use types::{
    account::AccountStateBlob, address::AccountAddress, ledger_info::LedgerInfoWithSignatures,
};
