use crate::codec::impl_crypto_hash;
use crate::crypto::hash::{HashDomain, HashValue};
use crate::crypto::signature::BlsSignature;
use crate::types::address::AccountAddress;
use crate::types::validator::ValidatorSet;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A ledger checkpoint: the root of the transaction accumulator at a
/// version, plus the consensus metadata validators sign over.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfo {
    pub epoch: u64,
    pub round: u64,
    pub consensus_block_id: HashValue,
    /// Root hash of the transaction accumulator after `version`.
    pub transaction_accumulator_hash: HashValue,
    /// Index of the last transaction; the accumulator holds `version + 1` leaves.
    pub version: u64,
    pub timestamp_usecs: u64,
    /// Present only on the last ledger info of an epoch.
    pub next_validator_set: Option<ValidatorSet>,
    pub consensus_data_hash: HashValue,
}

impl_crypto_hash!(LedgerInfo, HashDomain::LedgerInfo);

impl LedgerInfo {
    /// Whether this ledger info ends its epoch.
    pub fn ends_epoch(&self) -> bool {
        self.next_validator_set.is_some()
    }
}

/// A ledger info with the validator signatures over its hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerInfoWithV0 {
    pub ledger_info: LedgerInfo,
    pub signatures: BTreeMap<AccountAddress, BlsSignature>,
}

/// Versioned envelope of a signed ledger info.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerInfoWithSignatures {
    V0(LedgerInfoWithV0),
}

impl LedgerInfoWithSignatures {
    pub fn new(ledger_info: LedgerInfo, signatures: BTreeMap<AccountAddress, BlsSignature>) -> Self {
        LedgerInfoWithSignatures::V0(LedgerInfoWithV0 {
            ledger_info,
            signatures,
        })
    }

    pub fn ledger_info(&self) -> &LedgerInfo {
        match self {
            LedgerInfoWithSignatures::V0(inner) => &inner.ledger_info,
        }
    }

    pub fn signatures(&self) -> &BTreeMap<AccountAddress, BlsSignature> {
        match self {
            LedgerInfoWithSignatures::V0(inner) => &inner.signatures,
        }
    }
}
