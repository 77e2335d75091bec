use crate::codec::canonical_hash;
use crate::consensus::validator_verifier::VerificationError;
use crate::crypto::hash::{HashDomain, HashValue, HASH_LENGTH};
use crate::types::ledger_info::{LedgerInfo, LedgerInfoWithSignatures};
use crate::types::validator::ValidatorSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors from parsing the `<version>:<hash>` text form of a waypoint.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WaypointFormatError {
    #[error("Waypoint is missing the ':' separator")]
    MissingSeparator,

    #[error("Invalid waypoint version: {reason}")]
    InvalidVersion { reason: String },

    #[error("Invalid waypoint hash: {reason}")]
    InvalidHash { reason: String },
}

/// A trusted `(version, hash)` pair a client can bootstrap from.
///
/// The hash covers only the parts of a ledger info that do not depend on
/// consensus details (round, block id), so anyone can recompute it from a
/// ledger info at that version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Waypoint {
    version: u64,
    value: HashValue,
}

/// The ledger info fields a waypoint commits to, in hashing order.
#[derive(Serialize)]
struct WaypointCommitment<'a> {
    epoch: u64,
    transaction_accumulator_hash: HashValue,
    version: u64,
    timestamp_usecs: u64,
    next_validator_set: &'a Option<ValidatorSet>,
}

impl<'a> From<&'a LedgerInfo> for WaypointCommitment<'a> {
    fn from(li: &'a LedgerInfo) -> Self {
        Self {
            epoch: li.epoch,
            transaction_accumulator_hash: li.transaction_accumulator_hash,
            version: li.version,
            timestamp_usecs: li.timestamp_usecs,
            next_validator_set: &li.next_validator_set,
        }
    }
}

impl Waypoint {
    pub fn new(version: u64, value: HashValue) -> Self {
        Self { version, value }
    }

    /// Waypoint of any ledger info.
    pub fn new_any(ledger_info: &LedgerInfo) -> Self {
        let value = canonical_hash(HashDomain::Waypoint, &WaypointCommitment::from(ledger_info));
        Self::new(ledger_info.version, value)
    }

    /// Waypoint of a ledger info that ends an epoch.
    pub fn new_epoch_boundary(ledger_info: &LedgerInfo) -> Result<Self, VerificationError> {
        if !ledger_info.ends_epoch() {
            return Err(VerificationError::MissingNextValidatorSet {
                epoch: ledger_info.epoch,
                version: ledger_info.version,
            });
        }
        Ok(Self::new_any(ledger_info))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn value(&self) -> HashValue {
        self.value
    }

    /// Check that `ledger_info` is exactly the ledger info this waypoint names.
    /// Signatures are not looked at.
    pub fn verify(&self, ledger_info: &LedgerInfoWithSignatures) -> Result<(), VerificationError> {
        let li = ledger_info.ledger_info();
        if li.version != self.version {
            return Err(VerificationError::WaypointVersionMismatch {
                expected: self.version,
                got: li.version,
            });
        }
        let computed = Self::new_any(li);
        if computed.value != self.value {
            return Err(VerificationError::WaypointMismatch {
                expected: self.to_string(),
                got: computed.to_string(),
            });
        }
        Ok(())
    }

    pub fn marshal_text(&self) -> String {
        self.to_string()
    }

    pub fn parse_text(text: &str) -> Result<Self, WaypointFormatError> {
        text.parse()
    }
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.version, self.value.to_hex())
    }
}

impl FromStr for Waypoint {
    type Err = WaypointFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (version, hash) = s
            .split_once(':')
            .ok_or(WaypointFormatError::MissingSeparator)?;
        let version = version
            .parse::<u64>()
            .map_err(|e| WaypointFormatError::InvalidVersion {
                reason: e.to_string(),
            })?;
        if hash.len() != HASH_LENGTH * 2 {
            return Err(WaypointFormatError::InvalidHash {
                reason: format!("expected {} hex characters, got {}", HASH_LENGTH * 2, hash.len()),
            });
        }
        let value = HashValue::from_hex(hash).map_err(|e| WaypointFormatError::InvalidHash {
            reason: e.to_string(),
        })?;
        Ok(Self::new(version, value))
    }
}

impl Serialize for Waypoint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Waypoint {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
