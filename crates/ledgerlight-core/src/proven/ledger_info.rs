use crate::consensus::validator_verifier::VerificationError;
use crate::consensus::verifier::LedgerInfoVerifier;
use crate::consensus::waypoint::Waypoint;
use crate::crypto::hash::HashValue;
use crate::types::ledger_info::{LedgerInfo, LedgerInfoWithSignatures};
use crate::types::validator::ValidatorSet;
use std::sync::Arc;
use tracing::debug;

/// A ledger info that passed verification. Cheap to clone; every proven
/// object anchored to it shares the same copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProvenLedgerInfo(Arc<LedgerInfo>);

impl ProvenLedgerInfo {
    pub(crate) fn new(ledger_info: LedgerInfo) -> Self {
        Self(Arc::new(ledger_info))
    }

    pub fn ledger_info(&self) -> &LedgerInfo {
        &self.0
    }

    pub fn epoch(&self) -> u64 {
        self.0.epoch
    }

    pub fn round(&self) -> u64 {
        self.0.round
    }

    pub fn version(&self) -> u64 {
        self.0.version
    }

    pub fn timestamp_usecs(&self) -> u64 {
        self.0.timestamp_usecs
    }

    pub fn transaction_accumulator_hash(&self) -> HashValue {
        self.0.transaction_accumulator_hash
    }

    pub fn consensus_block_id(&self) -> HashValue {
        self.0.consensus_block_id
    }

    pub fn next_validator_set(&self) -> Option<&ValidatorSet> {
        self.0.next_validator_set.as_ref()
    }

    pub fn ends_epoch(&self) -> bool {
        self.0.ends_epoch()
    }

    pub fn waypoint(&self) -> Waypoint {
        Waypoint::new_any(&self.0)
    }
}

impl From<&ProvenLedgerInfo> for Waypoint {
    fn from(ledger_info: &ProvenLedgerInfo) -> Self {
        ledger_info.waypoint()
    }
}

impl LedgerInfoWithSignatures {
    /// Authenticate this ledger info with `verifier`.
    pub fn verify<V: LedgerInfoVerifier + ?Sized>(
        &self,
        verifier: &V,
    ) -> Result<ProvenLedgerInfo, VerificationError> {
        verifier.verify(self)?;
        let li = self.ledger_info();
        debug!(epoch = li.epoch, version = li.version, "ledger info verified");
        Ok(ProvenLedgerInfo::new(li.clone()))
    }
}
