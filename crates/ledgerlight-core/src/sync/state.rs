use crate::consensus::validator_verifier::ValidatorVerifier;
use crate::consensus::verifier::TrustAnchor;
use crate::consensus::waypoint::Waypoint;
use crate::crypto::hash::HashValue;
use crate::proof::accumulator::TransactionAccumulator;
use crate::sync::error::SyncError;
use crate::types::validator::ValidatorSet;
use serde::{Deserialize, Serialize};

/// Value of [`ClientState::waypoint`] that selects the insecure anchor.
pub const INSECURE_WAYPOINT: &str = "insecure";

/// The client's running checkpoint: the last ledger version it trusts and
/// the frozen subtrees of the accumulator at that version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub known_version: u64,
    pub frozen_subtree_roots: Vec<HashValue>,
}

impl SyncState {
    /// `None` for an accumulator without leaves.
    pub fn from_accumulator(accumulator: &TransactionAccumulator) -> Option<Self> {
        let known_version = accumulator.num_leaves().checked_sub(1)?;
        Some(Self {
            known_version,
            frozen_subtree_roots: accumulator.frozen_subtree_roots().to_vec(),
        })
    }

    /// Rebuild the accumulator, checking the subtree count against the version.
    pub fn to_accumulator(&self) -> Result<TransactionAccumulator, SyncError> {
        let num_leaves = self.known_version.checked_add(1).ok_or_else(|| {
            SyncError::InvalidPersistedState {
                reason: format!("known version {} is out of range", self.known_version),
            }
        })?;
        TransactionAccumulator::from_frozen(self.frozen_subtree_roots.clone(), num_leaves).map_err(
            |e| SyncError::InvalidPersistedState {
                reason: e.to_string(),
            },
        )
    }
}

/// Everything a client needs to resume: what it trusts and how far it got.
///
/// Trust comes from exactly one of: a validator set with its epoch, a
/// waypoint in text form, or the literal `"insecure"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validator_set: Option<ValidatorSet>,
    #[serde(default)]
    pub epoch: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_version: Option<u64>,
    #[serde(default)]
    pub subtrees: Vec<HashValue>,
}

impl ClientState {
    pub fn from_json(json: &str) -> Result<Self, SyncError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SyncError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Describe `anchor` and `accumulator` as a client state.
    pub fn capture(anchor: &TrustAnchor, accumulator: &TransactionAccumulator) -> Self {
        let mut state = ClientState::default();
        match anchor {
            TrustAnchor::Validators(verifier) => {
                state.validator_set = Some(verifier.validator_set().clone());
                state.epoch = verifier.epoch();
            }
            TrustAnchor::Waypoint(waypoint) => state.waypoint = Some(waypoint.to_string()),
            TrustAnchor::Insecure => state.waypoint = Some(INSECURE_WAYPOINT.to_string()),
        }
        if let Some(sync) = SyncState::from_accumulator(accumulator) {
            state.known_version = Some(sync.known_version);
            state.subtrees = sync.frozen_subtree_roots;
        }
        state
    }

    pub fn trust_anchor(&self) -> Result<TrustAnchor, SyncError> {
        if let Some(set) = &self.validator_set {
            let verifier = ValidatorVerifier::new(set, self.epoch).map_err(|e| {
                SyncError::InvalidPersistedState {
                    reason: e.to_string(),
                }
            })?;
            return Ok(TrustAnchor::Validators(verifier));
        }
        match self.waypoint.as_deref() {
            Some(INSECURE_WAYPOINT) => Ok(TrustAnchor::Insecure),
            Some(text) => {
                let waypoint: Waypoint = text.parse().map_err(|e| SyncError::InvalidPersistedState {
                    reason: format!("waypoint: {}", e),
                })?;
                Ok(TrustAnchor::Waypoint(waypoint))
            }
            None => Err(SyncError::InvalidPersistedState {
                reason: "no waypoint or validator set".to_string(),
            }),
        }
    }

    pub fn accumulator(&self) -> Result<TransactionAccumulator, SyncError> {
        match self.known_version {
            Some(known_version) => SyncState {
                known_version,
                frozen_subtree_roots: self.subtrees.clone(),
            }
            .to_accumulator(),
            None if self.subtrees.is_empty() => Ok(TransactionAccumulator::new()),
            None => Err(SyncError::InvalidPersistedState {
                reason: format!("{} subtrees but no known version", self.subtrees.len()),
            }),
        }
    }
}
