use crate::consensus::epoch_change::ValidatorChangeProof;
use crate::consensus::verifier::{LedgerInfoVerifier, TrustAnchor};
use crate::crypto::hash::HashValue;
use crate::proof::accumulator::TransactionAccumulator;
use crate::proven::ledger_info::ProvenLedgerInfo;
use crate::sync::consistency::LedgerConsistencyProof;
use crate::sync::error::SyncError;
use crate::sync::state::{ClientState, SyncState};
use crate::types::ledger_info::LedgerInfoWithSignatures;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// What a remote node returns when asked for its latest ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerUpdate {
    pub ledger_info_with_sigs: LedgerInfoWithSignatures,
    /// Required whenever the current anchor cannot verify the ledger info's
    /// epoch on its own.
    pub validator_change_proof: Option<ValidatorChangeProof>,
    pub ledger_consistency_proof: LedgerConsistencyProof,
}

#[derive(Debug)]
struct ClientInner {
    anchor: TrustAnchor,
    accumulator: TransactionAccumulator,
}

/// Tracks the latest trusted ledger and the accumulator up to it.
///
/// An update holds the write lock from the first check to the commit, so
/// readers see either the old state or the new one, never a mix.
#[derive(Debug)]
pub struct LightClient {
    inner: RwLock<ClientInner>,
}

impl LightClient {
    /// A client that trusts `anchor` and has not seen any transaction yet.
    pub fn new(anchor: TrustAnchor) -> Self {
        Self {
            inner: RwLock::new(ClientInner {
                anchor,
                accumulator: TransactionAccumulator::new(),
            }),
        }
    }

    pub fn from_client_state(state: &ClientState) -> Result<Self, SyncError> {
        let anchor = state.trust_anchor()?;
        let accumulator = state.accumulator()?;
        Ok(Self {
            inner: RwLock::new(ClientInner {
                anchor,
                accumulator,
            }),
        })
    }

    /// Verify `update` and advance the client to its ledger info.
    ///
    /// Nothing is committed unless every step succeeds.
    pub fn update_to_latest_ledger(
        &self,
        update: &LedgerUpdate,
    ) -> Result<ProvenLedgerInfo, SyncError> {
        let mut inner = self.inner.write();
        let epoch = update.ledger_info_with_sigs.ledger_info().epoch;

        // 1. Hand trust over to the ledger's epoch if the anchor can't vouch for it
        let change = if inner.anchor.epoch_change_required(epoch) {
            let proof = update
                .validator_change_proof
                .as_ref()
                .ok_or(SyncError::EpochChangeRequired { epoch })?;
            Some(proof.verify(&inner.anchor)?)
        } else {
            None
        };

        // 2. Verify the ledger info itself
        let proven = match &change {
            Some(change) => update.ledger_info_with_sigs.verify(&change.verifier)?,
            None => update.ledger_info_with_sigs.verify(&inner.anchor)?,
        };

        // 3. Never go back in history
        if let Some(known_version) = inner.accumulator.num_leaves().checked_sub(1) {
            if proven.version() < known_version {
                return Err(SyncError::StaleLedgerInfo {
                    known_version,
                    ledger_version: proven.version(),
                });
            }
        }

        // 4. The new ledger must extend what we already trust
        let accumulator = update
            .ledger_consistency_proof
            .extend(&inner.accumulator, &proven)?;

        // 5. Commit
        inner.accumulator = accumulator;
        if let Some(change) = change {
            inner.anchor = TrustAnchor::Validators(change.verifier);
        }

        debug!(
            epoch = proven.epoch(),
            version = proven.version(),
            "client advanced to new ledger info"
        );
        Ok(proven)
    }

    /// `None` until the client has synced at least one ledger info.
    pub fn sync_state(&self) -> Option<SyncState> {
        SyncState::from_accumulator(&self.inner.read().accumulator)
    }

    pub fn client_state(&self) -> ClientState {
        let inner = self.inner.read();
        ClientState::capture(&inner.anchor, &inner.accumulator)
    }

    /// Replace the known accumulator, e.g. with one persisted by the caller.
    pub fn set_known_version(
        &self,
        known_version: u64,
        subtrees: Vec<HashValue>,
    ) -> Result<(), SyncError> {
        let accumulator = SyncState {
            known_version,
            frozen_subtree_roots: subtrees,
        }
        .to_accumulator()?;
        self.inner.write().accumulator = accumulator;
        Ok(())
    }

    pub fn known_version(&self) -> Option<u64> {
        self.inner.read().accumulator.num_leaves().checked_sub(1)
    }

    pub fn trust_anchor(&self) -> TrustAnchor {
        self.inner.read().anchor.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::validator_verifier::{ValidatorVerifier, VerificationError};
    use crate::consensus::waypoint::Waypoint;
    use crate::proof::accumulator::TransactionAccumulatorHasher;
    use crate::proof::error::ProofError;
    use crate::test_utils::{sample_ledger_info, test_leaves, ReferenceTree, TestValidators};
    use crate::types::ledger_info::LedgerInfo;
    use std::collections::BTreeMap;

    type Tree = ReferenceTree<TransactionAccumulatorHasher>;

    /// Ledger info at `num_leaves - 1` over the shared test leaves.
    fn ledger_info(epoch: u64, num_leaves: usize) -> LedgerInfo {
        let root = Tree::new(&test_leaves(num_leaves)).root();
        sample_ledger_info(epoch, num_leaves as u64 - 1, root)
    }

    fn unsigned(ledger_info: LedgerInfo) -> LedgerInfoWithSignatures {
        LedgerInfoWithSignatures::new(ledger_info, BTreeMap::new())
    }

    fn consistency(known: u64, num_leaves: usize) -> LedgerConsistencyProof {
        let tree = Tree::new(&test_leaves(num_leaves));
        LedgerConsistencyProof::new(tree.new_subtrees(known, num_leaves as u64 - known))
    }

    fn update(
        ledger_info_with_sigs: LedgerInfoWithSignatures,
        validator_change_proof: Option<ValidatorChangeProof>,
        ledger_consistency_proof: LedgerConsistencyProof,
    ) -> LedgerUpdate {
        LedgerUpdate {
            ledger_info_with_sigs,
            validator_change_proof,
            ledger_consistency_proof,
        }
    }

    #[test]
    fn test_client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LightClient>();
    }

    #[test]
    fn test_insecure_client_follows_ledger() {
        let client = LightClient::new(TrustAnchor::Insecure);
        assert_eq!(client.known_version(), None);
        assert!(client.sync_state().is_none());

        let first = update(unsigned(ledger_info(1, 5)), None, consistency(0, 5));
        assert_eq!(client.update_to_latest_ledger(&first).unwrap().version(), 4);
        assert_eq!(client.known_version(), Some(4));

        let second = update(unsigned(ledger_info(1, 9)), None, consistency(5, 9));
        client.update_to_latest_ledger(&second).unwrap();
        let state = client.sync_state().unwrap();
        assert_eq!(state.known_version, 8);
        assert_eq!(
            state.to_accumulator().unwrap().root_hash(),
            Tree::new(&test_leaves(9)).root()
        );

        // Re-announcing the same ledger adds nothing and is accepted
        let again = update(unsigned(ledger_info(1, 9)), None, LedgerConsistencyProof::default());
        client.update_to_latest_ledger(&again).unwrap();
        assert_eq!(client.known_version(), Some(8));
        assert!(client.trust_anchor().is_insecure());
    }

    #[test]
    fn test_stale_ledger_info_rejected() {
        let client = LightClient::new(TrustAnchor::Insecure);
        client
            .update_to_latest_ledger(&update(unsigned(ledger_info(1, 9)), None, consistency(0, 9)))
            .unwrap();

        let stale = update(unsigned(ledger_info(1, 5)), None, LedgerConsistencyProof::default());
        assert!(matches!(
            client.update_to_latest_ledger(&stale),
            Err(SyncError::StaleLedgerInfo {
                known_version: 8,
                ledger_version: 4
            })
        ));
        assert_eq!(client.known_version(), Some(8));
    }

    #[test]
    fn test_forked_ledger_leaves_state_untouched() {
        let client = LightClient::new(TrustAnchor::Insecure);
        client
            .update_to_latest_ledger(&update(unsigned(ledger_info(1, 3)), None, consistency(0, 3)))
            .unwrap();
        let before = client.sync_state();

        let mut subtrees = consistency(3, 8).subtrees;
        subtrees[0] = HashValue([0xee; 32]);
        let forked = update(
            unsigned(ledger_info(1, 8)),
            None,
            LedgerConsistencyProof::new(subtrees),
        );
        assert!(matches!(
            client.update_to_latest_ledger(&forked),
            Err(SyncError::Proof(ProofError::RootMismatch { .. }))
        ));
        assert_eq!(client.sync_state(), before);
    }

    #[test]
    fn test_quorum_required_for_validator_anchor() {
        let validators = TestValidators::new(4, 10);
        let client = LightClient::new(ValidatorVerifier::new(&validators.set, 1).unwrap().into());

        let weak = update(validators.sign(&ledger_info(1, 4), 2), None, consistency(0, 4));
        assert!(matches!(
            client.update_to_latest_ledger(&weak),
            Err(SyncError::Verification(VerificationError::TooFewSignatures { .. }))
        ));
        assert_eq!(client.known_version(), None);

        let strong = update(validators.sign(&ledger_info(1, 4), 3), None, consistency(0, 4));
        client.update_to_latest_ledger(&strong).unwrap();
        assert_eq!(client.known_version(), Some(3));
    }

    #[test]
    fn test_waypoint_bootstrap() {
        let validators = TestValidators::new(4, 40);
        let mut genesis = ledger_info(0, 1);
        genesis.next_validator_set = Some(validators.set.clone());
        let waypoint = Waypoint::new_epoch_boundary(&genesis).unwrap();
        let client = LightClient::new(waypoint.into());

        let target = validators.sign(&ledger_info(1, 7), 4);
        let without_proof = update(target.clone(), None, consistency(0, 7));
        assert!(matches!(
            client.update_to_latest_ledger(&without_proof),
            Err(SyncError::EpochChangeRequired { epoch: 1 })
        ));

        let change = ValidatorChangeProof::new(vec![unsigned(genesis)], false);
        let with_proof = update(target, Some(change), consistency(0, 7));
        let proven = client.update_to_latest_ledger(&with_proof).unwrap();
        assert_eq!(proven.epoch(), 1);
        assert_eq!(client.known_version(), Some(6));
        assert_eq!(
            client.trust_anchor(),
            TrustAnchor::Validators(ValidatorVerifier::new(&validators.set, 1).unwrap())
        );
    }

    #[test]
    fn test_epoch_rotation() {
        let epoch1 = TestValidators::new(4, 10);
        let epoch2 = TestValidators::new(3, 20);
        let client = LightClient::new(ValidatorVerifier::new(&epoch1.set, 1).unwrap().into());
        client
            .update_to_latest_ledger(&update(epoch1.sign(&ledger_info(1, 4), 4), None, consistency(0, 4)))
            .unwrap();

        let mut epoch_end = ledger_info(1, 6);
        epoch_end.next_validator_set = Some(epoch2.set.clone());
        let change = ValidatorChangeProof::new(vec![epoch1.sign(&epoch_end, 3)], false);

        // Signed by the old validators: rejected once the new epoch is known
        let forged = update(epoch1.sign(&ledger_info(2, 10), 4), Some(change.clone()), consistency(4, 10));
        assert!(client.update_to_latest_ledger(&forged).is_err());
        assert_eq!(client.known_version(), Some(3));

        let rotated = update(epoch2.sign(&ledger_info(2, 10), 3), Some(change), consistency(4, 10));
        client.update_to_latest_ledger(&rotated).unwrap();
        assert_eq!(client.known_version(), Some(9));
        assert!(matches!(
            client.trust_anchor(),
            TrustAnchor::Validators(verifier) if verifier.epoch() == 2
        ));
    }

    #[test]
    fn test_client_state_restores_client() {
        let validators = TestValidators::new(4, 10);
        let client = LightClient::new(ValidatorVerifier::new(&validators.set, 1).unwrap().into());
        client
            .update_to_latest_ledger(&update(validators.sign(&ledger_info(1, 6), 3), None, consistency(0, 6)))
            .unwrap();

        let json = client.client_state().to_json().unwrap();
        let restored = LightClient::from_client_state(&ClientState::from_json(&json).unwrap()).unwrap();
        assert_eq!(restored.known_version(), Some(5));
        assert_eq!(restored.trust_anchor(), client.trust_anchor());

        restored
            .update_to_latest_ledger(&update(validators.sign(&ledger_info(1, 11), 3), None, consistency(6, 11)))
            .unwrap();
        assert_eq!(restored.known_version(), Some(10));
    }

    #[test]
    fn test_powerless_validator_state_does_not_restore() {
        let mut set = TestValidators::new(4, 10).set;
        for validator in &mut set.validators {
            validator.consensus_voting_power = 0;
        }
        let state = ClientState {
            validator_set: Some(set),
            epoch: 1,
            ..ClientState::default()
        };
        assert!(matches!(
            LightClient::from_client_state(&state),
            Err(SyncError::InvalidPersistedState { .. })
        ));
    }

    #[test]
    fn test_set_known_version() {
        let client = LightClient::new(TrustAnchor::Insecure);
        let acc = TransactionAccumulator::from_leaves(&test_leaves(6)).unwrap();
        client
            .set_known_version(5, acc.frozen_subtree_roots().to_vec())
            .unwrap();
        assert_eq!(client.known_version(), Some(5));

        assert!(matches!(
            client.set_known_version(6, acc.frozen_subtree_roots().to_vec()),
            Err(SyncError::InvalidPersistedState { .. })
        ));
        assert_eq!(client.known_version(), Some(5));

        client
            .update_to_latest_ledger(&update(unsigned(ledger_info(1, 8)), None, consistency(6, 8)))
            .unwrap();
        assert_eq!(client.known_version(), Some(7));
    }
}
