use crate::consensus::validator_verifier::{ValidatorVerifier, VerificationError};
use crate::consensus::verifier::LedgerInfoVerifier;
use crate::proven::ledger_info::ProvenLedgerInfo;
use crate::types::ledger_info::LedgerInfoWithSignatures;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Epoch-ending ledger infos that hand trust from one validator set to the
/// next. Each one is signed by the validators of its own epoch and names the
/// validators of the following epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorChangeProof {
    pub ledger_info_with_sigs: Vec<LedgerInfoWithSignatures>,
    /// The remote node truncated the chain; more epochs follow.
    pub more: bool,
}

/// Outcome of a validator change: the last epoch-ending ledger info and the
/// verifier for the epoch it opens.
#[derive(Clone, Debug)]
pub struct EpochChange {
    pub ledger_info: ProvenLedgerInfo,
    pub verifier: ValidatorVerifier,
}

impl ValidatorChangeProof {
    pub fn new(ledger_info_with_sigs: Vec<LedgerInfoWithSignatures>, more: bool) -> Self {
        Self {
            ledger_info_with_sigs,
            more,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ledger_info_with_sigs.is_empty()
    }

    /// Walk the chain starting from `anchor`.
    ///
    /// The first ledger info is checked by `anchor`, every later one by the
    /// validator set its predecessor announced. Epochs must strictly increase
    /// and every ledger info must carry the next validator set.
    pub fn verify<V: LedgerInfoVerifier + ?Sized>(
        &self,
        anchor: &V,
    ) -> Result<EpochChange, VerificationError> {
        let (first, rest) = self
            .ledger_info_with_sigs
            .split_first()
            .ok_or(VerificationError::EmptyValidatorChange)?;

        let mut change = Self::next_epoch(first, anchor)?;
        for ledger_info in rest {
            let previous = change.ledger_info.epoch();
            let epoch = ledger_info.ledger_info().epoch;
            if epoch <= previous {
                return Err(VerificationError::NonIncreasingEpoch {
                    previous,
                    got: epoch,
                });
            }
            change = Self::next_epoch(ledger_info, &change.verifier)?;
        }

        debug!(
            epochs = self.ledger_info_with_sigs.len(),
            new_epoch = change.verifier.epoch(),
            validators = change.verifier.len(),
            "validator change verified"
        );
        Ok(change)
    }

    // --- Helper functions ---

    fn next_epoch<V: LedgerInfoVerifier + ?Sized>(
        ledger_info: &LedgerInfoWithSignatures,
        verifier: &V,
    ) -> Result<EpochChange, VerificationError> {
        let proven = ledger_info.verify(verifier)?;
        let next_set = proven
            .next_validator_set()
            .ok_or(VerificationError::MissingNextValidatorSet {
                epoch: proven.epoch(),
                version: proven.version(),
            })?;
        let verifier = ValidatorVerifier::new(next_set, proven.epoch().saturating_add(1))?;
        Ok(EpochChange {
            ledger_info: proven,
            verifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::verifier::TrustAnchor;
    use crate::consensus::waypoint::Waypoint;
    use crate::crypto::hash::HashValue;
    use crate::test_utils::{sample_ledger_info, TestValidators};
    use crate::types::ledger_info::LedgerInfo;
    use std::collections::BTreeMap;

    fn epoch_ending(epoch: u64, version: u64, next: &TestValidators) -> LedgerInfo {
        let mut li = sample_ledger_info(epoch, version, HashValue([version as u8; 32]));
        li.next_validator_set = Some(next.set.clone());
        li
    }

    #[test]
    fn test_chain_of_two_epochs() {
        let epoch1 = TestValidators::new(4, 10);
        let epoch2 = TestValidators::new(4, 20);
        let epoch3 = TestValidators::new(3, 30);

        let proof = ValidatorChangeProof::new(
            vec![
                epoch1.sign(&epoch_ending(1, 10, &epoch2), 3),
                epoch2.sign(&epoch_ending(2, 20, &epoch3), 4),
            ],
            false,
        );
        let anchor = ValidatorVerifier::new(&epoch1.set, 1).unwrap();
        let change = proof.verify(&anchor).unwrap();

        assert_eq!(change.ledger_info.epoch(), 2);
        assert_eq!(change.ledger_info.version(), 20);
        assert_eq!(change.verifier.epoch(), 3);
        assert_eq!(change.verifier.validator_set(), &epoch3.set);
    }

    #[test]
    fn test_waypoint_bootstraps_chain() {
        let genesis_validators = TestValidators::new(4, 40);
        let genesis = epoch_ending(0, 0, &genesis_validators);
        let anchor = TrustAnchor::Waypoint(Waypoint::new_epoch_boundary(&genesis).unwrap());

        let proof = ValidatorChangeProof::new(
            vec![LedgerInfoWithSignatures::new(genesis, BTreeMap::new())],
            false,
        );
        let change = proof.verify(&anchor).unwrap();
        assert_eq!(change.verifier.epoch(), 1);
        assert_eq!(change.verifier.validator_set(), &genesis_validators.set);
    }

    #[test]
    fn test_empty_proof_rejected() {
        let anchor = TrustAnchor::Insecure;
        let proof = ValidatorChangeProof::new(vec![], false);
        assert!(proof.is_empty());
        assert_eq!(
            proof.verify(&anchor).unwrap_err(),
            VerificationError::EmptyValidatorChange
        );
    }

    #[test]
    fn test_missing_next_validator_set_rejected() {
        let validators = TestValidators::new(4, 10);
        let li = sample_ledger_info(1, 10, HashValue::zero());
        let proof = ValidatorChangeProof::new(vec![validators.sign(&li, 4)], false);
        let anchor = ValidatorVerifier::new(&validators.set, 1).unwrap();
        assert_eq!(
            proof.verify(&anchor).unwrap_err(),
            VerificationError::MissingNextValidatorSet {
                epoch: 1,
                version: 10
            }
        );
    }

    #[test]
    fn test_repeated_epoch_rejected() {
        let validators = TestValidators::new(4, 10);
        let first = validators.sign(&epoch_ending(1, 10, &validators), 4);
        let proof = ValidatorChangeProof::new(vec![first.clone(), first], false);
        assert_eq!(
            proof.verify(&TrustAnchor::Insecure).unwrap_err(),
            VerificationError::NonIncreasingEpoch {
                previous: 1,
                got: 1
            }
        );
    }

    #[test]
    fn test_skipped_epoch_rejected_by_verifier() {
        let epoch1 = TestValidators::new(4, 10);
        let epoch2 = TestValidators::new(4, 20);
        let proof = ValidatorChangeProof::new(
            vec![
                epoch1.sign(&epoch_ending(1, 10, &epoch2), 4),
                epoch2.sign(&epoch_ending(3, 30, &epoch2), 4),
            ],
            false,
        );
        let anchor = ValidatorVerifier::new(&epoch1.set, 1).unwrap();
        assert_eq!(
            proof.verify(&anchor).unwrap_err(),
            VerificationError::EpochMismatch {
                expected: 2,
                got: 3
            }
        );
    }

    #[test]
    fn test_forged_handover_rejected() {
        let epoch1 = TestValidators::new(4, 10);
        let epoch2 = TestValidators::new(4, 20);
        let impostors = TestValidators::new(4, 90);
        let proof = ValidatorChangeProof::new(
            vec![
                epoch1.sign(&epoch_ending(1, 10, &epoch2), 4),
                impostors.sign(&epoch_ending(2, 20, &impostors), 4),
            ],
            false,
        );
        let anchor = ValidatorVerifier::new(&epoch1.set, 1).unwrap();
        assert!(matches!(
            proof.verify(&anchor),
            Err(VerificationError::UnknownAuthor { .. })
        ));
    }

    #[test]
    fn test_powerless_next_validator_set_rejected() {
        let epoch1 = TestValidators::new(4, 10);
        let mut powerless = TestValidators::new(4, 20);
        for validator in &mut powerless.set.validators {
            validator.consensus_voting_power = 0;
        }
        let proof = ValidatorChangeProof::new(
            vec![epoch1.sign(&epoch_ending(1, 10, &powerless), 4)],
            false,
        );
        let anchor = ValidatorVerifier::new(&epoch1.set, 1).unwrap();
        assert_eq!(
            proof.verify(&anchor).unwrap_err(),
            VerificationError::NoVotingPower { epoch: 2 }
        );
    }
}
