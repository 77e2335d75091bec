use crate::consensus::validator_verifier::{ValidatorVerifier, VerificationError};
use crate::consensus::waypoint::Waypoint;
use crate::types::ledger_info::LedgerInfoWithSignatures;
use tracing::warn;

/// Something that can authenticate a signed ledger info.
pub trait LedgerInfoVerifier {
    fn verify(&self, ledger_info: &LedgerInfoWithSignatures) -> Result<(), VerificationError>;

    /// Whether a ledger info of `epoch` can only be trusted after a
    /// validator change proof.
    fn epoch_change_required(&self, epoch: u64) -> bool;
}

impl LedgerInfoVerifier for ValidatorVerifier {
    fn verify(&self, ledger_info: &LedgerInfoWithSignatures) -> Result<(), VerificationError> {
        ValidatorVerifier::verify(self, ledger_info)
    }

    fn epoch_change_required(&self, epoch: u64) -> bool {
        ValidatorVerifier::epoch_change_required(self, epoch)
    }
}

/// A waypoint only vouches for one ledger info, so anything newer has to
/// come through a validator change proof starting at it.
impl LedgerInfoVerifier for Waypoint {
    fn verify(&self, ledger_info: &LedgerInfoWithSignatures) -> Result<(), VerificationError> {
        Waypoint::verify(self, ledger_info)
    }

    fn epoch_change_required(&self, _epoch: u64) -> bool {
        true
    }
}

/// What a client currently trusts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrustAnchor {
    /// The validator set of a known epoch.
    Validators(ValidatorVerifier),
    /// A single trusted ledger info, usually at an epoch boundary.
    Waypoint(Waypoint),
    /// Accepts every ledger info. For tests and local networks only.
    Insecure,
}

impl TrustAnchor {
    pub fn is_insecure(&self) -> bool {
        matches!(self, TrustAnchor::Insecure)
    }
}

impl LedgerInfoVerifier for TrustAnchor {
    fn verify(&self, ledger_info: &LedgerInfoWithSignatures) -> Result<(), VerificationError> {
        match self {
            TrustAnchor::Validators(verifier) => verifier.verify(ledger_info),
            TrustAnchor::Waypoint(waypoint) => waypoint.verify(ledger_info),
            TrustAnchor::Insecure => {
                let li = ledger_info.ledger_info();
                warn!(
                    epoch = li.epoch,
                    version = li.version,
                    "INSECURE: accepting ledger info without verification"
                );
                Ok(())
            }
        }
    }

    fn epoch_change_required(&self, epoch: u64) -> bool {
        match self {
            TrustAnchor::Validators(verifier) => verifier.epoch_change_required(epoch),
            TrustAnchor::Waypoint(_) => true,
            TrustAnchor::Insecure => false,
        }
    }
}

impl From<ValidatorVerifier> for TrustAnchor {
    fn from(verifier: ValidatorVerifier) -> Self {
        TrustAnchor::Validators(verifier)
    }
}

impl From<Waypoint> for TrustAnchor {
    fn from(waypoint: Waypoint) -> Self {
        TrustAnchor::Waypoint(waypoint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::hash::HashValue;
    use crate::test_utils::{sample_ledger_info, TestValidators};
    use std::collections::BTreeMap;

    #[test]
    fn test_insecure_accepts_unsigned() {
        let li = LedgerInfoWithSignatures::new(sample_ledger_info(9, 9, HashValue::zero()), BTreeMap::new());
        let anchor = TrustAnchor::Insecure;
        assert!(anchor.verify(&li).is_ok());
        assert!(!anchor.epoch_change_required(100));
        assert!(anchor.is_insecure());
    }

    #[test]
    fn test_validator_anchor_delegates() {
        let validators = TestValidators::new(4, 50);
        let anchor = TrustAnchor::from(ValidatorVerifier::new(&validators.set, 2).unwrap());
        let li = sample_ledger_info(2, 3, HashValue([3u8; 32]));
        assert!(anchor.verify(&validators.sign(&li, 3)).is_ok());
        assert!(matches!(
            anchor.verify(&validators.sign(&li, 1)),
            Err(VerificationError::TooFewSignatures { .. })
        ));
        assert!(anchor.epoch_change_required(3));
    }

    #[test]
    fn test_waypoint_anchor_always_requires_epoch_change() {
        let li = sample_ledger_info(0, 0, HashValue::zero());
        let anchor = TrustAnchor::from(Waypoint::new_any(&li));
        assert!(anchor.epoch_change_required(0));
        assert!(anchor
            .verify(&LedgerInfoWithSignatures::new(li, BTreeMap::new()))
            .is_ok());
    }

    #[test]
    fn test_trait_objects() {
        let li = sample_ledger_info(0, 0, HashValue::zero());
        let verifiers: Vec<Box<dyn LedgerInfoVerifier>> = vec![
            Box::new(Waypoint::new_any(&li)),
            Box::new(TrustAnchor::Insecure),
        ];
        let signed = LedgerInfoWithSignatures::new(li, BTreeMap::new());
        for verifier in &verifiers {
            assert!(verifier.verify(&signed).is_ok());
        }
    }
}
