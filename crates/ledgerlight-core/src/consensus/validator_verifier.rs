use crate::crypto::hash::CryptoHash;
use crate::crypto::signature::{verify_bls_signature, BlsPublicKey, SignatureError};
use crate::types::address::AccountAddress;
use crate::types::ledger_info::LedgerInfoWithSignatures;
use crate::types::validator::ValidatorSet;
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur while authenticating a ledger info.
/// Each variant names the concrete check that failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VerificationError {
    #[error("Signature from unknown author {author}")]
    UnknownAuthor { author: AccountAddress },

    #[error("Invalid signature from {author}: {reason}")]
    InvalidSignature {
        author: AccountAddress,
        reason: SignatureError,
    },

    #[error("Insufficient voting power: {voting_power} signed (need at least {quorum})")]
    TooFewSignatures { voting_power: u128, quorum: u128 },

    #[error("Too many signatures: {got} signers but only {max} validators")]
    TooManySignatures { got: usize, max: usize },

    #[error("Ledger info is from epoch {got} but the verifier is for epoch {expected}")]
    EpochMismatch { expected: u64, got: u64 },

    #[error("Ledger info does not match waypoint: expected {expected}, got {got}")]
    WaypointMismatch { expected: String, got: String },

    #[error("Ledger info version {got} does not match waypoint version {expected}")]
    WaypointVersionMismatch { expected: u64, got: u64 },

    #[error("Ledger info at epoch {epoch}, version {version} carries no next validator set")]
    MissingNextValidatorSet { epoch: u64, version: u64 },

    #[error("Validator set of epoch {epoch} has no voting power")]
    NoVotingPower { epoch: u64 },

    #[error("Validator change proof carries no ledger infos")]
    EmptyValidatorChange,

    #[error("Validator change epoch {got} does not follow epoch {previous}")]
    NonIncreasingEpoch { previous: u64, got: u64 },
}

/// Quorum verifier for one epoch's validator set.
///
/// A ledger info is accepted when the validators that signed it hold
/// strictly more than two thirds of the total voting power.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatorVerifier {
    epoch: u64,
    validator_set: ValidatorSet,
    address_to_validator: BTreeMap<AccountAddress, ValidatorConsensusInfo>,
    total_voting_power: u128,
    quorum_voting_power: u128,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ValidatorConsensusInfo {
    public_key: BlsPublicKey,
    voting_power: u64,
}

impl ValidatorVerifier {
    /// Build the verifier for `epoch`. A set without voting power could
    /// never reach a quorum and is rejected.
    pub fn new(validator_set: &ValidatorSet, epoch: u64) -> Result<Self, VerificationError> {
        let address_to_validator: BTreeMap<_, _> = validator_set
            .validators
            .iter()
            .map(|v| {
                (
                    v.account_address,
                    ValidatorConsensusInfo {
                        public_key: v.consensus_public_key.clone(),
                        voting_power: v.consensus_voting_power,
                    },
                )
            })
            .collect();
        let total_voting_power: u128 = address_to_validator
            .values()
            .map(|v| v.voting_power as u128)
            .sum();
        if total_voting_power == 0 {
            return Err(VerificationError::NoVotingPower { epoch });
        }
        Ok(Self {
            epoch,
            validator_set: validator_set.clone(),
            address_to_validator,
            total_voting_power,
            quorum_voting_power: total_voting_power * 2 / 3 + 1,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn validator_set(&self) -> &ValidatorSet {
        &self.validator_set
    }

    pub fn len(&self) -> usize {
        self.address_to_validator.len()
    }

    pub fn is_empty(&self) -> bool {
        self.address_to_validator.is_empty()
    }

    pub fn total_voting_power(&self) -> u128 {
        self.total_voting_power
    }

    pub fn quorum_voting_power(&self) -> u128 {
        self.quorum_voting_power
    }

    /// Verify the quorum certificate of a signed ledger info.
    ///
    /// Every signature must come from a known validator and verify over the
    /// ledger info hash; a single bad signature rejects the whole certificate.
    pub fn verify(&self, ledger_info: &LedgerInfoWithSignatures) -> Result<(), VerificationError> {
        let li = ledger_info.ledger_info();
        if li.epoch != self.epoch {
            return Err(VerificationError::EpochMismatch {
                expected: self.epoch,
                got: li.epoch,
            });
        }

        let signatures = ledger_info.signatures();
        if signatures.len() > self.address_to_validator.len() {
            return Err(VerificationError::TooManySignatures {
                got: signatures.len(),
                max: self.address_to_validator.len(),
            });
        }

        let message = li.hash();
        let mut voting_power: u128 = 0;
        for (author, signature) in signatures {
            let validator = self
                .address_to_validator
                .get(author)
                .ok_or(VerificationError::UnknownAuthor { author: *author })?;
            verify_bls_signature(&validator.public_key, message.as_ref(), signature).map_err(
                |reason| VerificationError::InvalidSignature {
                    author: *author,
                    reason,
                },
            )?;
            voting_power += validator.voting_power as u128;
        }

        self.check_voting_power(voting_power)
    }

    /// Whether a ledger info of `epoch` needs a validator change first.
    pub fn epoch_change_required(&self, epoch: u64) -> bool {
        self.epoch < epoch
    }

    // --- Helper functions ---

    fn check_voting_power(&self, voting_power: u128) -> Result<(), VerificationError> {
        if voting_power < self.quorum_voting_power {
            return Err(VerificationError::TooFewSignatures {
                voting_power,
                quorum: self.quorum_voting_power,
            });
        }
        Ok(())
    }
}
