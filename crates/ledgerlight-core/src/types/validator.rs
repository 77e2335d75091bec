use crate::crypto::signature::BlsPublicKey;
use crate::types::address::AccountAddress;
use serde::{Deserialize, Serialize};

/// Signature scheme of a validator set. The variant index is part of the
/// hashed encoding of every ledger info that carries a validator set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidatorSetScheme {
    Bls12381,
}

/// One member of a validator set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    /// Address the validator signs ledger infos as.
    pub account_address: AccountAddress,
    /// BLS12-381 key its ledger info signatures verify against.
    pub consensus_public_key: BlsPublicKey,
    /// Weight of its signature towards the quorum.
    pub consensus_voting_power: u64,
}

/// The validators of one epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    pub scheme: ValidatorSetScheme,
    pub validators: Vec<ValidatorInfo>,
}

impl ValidatorSet {
    pub fn new(validators: Vec<ValidatorInfo>) -> Self {
        Self {
            scheme: ValidatorSetScheme::Bls12381,
            validators,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    pub fn total_voting_power(&self) -> u128 {
        self.validators
            .iter()
            .map(|v| v.consensus_voting_power as u128)
            .sum()
    }
}
