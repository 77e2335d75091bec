use crate::crypto::hash::CryptoHash;
use crate::proof::sparse_merkle::{SparseMerkleLeafNode, SparseMerkleProof};
use crate::proven::error::ProvenError;
use crate::proven::ledger_info::ProvenLedgerInfo;
use crate::proven::transaction_info::TransactionInfoWithProof;
use crate::proven::Proven;
use crate::types::account::{account_resource_path, AccountBlob, AccountResource, AccountStateBlob};
use crate::types::address::AccountAddress;
use serde::{Deserialize, Serialize};

/// Proof of an account's state: the state tree proof up to a transaction
/// info, and that transaction info's place in the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStateProof {
    pub transaction_info_with_proof: TransactionInfoWithProof,
    pub transaction_info_to_account_proof: SparseMerkleProof,
}

/// An account's state blob at some version as served by a remote node.
/// `blob` is `None` when the node claims the account does not exist.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStateWithProof {
    pub version: u64,
    pub blob: Option<AccountStateBlob>,
    pub proof: AccountStateProof,
}

/// The state of one account at one version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountState {
    address: AccountAddress,
    version: u64,
    blob: Option<AccountStateBlob>,
}

pub type ProvenAccountState = Proven<AccountState>;
pub type ProvenAccountBlob = Proven<AccountBlob>;
pub type ProvenAccountResource = Proven<AccountResource>;

impl AccountStateWithProof {
    /// Prove the state of `address` against `ledger_info`.
    ///
    /// 1. The transaction info at `version` is in the ledger's accumulator
    /// 2. The blob (or its absence) is in that transaction's state tree
    pub fn verify(
        &self,
        address: AccountAddress,
        ledger_info: &ProvenLedgerInfo,
    ) -> Result<ProvenAccountState, ProvenError> {
        let proof = &self.proof;
        proof
            .transaction_info_with_proof
            .verify(ledger_info, self.version)?;

        let state_root = proof.transaction_info_with_proof.transaction_info.state_root_hash;
        let key = address.hash();
        match &self.blob {
            Some(blob) => proof
                .transaction_info_to_account_proof
                .verify_inclusion(&SparseMerkleLeafNode::new(key, blob.hash()), state_root)?,
            None => proof
                .transaction_info_to_account_proof
                .verify_non_inclusion(&key, state_root)?,
        }

        Ok(Proven::new(
            AccountState {
                address,
                version: self.version,
                blob: self.blob.clone(),
            },
            ledger_info.clone(),
        ))
    }
}

impl AccountState {
    pub fn address(&self) -> AccountAddress {
        self.address
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn exists(&self) -> bool {
        self.blob.is_some()
    }

    pub fn blob(&self) -> Option<&AccountStateBlob> {
        self.blob.as_ref()
    }
}

impl ProvenAccountState {
    /// Decode the proven blob into its resources. `None` if the account
    /// does not exist.
    pub fn account_blob(&self) -> Result<Option<ProvenAccountBlob>, ProvenError> {
        let Some(raw) = self.get().blob() else {
            return Ok(None);
        };
        let blob = raw.decode()?;
        Ok(Some(self.map(|_| blob)))
    }
}

impl ProvenAccountBlob {
    /// Raw bytes of the resource at `path`.
    pub fn resource(&self, path: &[u8]) -> Result<Vec<u8>, ProvenError> {
        self.get()
            .resource(path)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| ProvenError::ResourceNotFound {
                path: hex::encode(path),
            })
    }

    pub fn resource_paths(&self) -> Vec<Vec<u8>> {
        self.get().resource_paths().map(<[u8]>::to_vec).collect()
    }

    pub fn account_resource(&self) -> Result<ProvenAccountResource, ProvenError> {
        let resource = self
            .get()
            .account_resource()?
            .ok_or_else(|| ProvenError::ResourceNotFound {
                path: hex::encode(account_resource_path()),
            })?;
        Ok(self.map(|_| resource))
    }
}
