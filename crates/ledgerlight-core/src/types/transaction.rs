use crate::codec::impl_crypto_hash;
use crate::crypto::hash::{CryptoHash, HashDomain, HashValue};
use crate::crypto::signature::{verify_bls_signature, BlsPublicKey, BlsSignature, SignatureError};
use crate::types::account::AccessPath;
use crate::types::address::AccountAddress;
use crate::types::event::ContractEvent;
use serde::{Deserialize, Serialize};

/// What the ledger commits for every executed transaction. Its hash is the
/// leaf of the transaction accumulator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInfo {
    /// Hash of the signed transaction.
    pub transaction_hash: HashValue,
    /// Root of the account state tree after the transaction.
    pub state_root_hash: HashValue,
    /// Root of the event accumulator over the transaction's events.
    pub event_root_hash: HashValue,
    pub gas_used: u64,
}

impl_crypto_hash!(TransactionInfo, HashDomain::TransactionInfo);

/// Argument to a transaction script. Variant indices are hashed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionArgument {
    U64(u64),
    Address(AccountAddress),
    Bytes(Vec<u8>),
    Bool(bool),
}

/// A single write of a write set. Variant indices are hashed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum WriteOp {
    Deletion,
    Value(Vec<u8>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteSetPayload {
    pub write_set: Vec<(AccessPath, WriteOp)>,
    pub events: Vec<ContractEvent>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub code: Vec<u8>,
    pub args: Vec<TransactionArgument>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub code: Vec<u8>,
}

/// Body of a transaction. Variant indices are hashed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionPayload {
    WriteSet(WriteSetPayload),
    Script(Script),
    Module(Module),
}

/// A transaction as its sender signed it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub sender: AccountAddress,
    pub sequence_number: u64,
    pub payload: TransactionPayload,
    pub max_gas_amount: u64,
    pub gas_unit_price: u64,
    /// Seconds since the Unix epoch after which the transaction is discarded.
    pub expiration_time: u64,
}

impl_crypto_hash!(RawTransaction, HashDomain::RawTransaction);

/// A raw transaction with the sender's key and signature over its hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTransaction {
    pub raw_txn: RawTransaction,
    pub public_key: BlsPublicKey,
    pub signature: BlsSignature,
}

impl_crypto_hash!(SignedTransaction, HashDomain::SignedTransaction);

impl SignedTransaction {
    pub fn sender(&self) -> AccountAddress {
        self.raw_txn.sender
    }

    pub fn sequence_number(&self) -> u64 {
        self.raw_txn.sequence_number
    }

    /// Check the sender signature over the raw transaction hash.
    pub fn verify_signature(&self) -> Result<(), SignatureError> {
        let message = self.raw_txn.hash();
        verify_bls_signature(&self.public_key, message.as_ref(), &self.signature)
    }
}
