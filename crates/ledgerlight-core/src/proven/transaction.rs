use crate::codec::hash_all;
use crate::crypto::hash::CryptoHash;
use crate::proof::range_proof::TransactionAccumulatorRangeProof;
use crate::proven::error::ProvenError;
use crate::proven::ledger_info::ProvenLedgerInfo;
use crate::proven::transaction_info::TransactionInfoWithProof;
use crate::proven::Proven;
use crate::types::event::{event_root_hash, ContractEvent};
use crate::types::transaction::{SignedTransaction, TransactionInfo};
use serde::{Deserialize, Serialize};

/// A committed transaction as served by a remote node. `events` is `None`
/// when they were not requested.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithProof {
    pub version: u64,
    pub signed_transaction: SignedTransaction,
    pub events: Option<Vec<ContractEvent>>,
    pub proof: TransactionInfoWithProof,
}

/// One entry of a transaction list: the transaction and its info.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionWithInfo {
    pub version: u64,
    pub signed_transaction: SignedTransaction,
    pub events: Option<Vec<ContractEvent>>,
    pub transaction_info: TransactionInfo,
}

/// A run of consecutive transactions and one range proof covering all
/// their infos.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionListWithProof {
    pub transactions: Vec<TransactionWithInfo>,
    pub proof: TransactionAccumulatorRangeProof,
}

/// A transaction committed at a known version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommittedTransaction {
    version: u64,
    signed_transaction: SignedTransaction,
    events: Option<Vec<ContractEvent>>,
    gas_used: u64,
}

pub type ProvenTransaction = Proven<CommittedTransaction>;
pub type ProvenTransactionList = Proven<Vec<CommittedTransaction>>;

impl TransactionWithProof {
    pub fn verify(&self, ledger_info: &ProvenLedgerInfo) -> Result<ProvenTransaction, ProvenError> {
        let info = &self.proof.transaction_info;
        check_transaction(
            self.version,
            &self.signed_transaction,
            self.events.as_deref(),
            info,
        )?;
        self.proof.verify(ledger_info, self.version)?;

        Ok(Proven::new(
            CommittedTransaction {
                version: self.version,
                signed_transaction: self.signed_transaction.clone(),
                events: self.events.clone(),
                gas_used: info.gas_used,
            },
            ledger_info.clone(),
        ))
    }
}

impl TransactionListWithProof {
    /// Assemble a list from the parallel vectors a node serves.
    ///
    /// `events`, when present, holds one event list per transaction.
    /// `first_version` is required unless the list is empty.
    pub fn from_parts(
        first_version: Option<u64>,
        transactions: Vec<SignedTransaction>,
        infos: Vec<TransactionInfo>,
        events: Option<Vec<Vec<ContractEvent>>>,
        proof: TransactionAccumulatorRangeProof,
    ) -> Result<Self, ProvenError> {
        if transactions.len() != infos.len() {
            return Err(ProvenError::LengthMismatch {
                what: "transaction infos",
                expected: transactions.len(),
                got: infos.len(),
            });
        }
        if let Some(events) = &events {
            if events.len() != transactions.len() {
                return Err(ProvenError::LengthMismatch {
                    what: "event lists",
                    expected: transactions.len(),
                    got: events.len(),
                });
            }
        }
        let first_version = match first_version {
            Some(version) => version,
            None if transactions.is_empty() => 0,
            None => {
                return Err(ProvenError::LengthMismatch {
                    what: "first versions",
                    expected: 1,
                    got: 0,
                })
            }
        };

        let mut events = events.map(Vec::into_iter);
        let transactions = transactions
            .into_iter()
            .zip(infos)
            .zip(0u64..)
            .map(|((signed_transaction, transaction_info), offset)| TransactionWithInfo {
                version: first_version.saturating_add(offset),
                signed_transaction,
                events: events.as_mut().and_then(Iterator::next),
                transaction_info,
            })
            .collect();
        Ok(Self { transactions, proof })
    }

    /// Prove every transaction of the list against `ledger_info`.
    ///
    /// Each transaction is checked against its own info, then all infos are
    /// proven at once with the range proof.
    pub fn verify(&self, ledger_info: &ProvenLedgerInfo) -> Result<ProvenTransactionList, ProvenError> {
        let first_version = self.transactions.first().map_or(0, |t| t.version);
        for (expected, txn) in (first_version..).zip(&self.transactions) {
            if txn.version != expected {
                return Err(ProvenError::NonContiguousVersions {
                    expected,
                    got: txn.version,
                });
            }
        }
        if let Some(last) = self.transactions.last() {
            if last.version > ledger_info.version() {
                return Err(ProvenError::VersionExceedsCheckpoint {
                    version: last.version,
                    ledger_version: ledger_info.version(),
                });
            }
        }

        let mut committed = Vec::with_capacity(self.transactions.len());
        for txn in &self.transactions {
            check_transaction(
                txn.version,
                &txn.signed_transaction,
                txn.events.as_deref(),
                &txn.transaction_info,
            )?;
            committed.push(CommittedTransaction {
                version: txn.version,
                signed_transaction: txn.signed_transaction.clone(),
                events: txn.events.clone(),
                gas_used: txn.transaction_info.gas_used,
            });
        }

        let infos: Vec<TransactionInfo> = self
            .transactions
            .iter()
            .map(|t| t.transaction_info.clone())
            .collect();
        self.proof.verify(
            first_version,
            &hash_all(&infos),
            ledger_info.transaction_accumulator_hash(),
        )?;

        Ok(Proven::new(committed, ledger_info.clone()))
    }
}

impl CommittedTransaction {
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn signed_transaction(&self) -> &SignedTransaction {
        &self.signed_transaction
    }

    pub fn events(&self) -> Option<&[ContractEvent]> {
        self.events.as_deref()
    }

    pub fn gas_used(&self) -> u64 {
        self.gas_used
    }
}

impl ProvenTransactionList {
    pub fn len(&self) -> usize {
        self.get().len()
    }

    pub fn is_empty(&self) -> bool {
        self.get().is_empty()
    }

    /// Each transaction of the list, proven against the same ledger info.
    pub fn transactions(&self) -> Vec<ProvenTransaction> {
        self.get()
            .iter()
            .map(|txn| Proven::new(txn.clone(), self.ledger_info().clone()))
            .collect()
    }
}

// --- Helper functions ---

/// Checks that need no ledger: the sender signature, the transaction hash
/// and, when events were served, their root.
fn check_transaction(
    version: u64,
    signed_transaction: &SignedTransaction,
    events: Option<&[ContractEvent]>,
    info: &TransactionInfo,
) -> Result<(), ProvenError> {
    signed_transaction
        .verify_signature()
        .map_err(|reason| ProvenError::InvalidSenderSignature { version, reason })?;

    let computed = signed_transaction.hash();
    if computed != info.transaction_hash {
        return Err(ProvenError::TransactionHashMismatch {
            version,
            computed: computed.to_hex(),
            expected: info.transaction_hash.to_hex(),
        });
    }

    if let Some(events) = events {
        let computed = event_root_hash(events)?;
        if computed != info.event_root_hash {
            return Err(ProvenError::EventRootHashMismatch {
                version,
                computed: computed.to_hex(),
                expected: info.event_root_hash.to_hex(),
            });
        }
    }
    Ok(())
}
