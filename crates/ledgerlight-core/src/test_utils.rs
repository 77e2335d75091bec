//! Fixtures shared by the unit tests: naive reference trees to check the
//! verifiers against, deterministic BLS keys and a small fake ledger.

use crate::codec::hash_all;
use crate::crypto::hash::{
    hash_bytes, hash_pair, CryptoHash, HashDomain, HashValue, ACCUMULATOR_PLACEHOLDER_HASH,
    SPARSE_MERKLE_PLACEHOLDER_HASH,
};
use crate::crypto::signature::{BlsPublicKey, BlsSignature, BLS_DST};
use crate::proof::accumulator::{AccumulatorHasher, EventAccumulatorHasher, TransactionAccumulatorHasher};
use crate::proof::sparse_merkle::{SparseMerkleLeafNode, SparseMerkleProof};
use crate::types::{
    account_resource_path, event_root_hash, AccountAddress, AccountBlob, AccountResource,
    AccountStateBlob, ContractEvent, EventHandle, EventKey, LedgerInfo, LedgerInfoWithSignatures,
    RawTransaction, Script, SignedTransaction, TransactionArgument, TransactionInfo,
    TransactionPayload, ValidatorInfo, ValidatorSet,
};
use blst::min_pk::SecretKey;
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Distinct leaf hashes: leaf `i` hashes the little-endian bytes of `i`.
pub fn test_leaves(n: usize) -> Vec<HashValue> {
    (0..n as u64)
        .map(|i| hash_bytes(HashDomain::TransactionInfo, &i.to_le_bytes()))
        .collect()
}

/// Root of the accumulator over `leaves`, computed from a full tree.
pub fn reference_root<H: AccumulatorHasher>(leaves: &[HashValue]) -> HashValue {
    ReferenceTree::<H>::new(leaves).root()
}

/// Every level of an accumulator, each odd level padded with one placeholder.
pub struct ReferenceTree<H> {
    levels: Vec<Vec<HashValue>>,
    hasher: PhantomData<H>,
}

impl<H: AccumulatorHasher> ReferenceTree<H> {
    pub fn new(leaves: &[HashValue]) -> Self {
        let mut levels = Vec::new();
        let mut current = leaves.to_vec();
        while current.len() > 1 {
            if current.len() % 2 == 1 {
                current.push(ACCUMULATOR_PLACEHOLDER_HASH);
            }
            let next = current
                .chunks_exact(2)
                .map(|pair| H::hash_internal(&pair[0], &pair[1]))
                .collect();
            levels.push(current);
            current = next;
        }
        levels.push(current);
        Self {
            levels,
            hasher: PhantomData,
        }
    }

    pub fn root(&self) -> HashValue {
        self.levels
            .last()
            .and_then(|top| top.first().copied())
            .unwrap_or(ACCUMULATOR_PLACEHOLDER_HASH)
    }

    /// Node `index` of `level`, leaves being level 0.
    pub fn node(&self, level: usize, index: usize) -> HashValue {
        self.levels[level][index]
    }

    fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Siblings of leaf `index`, root level first.
    pub fn proof(&self, index: u64) -> Vec<HashValue> {
        let mut idx = index as usize;
        let mut siblings = Vec::new();
        for level in 0..self.height() {
            siblings.push(self.levels[level][idx ^ 1]);
            idx >>= 1;
        }
        siblings.reverse();
        siblings
    }

    /// Left and right siblings of the leaves `first..=last`, root level first.
    pub fn range_proof(&self, first: u64, last: u64) -> (Vec<HashValue>, Vec<HashValue>) {
        let (mut first, mut last) = (first as usize, last as usize);
        let mut left = Vec::new();
        let mut right = Vec::new();
        for level in 0..self.height() {
            if first % 2 == 1 {
                left.push(self.levels[level][first - 1]);
            }
            if last % 2 == 0 {
                right.push(self.levels[level][last + 1]);
            }
            first >>= 1;
            last >>= 1;
        }
        left.reverse();
        right.reverse();
        (left, right)
    }

    /// Frozen subtrees formed by appending `count` leaves after `existing`.
    pub fn new_subtrees(&self, existing: u64, count: u64) -> Vec<HashValue> {
        let mut position = existing;
        let mut remaining = count;
        let mut subtrees = Vec::new();
        while remaining > 0 {
            let mut size = 1u64 << (63 - remaining.leading_zeros());
            while position % size != 0 {
                size >>= 1;
            }
            let level = size.trailing_zeros() as usize;
            subtrees.push(self.node(level, (position / size) as usize));
            position += size;
            remaining -= size;
        }
        subtrees
    }
}

/// A sparse Merkle tree built naively from its leaves.
pub struct ReferenceSparseTree {
    leaves: Vec<SparseMerkleLeafNode>,
}

impl ReferenceSparseTree {
    pub fn new(mut leaves: Vec<SparseMerkleLeafNode>) -> Self {
        leaves.sort_by_key(|leaf| leaf.key());
        Self { leaves }
    }

    pub fn leaves(&self) -> &[SparseMerkleLeafNode] {
        &self.leaves
    }

    pub fn root(&self) -> HashValue {
        Self::subtree_hash(&self.leaves, 0)
    }

    fn subtree_hash(leaves: &[SparseMerkleLeafNode], depth: usize) -> HashValue {
        match leaves {
            [] => SPARSE_MERKLE_PLACEHOLDER_HASH,
            [leaf] => leaf.hash(),
            _ => {
                let (left, right) = Self::split(leaves, depth);
                hash_pair(
                    HashDomain::SparseMerkleInternal,
                    &Self::subtree_hash(left, depth + 1),
                    &Self::subtree_hash(right, depth + 1),
                )
            }
        }
    }

    fn split(leaves: &[SparseMerkleLeafNode], depth: usize) -> (&[SparseMerkleLeafNode], &[SparseMerkleLeafNode]) {
        let at = leaves
            .iter()
            .position(|leaf| bit(&leaf.key(), depth))
            .unwrap_or(leaves.len());
        leaves.split_at(at)
    }

    /// Proof for `key`, present or not.
    pub fn proof(&self, key: &HashValue) -> SparseMerkleProof {
        let mut current: &[SparseMerkleLeafNode] = &self.leaves;
        let mut depth = 0;
        let mut siblings = Vec::new();
        while current.len() > 1 {
            let (left, right) = Self::split(current, depth);
            if bit(key, depth) {
                siblings.push(Self::subtree_hash(left, depth + 1));
                current = right;
            } else {
                siblings.push(Self::subtree_hash(right, depth + 1));
                current = left;
            }
            depth += 1;
        }
        SparseMerkleProof::new(current.first().copied(), siblings)
    }
}

fn bit(key: &HashValue, index: usize) -> bool {
    key.0[index / 8] & (0x80 >> (index % 8)) != 0
}

pub fn bls_keypair(seed: u8) -> (SecretKey, BlsPublicKey) {
    let sk = SecretKey::key_gen(&[seed; 32], &[]).expect("32 bytes of key material");
    let pk = BlsPublicKey(sk.sk_to_pk().to_bytes());
    (sk, pk)
}

pub fn bls_sign(sk: &SecretKey, message: &[u8]) -> BlsSignature {
    BlsSignature(sk.sign(message, BLS_DST, &[]).to_bytes())
}

pub fn sample_ledger_info(epoch: u64, version: u64, accumulator_hash: HashValue) -> LedgerInfo {
    LedgerInfo {
        epoch,
        round: version,
        consensus_block_id: HashValue([0x0b; 32]),
        transaction_accumulator_hash: accumulator_hash,
        version,
        timestamp_usecs: 1_000_000 * (version + 1),
        next_validator_set: None,
        consensus_data_hash: HashValue::zero(),
    }
}

pub fn sample_signed_transaction(sk: &SecretKey, sequence_number: u64) -> SignedTransaction {
    let raw_txn = RawTransaction {
        sender: AccountAddress([0xaa; 32]),
        sequence_number,
        payload: TransactionPayload::Script(Script {
            code: vec![0xc0, 0xde],
            args: vec![TransactionArgument::U64(sequence_number)],
        }),
        max_gas_amount: 10_000,
        gas_unit_price: 1,
        expiration_time: 1_900_000_000,
    };
    let signature = bls_sign(sk, raw_txn.hash().as_ref());
    SignedTransaction {
        raw_txn,
        public_key: BlsPublicKey(sk.sk_to_pk().to_bytes()),
        signature,
    }
}

/// A validator set of `n` members with voting power 1, and their keys.
pub struct TestValidators {
    pub keys: Vec<SecretKey>,
    pub set: ValidatorSet,
}

impl TestValidators {
    pub fn new(n: usize, seed: u8) -> Self {
        let mut keys = Vec::new();
        let mut validators = Vec::new();
        for i in 0..n {
            let (sk, pk) = bls_keypair(seed.wrapping_add(i as u8));
            let mut address = [0u8; 32];
            address[0] = seed;
            address[31] = i as u8;
            validators.push(ValidatorInfo {
                account_address: AccountAddress(address),
                consensus_public_key: pk,
                consensus_voting_power: 1,
            });
            keys.push(sk);
        }
        Self {
            keys,
            set: ValidatorSet::new(validators),
        }
    }

    pub fn address(&self, index: usize) -> AccountAddress {
        self.set.validators[index].account_address
    }

    /// Signatures of the first `signers` validators over `ledger_info`.
    pub fn sign(&self, ledger_info: &LedgerInfo, signers: usize) -> LedgerInfoWithSignatures {
        let message = ledger_info.hash();
        let signatures: BTreeMap<AccountAddress, BlsSignature> = self
            .keys
            .iter()
            .zip(&self.set.validators)
            .take(signers)
            .map(|(sk, info)| (info.account_address, bls_sign(sk, message.as_ref())))
            .collect();
        LedgerInfoWithSignatures::new(ledger_info.clone(), signatures)
    }
}

/// A committed ledger of `n` signed transactions over a fixed account state.
pub struct TestLedger {
    pub transactions: Vec<SignedTransaction>,
    pub events: Vec<Vec<ContractEvent>>,
    pub infos: Vec<TransactionInfo>,
    pub accounts: BTreeMap<AccountAddress, AccountStateBlob>,
    pub state: ReferenceSparseTree,
    pub accumulator: ReferenceTree<TransactionAccumulatorHasher>,
}

pub fn test_account_address(index: u8) -> AccountAddress {
    AccountAddress([0x40 + index; 32])
}

pub fn test_account_resource(balance: u64) -> AccountResource {
    AccountResource {
        authentication_key: vec![0x5a; 32],
        balance,
        received_events: EventHandle {
            count: 1,
            key: EventKey(vec![0x01; 8]),
        },
        sent_events: EventHandle {
            count: 2,
            key: EventKey(vec![0x02; 8]),
        },
        sequence_number: 2,
    }
}

impl TestLedger {
    pub fn new(n: usize) -> Self {
        let mut accounts = BTreeMap::new();
        for (i, balance) in [(0u8, 100u64), (1, 2_500)] {
            let mut resources = BTreeMap::new();
            let resource = crate::codec::to_bytes(&test_account_resource(balance)).unwrap();
            resources.insert(account_resource_path(), resource);
            let blob = AccountBlob::new(resources).to_state_blob().unwrap();
            accounts.insert(test_account_address(i), blob);
        }
        let state = ReferenceSparseTree::new(
            accounts
                .iter()
                .map(|(address, blob)| SparseMerkleLeafNode::new(address.hash(), blob.hash()))
                .collect(),
        );

        let (sk, _) = bls_keypair(0x77);
        let mut transactions = Vec::new();
        let mut events = Vec::new();
        let mut infos = Vec::new();
        for i in 0..n as u64 {
            let txn = sample_signed_transaction(&sk, i);
            let txn_events: Vec<ContractEvent> = (0..i % 3)
                .map(|j| ContractEvent::new(EventKey(vec![0x02; 8]), i + j, vec![i as u8, j as u8]))
                .collect();
            infos.push(TransactionInfo {
                transaction_hash: txn.hash(),
                state_root_hash: state.root(),
                event_root_hash: event_root_hash(&txn_events).unwrap(),
                gas_used: 10 + i,
            });
            transactions.push(txn);
            events.push(txn_events);
        }
        let accumulator = ReferenceTree::new(&hash_all(&infos));

        Self {
            transactions,
            events,
            infos,
            accounts,
            state,
            accumulator,
        }
    }

    pub fn version(&self) -> u64 {
        self.infos.len() as u64 - 1
    }

    pub fn ledger_info(&self, epoch: u64) -> LedgerInfo {
        sample_ledger_info(epoch, self.version(), self.accumulator.root())
    }

    pub fn event_proof(&self, version: u64, index: u64) -> Vec<HashValue> {
        let hashes = hash_all(&self.events[version as usize]);
        ReferenceTree::<EventAccumulatorHasher>::new(&hashes).proof(index)
    }
}
