use crate::chain::ViolationKind;
use crate::config::MiningConfig;
use crate::constants::GENESIS_PREVIOUS_HASH;
use crate::error::Result;
use crate::{digest, merkle_root, mine, now_millis, pow::meets_difficulty, Transaction};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The fields a block hash commits to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub previous_hash: String,
    /// Unix milliseconds (UTC), captured once at construction.
    pub timestamp: u64,
    pub merkle_root: String,
    pub nonce: u64,
}

impl BlockHeader {
    /// Everything in the hash preimage except the nonce.
    pub fn preimage_prefix(&self) -> String {
        format!("{}{}{}", self.previous_hash, self.timestamp, self.merkle_root)
    }

    /// `previous_hash ∥ timestamp ∥ merkle_root ∥ nonce`, no separators,
    /// integers in base 10.
    pub fn hash_preimage(&self) -> String {
        format!("{}{}", self.preimage_prefix(), self.nonce)
    }

    pub fn hash(&self) -> String {
        digest(self.hash_preimage())
    }
}

/// A block that has not been mined yet.
#[derive(Clone, Debug)]
pub struct BlockCandidate {
    pub(crate) header: BlockHeader,
    pub(crate) transactions: Vec<Transaction>,
    pub(crate) hash: String,
}

impl BlockCandidate {
    pub fn new(transactions: Vec<Transaction>, previous_hash: impl Into<String>) -> Self {
        Self::with_timestamp(transactions, previous_hash, now_millis())
    }

    pub fn with_timestamp(
        transactions: Vec<Transaction>,
        previous_hash: impl Into<String>,
        timestamp: u64,
    ) -> Self {
        let header = BlockHeader {
            previous_hash: previous_hash.into(),
            timestamp,
            merkle_root: merkle_root(&transactions),
            nonce: 0,
        };
        let hash = header.hash();
        debug!(
            "candidate with {} txs on {} hashes to {}",
            transactions.len(),
            header.previous_hash,
            hash
        );
        Self {
            header,
            transactions,
            hash,
        }
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    /// Search nonces until the hash has `difficulty` leading zeros, sealing the block.
    pub fn mine(self, difficulty: u32, config: &MiningConfig) -> Result<Block> {
        if config.parallel {
            mine::mine_block_parallel(self, difficulty, config.max_attempts)
        } else {
            mine::mine_block(self, difficulty, config.max_attempts)
        }
    }
}

/// A mined block.
///
/// Fields stay public so callers can inspect them, and so tampering can be
/// simulated; [`Block::verify`] and [`Chain::validate`](crate::Chain::validate)
/// detect such edits after the fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
    pub hash: String,
}

impl Block {
    pub fn calculate_hash(&self) -> String {
        self.header.hash()
    }

    pub fn is_genesis(&self) -> bool {
        self.header.previous_hash == GENESIS_PREVIOUS_HASH
    }

    /// Checks the block in isolation: stored hash, Merkle root, proof of work.
    pub fn verify(&self, difficulty: u32) -> std::result::Result<(), ViolationKind> {
        if self.calculate_hash() != self.hash {
            return Err(ViolationKind::HashMismatch);
        }
        if merkle_root(&self.transactions) != self.header.merkle_root {
            return Err(ViolationKind::MerkleRootMismatch);
        }
        if !meets_difficulty(&self.hash, difficulty) {
            return Err(ViolationKind::InsufficientWork);
        }
        Ok(())
    }
}
