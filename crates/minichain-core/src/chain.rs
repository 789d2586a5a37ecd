use crate::{
    config::ChainConfig,
    constants::GENESIS_PREVIOUS_HASH,
    error::{Error, Result},
    Block, BlockCandidate, Transaction,
};
use std::ops::Index;
use tracing::{info, warn};

/// Why a block failed validation.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViolationKind {
    /// Stored hash differs from the hash recomputed from the header.
    #[error("hash mismatch")]
    HashMismatch,
    /// `previous_hash` differs from the predecessor's stored hash.
    #[error("linkage mismatch")]
    LinkageMismatch,
    #[error("merkle root mismatch")]
    MerkleRootMismatch,
    /// Stored hash lacks the leading zeros the chain difficulty demands.
    #[error("insufficient proof of work")]
    InsufficientWork,
    /// A block after genesis carries no transactions.
    #[error("empty block")]
    EmptyBlock,
}

/// The first block found invalid, and why.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("block {index}: {kind}")]
pub struct Violation {
    pub index: usize,
    pub kind: ViolationKind,
}

/// Append-only sequence of mined blocks, starting from a genesis block.
#[derive(Clone, Debug)]
pub struct Chain {
    config: ChainConfig,
    blocks: Vec<Block>,
}

impl Chain {
    /// Validates `config` and mines the genesis block.
    pub fn new(config: ChainConfig) -> Result<Self> {
        config.validate()?;
        let genesis = BlockCandidate::new(Vec::new(), GENESIS_PREVIOUS_HASH)
            .mine(config.difficulty, &config.mining)?;
        info!("genesis block {} at difficulty {}", genesis.hash, config.difficulty);
        Ok(Self {
            config,
            blocks: vec![genesis],
        })
    }

    /// Wraps blocks produced elsewhere, e.g. deserialized, without re-mining.
    /// Nothing is checked beyond non-emptiness; call [`Chain::validate`].
    pub fn from_blocks(config: ChainConfig, blocks: Vec<Block>) -> Result<Self> {
        config.validate()?;
        if blocks.is_empty() {
            return Err(Error::EmptyChain);
        }
        Ok(Self { config, blocks })
    }

    /// Mines a block on top of the current tip and appends it. Only genesis
    /// may be empty, so `transactions` must not be.
    pub fn add_block(&mut self, transactions: Vec<Transaction>) -> Result<&Block> {
        let previous_hash = self.tip().ok_or(Error::EmptyChain)?.hash.clone();
        if transactions.is_empty() {
            return Err(Error::EmptyBlock);
        }
        let block = BlockCandidate::new(transactions, previous_hash)
            .mine(self.config.difficulty, &self.config.mining)?;
        info!(
            "appended block {} with {} txs, nonce {} and hash {}",
            self.blocks.len(),
            block.transactions.len(),
            block.header.nonce,
            block.hash
        );
        self.blocks.push(block);
        self.tip().ok_or(Error::EmptyChain)
    }

    /// Scans blocks in order and reports the first violation.
    ///
    /// For each block after genesis the link to its predecessor is checked
    /// first, then the block itself (hash, Merkle root, proof of work), then
    /// that it carries transactions. Genesis only gets the self checks.
    pub fn validate(&self) -> std::result::Result<(), Violation> {
        for (index, block) in self.blocks.iter().enumerate() {
            let linked = match index.checked_sub(1).map(|i| &self.blocks[i]) {
                Some(previous) => block.header.previous_hash == previous.hash,
                None => true,
            };
            let checked = if !linked {
                Err(ViolationKind::LinkageMismatch)
            } else {
                block.verify(self.config.difficulty).and_then(|()| {
                    if index > 0 && block.transactions.is_empty() {
                        Err(ViolationKind::EmptyBlock)
                    } else {
                        Ok(())
                    }
                })
            };
            if let Err(kind) = checked {
                let violation = Violation { index, kind };
                warn!("chain invalid: {violation}");
                return Err(violation);
            }
        }
        Ok(())
    }

    pub fn is_chain_valid(&self) -> bool {
        self.validate().is_ok()
    }

    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    pub fn difficulty(&self) -> u32 {
        self.config.difficulty
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Block> {
        self.blocks.get(index)
    }

    /// Direct write access to a stored block. Edits are not prevented, only
    /// detected by [`Chain::validate`].
    pub fn block_mut(&mut self, index: usize) -> Option<&mut Block> {
        self.blocks.get_mut(index)
    }

    pub fn tip(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl Index<usize> for Chain {
    type Output = Block;

    fn index(&self, index: usize) -> &Block {
        &self.blocks[index]
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = std::slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.blocks.iter()
    }
}
