mod helpers;

use helpers::{build_chain, init_tracing, random_txs};
use minichain_core::{
    merkle_root, pow, Amount, Block, BlockCandidate, Chain, ChainConfig, Error, MiningConfig,
    Transaction, Violation, ViolationKind,
};

#[test]
fn test_valid_chain() -> anyhow::Result<()> {
    init_tracing();
    let chain = build_chain(ChainConfig::new(2), 3)?;
    assert_eq!(chain.len(), 4);
    assert!(chain.is_chain_valid());
    assert_eq!(chain.validate(), Ok(()));
    for (i, block) in chain.iter().enumerate() {
        assert!(block.hash.starts_with("00"), "block {i} hash {}", block.hash);
        assert_eq!(block.calculate_hash(), block.hash);
        assert_eq!(block.header.merkle_root, merkle_root(&block.transactions));
        if i > 0 {
            assert_eq!(block.header.previous_hash, chain[i - 1].hash);
        }
    }
    Ok(())
}

#[test]
fn test_difficulty_counts_every_zero() -> anyhow::Result<()> {
    // Reading the target as the number 0 * difficulty would accept a single
    // leading zero at any difficulty; every block here carries three.
    init_tracing();
    let chain = build_chain(ChainConfig::new(3), 2)?;
    for block in &chain {
        assert!(pow::leading_zero_digits(&block.hash) >= 3);
    }
    Ok(())
}

#[test]
fn test_difficulty_zero_accepts_any_hash() -> anyhow::Result<()> {
    let chain = build_chain(ChainConfig::new(0), 3)?;
    assert!(chain.iter().all(|b| b.header.nonce == 0));
    assert!(chain.is_chain_valid());
    Ok(())
}

#[test]
fn test_parallel_mining_chain() -> anyhow::Result<()> {
    init_tracing();
    let chain = build_chain(ChainConfig::new(3).with_parallel(true), 3)?;
    assert!(chain.is_chain_valid());
    assert!(chain.iter().all(|b| b.hash.starts_with("000")));
    Ok(())
}

#[test]
fn test_tampered_hash_detected() -> anyhow::Result<()> {
    init_tracing();
    let mut chain = build_chain(ChainConfig::new(2), 3)?;
    if let Some(block) = chain.block_mut(1) {
        block.hash = "tampered".to_string();
    }
    assert!(!chain.is_chain_valid());
    assert_eq!(
        chain.validate(),
        Err(Violation {
            index: 1,
            kind: ViolationKind::HashMismatch
        })
    );
    Ok(())
}

#[test]
fn test_broken_linkage_detected() -> anyhow::Result<()> {
    init_tracing();
    let mut chain = build_chain(ChainConfig::new(2), 3)?;
    if let Some(block) = chain.block_mut(2) {
        block.header.previous_hash = "tampered".to_string();
    }
    assert!(!chain.is_chain_valid());
    let violation = chain.validate().unwrap_err();
    assert_eq!(violation.index, 2);
    assert_eq!(violation.kind, ViolationKind::LinkageMismatch);
    Ok(())
}

#[test]
fn test_tampered_nonce_detected() -> anyhow::Result<()> {
    let mut chain = build_chain(ChainConfig::new(1), 2)?;
    if let Some(block) = chain.block_mut(2) {
        block.header.nonce += 1;
    }
    assert_eq!(
        chain.validate(),
        Err(Violation {
            index: 2,
            kind: ViolationKind::HashMismatch
        })
    );
    Ok(())
}

#[test]
fn test_tampered_transaction_detected() -> anyhow::Result<()> {
    let mut chain = build_chain(ChainConfig::new(1), 3)?;
    if let Some(block) = chain.block_mut(2) {
        let original = block.transactions[0].clone();
        block.transactions[0] = Transaction::with_timestamp(
            original.sender(),
            "mallory",
            original.amount(),
            original.timestamp(),
        );
    }
    assert_eq!(
        chain.validate(),
        Err(Violation {
            index: 2,
            kind: ViolationKind::MerkleRootMismatch
        })
    );
    Ok(())
}

#[test]
fn test_rehashed_forgery_lacks_work() -> anyhow::Result<()> {
    let difficulty = 2;
    let mut chain = build_chain(ChainConfig::new(difficulty), 2)?;
    let tip = chain.len() - 1;
    if let Some(block) = chain.block_mut(tip) {
        block.transactions = random_txs(2);
        block.header.merkle_root = merkle_root(&block.transactions);
        // Pick the first nonce that does not happen to satisfy the target.
        block.header.nonce = 0;
        while pow::meets_difficulty(&block.calculate_hash(), difficulty) {
            block.header.nonce += 1;
        }
        block.hash = block.calculate_hash();
    }
    assert_eq!(
        chain.validate(),
        Err(Violation {
            index: tip,
            kind: ViolationKind::InsufficientWork
        })
    );
    Ok(())
}

#[test]
fn test_first_violation_wins() -> anyhow::Result<()> {
    let mut chain = build_chain(ChainConfig::new(1), 3)?;
    if let Some(block) = chain.block_mut(3) {
        block.hash = "later".to_string();
    }
    if let Some(block) = chain.block_mut(1) {
        block.hash = "earlier".to_string();
    }
    assert_eq!(chain.validate().map_err(|v| v.index), Err(1));
    Ok(())
}

#[test]
fn test_validation_is_idempotent() -> anyhow::Result<()> {
    let chain = build_chain(ChainConfig::new(1), 3)?;
    let before: Vec<Block> = chain.blocks().to_vec();
    for _ in 0..5 {
        assert!(chain.is_chain_valid());
    }
    assert_eq!(chain.blocks(), before.as_slice());

    let mut broken = chain.clone();
    if let Some(block) = broken.block_mut(1) {
        block.hash = "x".to_string();
    }
    let first = broken.validate();
    for _ in 0..5 {
        assert_eq!(broken.validate(), first);
    }
    Ok(())
}

#[test]
fn test_imported_blocks_validate() -> anyhow::Result<()> {
    let config = ChainConfig::new(1);
    let chain = build_chain(config, 3)?;
    let exported = serde_json::to_string(chain.blocks())?;

    let blocks: Vec<Block> = serde_json::from_str(&exported)?;
    let imported = Chain::from_blocks(config, blocks)?;
    assert!(imported.is_chain_valid());

    // Same blocks, stricter difficulty than they were mined at.
    let stricter = Chain::from_blocks(ChainConfig::new(60), chain.blocks().to_vec())?;
    assert_eq!(
        stricter.validate().map_err(|v| (v.index, v.kind)),
        Err((0, ViolationKind::InsufficientWork))
    );
    Ok(())
}

#[test]
fn test_empty_non_genesis_block_rejected() -> anyhow::Result<()> {
    let mut chain = Chain::new(ChainConfig::new(1))?;
    assert!(matches!(chain.add_block(vec![]), Err(Error::EmptyBlock)));
    chain.add_block(vec![Transaction::new("Alice", "Bob", "1.2".parse::<Amount>()?)])?;
    assert!(chain.is_chain_valid());

    // A properly mined but empty block arriving from elsewhere is still flagged.
    let tip_hash = chain[1].hash.clone();
    let empty = BlockCandidate::new(vec![], tip_hash).mine(1, &MiningConfig::default())?;
    let mut blocks = chain.blocks().to_vec();
    blocks.push(empty);
    let imported = Chain::from_blocks(ChainConfig::new(1), blocks)?;
    assert_eq!(
        imported.validate(),
        Err(Violation {
            index: 2,
            kind: ViolationKind::EmptyBlock
        })
    );
    Ok(())
}
