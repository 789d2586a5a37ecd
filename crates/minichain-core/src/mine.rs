use crate::{
    config::check_search_bounds,
    error::{Error, Result},
    pow::meets_difficulty,
    Block, BlockCandidate,
};
use rayon::prelude::*;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

/// Hash of the header whose preimage prefix is already absorbed by `prefix`.
fn hash_with_nonce(prefix: &Sha256, nonce: u64) -> String {
    let mut hasher = prefix.clone();
    hasher.update(nonce.to_string());
    hex::encode(hasher.finalize())
}

/// Mines a block by incrementing the nonce until the hash has `difficulty`
/// leading zero digits. At most `max_attempts` hashes are evaluated, the
/// candidate's initial hash included.
pub fn mine_block(candidate: BlockCandidate, difficulty: u32, max_attempts: u64) -> Result<Block> {
    check_search_bounds(difficulty, max_attempts)?;
    let BlockCandidate {
        mut header,
        transactions,
        mut hash,
    } = candidate;
    let prefix = Sha256::new_with_prefix(header.preimage_prefix());
    let exhausted = |attempts| Error::MiningExhausted {
        difficulty,
        attempts,
    };

    debug!("mining at difficulty {difficulty}, up to {max_attempts} attempts");
    let mut attempts = 1u64;
    while !meets_difficulty(&hash, difficulty) {
        if attempts >= max_attempts {
            return Err(exhausted(attempts));
        }
        header.nonce = header.nonce.checked_add(1).ok_or(exhausted(attempts))?;
        hash = hash_with_nonce(&prefix, header.nonce);
        attempts += 1;
    }

    info!("Mined block with nonce {} and hash {}", header.nonce, hash);
    Ok(Block {
        header,
        transactions,
        hash,
    })
}

/// Same contract as [`mine_block`], with the nonce range split across the
/// rayon pool. The first thread to find a match wins, so the nonce is not
/// necessarily the smallest one that qualifies.
pub fn mine_block_parallel(
    candidate: BlockCandidate,
    difficulty: u32,
    max_attempts: u64,
) -> Result<Block> {
    check_search_bounds(difficulty, max_attempts)?;
    let BlockCandidate {
        mut header,
        transactions,
        ..
    } = candidate;
    let prefix = Sha256::new_with_prefix(header.preimage_prefix());
    let start = header.nonce;
    let end = start.saturating_add(max_attempts);

    debug!("mining in parallel at difficulty {difficulty}, nonces {start}..{end}");
    let found = (start..end)
        .into_par_iter()
        .find_any(|nonce| meets_difficulty(&hash_with_nonce(&prefix, *nonce), difficulty))
        .ok_or(Error::MiningExhausted {
            difficulty,
            attempts: end - start,
        })?;

    header.nonce = found;
    let hash = hash_with_nonce(&prefix, found);
    info!("Mined block with nonce {} and hash {}", found, hash);
    Ok(Block {
        header,
        transactions,
        hash,
    })
}
