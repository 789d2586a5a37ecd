use minichain_core::{Amount, Chain, ChainConfig, Transaction};
use rand::Rng;

pub fn init_tracing() {
    // Several tests race to install the subscriber; only the first wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn random_txs(count: usize) -> Vec<Transaction> {
    let mut rng = rand::thread_rng();
    (0..count)
        .map(|i| {
            Transaction::new(
                format!("addr_from_{i}"),
                format!("addr_to_{}", rng.gen_range(0..1_000)),
                Amount::from_units(rng.gen_range(1..10_000_000_000)),
            )
        })
        .collect()
}

/// Genesis plus `extra` blocks of random transactions.
pub fn build_chain(config: ChainConfig, extra: usize) -> anyhow::Result<Chain> {
    let mut chain = Chain::new(config)?;
    for i in 0..extra {
        chain.add_block(random_txs(i + 1))?;
    }
    Ok(chain)
}
