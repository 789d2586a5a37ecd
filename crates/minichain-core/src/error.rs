use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("mining exhausted {attempts} attempts without reaching difficulty {difficulty}")]
    MiningExhausted { difficulty: u32, attempts: u64 },

    #[error("chain has no blocks")]
    EmptyChain,

    #[error("only the genesis block may have no transactions")]
    EmptyBlock,

    #[error("difficulty {requested} exceeds the {max} hex digits of a digest")]
    DifficultyTooHigh { requested: u32, max: usize },

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
