use crate::constants::{DEFAULT_DIFFICULTY, DEFAULT_MAX_ATTEMPTS, HASH_HEX_SIZE};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

pub const ENV_DIFFICULTY: &str = "MINICHAIN_DIFFICULTY";
pub const ENV_MAX_ATTEMPTS: &str = "MINICHAIN_MAX_ATTEMPTS";
pub const ENV_PARALLEL: &str = "MINICHAIN_PARALLEL";

/// Bounds and strategy for the nonce search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Maximum number of digests evaluated per block, nonce 0 included.
    pub max_attempts: u64,
    /// Spread the nonce range over the rayon thread pool.
    pub parallel: bool,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            parallel: false,
        }
    }
}

impl MiningConfig {
    pub fn validate(&self, difficulty: u32) -> Result<()> {
        check_search_bounds(difficulty, self.max_attempts)
    }
}

/// Difficulty must fit in a hex digest and at least one digest must be allowed.
pub(crate) fn check_search_bounds(difficulty: u32, max_attempts: u64) -> Result<()> {
    if difficulty as usize > HASH_HEX_SIZE {
        return Err(Error::DifficultyTooHigh {
            requested: difficulty,
            max: HASH_HEX_SIZE,
        });
    }
    if max_attempts == 0 {
        return Err(Error::InvalidConfig(
            "max_attempts must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Everything a [`Chain`](crate::chain::Chain) needs at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChainConfig {
    /// Required number of leading `'0'` hex digits in every sealed block hash.
    pub difficulty: u32,
    pub mining: MiningConfig,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining: MiningConfig::default(),
        }
    }
}

impl ChainConfig {
    pub fn new(difficulty: u32) -> Self {
        Self {
            difficulty,
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u64) -> Self {
        self.mining.max_attempts = max_attempts;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.mining.parallel = parallel;
        self
    }

    /// Rejects settings no search could ever satisfy.
    pub fn validate(&self) -> Result<()> {
        self.mining.validate(self.difficulty)
    }

    /// Defaults overlaid with `MINICHAIN_DIFFICULTY`, `MINICHAIN_MAX_ATTEMPTS`
    /// and `MINICHAIN_PARALLEL`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_DIFFICULTY) {
            config.difficulty = parse_var(ENV_DIFFICULTY, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_ATTEMPTS) {
            config.mining.max_attempts = parse_var(ENV_MAX_ATTEMPTS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PARALLEL) {
            config.mining.parallel = parse_var(ENV_PARALLEL, &raw)?;
        }
        config.validate()?;
        Ok(config)
    }
}

fn parse_var<T: FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| Error::InvalidConfig(format!("{key}={raw:?} is not valid")))
}
