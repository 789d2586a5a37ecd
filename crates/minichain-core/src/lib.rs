pub mod block;
pub mod chain;
pub mod config;
pub mod constants;
pub mod error;
pub mod mine;

use constants::{AMOUNT_DECIMALS, AMOUNT_SCALE, EMPTY_MERKLE_ROOT};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

pub use block::{Block, BlockCandidate, BlockHeader};
pub use chain::{Chain, Violation, ViolationKind};
pub use config::{ChainConfig, MiningConfig};
pub use error::{Error, Result};

/// SHA-256 of `data`, rendered as 64 lowercase hex characters.
pub fn digest(data: impl AsRef<[u8]>) -> String {
    hex::encode(Sha256::digest(data.as_ref()))
}

/// Milliseconds since the unix epoch, UTC. A clock set before 1970 reads as 0.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or_default()
}

/// Unsigned fixed-point amount with [`AMOUNT_DECIMALS`] fractional digits.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_units(units: u64) -> Self {
        Amount(units)
    }

    /// `whole` plus `fraction` minor units, e.g. `Amount::new(1, 20_000_000)` is 1.2.
    pub fn new(whole: u64, fraction: u64) -> Result<Self> {
        if fraction >= AMOUNT_SCALE {
            return Err(Error::InvalidAmount(format!(
                "fraction {fraction} needs more than {AMOUNT_DECIMALS} digits"
            )));
        }
        whole
            .checked_mul(AMOUNT_SCALE)
            .and_then(|units| units.checked_add(fraction))
            .map(Amount)
            .ok_or_else(|| Error::InvalidAmount(format!("{whole}.{fraction} overflows")))
    }

    pub const fn units(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:0width$}",
            self.0 / AMOUNT_SCALE,
            self.0 % AMOUNT_SCALE,
            width = AMOUNT_DECIMALS as usize
        )
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidAmount(s.to_string());
        let (whole, fraction) = match s.split_once('.') {
            Some((whole, fraction)) if !fraction.is_empty() => (whole, fraction),
            Some(_) => return Err(invalid()),
            None => (s, ""),
        };
        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty()
            || !all_digits(whole)
            || !all_digits(fraction)
            || fraction.len() > AMOUNT_DECIMALS as usize
        {
            return Err(invalid());
        }
        let whole: u64 = whole.parse().map_err(|_| invalid())?;
        let fraction_units = if fraction.is_empty() {
            0
        } else {
            let pad = AMOUNT_DECIMALS - fraction.len() as u32;
            fraction.parse::<u64>().map_err(|_| invalid())? * 10u64.pow(pad)
        };
        Amount::new(whole, fraction_units)
    }
}

/// A transfer recorded in a block. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    sender: String,
    receiver: String,
    amount: Amount,
    /// Creation time, unix milliseconds (UTC).
    timestamp: u64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, receiver: impl Into<String>, amount: Amount) -> Self {
        Self::with_timestamp(sender, receiver, amount, now_millis())
    }

    pub fn with_timestamp(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        amount: Amount,
        timestamp: u64,
    ) -> Self {
        Self {
            sender: sender.into(),
            receiver: receiver.into(),
            amount,
            timestamp,
        }
    }

    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn receiver(&self) -> &str {
        &self.receiver
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Compact JSON with keys in lexicographic order; this is the Merkle leaf content.
    pub fn canonical(&self) -> String {
        serde_json::json!({
            "amount": self.amount.to_string(),
            "receiver": self.receiver,
            "sender": self.sender,
            "timestamp": self.timestamp,
        })
        .to_string()
    }
}

fn digest_pair(left: &str, right: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(left);
    hasher.update(right);
    hex::encode(hasher.finalize())
}

/// Root over the leaf digests of `txs`, in order. An odd level pairs its last
/// digest with itself. No transactions yields the empty string.
pub fn merkle_root(txs: &[Transaction]) -> String {
    if txs.is_empty() {
        return EMPTY_MERKLE_ROOT.to_string();
    }
    let mut level: Vec<String> = txs.iter().map(|t| digest(t.canonical())).collect();

    while level.len() > 1 {
        if level.len() % 2 == 1 {
            if let Some(last) = level.last().cloned() {
                level.push(last);
            }
        }
        level = level
            .chunks(2)
            .map(|pair| digest_pair(&pair[0], &pair[1]))
            .collect();
    }
    level.into_iter().next().unwrap_or_default()
}

pub mod pow {
    /// True when the first `difficulty` characters of `hash` are all `'0'`.
    ///
    /// The target is `difficulty` zero characters, not a single `"0"`: a
    /// one-zero prefix only satisfies difficulty 0 or 1.
    pub fn meets_difficulty(hash: &str, difficulty: u32) -> bool {
        let wanted = difficulty as usize;
        hash.len() >= wanted && hash.bytes().take(wanted).all(|b| b == b'0')
    }

    pub fn leading_zero_digits(hash: &str) -> u32 {
        hash.bytes().take_while(|b| *b == b'0').count() as u32
    }
}
