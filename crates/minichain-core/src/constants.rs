pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const AMOUNT_DECIMALS: u32 = 8;
pub const AMOUNT_SCALE: u64 = 10u64.pow(AMOUNT_DECIMALS);
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const EMPTY_MERKLE_ROOT: &str = "";
pub const DEFAULT_DIFFICULTY: u32 = 2;
pub const DEFAULT_MAX_ATTEMPTS: u64 = 50_000_000;
