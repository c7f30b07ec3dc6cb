//! Protocol constants. All amounts are in base units (1 token = 10^18 units).

/// Base units per whole token.
pub const UNIT: u128 = 1_000_000_000_000_000_000;

/// Implicit denominator of every pool accumulator (`acc_reward_per_share`).
///
/// An accumulator value of `REWARD_PRECISION` means one base unit of reward
/// has accrued per base unit of stake.
pub const REWARD_PRECISION: u128 = UNIT;

/// Reward emitted per block when no rate is configured (0.3 tokens).
pub const DEFAULT_REWARD_PER_BLOCK: u128 = 3 * UNIT / 10;

/// Prefix for environment-variable configuration overrides
/// (`FURROW_REWARD_PER_BLOCK`, `FURROW_ADMIN`, ...).
pub const ENV_PREFIX: &str = "FURROW";

/// Default log filter for test harnesses and embedding hosts.
pub const DEFAULT_LOG_LEVEL: &str = "info";
