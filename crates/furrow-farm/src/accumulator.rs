//! Reward-per-share accumulator.
//!
//! Settling a pool brings its accumulator current to a block:
//!
//! ```text
//! share   = reward_per_block * weight / total_weight
//! acc    += share * (now - last_settled_block) * REWARD_PRECISION / total_staked
//! ```
//!
//! Blocks that elapse while a pool has no stake are forfeited. Projection
//! performs the same computation without mutating the pool, so queries
//! report the value a settlement at that block would produce.

use furrow_core::error::FarmError;
use furrow_core::math::{self, U256};
use furrow_core::types::{Amount, BlockNumber, Weight};
use tracing::debug;

use crate::registry::{Pool, PoolRegistry};

/// Emission parameters in force over a settlement interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Emission {
    pub reward_per_block: Amount,
    pub total_weight: Weight,
}

impl Emission {
    pub fn new(reward_per_block: Amount, total_weight: Weight) -> Self {
        Self { reward_per_block, total_weight }
    }

    /// Per-block reward flowing to `pool`.
    pub fn share_of(&self, pool: &Pool) -> Result<U256, FarmError> {
        math::pool_share(self.reward_per_block, pool.weight, self.total_weight)
    }
}

/// Accumulator value `pool` would hold if settled at `now`.
///
/// Returns the stored value unchanged when `now` is not past the last
/// settlement.
pub fn projected_acc_reward_per_share(
    pool: &Pool,
    emission: Emission,
    now: BlockNumber,
) -> Result<U256, FarmError> {
    if now <= pool.last_settled_block {
        return Ok(pool.acc_reward_per_share);
    }
    let elapsed = now - pool.last_settled_block;
    let increment =
        math::accumulator_increment(emission.share_of(pool)?, elapsed, pool.total_staked)?;
    pool.acc_reward_per_share
        .checked_add(increment)
        .ok_or(FarmError::ArithmeticOverflow)
}

/// Bring `pool` current to `now`. Returns `false` when already current.
///
/// On error the pool is left untouched.
pub fn settle(pool: &mut Pool, emission: Emission, now: BlockNumber) -> Result<bool, FarmError> {
    if now <= pool.last_settled_block {
        return Ok(false);
    }
    let acc = projected_acc_reward_per_share(pool, emission, now)?;
    debug!(
        pool = %pool.asset,
        from = pool.last_settled_block,
        to = now,
        staked = pool.total_staked,
        "settled pool"
    );
    pool.acc_reward_per_share = acc;
    pool.last_settled_block = now;
    Ok(true)
}

/// Settle every pool in `registry` to `now` under the registry's current
/// total weight. Returns the number of pools that advanced.
///
/// Callers that need all-or-nothing behaviour sweep a staged copy.
pub fn settle_all(
    registry: &mut PoolRegistry,
    reward_per_block: Amount,
    now: BlockNumber,
) -> Result<usize, FarmError> {
    let emission = Emission::new(reward_per_block, registry.total_weight());
    let mut advanced = 0;
    for pool in registry.iter_mut() {
        if settle(pool, emission, now)? {
            advanced += 1;
        }
    }
    Ok(advanced)
}
