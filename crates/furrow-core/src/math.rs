//! 256-bit fixed-point arithmetic for reward accrual.
//!
//! Every product is formed in [`U256`] and every division truncates toward
//! zero. Intermediate overflow and narrowing failures surface as
//! [`FarmError::ArithmeticOverflow`]; nothing wraps or saturates.

pub use primitive_types::U256;

use crate::constants::REWARD_PRECISION;
use crate::error::FarmError;
use crate::types::{Amount, BlockNumber, Weight};

/// Narrow a `U256` back to an [`Amount`].
pub fn to_amount(value: U256) -> Result<Amount, FarmError> {
    if value.bits() > 128 {
        return Err(FarmError::ArithmeticOverflow);
    }
    Ok(value.low_u128())
}

/// Per-block reward earned by a pool: `rate * weight / total_weight`.
///
/// Zero when `total_weight` is zero. Truncation here is the rounding policy:
/// the remainder of each block's emission is never distributed.
pub fn pool_share(rate: Amount, weight: Weight, total_weight: Weight) -> Result<U256, FarmError> {
    if total_weight == 0 {
        return Ok(U256::zero());
    }
    U256::from(rate)
        .checked_mul(U256::from(weight))
        .map(|v| v / U256::from(total_weight))
        .ok_or(FarmError::ArithmeticOverflow)
}

/// Accumulator growth for `elapsed` blocks of `share` spread over
/// `total_staked`: `share * elapsed * REWARD_PRECISION / total_staked`.
///
/// Zero when nothing is staked; those blocks are forfeited.
pub fn accumulator_increment(
    share: U256,
    elapsed: BlockNumber,
    total_staked: Amount,
) -> Result<U256, FarmError> {
    if total_staked == 0 {
        return Ok(U256::zero());
    }
    share
        .checked_mul(U256::from(elapsed))
        .and_then(|v| v.checked_mul(U256::from(REWARD_PRECISION)))
        .map(|v| v / U256::from(total_staked))
        .ok_or(FarmError::ArithmeticOverflow)
}

/// Reward attributable to `amount` of stake at accumulator value `acc`:
/// `amount * acc / REWARD_PRECISION`.
pub fn accrued(amount: Amount, acc: U256) -> Result<Amount, FarmError> {
    let scaled = U256::from(amount)
        .checked_mul(acc)
        .ok_or(FarmError::ArithmeticOverflow)?;
    to_amount(scaled / U256::from(REWARD_PRECISION))
}
