//! Per-holder stake positions.
//!
//! A position tracks principal, the accumulator value it was last rebased
//! at, and reward already credited but not yet paid. With `acc` the pool's
//! accumulator:
//!
//! ```text
//! pending = amount * (acc - reward_debt_acc) / REWARD_PRECISION
//! earned  = settled_reward + pending
//! ```
//!
//! Truncating once per interval keeps every position's pending at or below
//! its exact share, so payouts never exceed emission.
//!
//! Every stake change is bracketed by [`Position::flush`] (credit pending
//! at the old stake) and [`Position::rebase`] (reset the debt at the new
//! stake), so past accrual is never repriced.

use std::collections::HashMap;

use furrow_core::error::FarmError;
use furrow_core::math::{self, U256};
use furrow_core::types::{Address, Amount, AssetId};
use serde::{Deserialize, Serialize};

/// One holder's stake in one pool.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    /// Principal currently staked.
    pub amount: Amount,
    /// Pool accumulator at the last rebase.
    pub reward_debt_acc: U256,
    /// Reward credited at earlier checkpoints and not yet harvested.
    pub settled_reward: Amount,
}

impl Position {
    /// Whether the position holds neither stake nor reward.
    pub fn is_empty(&self) -> bool {
        self.amount == 0 && self.settled_reward == 0
    }

    /// Reward accrued since the last rebase at accumulator `acc`.
    pub fn pending(&self, acc: U256) -> Result<Amount, FarmError> {
        // acc never decreases below the snapshot of a rebased position.
        math::accrued(self.amount, acc.saturating_sub(self.reward_debt_acc))
    }

    /// Total claimable reward at accumulator `acc`.
    pub fn earned(&self, acc: U256) -> Result<Amount, FarmError> {
        self.settled_reward
            .checked_add(self.pending(acc)?)
            .ok_or(FarmError::ArithmeticOverflow)
    }

    /// Move pending reward into `settled_reward`.
    pub fn flush(&mut self, acc: U256) -> Result<(), FarmError> {
        self.settled_reward = self.earned(acc)?;
        Ok(())
    }

    /// Start the next accrual interval at `acc`.
    pub fn rebase(&mut self, acc: U256) {
        self.reward_debt_acc = acc;
    }

    pub fn credit_stake(&mut self, amount: Amount) -> Result<(), FarmError> {
        self.amount = self
            .amount
            .checked_add(amount)
            .ok_or(FarmError::ArithmeticOverflow)?;
        Ok(())
    }

    pub fn debit_stake(&mut self, amount: Amount) -> Result<(), FarmError> {
        if amount > self.amount {
            return Err(FarmError::InsufficientStake {
                have: self.amount,
                need: amount,
            });
        }
        self.amount -= amount;
        Ok(())
    }

    /// Take `amount` out of the settled reward.
    pub fn debit_reward(&mut self, amount: Amount) -> Result<(), FarmError> {
        if amount > self.settled_reward {
            return Err(FarmError::InsufficientReward {
                have: self.settled_reward,
                need: amount,
            });
        }
        self.settled_reward -= amount;
        Ok(())
    }
}

/// Store of positions keyed by `(asset, holder)`.
///
/// Absent entries read as [`Position::default`]. Positions are never
/// removed; a fully withdrawn and harvested position stays at zero.
#[derive(Debug, Clone, Default)]
pub struct PositionLedger {
    positions: HashMap<(AssetId, Address), Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, asset: &AssetId, holder: &Address) -> Option<&Position> {
        self.positions.get(&(*asset, *holder))
    }

    /// Copy of the stored position, or an empty one.
    pub fn load(&self, asset: &AssetId, holder: &Address) -> Position {
        self.get(asset, holder).copied().unwrap_or_default()
    }

    /// Store `position`. An empty position for a holder with no record is
    /// dropped, so only a deposit or an existing record creates an entry.
    pub fn commit(&mut self, asset: AssetId, holder: Address, position: Position) {
        let key = (asset, holder);
        if position.is_empty() && !self.positions.contains_key(&key) {
            return;
        }
        self.positions.insert(key, position);
    }

    /// Principal staked by `holder` in `asset`, zero if absent.
    pub fn staked(&self, asset: &AssetId, holder: &Address) -> Amount {
        self.get(asset, holder).map_or(0, |p| p.amount)
    }

    /// All positions held in one pool.
    pub fn positions_in<'a>(
        &'a self,
        asset: &'a AssetId,
    ) -> impl Iterator<Item = (&'a Address, &'a Position)> + 'a {
        self.positions
            .iter()
            .filter(move |((a, _), _)| a == asset)
            .map(|((_, holder), p)| (holder, p))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}
