//! Pool registry: asset identifier → pool record, plus the total weight.
//!
//! The registry is a plain owned store. It validates identity and weight
//! bookkeeping but never settles; callers settle through
//! [`accumulator`](crate::accumulator) before changing weights or stake.

use std::collections::BTreeMap;

use furrow_core::error::FarmError;
use furrow_core::math::U256;
use furrow_core::types::{Amount, AssetId, BlockNumber, Weight};
use serde::{Deserialize, Serialize};

/// A weighted pool accepting one staked asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    /// Asset staked into this pool; also the pool identifier.
    pub asset: AssetId,
    /// Share of the global emission relative to the registry total weight.
    pub weight: Weight,
    /// Last block the accumulator was brought current.
    pub last_settled_block: BlockNumber,
    /// Reward per unit of stake since registration, scaled by
    /// [`REWARD_PRECISION`](furrow_core::constants::REWARD_PRECISION).
    pub acc_reward_per_share: U256,
    /// Sum of all positions' stake in this pool.
    pub total_staked: Amount,
}

impl Pool {
    /// A freshly registered pool, settled at `block`.
    pub fn new(asset: AssetId, weight: Weight, block: BlockNumber) -> Self {
        Self {
            asset,
            weight,
            last_settled_block: block,
            acc_reward_per_share: U256::zero(),
            total_staked: 0,
        }
    }

    /// Whether the pool accepts deposits.
    pub fn is_active(&self) -> bool {
        self.weight > 0
    }
}

/// Owned table of pools keyed by asset, iterated in identifier order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolRegistry {
    pools: BTreeMap<AssetId, Pool>,
    total_weight: Weight,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all pool weights.
    pub fn total_weight(&self) -> Weight {
        self.total_weight
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.pools.contains_key(asset)
    }

    pub fn get(&self, asset: &AssetId) -> Option<&Pool> {
        self.pools.get(asset)
    }

    /// Look up a pool or fail with [`FarmError::UnknownPool`].
    pub fn require(&self, asset: &AssetId) -> Result<&Pool, FarmError> {
        self.pools.get(asset).ok_or(FarmError::UnknownPool(*asset))
    }

    /// Pools in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &Pool> {
        self.pools.values()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Pool> {
        self.pools.values_mut()
    }

    /// Principal staked in the pool for `asset`, zero if unregistered.
    pub fn staked_in(&self, asset: &AssetId) -> Amount {
        self.pools.get(asset).map_or(0, |p| p.total_staked)
    }

    /// Add a new pool and its weight to the total.
    ///
    /// # Errors
    ///
    /// - [`FarmError::DuplicatePool`] if the asset is already registered
    /// - [`FarmError::ArithmeticOverflow`] if the total weight would overflow
    pub fn register(&mut self, pool: Pool) -> Result<(), FarmError> {
        if self.pools.contains_key(&pool.asset) {
            return Err(FarmError::DuplicatePool(pool.asset));
        }
        let total = self
            .total_weight
            .checked_add(pool.weight)
            .ok_or(FarmError::ArithmeticOverflow)?;
        self.total_weight = total;
        self.pools.insert(pool.asset, pool);
        Ok(())
    }

    /// Replace a pool's weight and adjust the total. Returns the old weight.
    ///
    /// The pool must already be settled at the current block.
    ///
    /// # Errors
    ///
    /// - [`FarmError::UnknownPool`] if the asset is not registered
    /// - [`FarmError::ArithmeticOverflow`] if the total weight would overflow
    pub fn reweight(&mut self, asset: &AssetId, weight: Weight) -> Result<Weight, FarmError> {
        let old = self.require(asset)?.weight;
        let total = (self.total_weight - old)
            .checked_add(weight)
            .ok_or(FarmError::ArithmeticOverflow)?;
        self.total_weight = total;
        if let Some(pool) = self.pools.get_mut(asset) {
            pool.weight = weight;
        }
        Ok(old)
    }

    /// Store an updated copy of an existing pool.
    ///
    /// # Errors
    ///
    /// [`FarmError::UnknownPool`] if the pool was never registered.
    /// The stored weight is kept; weight changes go through
    /// [`reweight`](Self::reweight).
    pub fn commit(&mut self, pool: Pool) -> Result<(), FarmError> {
        let slot = self
            .pools
            .get_mut(&pool.asset)
            .ok_or(FarmError::UnknownPool(pool.asset))?;
        let weight = slot.weight;
        *slot = Pool { weight, ..pool };
        Ok(())
    }
}
