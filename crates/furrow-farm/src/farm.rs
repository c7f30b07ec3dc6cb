//! Distribution facade.
//!
//! [`Farm`] owns the pool registry, the position ledger and a handle to the
//! token ledger. Every mutating entry point settles the pools it affects at
//! the pre-mutation weight and rate, applies the change, and either commits
//! all of it or none of it.
//!
//! Operations that change the total weight or the reward rate settle every
//! pool on a staged copy of the registry and swap it in on success.
//! Operations on a single position go through [`Farm::with_settled_position`].

use furrow_core::error::{ConfigError, FarmError};
use furrow_core::traits::TokenLedger;
use furrow_core::types::{Address, Amount, AssetId, BlockNumber, Weight};
use tracing::{debug, info, warn};

use crate::accumulator::{self, Emission};
use crate::config::FarmConfig;
use crate::position::{Position, PositionLedger};
use crate::registry::{Pool, PoolRegistry};

/// Token movement requested by a position operation, executed only after
/// all bookkeeping has succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transfer {
    /// Pull stake from a depositor into custody.
    Pull { asset: AssetId, from: Address, amount: Amount },
    /// Return principal from custody.
    Push { asset: AssetId, to: Address, amount: Amount },
    /// Pay reward out of the free custody balance.
    Reward { to: Address, amount: Amount },
}

/// Weighted multi-pool reward farm over a [`TokenLedger`].
#[derive(Debug, Clone)]
pub struct Farm<L: TokenLedger> {
    admin: Address,
    custody: Address,
    reward_asset: AssetId,
    reward_per_block: Amount,
    registry: PoolRegistry,
    positions: PositionLedger,
    ledger: L,
    last_block: BlockNumber,
}

impl<L: TokenLedger> Farm<L> {
    /// Create a farm with no pools.
    pub fn new(config: FarmConfig, ledger: L) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            admin = %config.admin,
            custody = %config.custody,
            reward_asset = %config.reward_asset,
            reward_per_block = config.reward_per_block,
            genesis = config.genesis_block,
            log_level = %config.log_level,
            "farm initialized"
        );
        Ok(Self {
            admin: config.admin,
            custody: config.custody,
            reward_asset: config.reward_asset,
            reward_per_block: config.reward_per_block,
            registry: PoolRegistry::new(),
            positions: PositionLedger::new(),
            ledger,
            last_block: config.genesis_block,
        })
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    pub fn admin(&self) -> Address {
        self.admin
    }

    pub fn custody(&self) -> Address {
        self.custody
    }

    pub fn reward_asset(&self) -> AssetId {
        self.reward_asset
    }

    pub fn reward_per_block(&self) -> Amount {
        self.reward_per_block
    }

    pub fn total_weight(&self) -> Weight {
        self.registry.total_weight()
    }

    /// Highest block number applied by a mutating operation.
    pub fn last_block(&self) -> BlockNumber {
        self.last_block
    }

    pub fn pool(&self, asset: &AssetId) -> Option<&Pool> {
        self.registry.get(asset)
    }

    /// Registered pools in identifier order.
    pub fn pools(&self) -> impl Iterator<Item = &Pool> {
        self.registry.iter()
    }

    pub fn position(&self, asset: &AssetId, holder: &Address) -> Option<&Position> {
        self.positions.get(asset, holder)
    }

    pub fn positions(&self) -> &PositionLedger {
        &self.positions
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    /// Custody balance of `asset` not backing any staked principal.
    pub fn free_custody_balance(&self, asset: &AssetId) -> Amount {
        self.ledger
            .balance_of(asset, &self.custody)
            .saturating_sub(self.registry.staked_in(asset))
    }

    // ------------------------------------------------------------------
    // Administration
    // ------------------------------------------------------------------

    /// Register a pool for `asset` with `weight`, settled at `now`.
    ///
    /// Existing pools are settled at the old total weight first.
    pub fn register_pool(
        &mut self,
        caller: Address,
        asset: AssetId,
        weight: Weight,
        now: BlockNumber,
    ) -> Result<(), FarmError> {
        self.ensure_admin(caller)?;
        self.check_clock(now)?;
        let mut staged = self.swept(now)?;
        staged.register(Pool::new(asset, weight, now))?;
        self.registry = staged;
        self.last_block = now;
        info!(
            pool = %asset,
            weight,
            total_weight = self.registry.total_weight(),
            block = now,
            "pool registered"
        );
        Ok(())
    }

    /// Change a pool's weight. Returns the previous weight.
    ///
    /// A zero weight stops accrual and deposits but never blocks withdraw
    /// or harvest.
    pub fn set_weight(
        &mut self,
        caller: Address,
        asset: AssetId,
        weight: Weight,
        now: BlockNumber,
    ) -> Result<Weight, FarmError> {
        self.ensure_admin(caller)?;
        self.check_clock(now)?;
        self.registry.require(&asset)?;
        let mut staged = self.swept(now)?;
        let old = staged.reweight(&asset, weight)?;
        self.registry = staged;
        self.last_block = now;
        info!(
            pool = %asset,
            old,
            new = weight,
            total_weight = self.registry.total_weight(),
            block = now,
            "pool reweighted"
        );
        Ok(old)
    }

    /// Change the global reward per block. Every pool is settled at the
    /// old rate first.
    pub fn set_reward_rate(
        &mut self,
        caller: Address,
        reward_per_block: Amount,
        now: BlockNumber,
    ) -> Result<(), FarmError> {
        self.ensure_admin(caller)?;
        self.check_clock(now)?;
        let staged = self.swept(now)?;
        let old = self.reward_per_block;
        self.registry = staged;
        self.reward_per_block = reward_per_block;
        self.last_block = now;
        info!(old, new = reward_per_block, block = now, "reward rate changed");
        Ok(())
    }

    /// Move `amount` of an asset that is not staked in any pool from
    /// custody to `to`.
    pub fn drain_stray(
        &mut self,
        caller: Address,
        asset: AssetId,
        to: Address,
        amount: Amount,
    ) -> Result<(), FarmError> {
        self.ensure_admin(caller)?;
        if self.registry.contains(&asset) {
            warn!(pool = %asset, "refusing to drain a staked asset");
            return Err(FarmError::StakedAssetLocked(asset));
        }
        let have = self.free_custody_balance(&asset);
        if amount > have {
            warn!(asset = %asset, have, need = amount, "stray drain exceeds custody balance");
            return Err(FarmError::InsufficientCustodyBalance { have, need: amount });
        }
        self.ledger.transfer(&asset, &self.custody, &to, amount)?;
        info!(asset = %asset, to = %to, amount, "stray tokens drained");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Positions
    // ------------------------------------------------------------------

    /// Stake `amount` of `asset` from `depositor`.
    ///
    /// The depositor must have approved custody as spender for at least
    /// `amount`.
    pub fn deposit(
        &mut self,
        depositor: Address,
        asset: AssetId,
        amount: Amount,
        now: BlockNumber,
    ) -> Result<(), FarmError> {
        self.with_settled_position(asset, depositor, now, |pool, position| {
            if !pool.is_active() {
                return Err(FarmError::ZeroWeightPool(pool.asset));
            }
            position.credit_stake(amount)?;
            pool.total_staked = pool
                .total_staked
                .checked_add(amount)
                .ok_or(FarmError::ArithmeticOverflow)?;
            Ok(Transfer::Pull { asset, from: depositor, amount })
        })?;
        debug!(pool = %asset, holder = %depositor, amount, block = now, "deposit");
        Ok(())
    }

    /// Return `amount` of staked principal to `holder`.
    pub fn withdraw(
        &mut self,
        holder: Address,
        asset: AssetId,
        amount: Amount,
        now: BlockNumber,
    ) -> Result<(), FarmError> {
        self.with_settled_position(asset, holder, now, |pool, position| {
            position.debit_stake(amount)?;
            pool.total_staked = pool
                .total_staked
                .checked_sub(amount)
                .ok_or(FarmError::ArithmeticOverflow)?;
            Ok(Transfer::Push { asset, to: holder, amount })
        })?;
        debug!(pool = %asset, holder = %holder, amount, block = now, "withdraw");
        Ok(())
    }

    /// Pay `amount` of `holder`'s settled reward to `holder`.
    pub fn harvest(
        &mut self,
        holder: Address,
        asset: AssetId,
        amount: Amount,
        now: BlockNumber,
    ) -> Result<(), FarmError> {
        self.harvest_for(holder, asset, holder, amount, now)
    }

    /// Harvest on behalf of `holder`. `caller` must be the holder or the
    /// admin; the reward always goes to the holder.
    pub fn harvest_for(
        &mut self,
        caller: Address,
        asset: AssetId,
        holder: Address,
        amount: Amount,
        now: BlockNumber,
    ) -> Result<(), FarmError> {
        if caller != holder && caller != self.admin {
            warn!(caller = %caller, holder = %holder, "harvest by third party rejected");
            return Err(FarmError::Unauthorized(caller));
        }
        self.with_settled_position(asset, holder, now, |_, position| {
            position.debit_reward(amount)?;
            Ok(Transfer::Reward { to: holder, amount })
        })?;
        info!(pool = %asset, holder = %holder, caller = %caller, amount, block = now, "reward harvested");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Views
    // ------------------------------------------------------------------

    /// Reward `holder` could harvest from `asset`'s pool at `now`.
    ///
    /// Zero for unknown pools and absent positions. Never mutates.
    pub fn earned_reward(
        &self,
        asset: &AssetId,
        holder: &Address,
        now: BlockNumber,
    ) -> Result<Amount, FarmError> {
        let Some(pool) = self.registry.get(asset) else {
            return Ok(0);
        };
        let Some(position) = self.positions.get(asset, holder) else {
            return Ok(0);
        };
        let acc = accumulator::projected_acc_reward_per_share(pool, self.emission(), now)?;
        position.earned(acc)
    }

    /// Principal `holder` has staked in `asset`'s pool.
    pub fn staked_amount(&self, asset: &AssetId, holder: &Address) -> Amount {
        self.positions.staked(asset, holder)
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn emission(&self) -> Emission {
        Emission::new(self.reward_per_block, self.registry.total_weight())
    }

    fn ensure_admin(&self, caller: Address) -> Result<(), FarmError> {
        if caller != self.admin {
            warn!(caller = %caller, "admin operation rejected");
            return Err(FarmError::Unauthorized(caller));
        }
        Ok(())
    }

    fn check_clock(&self, now: BlockNumber) -> Result<(), FarmError> {
        if now < self.last_block {
            return Err(FarmError::StaleBlock {
                got: now,
                last: self.last_block,
            });
        }
        Ok(())
    }

    /// Copy of the registry with every pool settled to `now`.
    fn swept(&self, now: BlockNumber) -> Result<PoolRegistry, FarmError> {
        let mut staged = self.registry.clone();
        let advanced = accumulator::settle_all(&mut staged, self.reward_per_block, now)?;
        debug!(pools = staged.len(), advanced, block = now, "swept pools");
        Ok(staged)
    }

    /// Settle one pool, checkpoint the holder's position, apply `op`, then
    /// rebase the position, execute the requested transfer and commit.
    ///
    /// Nothing is written unless every step succeeds.
    fn with_settled_position<F>(
        &mut self,
        asset: AssetId,
        holder: Address,
        now: BlockNumber,
        op: F,
    ) -> Result<(), FarmError>
    where
        F: FnOnce(&mut Pool, &mut Position) -> Result<Transfer, FarmError>,
    {
        self.check_clock(now)?;
        let emission = self.emission();
        let mut pool = self.registry.require(&asset)?.clone();
        accumulator::settle(&mut pool, emission, now)?;

        let mut position = self.positions.load(&asset, &holder);
        position.flush(pool.acc_reward_per_share)?;
        let transfer = op(&mut pool, &mut position)?;
        position.rebase(pool.acc_reward_per_share);

        self.execute(transfer)?;
        self.registry.commit(pool)?;
        self.positions.commit(asset, holder, position);
        self.last_block = now;
        Ok(())
    }

    fn execute(&mut self, transfer: Transfer) -> Result<(), FarmError> {
        match transfer {
            Transfer::Pull { amount: 0, .. }
            | Transfer::Push { amount: 0, .. }
            | Transfer::Reward { amount: 0, .. } => {}
            Transfer::Pull { asset, from, amount } => {
                self.ledger
                    .transfer_from(&asset, &self.custody, &from, &self.custody, amount)?;
            }
            Transfer::Push { asset, to, amount } => {
                self.ledger.transfer(&asset, &self.custody, &to, amount)?;
            }
            Transfer::Reward { to, amount } => {
                let have = self.free_custody_balance(&self.reward_asset);
                if amount > have {
                    warn!(have, need = amount, "reward payout exceeds free custody balance");
                    return Err(FarmError::InsufficientCustodyBalance { have, need: amount });
                }
                self.ledger
                    .transfer(&self.reward_asset, &self.custody, &to, amount)?;
            }
        }
        Ok(())
    }
}
