//! In-memory token ledger.
//!
//! [`MemoryTokenLedger`] keeps balances and allowances for any number of
//! assets in `HashMap`s. It has no persistence and is meant for tests,
//! benchmarks and simulations; hosts provide their own [`TokenLedger`].

use std::collections::HashMap;

use crate::error::TokenError;
use crate::traits::TokenLedger;
use crate::types::{Address, Amount, AssetId};

/// In-memory multi-asset token ledger.
///
/// Not thread-safe for writers; callers should wrap in a `Mutex` if
/// concurrent access is needed.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenLedger {
    /// `(asset, holder)` → balance.
    balances: HashMap<(AssetId, Address), Amount>,
    /// `(asset, owner, spender)` → remaining allowance.
    allowances: HashMap<(AssetId, Address, Address), Amount>,
    /// Minted supply per asset.
    supply: HashMap<AssetId, Amount>,
}

impl MemoryTokenLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create `amount` of `asset` out of thin air and credit it to `to`.
    ///
    /// # Errors
    ///
    /// [`TokenError::BalanceOverflow`] if the supply or the balance would overflow.
    pub fn mint(&mut self, asset: &AssetId, to: &Address, amount: Amount) -> Result<(), TokenError> {
        let supply = self
            .total_supply(asset)
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow(*asset))?;
        let balance = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow(*asset))?;
        self.supply.insert(*asset, supply);
        self.balances.insert((*asset, *to), balance);
        Ok(())
    }

    /// Total minted supply of `asset`.
    pub fn total_supply(&self, asset: &AssetId) -> Amount {
        self.supply.get(asset).copied().unwrap_or(0)
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn balance_of(&self, asset: &AssetId, holder: &Address) -> Amount {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> Amount {
        self.allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn approve(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: Amount) {
        self.allowances.insert((*asset, *owner, *spender), amount);
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let have = self.balance_of(asset, from);
        if have < amount {
            return Err(TokenError::InsufficientBalance {
                asset: *asset,
                have,
                need: amount,
            });
        }
        if from == to {
            return Ok(());
        }
        let credited = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or(TokenError::BalanceOverflow(*asset))?;
        self.balances.insert((*asset, *from), have - amount);
        self.balances.insert((*asset, *to), credited);
        Ok(())
    }

    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError> {
        let allowed = self.allowance(asset, from, spender);
        if allowed < amount {
            return Err(TokenError::InsufficientAllowance {
                asset: *asset,
                have: allowed,
                need: amount,
            });
        }
        self.transfer(asset, from, to, amount)?;
        self.allowances
            .insert((*asset, *from, *spender), allowed - amount);
        Ok(())
    }
}
