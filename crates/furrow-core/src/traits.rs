//! Trait interfaces for Furrow.
//!
//! - [`TokenLedger`]: fungible asset balances and transfers. The farm
//!   consumes it; hosts implement it over their own token contracts.
//!   [`MemoryTokenLedger`](crate::token::MemoryTokenLedger) is the in-memory
//!   implementation used by tests and simulations.

use crate::error::TokenError;
use crate::types::{Address, Amount, AssetId};

/// Multi-asset fungible token balances with allowance-checked pulls.
///
/// Every mutating method is atomic: on error no balance or allowance has
/// changed.
pub trait TokenLedger: Send + Sync {
    /// Balance of `holder` in `asset`. Zero for unknown holders or assets.
    fn balance_of(&self, asset: &AssetId, holder: &Address) -> Amount;

    /// Amount `spender` may still pull from `owner` in `asset`.
    fn allowance(&self, asset: &AssetId, owner: &Address, spender: &Address) -> Amount;

    /// Set the allowance of `spender` over `owner`'s `asset` balance.
    fn approve(&mut self, asset: &AssetId, owner: &Address, spender: &Address, amount: Amount);

    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientBalance`] if `from` holds less than `amount`
    /// - [`TokenError::BalanceOverflow`] if the recipient balance would overflow
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;

    /// Move `amount` of `asset` from `from` to `to` on behalf of `spender`,
    /// consuming allowance.
    ///
    /// # Errors
    ///
    /// - [`TokenError::InsufficientAllowance`] if the allowance is below `amount`
    /// - any error of [`transfer`](Self::transfer)
    fn transfer_from(
        &mut self,
        asset: &AssetId,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: Amount,
    ) -> Result<(), TokenError>;
}
