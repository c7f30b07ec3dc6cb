//! Error types for Furrow.
use thiserror::Error;

use crate::types::{Address, Amount, AssetId, BlockNumber};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("invalid hex: {0}")] InvalidHex(String),
    #[error("invalid length: {0} bytes, expected 20")] InvalidLength(usize),
}

/// Failures surfaced by a [`TokenLedger`](crate::traits::TokenLedger).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("insufficient balance of {asset}: have {have}, need {need}")] InsufficientBalance { asset: AssetId, have: Amount, need: Amount },
    #[error("insufficient allowance of {asset}: have {have}, need {need}")] InsufficientAllowance { asset: AssetId, have: Amount, need: Amount },
    #[error("balance overflow for {0}")] BalanceOverflow(AssetId),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FarmError {
    #[error("pool already registered: {0}")] DuplicatePool(AssetId),
    #[error("unknown pool: {0}")] UnknownPool(AssetId),
    #[error("pool has zero weight: {0}")] ZeroWeightPool(AssetId),
    #[error("insufficient stake: have {have}, need {need}")] InsufficientStake { have: Amount, need: Amount },
    #[error("insufficient reward: have {have}, need {need}")] InsufficientReward { have: Amount, need: Amount },
    #[error("insufficient custody balance: have {have}, need {need}")] InsufficientCustodyBalance { have: Amount, need: Amount },
    #[error("unauthorized caller: {0}")] Unauthorized(Address),
    #[error("asset is staked in a pool: {0}")] StakedAssetLocked(AssetId),
    #[error("stale block: got {got}, last applied {last}")] StaleBlock { got: BlockNumber, last: BlockNumber },
    #[error("arithmetic overflow")] ArithmeticOverflow,
    #[error(transparent)] Token(#[from] TokenError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("config source: {0}")] Source(String),
    #[error("invalid config: {0}")] Invalid(String),
}
