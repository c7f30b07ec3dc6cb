//! Farm configuration.
//!
//! [`FarmConfig`] carries the accounts and emission parameters a farm is
//! created with. It can be built programmatically or loaded from a TOML,
//! JSON or YAML file with `FURROW_*` environment overrides layered on top.

use std::path::Path;

use config::{Config, Environment, File};
use furrow_core::constants::{DEFAULT_LOG_LEVEL, DEFAULT_REWARD_PER_BLOCK, ENV_PREFIX};
use furrow_core::error::ConfigError;
use furrow_core::types::{amount_serde, Address, Amount, AssetId, BlockNumber};
use serde::{Deserialize, Serialize};

/// Configuration for a [`Farm`](crate::Farm) instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct FarmConfig {
    /// Account allowed to register pools, change weights and rates, and
    /// drain stray tokens.
    pub admin: Address,
    /// Account holding all staked principal and the reward reserve.
    pub custody: Address,
    /// Asset rewards are paid in.
    pub reward_asset: AssetId,
    /// Reward emitted per block across all pools.
    #[serde(with = "amount_serde")]
    pub reward_per_block: Amount,
    /// Block the farm starts at. Earlier blocks are rejected as stale.
    pub genesis_block: BlockNumber,
    /// Log filter for hosts that install a subscriber (e.g. "info",
    /// "furrow_farm=debug").
    pub log_level: String,
}

impl Default for FarmConfig {
    fn default() -> Self {
        Self {
            admin: Address::ZERO,
            custody: Address::ZERO,
            reward_asset: AssetId::default(),
            reward_per_block: DEFAULT_REWARD_PER_BLOCK,
            genesis_block: 0,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl FarmConfig {
    /// Config with the given accounts and default emission.
    pub fn new(admin: Address, custody: Address, reward_asset: AssetId) -> Self {
        Self {
            admin,
            custody,
            reward_asset,
            ..Self::default()
        }
    }

    /// Load from an optional file, then apply `FURROW_*` environment
    /// variables, then validate.
    ///
    /// The file format is inferred from its extension.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let cfg: Self = builder
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()
            .and_then(|c| c.try_deserialize::<Self>())
            .map_err(|e| ConfigError::Source(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations a farm cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.admin.is_zero() {
            return Err(ConfigError::Invalid("admin must be a non-zero address".into()));
        }
        if self.custody.is_zero() {
            return Err(ConfigError::Invalid("custody must be a non-zero address".into()));
        }
        if self.reward_asset.address().is_zero() {
            return Err(ConfigError::Invalid("reward_asset must be a non-zero address".into()));
        }
        Ok(())
    }
}
