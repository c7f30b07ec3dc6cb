//! Shared helpers for the integration tests.

use std::sync::Once;

use furrow_core::constants::UNIT;
use furrow_core::token::MemoryTokenLedger;
use furrow_core::traits::TokenLedger;
use furrow_core::types::{Address, Amount, AssetId};
use furrow_farm::{Farm, FarmConfig};

pub const ADMIN: Address = Address([0xAD; 20]);
pub const CUSTODY: Address = Address([0xC0; 20]);
pub const REWARD_ASSET: AssetId = AssetId::new(Address([0xEE; 20]));

/// Reward reserve minted to custody by [`new_farm`].
pub const REWARD_RESERVE: Amount = 1_000_000 * UNIT;

/// Account address from a seed byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 20])
}

/// Staked asset identifier from a seed byte. Seeds are offset so they never
/// collide with [`addr`] accounts.
pub fn asset(seed: u8) -> AssetId {
    let mut bytes = [seed; 20];
    bytes[0] = 0xA5;
    AssetId::new(Address(bytes))
}

/// Farm at genesis block 0 with the default rate and a funded reward reserve.
pub fn new_farm() -> Farm<MemoryTokenLedger> {
    let config = FarmConfig::new(ADMIN, CUSTODY, REWARD_ASSET);
    init_tracing_with(&config.log_level);
    let mut ledger = MemoryTokenLedger::new();
    ledger
        .mint(&REWARD_ASSET, &CUSTODY, REWARD_RESERVE)
        .expect("mint reward reserve");
    Farm::new(config, ledger).expect("valid config")
}

/// Mint `amount` of `asset` to `holder` and approve custody without limit.
pub fn fund(farm: &mut Farm<MemoryTokenLedger>, asset: AssetId, holder: Address, amount: Amount) {
    let ledger = farm.ledger_mut();
    ledger.mint(&asset, &holder, amount).expect("mint stake");
    ledger.approve(&asset, &holder, &CUSTODY, Amount::MAX);
}

/// Assert two amounts differ by at most `dust` base units.
///
/// Per-interval truncation makes the accumulator lose at most one base unit
/// per settlement, so closed-form expectations are compared with a bound.
#[track_caller]
pub fn assert_close(actual: Amount, expected: Amount, dust: Amount) {
    let diff = actual.abs_diff(expected);
    assert!(
        diff <= dust,
        "expected {expected} ± {dust}, got {actual} (off by {diff})"
    );
}

/// Install a `tracing` subscriber once per test binary at the default
/// configured log level.
pub fn init_tracing() {
    init_tracing_with(&FarmConfig::default().log_level);
}

/// Install a `tracing` subscriber once per test binary.
///
/// Honours `RUST_LOG`, falling back to `level` (a [`FarmConfig::log_level`]
/// filter such as `"info"` or `"furrow_farm=debug"`).
pub fn init_tracing_with(level: &str) {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        use tracing_subscriber::filter::EnvFilter;
        use tracing_subscriber::fmt;
        use tracing_subscriber::prelude::*;

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_test_writer().with_target(true))
            .try_init();
    });
}
