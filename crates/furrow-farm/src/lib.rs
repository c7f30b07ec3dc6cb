//! # furrow-farm: weighted multi-pool reward distribution.
//!
//! All calculations use integer arithmetic only for determinism.
//!
//! A global per-block reward is split across pools by weight, and within a
//! pool across depositors by stake:
//! - **Accumulator**: each pool tracks reward-per-unit-of-stake since
//!   registration; settling advances it to the current block using the
//!   weight and rate that were in effect.
//! - **Positions**: each depositor records a reward debt against the
//!   accumulator so reward earned before a deposit is never paid to it.
//! - **Facade**: [`Farm`] settles before every mutation and applies each
//!   operation all-or-nothing.

pub mod accumulator;
pub mod config;
pub mod farm;
pub mod position;
pub mod registry;

pub use accumulator::Emission;
pub use config::FarmConfig;
pub use farm::Farm;
pub use position::{Position, PositionLedger};
pub use registry::{Pool, PoolRegistry};
