//! # furrow-core
//! Foundation types, fixed-point math and the token interface for Furrow.

pub mod constants;
pub mod error;
pub mod math;
pub mod token;
pub mod traits;
pub mod types;
