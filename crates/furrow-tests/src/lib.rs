//! Cross-crate test suite for Furrow.
//!
//! Integration tests drive a [`Farm`](furrow_farm::Farm) over the in-memory
//! token ledger through multi-pool reward scenarios, attempt to break its
//! accounting from a hostile caller's perspective, and check conservation
//! properties under randomized operation sequences.

pub mod helpers;
