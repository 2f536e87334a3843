//! Helpers shared by the marketplace's operational binaries.
//!
//! The binaries are one-shot tools run by an operator: create a wallet,
//! check balances, probe a gated endpoint, make a real paid request, look the
//! deployment up in a discovery catalog, and check the facilitator.

pub mod catalog;
pub mod env;
pub mod error;
pub mod keys;
pub mod probe;
pub mod units;

pub use error::OpsError;
