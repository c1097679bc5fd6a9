//! Price Oracle Core - run orchestration.
//!
//! One run reads the ledger's instrument catalog, fans instruments out to the
//! first capable market data provider, converts quotes into the target
//! currency, submits a single price batch and optionally triggers a valuation
//! recompute.

pub mod errors;
pub mod oracle;

// Re-export error types
pub use errors::{OracleError, Result};

pub use oracle::{OracleConfig, PriceOracle, RunOutcome, RunPhase, RunSummary};
