//! Core error types for the price oracle.
//!
//! Only conditions that abort a run live here. Per-instrument problems are
//! collected as `FetchFailure`s in the run summary instead.

use oracle_ledger::LedgerError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, OracleError>;

/// Fatal run errors.
#[derive(Error, Debug)]
pub enum OracleError {
    #[error("Failed to fetch the instrument catalog: {0}")]
    Catalog(#[source] LedgerError),

    #[error("Failed to submit prices: {0}")]
    Submission(#[source] LedgerError),
}
