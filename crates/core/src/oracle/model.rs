use std::fmt;
use std::time::Duration;

use oracle_market_data::FetchFailure;

use crate::errors::OracleError;

/// Default target currency for submitted prices.
pub const DEFAULT_TARGET_CURRENCY: &str = "MYR";

/// Default budget for the whole fetch phase.
pub const DEFAULT_FETCH_DEADLINE: Duration = Duration::from_secs(60);

/// Run-level settings for the orchestrator.
#[derive(Debug, Clone)]
pub struct OracleConfig {
    /// Currency every submitted price is expressed in.
    pub target_currency: String,
    /// Budget for the whole fetch phase, shared by all providers.
    pub fetch_deadline: Duration,
    /// Whether to ask the ledger to recompute valuations after submitting.
    pub compute_snapshots: bool,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            target_currency: DEFAULT_TARGET_CURRENCY.to_string(),
            fetch_deadline: DEFAULT_FETCH_DEADLINE,
            compute_snapshots: true,
        }
    }
}

/// Stages of a single oracle run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    FetchingCatalog,
    FetchingPrices,
    Converting,
    SubmittingPrices,
    TriggeringSnapshot,
    Done,
}

impl RunPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::FetchingCatalog => "fetching_catalog",
            Self::FetchingPrices => "fetching_prices",
            Self::Converting => "converting",
            Self::SubmittingPrices => "submitting_prices",
            Self::TriggeringSnapshot => "triggering_snapshot",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Instruments in the ledger catalog.
    pub instruments_fetched: usize,
    /// Prices the ledger reported as recorded.
    pub quotes_submitted: usize,
    /// Valuations the ledger reported as recomputed.
    pub valuations_recomputed: usize,
    /// Ids of instruments no provider could price.
    pub unsupported: Vec<String>,
    /// Instruments that could not be priced.
    pub failures: Vec<FetchFailure>,
    pub duration: Duration,
}

impl RunSummary {
    pub fn outcome(&self) -> RunOutcome {
        if self.failures.is_empty() {
            RunOutcome::Success
        } else {
            RunOutcome::Partial
        }
    }
}

/// Process-level classification of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Everything routed was priced and submitted.
    Success,
    /// Submitted, but at least one instrument failed.
    Partial,
    /// The run aborted.
    Fatal,
}

impl RunOutcome {
    pub fn of(result: &Result<RunSummary, OracleError>) -> Self {
        match result {
            Ok(summary) => summary.outcome(),
            Err(_) => Self::Fatal,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Fatal => 1,
            Self::Partial => 2,
        }
    }
}
