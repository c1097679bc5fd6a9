use std::fmt;

use crate::errors::FailureCause;

use super::instrument::Instrument;
use super::quote::Quote;

/// A failed price fetch for one instrument. Non-fatal to the run.
#[derive(Clone, Debug, PartialEq)]
pub struct FetchFailure {
    pub instrument_id: String,
    pub symbol: String,
    pub cause: FailureCause,
}

impl FetchFailure {
    pub fn new(instrument: &Instrument, cause: FailureCause) -> Self {
        Self {
            instrument_id: instrument.id.clone(),
            symbol: instrument.symbol.clone(),
            cause,
        }
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to fetch price for {} (ID {}): {}",
            self.symbol, self.instrument_id, self.cause
        )
    }
}

/// Quotes and failures produced by one fetch unit (a provider call or a batch).
///
/// Merging is a plain union, so the order in which outcomes are absorbed
/// does not matter.
#[derive(Clone, Debug, Default)]
pub struct FetchOutcome {
    pub quotes: Vec<Quote>,
    pub failures: Vec<FetchFailure>,
}

impl FetchOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every instrument in `instruments` failed for the same reason.
    pub fn all_failed<'a>(
        instruments: impl IntoIterator<Item = &'a Instrument>,
        cause: &FailureCause,
    ) -> Self {
        Self {
            quotes: Vec::new(),
            failures: instruments
                .into_iter()
                .map(|instrument| FetchFailure::new(instrument, cause.clone()))
                .collect(),
        }
    }

    pub fn push_quote(&mut self, quote: Quote) {
        self.quotes.push(quote);
    }

    pub fn push_failure(&mut self, instrument: &Instrument, cause: FailureCause) {
        self.failures.push(FetchFailure::new(instrument, cause));
    }

    pub fn merge(&mut self, other: FetchOutcome) {
        self.quotes.extend(other.quotes);
        self.failures.extend(other.failures);
    }

    /// Number of instruments accounted for.
    pub fn len(&self) -> usize {
        self.quotes.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty() && self.failures.is_empty()
    }
}

impl FromIterator<FetchOutcome> for FetchOutcome {
    fn from_iter<I: IntoIterator<Item = FetchOutcome>>(iter: I) -> Self {
        iter.into_iter().fold(FetchOutcome::new(), |mut acc, outcome| {
            acc.merge(outcome);
            acc
        })
    }
}
