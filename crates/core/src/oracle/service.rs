//! Price oracle run orchestration.
//!
//! # Architecture
//!
//! ```text
//! PriceOracle
//!       │
//!       ├─► LedgerClient (catalog, price submission, recompute trigger)
//!       ├─► MarketDataProvider[] (first-match routing, one task per provider)
//!       └─► CurrencyConverter (quotes outside the target currency)
//! ```
//!
//! Every routed instrument ends the fetch phase with exactly one quote or
//! one failure, whatever its provider did.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use oracle_ledger::LedgerClient;
use oracle_market_data::fx::canonical_currency;
use oracle_market_data::{
    CurrencyConverter, FailureCause, FetchFailure, FetchOutcome, FxError, Instrument,
    MarketDataError, MarketDataProvider, Quote,
};
use rust_decimal::Decimal;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use super::model::{OracleConfig, RunPhase, RunSummary};
use super::routing::{route, ProviderGroup};
use crate::errors::{OracleError, Result};

/// Extra time a provider task gets past the fetch deadline before it is
/// abandoned. Providers are expected to resolve by the deadline themselves.
const PROVIDER_GRACE: Duration = Duration::from_secs(1);

/// How a provider task ended.
enum TaskResult {
    Completed(std::result::Result<FetchOutcome, MarketDataError>),
    Panicked(String),
    Abandoned,
}

/// Orchestrates one oracle run.
pub struct PriceOracle {
    ledger: Arc<dyn LedgerClient>,
    providers: Vec<Arc<dyn MarketDataProvider>>,
    converter: Arc<CurrencyConverter>,
    config: OracleConfig,
}

impl PriceOracle {
    /// Providers are consulted in order; the first that supports an
    /// instrument's asset type prices it.
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        providers: Vec<Arc<dyn MarketDataProvider>>,
        converter: Arc<CurrencyConverter>,
        config: OracleConfig,
    ) -> Self {
        Self {
            ledger,
            providers,
            converter,
            config,
        }
    }

    /// Execute a single pass: catalog, fetch, convert, submit, recompute.
    ///
    /// Only catalog and submission failures abort the run. Everything else
    /// lands in the summary.
    pub async fn run(&self) -> Result<RunSummary> {
        let started = std::time::Instant::now();
        let mut phase = RunPhase::Idle;
        let mut summary = RunSummary::default();

        advance(&mut phase, RunPhase::FetchingCatalog);
        let instruments = self
            .ledger
            .get_instruments()
            .await
            .map_err(OracleError::Catalog)?;
        summary.instruments_fetched = instruments.len();

        if instruments.is_empty() {
            info!("No instruments tracked, nothing to do");
            return Ok(finish(&mut phase, summary, started));
        }

        advance(&mut phase, RunPhase::FetchingPrices);
        let routing = route(&self.providers, &instruments);
        for instrument in &routing.unsupported {
            warn!(
                instrument_id = %instrument.id,
                symbol = %instrument.symbol,
                asset_type = %instrument.asset_type,
                "No provider supports asset type"
            );
        }
        summary.unsupported = routing.unsupported.iter().map(|i| i.id.clone()).collect();

        let fetched = self.fetch_all(routing.groups).await;
        info!(
            "Fetched {} quotes with {} failures ({} unsupported)",
            fetched.quotes.len(),
            fetched.failures.len(),
            summary.unsupported.len()
        );
        summary.failures = fetched.failures;

        advance(&mut phase, RunPhase::Converting);
        let (quotes, conversion_failures) = self.convert_all(fetched.quotes, &instruments).await;
        summary.failures.extend(conversion_failures);

        if quotes.is_empty() {
            warn!("No quotes to submit");
            return Ok(finish(&mut phase, summary, started));
        }

        advance(&mut phase, RunPhase::SubmittingPrices);
        summary.quotes_submitted = self
            .ledger
            .submit_prices(&quotes)
            .await
            .map_err(OracleError::Submission)?;

        if self.config.compute_snapshots {
            advance(&mut phase, RunPhase::TriggeringSnapshot);
            match self.ledger.trigger_recompute(Utc::now()).await {
                Ok(recomputed) => summary.valuations_recomputed = recomputed,
                Err(e) => warn!("Failed to trigger valuation recompute: {}", e),
            }
        }

        Ok(finish(&mut phase, summary, started))
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Fetch every group concurrently, one task per provider.
    async fn fetch_all(&self, groups: Vec<ProviderGroup>) -> FetchOutcome {
        let deadline = Instant::now() + self.config.fetch_deadline;

        let tasks: Vec<_> = groups
            .into_iter()
            .map(|group| {
                let provider = group.provider;
                let instruments: Arc<[Instrument]> = group.instruments.into();
                info!(
                    "Fetching {} prices from {}",
                    instruments.len(),
                    provider.name()
                );

                let mut handle = tokio::spawn({
                    let provider = provider.clone();
                    let instruments = instruments.clone();
                    async move { provider.fetch_prices(&instruments, deadline).await }
                });

                async move {
                    let result = match timeout_at(deadline + PROVIDER_GRACE, &mut handle).await {
                        Ok(Ok(result)) => TaskResult::Completed(result),
                        Ok(Err(e)) => TaskResult::Panicked(e.to_string()),
                        Err(_) => {
                            handle.abort();
                            TaskResult::Abandoned
                        }
                    };
                    reconcile(provider.as_ref(), &instruments, result)
                }
            })
            .collect();

        join_all(tasks).await.into_iter().collect()
    }

    // =========================================================================
    // Conversion
    // =========================================================================

    /// Convert quotes into the target currency. A quote that cannot be
    /// converted becomes a failure for its instrument.
    async fn convert_all(
        &self,
        quotes: Vec<Quote>,
        instruments: &[Instrument],
    ) -> (Vec<Quote>, Vec<FetchFailure>) {
        let rates = self.resolve_rates(&quotes).await;

        let by_id: HashMap<&str, &Instrument> =
            instruments.iter().map(|i| (i.id.as_str(), i)).collect();
        let mut converted = Vec::with_capacity(quotes.len());
        let mut failures = Vec::new();

        for quote in quotes {
            let instrument_id = quote.instrument_id.clone();
            match self.convert_quote(quote, &rates) {
                Ok(quote) => converted.push(quote),
                Err(cause) => {
                    let failure = match by_id.get(instrument_id.as_str()) {
                        Some(instrument) => FetchFailure::new(instrument, cause),
                        None => FetchFailure {
                            instrument_id,
                            symbol: String::new(),
                            cause,
                        },
                    };
                    debug!("Dropping quote: {}", failure);
                    failures.push(failure);
                }
            }
        }

        (converted, failures)
    }

    /// Look up every distinct currency pair once. Distinct pairs resolve
    /// concurrently.
    async fn resolve_rates(
        &self,
        quotes: &[Quote],
    ) -> HashMap<String, std::result::Result<Decimal, FxError>> {
        let currencies: HashSet<String> = quotes
            .iter()
            .filter(|q| self.converter.needs_conversion(&q.currency))
            .map(|q| canonical_currency(&q.currency))
            .collect();

        join_all(currencies.into_iter().map(|currency| async move {
            let rate = self.converter.get_rate(&currency).await;
            (currency, rate)
        }))
        .await
        .into_iter()
        .collect()
    }

    fn convert_quote(
        &self,
        quote: Quote,
        rates: &HashMap<String, std::result::Result<Decimal, FxError>>,
    ) -> std::result::Result<Quote, FailureCause> {
        if !self.converter.needs_conversion(&quote.currency) {
            return Ok(quote);
        }

        let rate = match rates.get(&canonical_currency(&quote.currency)) {
            Some(Ok(rate)) => *rate,
            Some(Err(e)) => return Err(FailureCause::Conversion(e.to_string())),
            None => {
                return Err(FailureCause::Conversion(format!(
                    "no exchange rate for {}",
                    quote.currency
                )))
            }
        };

        let price = self
            .converter
            .apply_rate(quote.price, &quote.currency, rate)
            .map_err(|e| FailureCause::Conversion(e.to_string()))?;
        if price <= 0 {
            return Err(FailureCause::Conversion(format!(
                "{} {} converts to a non-positive amount",
                quote.price, quote.currency
            )));
        }

        Ok(Quote {
            price,
            currency: self.converter.target_currency().to_string(),
            ..quote
        })
    }
}

/// Turn a provider task's result into exactly one record per routed instrument.
fn reconcile(
    provider: &dyn MarketDataProvider,
    instruments: &[Instrument],
    result: TaskResult,
) -> FetchOutcome {
    let cause = match result {
        TaskResult::Completed(Ok(outcome)) => {
            return reconcile_outcome(provider, instruments, outcome)
        }
        TaskResult::Completed(Err(e)) => {
            warn!("{} failed: {}", provider.name(), e);
            FailureCause::provider_failed(provider.name(), &e)
        }
        TaskResult::Panicked(message) => {
            warn!("{} task failed: {}", provider.name(), message);
            FailureCause::ProviderFailed {
                provider: provider.name().to_string(),
                message,
            }
        }
        TaskResult::Abandoned => {
            warn!("{} did not finish by the fetch deadline", provider.name());
            FailureCause::Timeout
        }
    };

    FetchOutcome::all_failed(instruments, &cause)
}

fn reconcile_outcome(
    provider: &dyn MarketDataProvider,
    instruments: &[Instrument],
    outcome: FetchOutcome,
) -> FetchOutcome {
    let mut pending: HashMap<&str, &Instrument> =
        instruments.iter().map(|i| (i.id.as_str(), i)).collect();
    let mut reconciled = FetchOutcome::new();

    for quote in outcome.quotes {
        if pending.remove(quote.instrument_id.as_str()).is_some() {
            reconciled.push_quote(quote);
        } else {
            debug!(
                "{} returned an extra quote for {}",
                provider.name(),
                quote.instrument_id
            );
        }
    }

    for failure in outcome.failures {
        if pending.remove(failure.instrument_id.as_str()).is_some() {
            reconciled.failures.push(failure);
        } else {
            debug!(
                "{} returned an extra failure for {}",
                provider.name(),
                failure.instrument_id
            );
        }
    }

    for instrument in instruments {
        if pending.contains_key(instrument.id.as_str()) {
            reconciled.push_failure(
                instrument,
                FailureCause::NoResult {
                    provider: provider.name().to_string(),
                },
            );
        }
    }

    reconciled
}

fn advance(phase: &mut RunPhase, next: RunPhase) {
    info!("Oracle phase {} -> {}", phase, next);
    *phase = next;
}

fn finish(phase: &mut RunPhase, mut summary: RunSummary, started: std::time::Instant) -> RunSummary {
    advance(phase, RunPhase::Done);
    summary.duration = started.elapsed();
    summary
}
