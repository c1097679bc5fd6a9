//! Yahoo Finance market data provider.
//!
//! This provider uses the Yahoo Finance quote API to price:
//! - Equities/ETFs (e.g., AAPL, SHOP.TO)
//! - Bonds and REITs listed on an exchange
//! - Foreign exchange rates (e.g., USDMYR=X) for currency conversion

mod models;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use num_traits::FromPrimitive;
use reqwest::header;
use rust_decimal::Decimal;
use serde_json::Value;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::errors::{FailureCause, MarketDataError};
use crate::fx::{normalize_amount, FxError, FxRateSource};
use crate::models::{to_minor_units, AssetType, FetchOutcome, Instrument, Quote};
use crate::provider::{MarketDataProvider, ProviderCapabilities, RateLimit};
use crate::resolver::{yahoo_fx_ticker, yahoo_ticker};

use models::{entry_symbol, YahooQuote, YahooQuoteResponse, YahooQuoteResult};

const PROVIDER_ID: &str = "YAHOO";
const PROVIDER_NAME: &str = "Yahoo Finance";

/// Production quote API host.
pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Symbols per quote request.
pub const YAHOO_BATCH_SIZE: usize = 50;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Instruments that share one Yahoo ticker.
struct TickerGroup<'a> {
    ticker: String,
    instruments: Vec<&'a Instrument>,
}

/// Yahoo Finance market data provider.
///
/// Instruments are grouped by ticker, chunked into batches of
/// [`YAHOO_BATCH_SIZE`] symbols and fetched concurrently, with at most
/// `rate_limit.max_concurrency` requests in flight.
pub struct YahooProvider {
    client: reqwest::Client,
    base_url: String,
    rate_limit: RateLimit,
}

impl YahooProvider {
    /// Create a provider against the production API.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: YAHOO_BASE_URL.to_string(),
            rate_limit: RateLimit::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn rate_limit(&self) -> &RateLimit {
        &self.rate_limit
    }

    // ========================================================================
    // Request
    // ========================================================================

    /// Fetch one batch of tickers, keyed by upper-cased response symbol.
    ///
    /// Any error fails the whole batch.
    async fn fetch_batch(&self, tickers: &[&str]) -> Result<HashMap<String, Value>, FailureCause> {
        let url = format!("{}/v7/finance/quote", self.base_url);
        debug!("Requesting {} Yahoo quotes", tickers.len());

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .query(&[("symbols", tickers.join(","))])
            .send()
            .await
            .map_err(|e| FailureCause::from_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureCause::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: YahooQuoteResponse = response
            .json()
            .await
            .map_err(|e| FailureCause::Decode(e.to_string()))?;

        let YahooQuoteResult { result, error } = body.quote_response;
        let entries = result.unwrap_or_default();
        if entries.is_empty() {
            if let Some(error) = error {
                return Err(FailureCause::Upstream {
                    code: error.code.unwrap_or_default(),
                    description: error.description.unwrap_or_default(),
                });
            }
        }

        let mut by_symbol = HashMap::with_capacity(entries.len());
        for entry in entries {
            match entry_symbol(&entry) {
                Some(symbol) => {
                    by_symbol.insert(symbol.to_ascii_uppercase(), entry);
                }
                None => debug!("Skipping Yahoo result entry without a symbol"),
            }
        }
        Ok(by_symbol)
    }

    // ========================================================================
    // Parsing
    // ========================================================================

    /// Resolve every instrument of a batch against the fetched entries.
    fn resolve_batch(
        groups: &[TickerGroup<'_>],
        mut entries: HashMap<String, Value>,
        observed_at: DateTime<Utc>,
    ) -> FetchOutcome {
        let mut outcome = FetchOutcome::new();

        for group in groups {
            let Some(entry) = entries.remove(&group.ticker.to_ascii_uppercase()) else {
                for instrument in &group.instruments {
                    outcome.push_failure(
                        instrument,
                        FailureCause::NotInResponse {
                            ticker: group.ticker.clone(),
                        },
                    );
                }
                continue;
            };

            let parsed: Result<YahooQuote, _> = serde_json::from_value(entry);
            for instrument in &group.instruments {
                match &parsed {
                    Ok(quote) => match quote_for(instrument, &group.ticker, quote, observed_at) {
                        Ok(quote) => outcome.push_quote(quote),
                        Err(cause) => outcome.push_failure(instrument, cause),
                    },
                    Err(e) => outcome.push_failure(
                        instrument,
                        FailureCause::MalformedEntry {
                            ticker: group.ticker.clone(),
                            message: e.to_string(),
                        },
                    ),
                }
            }
        }

        outcome
    }
}

/// Build a minor-unit quote from a Yahoo entry.
///
/// Subunit currencies (GBp, ZAc) are folded into their major currency first.
/// An entry without a currency is taken to be in the instrument's currency.
fn quote_for(
    instrument: &Instrument,
    ticker: &str,
    entry: &YahooQuote,
    observed_at: DateTime<Utc>,
) -> Result<Quote, FailureCause> {
    let price = entry
        .regular_market_price
        .ok_or_else(|| FailureCause::MalformedEntry {
            ticker: ticker.to_string(),
            message: "missing regularMarketPrice".to_string(),
        })?;

    let currency = entry
        .currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(instrument.currency.as_str());

    let non_positive = || FailureCause::NonPositivePrice {
        ticker: ticker.to_string(),
        price: price.to_string(),
    };

    if !price.is_finite() || price <= 0.0 {
        return Err(non_positive());
    }
    let amount = Decimal::from_f64(price).ok_or_else(non_positive)?;
    let (amount, currency) = normalize_amount(amount, currency);
    let minor = to_minor_units(amount).ok_or_else(non_positive)?;

    Ok(Quote::new(
        instrument.id.clone(),
        minor,
        currency.to_ascii_uppercase(),
        observed_at,
    ))
}

/// Group instruments by ticker, keeping first-seen order.
fn group_by_ticker(instruments: &[Instrument]) -> Vec<TickerGroup<'_>> {
    let mut groups: Vec<TickerGroup<'_>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for instrument in instruments {
        let ticker = yahoo_ticker(instrument);
        match index.get(&ticker.to_ascii_uppercase()) {
            Some(&i) => groups[i].instruments.push(instrument),
            None => {
                index.insert(ticker.to_ascii_uppercase(), groups.len());
                groups.push(TickerGroup {
                    ticker,
                    instruments: vec![instrument],
                });
            }
        }
    }

    groups
}

#[async_trait]
impl MarketDataProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[
                AssetType::Stock,
                AssetType::Etf,
                AssetType::Bond,
                AssetType::Reit,
            ],
            max_batch_size: YAHOO_BATCH_SIZE,
        }
    }

    async fn fetch_prices(
        &self,
        instruments: &[Instrument],
        deadline: Instant,
    ) -> Result<FetchOutcome, MarketDataError> {
        if instruments.is_empty() {
            return Ok(FetchOutcome::new());
        }

        let groups = group_by_ticker(instruments);
        let batch_size = self.capabilities().max_batch_size.max(1);
        let batches: Vec<&[TickerGroup<'_>]> = groups.chunks(batch_size).collect();
        debug!(
            "Fetching {} instruments from {} in {} batches",
            instruments.len(),
            PROVIDER_NAME,
            batches.len()
        );

        let semaphore = Semaphore::new(self.rate_limit.max_concurrency.max(1));
        let semaphore = &semaphore;

        let tasks = batches.into_iter().map(|batch| async move {
            let tickers: Vec<&str> = batch.iter().map(|g| g.ticker.as_str()).collect();
            let all_instruments = || batch.iter().flat_map(|g| g.instruments.iter().copied());

            // The permit wait counts against the deadline too.
            let fetched = timeout_at(deadline, async {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| FailureCause::Request(e.to_string()))?;
                self.fetch_batch(&tickers).await
            })
            .await;

            match fetched {
                Ok(Ok(entries)) => Self::resolve_batch(batch, entries, Utc::now()),
                Ok(Err(cause)) => {
                    warn!(
                        "{} batch of {} tickers failed: {}",
                        PROVIDER_NAME,
                        tickers.len(),
                        cause
                    );
                    FetchOutcome::all_failed(all_instruments(), &cause)
                }
                Err(_) => {
                    warn!(
                        "{} batch of {} tickers missed the fetch deadline",
                        PROVIDER_NAME,
                        tickers.len()
                    );
                    FetchOutcome::all_failed(all_instruments(), &FailureCause::Timeout)
                }
            }
        });

        Ok(join_all(tasks).await.into_iter().collect())
    }
}

#[async_trait]
impl FxRateSource for YahooProvider {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<Decimal, FxError> {
        let ticker = yahoo_fx_ticker(from, to);
        let pair = format!("{}/{}", from, to);

        let mut entries = self
            .fetch_batch(&[ticker.as_str()])
            .await
            .map_err(|cause| FxError::FetchError {
                pair: pair.clone(),
                message: cause.to_string(),
            })?;

        let entry = entries
            .remove(&ticker.to_ascii_uppercase())
            .ok_or_else(|| FxError::RateNotFound(pair.clone()))?;
        let quote: YahooQuote =
            serde_json::from_value(entry).map_err(|e| FxError::FetchError {
                pair: pair.clone(),
                message: e.to_string(),
            })?;

        let rate = quote
            .regular_market_price
            .and_then(Decimal::from_f64)
            .ok_or_else(|| FxError::RateNotFound(pair.clone()))?;
        debug!("Fetched exchange rate {} = {}", pair, rate);
        Ok(rate)
    }
}

#[cfg(test)]
mod provider_tests;
