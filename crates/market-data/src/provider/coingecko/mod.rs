//! CoinGecko market data provider.
//!
//! Prices cryptocurrencies through the public `simple/price` endpoint. Mapped
//! coins go out in requests of up to [`COINGECKO_BATCH_SIZE`] ids, so a normal
//! catalog needs a single request; unmapped tickers fail up front without
//! touching the network.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use futures::future::join_all;
use reqwest::header;
use serde_json::Value;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::errors::{FailureCause, MarketDataError};
use crate::models::{price_to_minor_units, AssetType, FetchOutcome, Instrument, Quote};
use crate::provider::{MarketDataProvider, ProviderCapabilities};
use crate::resolver::coingecko_id;

const PROVIDER_ID: &str = "COINGECKO";
const PROVIDER_NAME: &str = "CoinGecko";

/// Production API host.
pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com";

/// Maximum coin ids per `simple/price` request.
pub const COINGECKO_BATCH_SIZE: usize = 250;

/// Quote currency used when no mapped instrument names one.
pub const DEFAULT_VS_CURRENCY: &str = "usd";

/// Response shape: `{"bitcoin": {"usd": 67234.56}}`.
type SimplePriceResponse = HashMap<String, Value>;

/// Instruments that resolve to one CoinGecko id.
struct CoinGroup<'a> {
    id: &'static str,
    instruments: Vec<&'a Instrument>,
}

/// CoinGecko market data provider.
pub struct CoinGeckoProvider {
    client: reqwest::Client,
    base_url: String,
    default_currency: String,
    batch_size: usize,
}

impl CoinGeckoProvider {
    /// Create a provider against the production API.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: COINGECKO_BASE_URL.to_string(),
            default_currency: DEFAULT_VS_CURRENCY.to_string(),
            batch_size: COINGECKO_BATCH_SIZE,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_default_currency(mut self, currency: &str) -> Self {
        self.default_currency = currency.trim().to_ascii_lowercase();
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Currency of the first mapped instrument, lower-cased.
    fn vs_currency(&self, groups: &[CoinGroup<'_>]) -> String {
        groups
            .first()
            .and_then(|g| g.instruments.first())
            .map(|i| i.currency.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_ascii_lowercase)
            .unwrap_or_else(|| self.default_currency.clone())
    }

    /// Price one batch of coin groups. Every instrument of the batch ends up
    /// with a quote or a failure.
    async fn fetch_batch(
        &self,
        groups: &[CoinGroup<'_>],
        vs_currency: &str,
        deadline: Instant,
    ) -> FetchOutcome {
        let ids: Vec<&str> = groups.iter().map(|g| g.id).collect();
        let mapped = || groups.iter().flat_map(|g| g.instruments.iter().copied());

        let body = match timeout_at(deadline, self.fetch_simple_price(&ids, vs_currency)).await {
            Ok(Ok(body)) => body,
            Ok(Err(cause)) => {
                warn!("{} request for {} coins failed: {}", PROVIDER_NAME, ids.len(), cause);
                return FetchOutcome::all_failed(mapped(), &cause);
            }
            Err(_) => {
                warn!("{} request missed the fetch deadline", PROVIDER_NAME);
                return FetchOutcome::all_failed(mapped(), &FailureCause::Timeout);
            }
        };

        let mut outcome = FetchOutcome::new();
        let observed_at = Utc::now();
        let currency = vs_currency.to_ascii_uppercase();
        for group in groups {
            match resolve_price(&body, group.id, vs_currency) {
                Ok(price) => {
                    for instrument in &group.instruments {
                        outcome.push_quote(Quote::new(
                            instrument.id.clone(),
                            price,
                            currency.clone(),
                            observed_at,
                        ));
                    }
                }
                Err(cause) => {
                    for instrument in &group.instruments {
                        outcome.push_failure(instrument, cause.clone());
                    }
                }
            }
        }

        outcome
    }

    async fn fetch_simple_price(
        &self,
        ids: &[&str],
        vs_currency: &str,
    ) -> Result<SimplePriceResponse, FailureCause> {
        let url = format!("{}/api/v3/simple/price", self.base_url);
        debug!("Requesting {} CoinGecko prices in {}", ids.len(), vs_currency);

        let response = self
            .client
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .query(&[("ids", ids.join(",")), ("vs_currencies", vs_currency.to_string())])
            .send()
            .await
            .map_err(|e| FailureCause::from_request_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FailureCause::HttpStatus {
                status: status.as_u16(),
            });
        }

        response
            .json()
            .await
            .map_err(|e| FailureCause::Decode(e.to_string()))
    }
}

/// Split instruments into coin groups (first-seen order) and unmapped failures.
fn group_by_coin<'a>(
    instruments: &'a [Instrument],
    outcome: &mut FetchOutcome,
) -> Vec<CoinGroup<'a>> {
    let mut groups: Vec<CoinGroup<'a>> = Vec::new();

    for instrument in instruments {
        let Some(id) = coingecko_id(&instrument.symbol) else {
            outcome.push_failure(
                instrument,
                FailureCause::UnmappedSymbol {
                    provider: PROVIDER_NAME.to_string(),
                    symbol: instrument.symbol.clone(),
                },
            );
            continue;
        };

        match groups.iter_mut().find(|g| g.id == id) {
            Some(group) => group.instruments.push(instrument),
            None => groups.push(CoinGroup {
                id,
                instruments: vec![instrument],
            }),
        }
    }

    groups
}

/// Price of `id` in `vs_currency` as positive minor units.
fn resolve_price(
    body: &SimplePriceResponse,
    id: &str,
    vs_currency: &str,
) -> Result<i64, FailureCause> {
    let prices = body.get(id).ok_or_else(|| FailureCause::NotInResponse {
        ticker: id.to_string(),
    })?;

    let price = prices
        .get(vs_currency)
        .filter(|p| !p.is_null())
        .ok_or_else(|| FailureCause::MissingCurrency {
            ticker: id.to_string(),
            currency: vs_currency.to_string(),
        })?;

    let price = price.as_f64().ok_or_else(|| FailureCause::MalformedEntry {
        ticker: id.to_string(),
        message: format!("price is not a number: {}", price),
    })?;

    price_to_minor_units(price).ok_or_else(|| FailureCause::NonPositivePrice {
        ticker: id.to_string(),
        price: price.to_string(),
    })
}

#[async_trait]
impl MarketDataProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            asset_types: &[AssetType::Crypto],
            max_batch_size: self.batch_size,
        }
    }

    async fn fetch_prices(
        &self,
        instruments: &[Instrument],
        deadline: Instant,
    ) -> Result<FetchOutcome, MarketDataError> {
        let mut outcome = FetchOutcome::new();
        let groups = group_by_coin(instruments, &mut outcome);
        if groups.is_empty() {
            return Ok(outcome);
        }

        let vs_currency = self.vs_currency(&groups);
        let batch_size = self.capabilities().max_batch_size.max(1);
        let batches = join_all(
            groups
                .chunks(batch_size)
                .map(|batch| self.fetch_batch(batch, &vs_currency, deadline)),
        )
        .await;
        for batch in batches {
            outcome.merge(batch);
        }

        Ok(outcome)
    }
}
