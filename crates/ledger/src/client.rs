use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use oracle_market_data::{Instrument, Quote};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::errors::{LedgerError, Result};
use crate::models::{
    PriceEntry, PricesRecorded, RecordPricesRequest, SecuritiesResponse, SnapshotRequest,
    SnapshotsRecorded,
};

/// Header carrying the pipeline shared secret (`X-API-Key`). Static header
/// names must be lower-case.
pub const API_KEY_HEADER: &str = "x-api-key";

const SECURITIES_PATH: &str = "/api/v1/pipeline/securities";
const PRICES_PATH: &str = "/api/v1/pipeline/securities/prices";
const SNAPSHOTS_PATH: &str = "/api/v1/pipeline/snapshots";

/// Operations the oracle needs from the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Fetch every tracked instrument.
    async fn get_instruments(&self) -> Result<Vec<Instrument>>;

    /// Record one batch of prices. Returns how many the ledger stored.
    async fn submit_prices(&self, quotes: &[Quote]) -> Result<usize>;

    /// Ask the ledger to recompute portfolio valuations as of `recorded_at`.
    /// Returns how many valuations were recomputed.
    async fn trigger_recompute(&self, recorded_at: DateTime<Utc>) -> Result<usize>;
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP client
// ─────────────────────────────────────────────────────────────────────────────

/// HTTP client for the ledger pipeline API.
///
/// # Example
///
/// ```ignore
/// let client = HttpLedgerClient::new(http, "https://ledger.internal", "secret")?;
/// let instruments = client.get_instruments().await?;
/// ```
#[derive(Debug, Clone)]
pub struct HttpLedgerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: HeaderValue,
}

impl HttpLedgerClient {
    /// Create a new ledger client.
    ///
    /// # Arguments
    ///
    /// * `client` - Shared HTTP client (carries the per-request timeout)
    /// * `base_url` - Ledger base URL; a trailing `/` is ignored
    /// * `api_key` - Pipeline shared secret
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Unauthorized` if the key cannot be sent as a header.
    pub fn new(client: reqwest::Client, base_url: &str, api_key: &str) -> Result<Self> {
        let mut api_key =
            HeaderValue::from_str(api_key).map_err(|_| LedgerError::Unauthorized)?;
        api_key.set_sensitive(true);

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a client with its own HTTP connection pool and request timeout.
    pub fn with_timeout(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| LedgerError::Network {
                operation: "initializing client",
                source,
            })?;
        Self::new(client, base_url, api_key)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create default headers for API requests.
    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(API_KEY_HEADER, self.api_key.clone());
        headers
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, operation: &'static str) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Ledger] GET {}", url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|source| LedgerError::Network { operation, source })?;

        Self::parse_response(response, operation).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        operation: &'static str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("[Ledger] POST {}", url);

        let response = self
            .client
            .post(&url)
            .headers(self.headers())
            .json(body)
            .send()
            .await
            .map_err(|source| LedgerError::Network { operation, source })?;

        Self::parse_response(response, operation).await
    }

    /// Parse an HTTP response, mapping auth and availability statuses.
    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            return Err(LedgerError::from_status(operation, status));
        }

        let body = response
            .text()
            .await
            .map_err(|source| LedgerError::Network { operation, source })?;

        serde_json::from_str(&body).map_err(|e| LedgerError::Decode {
            operation,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl LedgerClient for HttpLedgerClient {
    async fn get_instruments(&self) -> Result<Vec<Instrument>> {
        let response: SecuritiesResponse =
            self.get(SECURITIES_PATH, "fetching securities").await?;
        debug!("[Ledger] {} securities tracked", response.securities.len());

        Ok(response
            .securities
            .into_iter()
            .map(Instrument::from)
            .collect())
    }

    async fn submit_prices(&self, quotes: &[Quote]) -> Result<usize> {
        let request = RecordPricesRequest {
            prices: quotes.iter().map(PriceEntry::from).collect(),
        };

        let response: PricesRecorded = self
            .post(PRICES_PATH, &request, "recording prices")
            .await?;
        Ok(response.prices_recorded)
    }

    async fn trigger_recompute(&self, recorded_at: DateTime<Utc>) -> Result<usize> {
        let request = SnapshotRequest::at(recorded_at);

        let response: SnapshotsRecorded = self
            .post(SNAPSHOTS_PATH, &request, "computing snapshots")
            .await?;
        Ok(response.snapshots_recorded)
    }
}
