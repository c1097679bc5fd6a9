//! Market data provider trait definitions.
//!
//! This module defines the core `MarketDataProvider` trait that all
//! market data providers must implement.

use async_trait::async_trait;
use tokio::time::Instant;

use crate::errors::MarketDataError;
use crate::models::{AssetType, FetchOutcome, Instrument};

use super::capabilities::ProviderCapabilities;

/// Trait for market data providers.
///
/// Implement this trait to add support for a new market data source.
/// The orchestrator keeps providers in an ordered list and routes every
/// instrument to the first one whose [`supports`](Self::supports) accepts
/// its asset type.
///
/// # Contract
///
/// - Return as many quotes as possible even when some instruments fail.
/// - One instrument's malformed upstream entry must never abort the call.
/// - Respect `deadline`: instruments still unresolved when it passes become
///   failures, already-resolved ones are kept.
/// - Business conditions (unknown symbol, zero price, failed batch) are
///   reported as failures inside the [`FetchOutcome`]. An `Err` is reserved
///   for conditions that invalidate the whole call; the caller then records
///   every instrument of the call as failed.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use oracle_market_data::provider::{MarketDataProvider, ProviderCapabilities};
///
/// struct MyProvider;
///
/// #[async_trait]
/// impl MarketDataProvider for MyProvider {
///     fn id(&self) -> &'static str {
///         "MY_PROVIDER"
///     }
///
///     fn name(&self) -> &'static str {
///         "My Provider"
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             asset_types: &[AssetType::Stock],
///             max_batch_size: 20,
///         }
///     }
///
///     // ... implement fetch_prices
/// }
/// ```
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO", "COINGECKO", etc.
    /// Used for logging.
    fn id(&self) -> &'static str;

    /// Human-readable provider name (e.g. "Yahoo Finance").
    fn name(&self) -> &'static str;

    /// Describes what this provider can price.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Whether this provider can price instruments of the given asset type.
    fn supports(&self, asset_type: &AssetType) -> bool {
        self.capabilities().supports(asset_type)
    }

    /// Fetch current prices for the given instruments.
    ///
    /// # Arguments
    ///
    /// * `instruments` - Instruments routed to this provider
    /// * `deadline` - Point in time after which unresolved instruments fail
    ///
    /// # Returns
    ///
    /// Exactly one quote or failure per instrument, or a `MarketDataError`
    /// when the call as a whole could not be made.
    async fn fetch_prices(
        &self,
        instruments: &[Instrument],
        deadline: Instant,
    ) -> Result<FetchOutcome, MarketDataError>;
}
