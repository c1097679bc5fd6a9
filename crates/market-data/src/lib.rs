//! Price Oracle Market Data Crate
//!
//! This crate provides provider-agnostic price fetching for the instruments
//! tracked by the ledger.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Equities, ETFs, bonds and REITs through Yahoo Finance
//! - Cryptocurrencies through CoinGecko
//! - Exchange-suffix and coin-id symbol resolution
//! - Exchange rates and conversion into a single target currency
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |    Instrument    |  (ledger catalog entry)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Resolver      |  (exchange suffix / coin id tables)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |    Provider      |  (Yahoo, CoinGecko)
//! +------------------+
//!          |
//!          v
//! +------------------+     +---------------------+
//! |   FetchOutcome   | --> |  CurrencyConverter  |
//! +------------------+     +---------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Instrument`] - Priceable entity as tracked by the ledger
//! - [`Quote`] - Price observation in minor currency units
//! - [`FetchOutcome`] - Quotes plus per-instrument [`FetchFailure`]s
//! - [`MarketDataProvider`] - Trait implemented by every price source
//! - [`CurrencyConverter`] - Memoizing converter into the target currency

pub mod errors;
pub mod fx;
pub mod models;
pub mod provider;
pub mod resolver;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export all public types from models
pub use models::{
    price_to_minor_units, to_minor_units, AssetType, FetchFailure, FetchOutcome, Instrument,
    Quote,
};

pub use errors::{FailureCause, MarketDataError};
pub use fx::{CurrencyConverter, FxError, FxRateSource};

// Re-export provider types
pub use provider::coingecko::CoinGeckoProvider;
pub use provider::yahoo::YahooProvider;
pub use provider::{MarketDataProvider, ProviderCapabilities, RateLimit};
