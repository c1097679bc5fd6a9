//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `MarketDataProvider` trait that all providers implement
//! - Provider capabilities and concurrency configuration
//! - Concrete provider implementations (Yahoo Finance, CoinGecko)
//!
//! # Architecture
//!
//! Providers receive ledger instruments and resolve their own upstream
//! symbols through the tables in the resolver module: exchange suffixes for
//! Yahoo, coin ids for CoinGecko.

mod capabilities;
mod traits;

pub mod coingecko;
pub mod yahoo;

// Re-exports
pub use capabilities::{ProviderCapabilities, RateLimit};
pub use traits::MarketDataProvider;
