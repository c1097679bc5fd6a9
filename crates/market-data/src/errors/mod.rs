//! Error types for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: hard errors that invalidate an entire provider call
//! - [`FailureCause`]: per-instrument causes recorded as fetch failures

use thiserror::Error;

/// Errors that invalidate an entire provider call.
///
/// Business conditions (unknown symbol, zero price, a failed batch) never
/// surface here; they become [`FailureCause`]s on individual instruments.
/// When a provider returns one of these, every instrument of the call is
/// recorded as failed by the caller.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A provider-specific error occurred.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },
}

/// Why a single instrument could not be priced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureCause {
    /// The ticker has no entry in the provider's symbol table.
    #[error("no {provider} mapping for symbol {symbol}")]
    UnmappedSymbol { provider: String, symbol: String },

    /// The upstream response carried no entry for the ticker.
    #[error("no quote returned for {ticker}")]
    NotInResponse { ticker: String },

    /// The upstream entry for the ticker could not be decoded.
    #[error("malformed quote for {ticker}: {message}")]
    MalformedEntry { ticker: String, message: String },

    /// The upstream response had no price in the requested currency.
    #[error("no {currency} price for {ticker}")]
    MissingCurrency { ticker: String, currency: String },

    /// Zero, negative, or otherwise unusable price.
    #[error("non-positive price for {ticker}: {price}")]
    NonPositivePrice { ticker: String, price: String },

    /// The request for this instrument's batch returned a non-2xx status.
    #[error("unexpected status {status}")]
    HttpStatus { status: u16 },

    /// The request for this instrument's batch could not be sent or read.
    #[error("http request failed: {0}")]
    Request(String),

    /// The response for this instrument's batch could not be decoded.
    #[error("decoding response: {0}")]
    Decode(String),

    /// The upstream API reported an error for the whole request.
    #[error("upstream error {code}: {description}")]
    Upstream { code: String, description: String },

    /// The fetch deadline expired before this instrument was resolved.
    #[error("fetch deadline exceeded")]
    Timeout,

    /// The provider call failed as a whole.
    #[error("provider {provider} failed: {message}")]
    ProviderFailed { provider: String, message: String },

    /// The provider neither priced nor rejected this instrument.
    #[error("no result returned by {provider}")]
    NoResult { provider: String },

    /// The quote could not be converted to the target currency.
    #[error("currency conversion failed: {0}")]
    Conversion(String),
}

impl FailureCause {
    /// Classify a reqwest error raised while sending or reading a request.
    pub fn from_request_error(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }

    pub fn provider_failed(provider: &str, err: &MarketDataError) -> Self {
        Self::ProviderFailed {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}
