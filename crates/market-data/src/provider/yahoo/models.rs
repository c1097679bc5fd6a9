//! Yahoo Finance API response models.
//!
//! These models parse the `v7/finance/quote` endpoint. The `result` array is
//! kept as raw JSON so that each entry can be decoded on its own; one bad
//! entry must not take the rest of the batch down with it.

use serde::Deserialize;
use serde_json::Value;

/// Main response wrapper for the quote API
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuoteResponse {
    pub quote_response: YahooQuoteResult,
}

/// Quote response container
#[derive(Debug, Deserialize)]
pub struct YahooQuoteResult {
    pub result: Option<Vec<Value>>,
    pub error: Option<YahooApiError>,
}

/// Top-level error object reported alongside an empty result
#[derive(Debug, Deserialize)]
pub struct YahooApiError {
    pub code: Option<String>,
    pub description: Option<String>,
}

/// A single entry of the quote result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YahooQuote {
    pub currency: Option<String>,
    pub regular_market_price: Option<f64>,
}

/// Symbol of a raw result entry, if it carries one.
pub fn entry_symbol(entry: &Value) -> Option<&str> {
    entry.get("symbol").and_then(Value::as_str)
}
