//! Wire models for the ledger pipeline API.

use chrono::{DateTime, SecondsFormat, Utc};
use oracle_market_data::{AssetType, Instrument, Quote};
use serde::{Deserialize, Serialize};

/// A tracked security as returned by `GET /api/v1/pipeline/securities`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerInstrument {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub asset_type: String,
    pub currency: String,
    pub exchange: String,
    pub provider_symbol: String,
    pub network: String,
}

impl From<LedgerInstrument> for Instrument {
    fn from(security: LedgerInstrument) -> Self {
        Instrument::new(
            security.id,
            security.symbol,
            AssetType::from_label(&security.asset_type),
            security.currency.trim().to_ascii_uppercase(),
        )
        .with_exchange(security.exchange)
        .with_provider_symbol(security.provider_symbol)
        .with_network(security.network)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct SecuritiesResponse {
    #[serde(default)]
    pub securities: Vec<LedgerInstrument>,
}

/// One price to record, in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub security_id: String,
    pub price: i64,
    /// RFC 3339, second precision
    pub recorded_at: String,
}

impl From<&Quote> for PriceEntry {
    fn from(quote: &Quote) -> Self {
        Self {
            security_id: quote.instrument_id.clone(),
            price: quote.price,
            recorded_at: format_timestamp(quote.observed_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordPricesRequest {
    pub prices: Vec<PriceEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PricesRecorded {
    pub prices_recorded: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotRequest {
    pub recorded_at: String,
}

impl SnapshotRequest {
    pub fn at(recorded_at: DateTime<Utc>) -> Self {
        Self {
            recorded_at: format_timestamp(recorded_at),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotsRecorded {
    pub snapshots_recorded: usize,
}

pub(crate) fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}
