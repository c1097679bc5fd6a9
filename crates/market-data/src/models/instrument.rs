use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Asset classification as tracked by the ledger.
///
/// Ledger labels are free-form strings; [`AssetType::from_label`] folds them
/// into this closed set. Anything unrecognised becomes [`AssetType::Other`],
/// which no provider supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    #[default]
    Stock,
    Etf,
    Bond,
    Reit,
    Crypto,
    Other,
}

impl AssetType {
    /// Normalize a ledger asset-type label (case-insensitive, with aliases).
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "stock" | "equity" | "share" => Self::Stock,
            "etf" => Self::Etf,
            "bond" => Self::Bond,
            "reit" => Self::Reit,
            "crypto" | "cryptocurrency" | "coin" | "token" => Self::Crypto,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stock => "stock",
            Self::Etf => "etf",
            Self::Bond => "bond",
            Self::Reit => "reit",
            Self::Crypto => "crypto",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// An instrument tracked by the ledger. Read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Instrument {
    /// Ledger identifier.
    pub id: String,

    /// Ticker as the ledger knows it (e.g. "AAPL", "BTC").
    pub symbol: String,

    pub asset_type: AssetType,

    /// Exchange code, empty when the instrument trades on the default market.
    pub exchange: String,

    /// Explicit provider symbol override (e.g. "1023.KL"), empty when unset.
    pub provider_symbol: String,

    /// Network tag for crypto assets, empty otherwise.
    pub network: String,

    /// Native currency code (ISO 4217).
    pub currency: String,
}

impl Instrument {
    pub fn new(
        id: impl Into<String>,
        symbol: impl Into<String>,
        asset_type: AssetType,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            symbol: symbol.into(),
            asset_type,
            currency: currency.into(),
            ..Default::default()
        }
    }

    pub fn with_exchange(mut self, exchange: impl Into<String>) -> Self {
        self.exchange = exchange.into();
        self
    }

    pub fn with_provider_symbol(mut self, provider_symbol: impl Into<String>) -> Self {
        self.provider_symbol = provider_symbol.into();
        self
    }

    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_from_label_is_case_insensitive() {
        assert_eq!(AssetType::from_label("stock"), AssetType::Stock);
        assert_eq!(AssetType::from_label("Stock"), AssetType::Stock);
        assert_eq!(AssetType::from_label("STOCK"), AssetType::Stock);
        assert_eq!(AssetType::from_label("ETF"), AssetType::Etf);
        assert_eq!(AssetType::from_label("Bond"), AssetType::Bond);
        assert_eq!(AssetType::from_label("REIT"), AssetType::Reit);
    }

    #[test]
    fn test_asset_type_aliases() {
        assert_eq!(AssetType::from_label("Cryptocurrency"), AssetType::Crypto);
        assert_eq!(AssetType::from_label("CRYPTOCURRENCY"), AssetType::Crypto);
        assert_eq!(AssetType::from_label("equity"), AssetType::Stock);
        assert_eq!(AssetType::from_label(" crypto "), AssetType::Crypto);
    }

    #[test]
    fn test_unknown_asset_type_is_other() {
        assert_eq!(AssetType::from_label("commodity"), AssetType::Other);
        assert_eq!(AssetType::from_label(""), AssetType::Other);
        assert_eq!("property".parse::<AssetType>().unwrap(), AssetType::Other);
    }

    #[test]
    fn test_instrument_builder() {
        let instrument = Instrument::new("sec-3", "CIMB", AssetType::Stock, "MYR")
            .with_exchange("BURSA")
            .with_provider_symbol("1023.KL");

        assert_eq!(instrument.id, "sec-3");
        assert_eq!(instrument.exchange, "BURSA");
        assert_eq!(instrument.provider_symbol, "1023.KL");
        assert!(instrument.network.is_empty());
    }
}
