//! Provider capabilities and concurrency configuration.
//!
//! This module defines structures for describing what a market data provider
//! can price and how hard it may be driven.

use crate::models::AssetType;

/// Describes the capabilities of a market data provider.
///
/// Used by the orchestrator to route instruments to the first provider
/// that can handle their asset type.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Asset types this provider can price.
    pub asset_types: &'static [AssetType],

    /// Maximum number of symbols accepted by a single upstream request.
    pub max_batch_size: usize,
}

impl ProviderCapabilities {
    pub fn supports(&self, asset_type: &AssetType) -> bool {
        self.asset_types.contains(asset_type)
    }
}

/// Request concurrency limits for a provider.
///
/// Controls how many upstream requests a single `fetch_prices` call may
/// keep in flight.
#[derive(Clone, Debug)]
pub struct RateLimit {
    /// Maximum concurrent requests to this provider.
    pub max_concurrency: usize,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self { max_concurrency: 4 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_supports() {
        let capabilities = ProviderCapabilities {
            asset_types: &[AssetType::Stock, AssetType::Etf],
            max_batch_size: 50,
        };

        assert!(capabilities.supports(&AssetType::Stock));
        assert!(capabilities.supports(&AssetType::Etf));
        assert!(!capabilities.supports(&AssetType::Crypto));
        assert!(!capabilities.supports(&AssetType::Other));
    }

    #[test]
    fn test_rate_limit_default() {
        assert_eq!(RateLimit::default().max_concurrency, 4);
    }
}
