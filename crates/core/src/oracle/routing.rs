use std::sync::Arc;

use oracle_market_data::{Instrument, MarketDataProvider};

/// Instruments routed to one provider.
pub struct ProviderGroup {
    pub provider: Arc<dyn MarketDataProvider>,
    pub instruments: Vec<Instrument>,
}

/// Instruments partitioned across providers.
pub struct Routing {
    /// Non-empty groups, in provider order.
    pub groups: Vec<ProviderGroup>,
    /// Instruments no provider supports.
    pub unsupported: Vec<Instrument>,
}

/// Route every instrument to the first provider that supports its asset type.
pub fn route(providers: &[Arc<dyn MarketDataProvider>], instruments: &[Instrument]) -> Routing {
    let mut buckets: Vec<Vec<Instrument>> = vec![Vec::new(); providers.len()];
    let mut unsupported = Vec::new();

    for instrument in instruments {
        match providers
            .iter()
            .position(|p| p.supports(&instrument.asset_type))
        {
            Some(index) => buckets[index].push(instrument.clone()),
            None => unsupported.push(instrument.clone()),
        }
    }

    let groups = providers
        .iter()
        .zip(buckets)
        .filter(|(_, instruments)| !instruments.is_empty())
        .map(|(provider, instruments)| ProviderGroup {
            provider: provider.clone(),
            instruments,
        })
        .collect();

    Routing {
        groups,
        unsupported,
    }
}
