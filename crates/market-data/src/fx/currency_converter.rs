use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use num_traits::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};

use super::currency::canonical_currency;
use super::fx_errors::{pair_label, FxError};
use super::fx_traits::FxRateSource;

type RateKey = (String, String);

/// Converts minor-unit amounts into a single target currency.
///
/// Rates are fetched lazily from an [`FxRateSource`] and memoized for the
/// lifetime of the converter (one oracle run). The memo lock is only held
/// for the map access itself, never across the upstream fetch, so lookups
/// of distinct pairs proceed in parallel. Two tasks racing on the same
/// uncached pair may both fetch it; the second insert overwrites the first
/// with an equivalent rate.
pub struct CurrencyConverter {
    target: String,
    source: Arc<dyn FxRateSource>,
    rates: RwLock<HashMap<RateKey, Decimal>>,
}

impl CurrencyConverter {
    pub fn new(target_currency: &str, source: Arc<dyn FxRateSource>) -> Self {
        Self {
            target: canonical_currency(target_currency),
            source,
            rates: RwLock::new(HashMap::new()),
        }
    }

    pub fn target_currency(&self) -> &str {
        &self.target
    }

    /// Whether an amount in `currency` must be converted to reach the target.
    pub fn needs_conversion(&self, currency: &str) -> bool {
        canonical_currency(currency) != self.target
    }

    /// Rate from `from` into the target currency.
    pub async fn get_rate(&self, from: &str) -> Result<Decimal, FxError> {
        let from = canonical_currency(from);
        if from == self.target {
            return Ok(Decimal::ONE);
        }

        let key = (from, self.target.clone());
        let cached = self.read_rates().get(&key).copied();
        if let Some(rate) = cached {
            return Ok(rate);
        }

        let (from, to) = &key;
        debug!("Fetching exchange rate {}", pair_label(from, to));
        let rate = self.source.fetch_rate(from, to).await?;
        if rate <= Decimal::ZERO {
            return Err(FxError::InvalidRate {
                pair: pair_label(from, to),
                rate: rate.to_string(),
            });
        }

        self.write_rates().insert(key, rate);
        Ok(rate)
    }

    /// Convert a minor-unit amount from `from` into target-currency minor units.
    ///
    /// Amounts already in the target are returned unchanged. Otherwise the
    /// product with the rate is rounded half away from zero.
    pub async fn convert(&self, amount_minor: i64, from: &str) -> Result<i64, FxError> {
        if !self.needs_conversion(from) {
            return Ok(amount_minor);
        }

        let rate = self.get_rate(from).await?;
        self.apply_rate(amount_minor, from, rate)
    }

    /// Convert a minor-unit amount with a rate already obtained from
    /// [`get_rate`](Self::get_rate).
    pub fn apply_rate(&self, amount_minor: i64, from: &str, rate: Decimal) -> Result<i64, FxError> {
        (Decimal::from(amount_minor) * rate)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .ok_or_else(|| {
                FxError::ConversionError(format!(
                    "{} {} does not fit in minor units of {}",
                    amount_minor, from, self.target
                ))
            })
    }

    /// Number of memoized pairs.
    pub fn cached_rates(&self) -> usize {
        self.read_rates().len()
    }

    /// Read the rate memo, recovering from poison if necessary.
    ///
    /// Entries are inserted whole, so a poisoned map is still consistent.
    fn read_rates(&self) -> RwLockReadGuard<'_, HashMap<RateKey, Decimal>> {
        self.rates.read().unwrap_or_else(|poisoned| {
            warn!("Exchange rate cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write_rates(&self) -> RwLockWriteGuard<'_, HashMap<RateKey, Decimal>> {
        self.rates.write().unwrap_or_else(|poisoned| {
            warn!("Exchange rate cache lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
