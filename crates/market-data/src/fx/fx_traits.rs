use async_trait::async_trait;
use rust_decimal::Decimal;

use super::fx_errors::FxError;

/// Source of live exchange rates.
///
/// `fetch_rate` returns how many units of `to` one unit of `from` buys.
/// Both codes arrive normalized and upper-cased. Implementations do not
/// cache; memoization belongs to [`CurrencyConverter`](super::CurrencyConverter).
#[async_trait]
pub trait FxRateSource: Send + Sync {
    async fn fetch_rate(&self, from: &str, to: &str) -> Result<Decimal, FxError>;
}
