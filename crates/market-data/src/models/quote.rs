use chrono::{DateTime, Utc};
use num_traits::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// A single price observation for one instrument.
///
/// `price` is expressed in minor currency units (e.g. cents) and is always
/// strictly positive; providers never materialize a quote otherwise.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Ledger identifier of the priced instrument
    pub instrument_id: String,

    /// Price in minor units of `currency`
    pub price: i64,

    /// Quote currency (ISO 4217, upper-case)
    pub currency: String,

    /// When the price was observed
    pub observed_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        instrument_id: impl Into<String>,
        price: i64,
        currency: impl Into<String>,
        observed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            price,
            currency: currency.into(),
            observed_at,
        }
    }
}

/// Convert a major-unit decimal amount into positive minor units.
///
/// Multiplies by 100 and rounds half away from zero. Returns `None` when the
/// result would not be a positive integer.
pub fn to_minor_units(amount: Decimal) -> Option<i64> {
    let minor = (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()?;
    (minor > 0).then_some(minor)
}

/// Convert an upstream float price into positive minor units.
///
/// The float goes through its shortest decimal representation first, so
/// `178.72` becomes exactly `17872` rather than suffering binary noise.
pub fn price_to_minor_units(price: f64) -> Option<i64> {
    if !price.is_finite() || price <= 0.0 {
        return None;
    }
    to_minor_units(Decimal::from_f64(price)?)
}
