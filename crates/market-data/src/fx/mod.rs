//! Currency normalization and conversion into the ledger's target currency.

mod currency;
mod currency_converter;
mod fx_errors;
mod fx_traits;

pub use currency::{
    canonical_currency, get_normalization_rule, normalize_amount, normalize_currency_code,
    CurrencyNormalizationRule,
};
pub use currency_converter::CurrencyConverter;
pub use fx_errors::FxError;
pub use fx_traits::FxRateSource;
