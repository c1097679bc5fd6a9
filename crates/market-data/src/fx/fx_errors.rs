use thiserror::Error;

/// Errors raised while looking up exchange rates or converting amounts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("Exchange rate not found: {0}")]
    RateNotFound(String),

    #[error("Invalid exchange rate for {pair}: {rate}")]
    InvalidRate { pair: String, rate: String },

    #[error("Fetch error for {pair}: {message}")]
    FetchError { pair: String, message: String },

    #[error("Currency conversion error: {0}")]
    ConversionError(String),
}

/// Display form of a currency pair, e.g. `USD/MYR`.
pub(crate) fn pair_label(from: &str, to: &str) -> String {
    format!("{}/{}", from, to)
}
