//! Provider symbol resolution.
//!
//! Maps ledger instruments onto the identifiers each upstream API expects:
//! - `exchange_suffixes` - Yahoo tickers from symbol + exchange code
//! - `coin_ids` - CoinGecko coin ids from crypto tickers

mod coin_ids;
mod exchange_suffixes;

pub use coin_ids::coingecko_id;
pub use exchange_suffixes::{yahoo_fx_ticker, yahoo_suffix_for_exchange, yahoo_ticker};
