//! Ticker to CoinGecko coin id mapping.
//!
//! CoinGecko addresses assets by slug-like ids rather than tickers. The table
//! is curated to the most commonly held assets; unmapped tickers fail without
//! spending a network call.

use std::collections::HashMap;

use lazy_static::lazy_static;

const COINGECKO_ID_TABLE: &[(&str, &str)] = &[
    ("BTC", "bitcoin"),
    ("XBT", "bitcoin"),
    ("ETH", "ethereum"),
    ("USDT", "tether"),
    ("BNB", "binancecoin"),
    ("SOL", "solana"),
    ("USDC", "usd-coin"),
    ("XRP", "ripple"),
    ("DOGE", "dogecoin"),
    ("TRX", "tron"),
    ("ADA", "cardano"),
    ("AVAX", "avalanche-2"),
    ("SHIB", "shiba-inu"),
    ("TON", "the-open-network"),
    ("LINK", "chainlink"),
    ("DOT", "polkadot"),
    ("BCH", "bitcoin-cash"),
    ("NEAR", "near"),
    ("MATIC", "matic-network"),
    ("POL", "polygon-ecosystem-token"),
    ("LTC", "litecoin"),
    ("DAI", "dai"),
    ("UNI", "uniswap"),
    ("ICP", "internet-computer"),
    ("APT", "aptos"),
    ("XLM", "stellar"),
    ("ETC", "ethereum-classic"),
    ("ATOM", "cosmos"),
    ("XMR", "monero"),
    ("FIL", "filecoin"),
    ("HBAR", "hedera-hashgraph"),
    ("ARB", "arbitrum"),
    ("OP", "optimism"),
    ("SUI", "sui"),
    ("INJ", "injective-protocol"),
    ("AAVE", "aave"),
    ("ALGO", "algorand"),
    ("XTZ", "tezos"),
    ("EOS", "eos"),
    ("PEPE", "pepe"),
    ("WBTC", "wrapped-bitcoin"),
];

lazy_static! {
    static ref COINGECKO_IDS: HashMap<&'static str, &'static str> =
        COINGECKO_ID_TABLE.iter().copied().collect();
}

/// Look up the CoinGecko id for a ticker (case-insensitive).
pub fn coingecko_id(symbol: &str) -> Option<&'static str> {
    let ticker = symbol.trim().to_ascii_uppercase();
    COINGECKO_IDS.get(ticker.as_str()).copied()
}
