use std::sync::Arc;

use anyhow::Context;
use oracle_core::{OracleError, PriceOracle, RunSummary};
use oracle_ledger::HttpLedgerClient;
use oracle_market_data::{
    CoinGeckoProvider, CurrencyConverter, MarketDataProvider, RateLimit, YahooProvider,
};
use tracing::{error, info, warn};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{Config, LogFormat};

/// Install the global subscriber. `RUST_LOG` overrides `level` when set.
pub fn init_tracing(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init(),
    }
}

/// Wire the ledger client, providers and converter for one run.
pub fn build_oracle(config: &Config) -> anyhow::Result<PriceOracle> {
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let ledger = HttpLedgerClient::new(
        client.clone(),
        &config.ledger_api_url,
        &config.pipeline_api_key,
    )
    .context("Failed to configure ledger client")?;
    info!("Ledger at {}", ledger.base_url());

    let yahoo = Arc::new(YahooProvider::new(client.clone()).with_rate_limit(RateLimit {
        max_concurrency: config.equity_max_concurrency,
    }));
    let coingecko = Arc::new(CoinGeckoProvider::new(client));

    // Yahoo also serves exchange rates through its currency pair tickers.
    let converter = CurrencyConverter::new(&config.target_currency, yahoo.clone());

    // Order matters: the first provider supporting an asset type wins.
    let providers: Vec<Arc<dyn MarketDataProvider>> = vec![yahoo, coingecko];

    Ok(PriceOracle::new(
        Arc::new(ledger),
        providers,
        Arc::new(converter),
        config.oracle_config(),
    ))
}

/// One line per failed instrument, then the run summary.
pub fn report(result: &Result<RunSummary, OracleError>) {
    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            error!("Oracle run failed: {}", e);
            return;
        }
    };

    for failure in &summary.failures {
        warn!(
            instrument_id = %failure.instrument_id,
            symbol = %failure.symbol,
            cause = %failure.cause,
            "Failed to price instrument"
        );
    }

    info!(
        instruments = summary.instruments_fetched,
        quotes_submitted = summary.quotes_submitted,
        valuations_recomputed = summary.valuations_recomputed,
        unsupported = summary.unsupported.len(),
        failures = summary.failures.len(),
        duration_ms = summary.duration.as_millis() as u64,
        "Oracle run complete"
    );
}
