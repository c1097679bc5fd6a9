//! Tests for the Yahoo provider against a local stand-in of the quote API.
//!
//! Covered contract points:
//! 1. Batching: ceil(N / 50) requests, every instrument accounted for once
//! 2. Partial failure: missing, malformed, and zero-priced entries fail alone
//! 3. Batch failure: non-2xx and upstream errors fail only that batch
//! 4. Deadline: unfinished batches fail, finished ones are kept
//! 5. Concurrency: in-flight requests never exceed the semaphore

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tokio::time::Instant;

    use crate::errors::FailureCause;
    use crate::fx::{FxError, FxRateSource};
    use crate::models::{AssetType, FetchOutcome, Instrument};
    use crate::provider::yahoo::{group_by_ticker, YahooProvider, YAHOO_BATCH_SIZE};
    use crate::provider::{MarketDataProvider, RateLimit};
    use crate::test_support::{serve, stock, InFlight};

    // =========================================================================
    // Mock quote API
    // =========================================================================

    #[derive(Default)]
    struct MockYahoo {
        quotes: HashMap<String, Value>,
        status: Option<StatusCode>,
        body: Option<Value>,
        delay: Duration,
        slow_symbol: Option<String>,
        requests: Mutex<Vec<Vec<String>>>,
        in_flight: InFlight,
    }

    impl MockYahoo {
        fn with_price(mut self, symbol: &str, currency: &str, price: f64) -> Self {
            self.quotes.insert(
                symbol.to_ascii_uppercase(),
                json!({"symbol": symbol, "currency": currency, "regularMarketPrice": price}),
            );
            self
        }

        fn with_entry(mut self, symbol: &str, entry: Value) -> Self {
            self.quotes.insert(symbol.to_ascii_uppercase(), entry);
            self
        }

        fn requests(&self) -> Vec<Vec<String>> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn quote_handler(
        State(mock): State<Arc<MockYahoo>>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Response {
        let symbols: Vec<String> = params
            .get("symbols")
            .map(|s| s.split(',').map(str::to_string).collect())
            .unwrap_or_default();
        mock.requests.lock().unwrap().push(symbols.clone());

        mock.in_flight.enter();
        let slow = mock
            .slow_symbol
            .as_ref()
            .is_some_and(|slow| symbols.contains(slow));
        if slow {
            tokio::time::sleep(Duration::from_secs(10)).await;
        } else if !mock.delay.is_zero() {
            tokio::time::sleep(mock.delay).await;
        }
        mock.in_flight.exit();

        if let Some(status) = mock.status {
            return status.into_response();
        }
        if let Some(body) = &mock.body {
            return Json(body.clone()).into_response();
        }

        let result: Vec<Value> = symbols
            .iter()
            .filter_map(|s| mock.quotes.get(&s.to_ascii_uppercase()).cloned())
            .collect();
        Json(json!({"quoteResponse": {"result": result, "error": null}})).into_response()
    }

    async fn provider_for(mock: &Arc<MockYahoo>) -> YahooProvider {
        let router = Router::new()
            .route("/v7/finance/quote", get(quote_handler))
            .with_state(mock.clone());
        let base_url = serve(router).await;
        YahooProvider::new(reqwest::Client::new()).with_base_url(base_url)
    }

    fn deadline() -> Instant {
        Instant::now() + Duration::from_secs(10)
    }

    fn quote_price(outcome: &FetchOutcome, instrument_id: &str) -> Option<(i64, String)> {
        outcome
            .quotes
            .iter()
            .find(|q| q.instrument_id == instrument_id)
            .map(|q| (q.price, q.currency.clone()))
    }

    fn numbered(count: usize) -> Vec<Instrument> {
        (0..count)
            .map(|i| stock(&format!("sec-{}", i), &format!("SYM{}", i)))
            .collect()
    }

    fn mock_with_numbered(count: usize) -> MockYahoo {
        (0..count).fold(MockYahoo::default(), |mock, i| {
            mock.with_price(&format!("SYM{}", i), "USD", 10.0 + i as f64)
        })
    }

    // =========================================================================
    // Happy path
    // =========================================================================

    #[tokio::test]
    async fn test_fetch_prices_in_minor_units() {
        let mock = Arc::new(
            MockYahoo::default()
                .with_price("AAPL", "USD", 178.72)
                .with_price("MSFT", "USD", 420.55),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "AAPL"), stock("2", "MSFT")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert!(outcome.failures.is_empty());
        assert_eq!(quote_price(&outcome, "1"), Some((17872, "USD".to_string())));
        assert_eq!(quote_price(&outcome, "2"), Some((42055, "USD".to_string())));
        assert_eq!(mock.requests(), vec![vec!["AAPL".to_string(), "MSFT".to_string()]]);
    }

    #[tokio::test]
    async fn test_empty_input_makes_no_requests() {
        let mock = Arc::new(MockYahoo::default());
        let provider = provider_for(&mock).await;

        let outcome = provider.fetch_prices(&[], deadline()).await.unwrap();

        assert!(outcome.is_empty());
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_batches_are_capped_at_fifty_symbols() {
        let mock = Arc::new(mock_with_numbered(120));
        let provider = provider_for(&mock).await;

        let outcome = provider.fetch_prices(&numbered(120), deadline()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 120);
        assert!(outcome.failures.is_empty());

        let mut sizes: Vec<usize> = mock.requests().iter().map(Vec::len).collect();
        sizes.sort_unstable();
        assert_eq!(sizes, vec![20, 50, 50]);
    }

    #[tokio::test]
    async fn test_ticker_resolution_uses_suffix_and_override() {
        let mock = Arc::new(
            MockYahoo::default()
                .with_price("SHOP.TO", "CAD", 101.5)
                .with_price("1023.KL", "MYR", 6.5),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![
            stock("1", "SHOP").with_exchange("TSX"),
            stock("2", "CIMB")
                .with_exchange("BURSA")
                .with_provider_symbol("1023.KL"),
        ];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(quote_price(&outcome, "1"), Some((10150, "CAD".to_string())));
        assert_eq!(quote_price(&outcome, "2"), Some((650, "MYR".to_string())));
        assert_eq!(
            mock.requests(),
            vec![vec!["SHOP.TO".to_string(), "1023.KL".to_string()]]
        );
    }

    #[tokio::test]
    async fn test_instruments_sharing_a_ticker_share_one_entry() {
        let mock = Arc::new(MockYahoo::default().with_price("AAPL", "USD", 178.72));
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "AAPL"), stock("2", "aapl")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 2);
        assert_eq!(mock.requests(), vec![vec!["AAPL".to_string()]]);
    }

    #[tokio::test]
    async fn test_response_symbol_match_is_case_insensitive() {
        let mock = Arc::new(
            MockYahoo::default().with_entry(
                "VOD.L",
                json!({"symbol": "vod.l", "currency": "GBP", "regularMarketPrice": 0.72}),
            ),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "VOD").with_exchange("LSE")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(quote_price(&outcome, "1"), Some((72, "GBP".to_string())));
    }

    // =========================================================================
    // Currency handling
    // =========================================================================

    #[tokio::test]
    async fn test_pence_are_normalized_to_pounds() {
        let mock = Arc::new(MockYahoo::default().with_price("VOD.L", "GBp", 525.12));
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "VOD").with_exchange("XLON")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        // 525.12 pence = 5.2512 GBP = 525 minor units
        assert_eq!(quote_price(&outcome, "1"), Some((525, "GBP".to_string())));
    }

    #[tokio::test]
    async fn test_missing_currency_falls_back_to_instrument() {
        let mock = Arc::new(
            MockYahoo::default()
                .with_entry("MAYBANK", json!({"symbol": "MAYBANK", "regularMarketPrice": 9.87})),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![Instrument::new("1", "MAYBANK", AssetType::Stock, "MYR")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(quote_price(&outcome, "1"), Some((987, "MYR".to_string())));
    }

    // =========================================================================
    // Per-instrument failures
    // =========================================================================

    #[tokio::test]
    async fn test_missing_ticker_fails_alone() {
        let mock = Arc::new(
            MockYahoo::default()
                .with_price("AAPL", "USD", 178.72)
                .with_price("MSFT", "USD", 420.55),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![
            stock("1", "AAPL"),
            stock("2", "MSFT"),
            stock("3", "FAKESYM"),
        ];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 2);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].instrument_id, "3");
        assert_eq!(
            outcome.failures[0].cause,
            FailureCause::NotInResponse {
                ticker: "FAKESYM".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_zero_price_is_a_failure() {
        let mock = Arc::new(
            MockYahoo::default()
                .with_price("AAPL", "USD", 178.72)
                .with_price("DEAD", "USD", 0.0),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "AAPL"), stock("2", "DEAD")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.failures.len(), 1);
        assert!(matches!(
            outcome.failures[0].cause,
            FailureCause::NonPositivePrice { .. }
        ));
    }

    #[tokio::test]
    async fn test_malformed_entry_fails_alone() {
        let mock = Arc::new(
            MockYahoo::default()
                .with_price("AAPL", "USD", 178.72)
                .with_entry("BAD", json!({"symbol": "BAD", "regularMarketPrice": "n/a"}))
                .with_entry("NOPRICE", json!({"symbol": "NOPRICE", "currency": "USD"})),
        );
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "AAPL"), stock("2", "BAD"), stock("3", "NOPRICE")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 1);
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome
            .failures
            .iter()
            .all(|f| matches!(f.cause, FailureCause::MalformedEntry { .. })));
    }

    // =========================================================================
    // Batch failures
    // =========================================================================

    #[tokio::test]
    async fn test_http_error_fails_the_batch_without_erroring() {
        let mock = Arc::new(MockYahoo {
            status: Some(StatusCode::INTERNAL_SERVER_ERROR),
            ..Default::default()
        });
        let provider = provider_for(&mock).await;
        let instruments = vec![stock("1", "AAPL"), stock("2", "MSFT")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert!(outcome.quotes.is_empty());
        assert_eq!(outcome.failures.len(), 2);
        assert!(outcome
            .failures
            .iter()
            .all(|f| f.cause == FailureCause::HttpStatus { status: 500 }));
    }

    #[tokio::test]
    async fn test_upstream_error_object_fails_the_batch() {
        let mock = Arc::new(MockYahoo {
            body: Some(json!({
                "quoteResponse": {
                    "result": [],
                    "error": {"code": "Bad Request", "description": "invalid symbols"}
                }
            })),
            ..Default::default()
        });
        let provider = provider_for(&mock).await;

        let outcome = provider
            .fetch_prices(&[stock("1", "AAPL")], deadline())
            .await
            .unwrap();

        assert_eq!(
            outcome.failures[0].cause,
            FailureCause::Upstream {
                code: "Bad Request".to_string(),
                description: "invalid symbols".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_undecodable_body_fails_the_batch() {
        let mock = Arc::new(MockYahoo {
            body: Some(json!({"unexpected": true})),
            ..Default::default()
        });
        let provider = provider_for(&mock).await;

        let outcome = provider
            .fetch_prices(&[stock("1", "AAPL")], deadline())
            .await
            .unwrap();

        assert!(matches!(outcome.failures[0].cause, FailureCause::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_every_instrument() {
        let provider =
            YahooProvider::new(reqwest::Client::new()).with_base_url("http://127.0.0.1:1");
        let instruments = vec![stock("1", "AAPL"), stock("2", "MSFT")];

        let outcome = provider.fetch_prices(&instruments, deadline()).await.unwrap();

        assert!(outcome.quotes.is_empty());
        assert_eq!(outcome.failures.len(), 2);
    }

    // =========================================================================
    // Deadline and concurrency
    // =========================================================================

    #[tokio::test]
    async fn test_deadline_fails_only_unfinished_batches() {
        let mock = Arc::new(MockYahoo {
            slow_symbol: Some("SYM50".to_string()),
            ..mock_with_numbered(51)
        });
        let provider = provider_for(&mock).await;

        let started = Instant::now();
        let deadline = started + Duration::from_millis(500);
        let outcome = provider.fetch_prices(&numbered(51), deadline).await.unwrap();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(outcome.quotes.len(), 50);
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].symbol, "SYM50");
        assert_eq!(outcome.failures[0].cause, FailureCause::Timeout);
    }

    #[tokio::test]
    async fn test_in_flight_requests_respect_the_semaphore() {
        let mock = Arc::new(MockYahoo {
            delay: Duration::from_millis(30),
            ..mock_with_numbered(500)
        });
        let provider = provider_for(&mock)
            .await
            .with_rate_limit(RateLimit { max_concurrency: 2 });

        let outcome = provider.fetch_prices(&numbered(500), deadline()).await.unwrap();

        assert_eq!(outcome.quotes.len(), 500);
        assert_eq!(mock.requests().len(), 10);
        assert!(mock.in_flight.peak() <= 2);
        assert!(mock.in_flight.peak() >= 1);
    }

    // =========================================================================
    // Exchange rates
    // =========================================================================

    #[tokio::test]
    async fn test_fetch_rate_uses_fx_ticker() {
        let mock = Arc::new(MockYahoo::default().with_price("USDMYR=X", "MYR", 4.4725));
        let provider = provider_for(&mock).await;

        let rate = provider.fetch_rate("USD", "MYR").await.unwrap();

        assert_eq!(rate, dec!(4.4725));
        assert_eq!(mock.requests(), vec![vec!["USDMYR=X".to_string()]]);
    }

    #[tokio::test]
    async fn test_fetch_rate_missing_pair() {
        let mock = Arc::new(MockYahoo::default());
        let provider = provider_for(&mock).await;

        let result = provider.fetch_rate("XXX", "MYR").await;

        assert_eq!(result, Err(FxError::RateNotFound("XXX/MYR".to_string())));
    }

    #[tokio::test]
    async fn test_fetch_rate_http_error() {
        let mock = Arc::new(MockYahoo {
            status: Some(StatusCode::SERVICE_UNAVAILABLE),
            ..Default::default()
        });
        let provider = provider_for(&mock).await;

        let result = provider.fetch_rate("USD", "MYR").await;

        assert!(matches!(result, Err(FxError::FetchError { .. })));
    }

    // =========================================================================
    // Capabilities and grouping
    // =========================================================================

    #[test]
    fn test_capabilities() {
        let provider = YahooProvider::new(reqwest::Client::new());

        assert_eq!(provider.id(), "YAHOO");
        assert_eq!(provider.name(), "Yahoo Finance");
        assert!(provider.supports(&AssetType::Stock));
        assert!(provider.supports(&AssetType::Etf));
        assert!(provider.supports(&AssetType::Bond));
        assert!(provider.supports(&AssetType::Reit));
        assert!(!provider.supports(&AssetType::Crypto));
        assert!(!provider.supports(&AssetType::Other));
        assert_eq!(provider.capabilities().max_batch_size, YAHOO_BATCH_SIZE);
        assert_eq!(provider.rate_limit().max_concurrency, 4);
    }

    proptest! {
        #[test]
        fn prop_batches_cover_every_instrument(count in 0usize..400) {
            let instruments = numbered(count);
            let groups = group_by_ticker(&instruments);
            let batches: Vec<_> = groups.chunks(YAHOO_BATCH_SIZE).collect();

            prop_assert_eq!(batches.len(), count.div_ceil(YAHOO_BATCH_SIZE));
            prop_assert!(batches.iter().all(|b| b.len() <= YAHOO_BATCH_SIZE));

            let ids: HashSet<&str> = batches
                .iter()
                .flat_map(|b| b.iter())
                .flat_map(|g| g.instruments.iter().map(|i| i.id.as_str()))
                .collect();
            prop_assert_eq!(ids.len(), count);
        }
    }
}
