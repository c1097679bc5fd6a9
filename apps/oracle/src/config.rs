use std::fmt;
use std::time::Duration;

use anyhow::{bail, Context};
use oracle_core::oracle::{DEFAULT_FETCH_DEADLINE, DEFAULT_TARGET_CURRENCY};
use oracle_core::OracleConfig;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_EQUITY_MAX_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

pub struct Config {
    pub ledger_api_url: String,
    pub pipeline_api_key: String,
    pub log_level: String,
    pub log_format: LogFormat,
    pub request_timeout: Duration,
    pub fetch_deadline: Duration,
    pub compute_snapshots: bool,
    pub target_currency: String,
    pub equity_max_concurrency: usize,
}

impl Config {
    /// Load from the process environment. Call `dotenvy::dotenv()` first to
    /// pick up a `.env` file.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let ledger_api_url = var("LEDGER_API_URL")
            .context("LEDGER_API_URL is required")?
            .trim_end_matches('/')
            .to_string();
        if !ledger_api_url.starts_with("http://") && !ledger_api_url.starts_with("https://") {
            bail!("LEDGER_API_URL must be an http(s) URL, got {}", ledger_api_url);
        }
        let pipeline_api_key = var("PIPELINE_API_KEY").context("PIPELINE_API_KEY is required")?;

        let log_level = var("ORACLE_LOG_LEVEL")
            .unwrap_or_else(|| "info".into())
            .to_ascii_lowercase();
        if !matches!(log_level.as_str(), "debug" | "info" | "warn" | "error") {
            bail!("ORACLE_LOG_LEVEL must be debug, info, warn or error, got {}", log_level);
        }

        let log_format = match var("ORACLE_LOG_FORMAT")
            .unwrap_or_else(|| "text".into())
            .to_ascii_lowercase()
            .as_str()
        {
            "text" => LogFormat::Text,
            "json" => LogFormat::Json,
            other => bail!("ORACLE_LOG_FORMAT must be text or json, got {}", other),
        };

        let request_timeout = Duration::from_millis(parse_positive(
            "ORACLE_REQUEST_TIMEOUT_MS",
            var("ORACLE_REQUEST_TIMEOUT_MS"),
            DEFAULT_REQUEST_TIMEOUT_MS,
        )?);
        let fetch_deadline = Duration::from_millis(parse_positive(
            "ORACLE_FETCH_DEADLINE_MS",
            var("ORACLE_FETCH_DEADLINE_MS"),
            DEFAULT_FETCH_DEADLINE.as_millis() as u64,
        )?);

        let compute_snapshots = match var("ORACLE_COMPUTE_SNAPSHOTS") {
            None => true,
            Some(raw) => match raw.to_ascii_lowercase().as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                _ => bail!("ORACLE_COMPUTE_SNAPSHOTS must be true/false/1/0, got {}", raw),
            },
        };

        let target_currency = var("ORACLE_TARGET_CURRENCY")
            .unwrap_or_else(|| DEFAULT_TARGET_CURRENCY.into())
            .to_ascii_uppercase();
        if target_currency.len() != 3 || !target_currency.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!(
                "ORACLE_TARGET_CURRENCY must be a 3-letter currency code, got {}",
                target_currency
            );
        }

        let equity_max_concurrency = parse_positive(
            "ORACLE_EQUITY_MAX_CONCURRENCY",
            var("ORACLE_EQUITY_MAX_CONCURRENCY"),
            DEFAULT_EQUITY_MAX_CONCURRENCY as u64,
        )? as usize;

        Ok(Self {
            ledger_api_url,
            pipeline_api_key,
            log_level,
            log_format,
            request_timeout,
            fetch_deadline,
            compute_snapshots,
            target_currency,
            equity_max_concurrency,
        })
    }

    pub fn oracle_config(&self) -> OracleConfig {
        OracleConfig {
            target_currency: self.target_currency.clone(),
            fetch_deadline: self.fetch_deadline,
            compute_snapshots: self.compute_snapshots,
        }
    }
}

// The API key never reaches the logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("ledger_api_url", &self.ledger_api_url)
            .field("pipeline_api_key", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("request_timeout", &self.request_timeout)
            .field("fetch_deadline", &self.fetch_deadline)
            .field("compute_snapshots", &self.compute_snapshots)
            .field("target_currency", &self.target_currency)
            .field("equity_max_concurrency", &self.equity_max_concurrency)
            .finish()
    }
}

fn parse_positive(key: &str, raw: Option<String>, default: u64) -> anyhow::Result<u64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: u64 = raw
        .parse()
        .with_context(|| format!("{} must be a positive integer, got {}", key, raw))?;
    if value == 0 {
        bail!("{} must be greater than zero", key);
    }
    Ok(value)
}
