use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors returned by the ledger pipeline API.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// The shared secret was missing or rejected (401).
    #[error("ledger rejected the pipeline API key")]
    Unauthorized,

    /// The ledger has no pipeline secret configured (503).
    #[error("ledger pipeline API is unavailable")]
    ServiceUnavailable,

    #[error("ledger {operation}: unexpected status {status}")]
    UnexpectedStatus { operation: &'static str, status: u16 },

    #[error("ledger {operation}: {source}")]
    Network {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("ledger {operation}: decoding response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl LedgerError {
    /// Map a non-success status onto the matching error.
    pub fn from_status(operation: &'static str, status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::SERVICE_UNAVAILABLE => Self::ServiceUnavailable,
            _ => Self::UnexpectedStatus {
                operation,
                status: status.as_u16(),
            },
        }
    }
}
