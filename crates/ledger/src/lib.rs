//! Ledger Pipeline Client
//!
//! Thin client for the ledger's pipeline API: the oracle reads the catalog of
//! tracked instruments, writes back one batch of prices, and optionally asks
//! the ledger to recompute portfolio valuations.

mod client;
mod errors;
mod models;

pub use client::{HttpLedgerClient, LedgerClient, API_KEY_HEADER};
pub use errors::{LedgerError, Result};
pub use models::{
    LedgerInstrument, PriceEntry, PricesRecorded, RecordPricesRequest, SecuritiesResponse,
    SnapshotRequest, SnapshotsRecorded,
};
