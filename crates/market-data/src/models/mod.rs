//! Market data models
//!
//! This module contains the core data types shared by providers and the
//! orchestrator:
//! - `instrument` - Ledger instrument and the AssetType classification
//! - `quote` - Quote in minor units plus minor-unit conversion helpers
//! - `outcome` - Per-instrument failures and fetch outcomes

mod instrument;
mod outcome;
mod quote;

pub use instrument::{AssetType, Instrument};
pub use outcome::{FetchFailure, FetchOutcome};
pub use quote::{price_to_minor_units, to_minor_units, Quote};
