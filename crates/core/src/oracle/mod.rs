//! Oracle run: routing, fetching, conversion and submission.

mod model;
mod routing;
mod service;


pub use model::{
    OracleConfig, RunOutcome, RunPhase, RunSummary, DEFAULT_FETCH_DEADLINE,
    DEFAULT_TARGET_CURRENCY,
};
pub use routing::{route, ProviderGroup, Routing};
pub use service::PriceOracle;
