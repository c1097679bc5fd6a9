mod config;
mod main_lib;

use std::process::ExitCode;

use config::{Config, LogFormat};
use main_lib::{build_oracle, init_tracing, report};
use oracle_core::RunOutcome;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            // No validated log settings yet; report at the defaults.
            init_tracing("info", LogFormat::Text);
            tracing::error!("Invalid configuration: {:#}", e);
            return ExitCode::from(RunOutcome::Fatal.exit_code());
        }
    };
    init_tracing(&config.log_level, config.log_format);
    tracing::debug!("Loaded configuration: {:?}", config);

    let oracle = match build_oracle(&config) {
        Ok(oracle) => oracle,
        Err(e) => {
            tracing::error!("Failed to start oracle: {:#}", e);
            return ExitCode::from(RunOutcome::Fatal.exit_code());
        }
    };

    let result = oracle.run().await;
    report(&result);
    ExitCode::from(RunOutcome::of(&result).exit_code())
}
