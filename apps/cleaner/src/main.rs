//! Retires stale job executions from a workflow-orchestration server.

#![forbid(unsafe_code)]

mod cleaner_config;

use std::sync::Arc;
use std::time::Duration;

use sweeper_application::{RetirementService, RetirementSummary};
use sweeper_core::{AppError, AppResult};
use sweeper_infrastructure::HttpExecutionApi;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::cleaner_config::{CleanupConfig, debug_requested};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing(debug_requested());

    let config = CleanupConfig::load().inspect_err(|error| {
        error!(error = %error, "invalid configuration, exiting");
    })?;
    let api = Arc::new(HttpExecutionApi::new(config.execution_api_settings())?);
    let service = RetirementService::new(api, config.retirement_options());

    info!(
        server = %config.base_url,
        mode = config.mode.as_str(),
        retention = %config.retention,
        chunk_size = config.chunk_size.get(),
        exclude_running = config.exclude_running,
        retry_transient = config.retry_transient,
        debug = config.debug,
        interval_seconds = config.interval.map(|interval| interval.as_secs()),
        "sweeper-cleaner started"
    );

    let Some(interval) = config.interval else {
        return run_once(&service).await.map(|_| ());
    };

    loop {
        if let Err(error) = run_once(&service).await {
            warn!(error = %error, "cleanup run aborted, waiting for next cycle");
        }
        tokio::time::sleep(interval).await;
    }
}

async fn run_once(service: &RetirementService) -> AppResult<RetirementSummary> {
    let summary = service.run().await?;

    if let Some(elapsed) = summary.elapsed() {
        let (hours, minutes, seconds) = split_elapsed(elapsed);
        info!(
            hours,
            minutes,
            seconds,
            deleted = summary.executions_deleted,
            "cleanup run completed"
        );
    }

    Ok(summary)
}

fn split_elapsed(elapsed: Duration) -> (u64, u64, u64) {
    let total = elapsed.as_secs();
    (total / 3600, (total / 60) % 60, total % 60)
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
