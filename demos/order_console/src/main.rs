// demos/order_console/src/main.rs

mod config;
mod errors;

use crate::config::AppConfig;
use crate::errors::Result as AppResult;

use orderflow::{Outcome, StubBehavior, StubOrderService};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
  // Logs go to stderr; stdout only carries the outcome lines.
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(std::io::stderr)
    .init();

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load configuration.");
      return ExitCode::FAILURE;
    }
  };

  match run(&app_config, &mut io::stdout().lock()).await {
    Ok(_) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!(error = %e, "Order console failed.");
      ExitCode::FAILURE
    }
  }
}

/// Runs every selected idiom once against a fresh stub and writes its outcome line to `out`.
async fn run(app_config: &AppConfig, out: &mut impl Write) -> AppResult<Vec<Outcome>> {
  let mut outcomes = Vec::new();
  for idiom in app_config.idioms.idioms() {
    let behavior = StubBehavior::for_scenario(app_config.scenario).with_latency(app_config.step_latency);
    let pipeline = idiom.build(Arc::new(StubOrderService::new(behavior)))?;

    tracing::debug!(%idiom, order_id = app_config.order_id, "Processing order.");
    let outcome = pipeline.process(app_config.order_id).await;
    writeln!(out, "{}", outcome)?;
    outcomes.push(outcome);
  }
  Ok(outcomes)
}
