// demos/order_console/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use orderflow::{Idiom, OrderId, Scenario};
use std::env;
use std::time::Duration;

/// Which idioms a console run exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdiomSelection {
  One(Idiom),
  All,
}

impl IdiomSelection {
  pub fn idioms(self) -> Vec<Idiom> {
    match self {
      IdiomSelection::One(idiom) => vec![idiom],
      IdiomSelection::All => Idiom::ALL.to_vec(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub order_id: OrderId,
  pub idioms: IdiomSelection,
  pub scenario: Scenario,
  pub step_latency: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present

    let get_env = |var_name: &str, default: &str| env::var(var_name).unwrap_or_else(|_| default.to_string());

    let order_id = get_env("ORDER_ID", "123")
      .trim()
      .parse::<OrderId>()
      .map_err(|e| AppError::Config(format!("Invalid ORDER_ID: {}", e)))?;

    let idioms = match get_env("PIPELINE_IDIOM", "sequential").trim() {
      all if all.eq_ignore_ascii_case("all") => IdiomSelection::All,
      name => IdiomSelection::One(name.parse::<Idiom>()?),
    };

    let scenario = get_env("ORDER_SCENARIO", "success").parse::<Scenario>()?;

    let step_latency = get_env("STEP_LATENCY_MS", "1000")
      .trim()
      .parse::<u64>()
      .map(Duration::from_millis)
      .map_err(|e| AppError::Config(format!("Invalid STEP_LATENCY_MS: {}", e)))?;

    tracing::debug!(order_id, ?idioms, ?scenario, ?step_latency, "Configuration loaded.");

    Ok(Self {
      order_id,
      idioms,
      scenario,
      step_latency,
    })
  }
}
