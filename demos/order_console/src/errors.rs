// demos/order_console/src/errors.rs

use orderflow::FlowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Order Pipeline Error: {source}")]
  Flow {
    #[from]
    source: FlowError,
  },

  #[error("Output Error: {0}")]
  Output(#[from] std::io::Error),
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
