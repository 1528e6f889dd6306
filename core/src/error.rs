// orderflow/src/error.rs
use anyhow::Error as AnyhowError;
use thiserror::Error;

use crate::order::model::{OrderId, PipelineState};

#[derive(Debug, Error)]
pub enum FlowError {
  /// Retrieval yielded no order. The message is part of the observable contract.
  #[error("Order not found.")]
  NotFound { order_id: OrderId },

  #[error("{source}")]
  RetrieveFault {
    #[source]
    source: AnyhowError,
  },

  #[error("{source}")]
  DiscountFault {
    #[source]
    source: AnyhowError,
  },

  #[error("{source}")]
  UpdateFault {
    #[source]
    source: AnyhowError,
  },

  #[error("Stage not found: {stage_name}")]
  StageNotFound { stage_name: String },

  #[error("Stage already defined: {stage_name}")]
  DuplicateStage { stage_name: String },

  #[error("Handler missing for non-optional stage: {stage_name}")]
  HandlerMissing { stage_name: String },

  #[error("Illegal pipeline transition from {from:?} to {to:?}")]
  InvalidTransition { from: PipelineState, to: PipelineState },

  #[error("No outcome was published for order {order_id}.")]
  NoOutcome { order_id: OrderId },

  #[error("Configuration error: {message}")]
  Config { message: String },

  #[error("Internal orderflow error: {0}")]
  Internal(String),
}

impl FlowError {
  /// True for the three faults a step can raise (not-found included).
  pub fn is_step_fault(&self) -> bool {
    matches!(
      self,
      FlowError::NotFound { .. }
        | FlowError::RetrieveFault { .. }
        | FlowError::DiscountFault { .. }
        | FlowError::UpdateFault { .. }
    )
  }
}

pub type FlowResult<T, E = FlowError> = std::result::Result<T, E>;
