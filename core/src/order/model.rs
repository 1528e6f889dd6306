// orderflow/src/order/model.rs

use std::fmt;
use uuid::Uuid;

use crate::error::FlowResult;

pub type OrderId = i64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Order {
  pub id: OrderId,
}

impl Order {
  pub fn new(id: OrderId) -> Self {
    Self { id }
  }
}

/// Terminal result of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
  Success,
  Failure(String),
}

impl Outcome {
  pub fn failure(message: impl Into<String>) -> Self {
    Outcome::Failure(message.into())
  }

  pub fn is_success(&self) -> bool {
    matches!(self, Outcome::Success)
  }

  /// The failure message, if any.
  pub fn message(&self) -> Option<&str> {
    match self {
      Outcome::Success => None,
      Outcome::Failure(message) => Some(message),
    }
  }
}

impl From<&FlowResult<()>> for Outcome {
  fn from(result: &FlowResult<()>) -> Self {
    match result {
      Ok(()) => Outcome::Success,
      Err(e) => Outcome::Failure(e.to_string()),
    }
  }
}

/// The line printed by the console for this outcome.
impl fmt::Display for Outcome {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Outcome::Success => write!(f, "Order processed successfully."),
      Outcome::Failure(message) => write!(f, "Order processing failed: {}", message),
    }
  }
}

/// Lifecycle of a single run.
///
/// ```text
/// Pending -> Retrieving -> Discounting -> Updating -> Succeeded
///    |           |              |             |
///    +-----------+--------------+-------------+--> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
  Pending,
  Retrieving,
  Discounting,
  Updating,
  Succeeded,
  Failed,
}

impl PipelineState {
  pub fn is_terminal(self) -> bool {
    matches!(self, PipelineState::Succeeded | PipelineState::Failed)
  }

  pub fn can_advance_to(self, next: PipelineState) -> bool {
    use PipelineState::*;
    matches!(
      (self, next),
      (Pending, Retrieving)
        | (Retrieving, Discounting)
        | (Discounting, Updating)
        | (Updating, Succeeded)
        | (Pending | Retrieving | Discounting | Updating, Failed)
    )
  }
}

/// Identifies one run. Used to correlate events of concurrent runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunId(Uuid);

impl RunId {
  pub fn new() -> Self {
    RunId(Uuid::new_v4())
  }
}

impl Default for RunId {
  fn default() -> Self {
    Self::new()
  }
}

impl fmt::Display for RunId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}
