// orderflow/src/core/control.rs

//! Flow signals returned by stage handlers and the outcome of a whole engine run.

/// Returned by every stage handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageControl {
  /// Proceed with the remaining handlers and stages.
  Continue,
  /// Halt the run. No further handler, in this stage or later ones, is invoked.
  Stop,
}

/// Result of `Pipeline::run` when no handler failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineResult {
  /// Every stage that was not skipped ran to the end.
  Completed,
  /// A handler returned `StageControl::Stop`.
  Stopped,
}
