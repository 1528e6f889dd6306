// orderflow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its structural editing methods.

use crate::core::context::Handler;
use crate::core::stage::{SkipCondition, StageDef};
use crate::error::{FlowError, FlowResult};
use std::collections::HashMap;
use tracing::{event, Level};

/// Handlers registered for one stage, grouped by phase.
pub(crate) struct StageHooks<TData: 'static + Send + Sync, Err> {
  pub(crate) before: Vec<Handler<TData, Err>>,
  pub(crate) on: Vec<Handler<TData, Err>>,
  pub(crate) after: Vec<Handler<TData, Err>>,
}

impl<TData: 'static + Send + Sync, Err> StageHooks<TData, Err> {
  pub(crate) fn is_empty(&self) -> bool {
    self.before.is_empty() && self.on.is_empty() && self.after.is_empty()
  }
}

impl<TData: 'static + Send + Sync, Err> Default for StageHooks<TData, Err> {
  fn default() -> Self {
    Self {
      before: Vec::new(),
      on: Vec::new(),
      after: Vec::new(),
    }
  }
}

/// An ordered list of named stages plus the hooks attached to them.
///
/// `TData` is the run context stored in `ContextData<TData>`. `Err` is what
/// handlers fail with; it must absorb `FlowError` so engine-level problems
/// (a non-optional stage without handlers, say) can be reported through it.
///
/// A `Pipeline` holds no per-run state. Build it once and call `run` with a
/// fresh context for every invocation.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) stages: Vec<StageDef<TData>>,
  pub(crate) hooks: HashMap<String, StageHooks<TData, Err>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline with mandatory stages in the given order.
  /// Repeated names are ignored after their first occurrence.
  pub fn new(stage_names: &[&str]) -> Self {
    let mut pipeline = Self {
      stages: Vec::with_capacity(stage_names.len()),
      hooks: HashMap::new(),
    };
    for name in stage_names {
      if pipeline.add_stage(StageDef::new(*name)).is_err() {
        event!(Level::WARN, stage_name = %name, "Duplicate stage name ignored.");
      }
    }
    pipeline
  }

  /// Appends a stage.
  pub fn add_stage(&mut self, stage: StageDef<TData>) -> FlowResult<()> {
    self.ensure_absent(&stage.name)?;
    self.stages.push(stage);
    Ok(())
  }

  pub fn insert_before_stage(&mut self, existing_stage: &str, stage: StageDef<TData>) -> FlowResult<()> {
    let idx = self.position(existing_stage)?;
    self.ensure_absent(&stage.name)?;
    self.stages.insert(idx, stage);
    Ok(())
  }

  pub fn insert_after_stage(&mut self, existing_stage: &str, stage: StageDef<TData>) -> FlowResult<()> {
    let idx = self.position(existing_stage)?;
    self.ensure_absent(&stage.name)?;
    self.stages.insert(idx + 1, stage);
    Ok(())
  }

  /// Removes a stage together with its hooks. Returns whether it existed.
  pub fn remove_stage(&mut self, stage_name: &str) -> bool {
    match self.stages.iter().position(|s| s.name == stage_name) {
      Some(idx) => {
        self.stages.remove(idx);
        self.hooks.remove(stage_name);
        true
      }
      None => false,
    }
  }

  pub fn set_optional(&mut self, stage_name: &str, optional: bool) -> FlowResult<()> {
    let idx = self.position(stage_name)?;
    self.stages[idx].optional = optional;
    Ok(())
  }

  pub fn set_skip_condition(&mut self, stage_name: &str, skip_if: Option<SkipCondition<TData>>) -> FlowResult<()> {
    let idx = self.position(stage_name)?;
    self.stages[idx].skip_if = skip_if;
    Ok(())
  }

  pub fn stage_names(&self) -> Vec<&str> {
    self.stages.iter().map(|s| s.name.as_str()).collect()
  }

  pub fn len(&self) -> usize {
    self.stages.len()
  }

  pub fn is_empty(&self) -> bool {
    self.stages.is_empty()
  }

  pub(crate) fn position(&self, stage_name: &str) -> FlowResult<usize> {
    self
      .stages
      .iter()
      .position(|s| s.name == stage_name)
      .ok_or_else(|| FlowError::StageNotFound {
        stage_name: stage_name.to_string(),
      })
  }

  fn ensure_absent(&self, stage_name: &str) -> FlowResult<()> {
    if self.stages.iter().any(|s| s.name == stage_name) {
      return Err(FlowError::DuplicateStage {
        stage_name: stage_name.to_string(),
      });
    }
    Ok(())
  }
}
