// orderflow/src/pipeline/hooks.rs

//! Registration of `before`, `on` and `after` handlers.

use crate::core::context::{boxed_handler, Handler};
use crate::core::context_data::ContextData;
use crate::core::control::StageControl;
use crate::error::{FlowError, FlowResult};
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

/// The three phases of a stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookPhase {
  Before,
  On,
  After,
}

impl HookPhase {
  pub const ALL: [HookPhase; 3] = [HookPhase::Before, HookPhase::On, HookPhase::After];
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Registers a handler that runs before the stage's `on` handlers.
  ///
  /// The handler's own error type only has to convert into the pipeline's `Err`.
  pub fn before<F, E>(
    &mut self,
    stage_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StageControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.register(HookPhase::Before, stage_name, boxed_handler(handler_fn))
  }

  /// Registers the main work of a stage.
  pub fn on<F, E>(
    &mut self,
    stage_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StageControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.register(HookPhase::On, stage_name, boxed_handler(handler_fn))
  }

  pub fn after<F, E>(
    &mut self,
    stage_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) -> FlowResult<()>
  where
    F: Future<Output = Result<StageControl, E>> + Send + 'static,
    E: Into<Err> + Send + Sync + 'static,
  {
    self.register(HookPhase::After, stage_name, boxed_handler(handler_fn))
  }

  pub fn handler_count(&self, stage_name: &str, phase: HookPhase) -> usize {
    self.hooks.get(stage_name).map_or(0, |hooks| match phase {
      HookPhase::Before => hooks.before.len(),
      HookPhase::On => hooks.on.len(),
      HookPhase::After => hooks.after.len(),
    })
  }

  fn register(&mut self, phase: HookPhase, stage_name: &str, handler: Handler<TData, Err>) -> FlowResult<()> {
    self.position(stage_name)?;
    let hooks = self.hooks.entry(stage_name.to_string()).or_default();
    match phase {
      HookPhase::Before => hooks.before.push(handler),
      HookPhase::On => hooks.on.push(handler),
      HookPhase::After => hooks.after.push(handler),
    }
    event!(Level::TRACE, %stage_name, ?phase, "Handler registered.");
    Ok(())
  }
}
