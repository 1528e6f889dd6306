// orderflow/src/pipeline/execution.rs

//! `Pipeline::run`: walks the stages in order and drives their hooks.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineResult, StageControl};
use crate::core::stage::StageDef;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use crate::pipeline::hooks::HookPhase;
use tracing::{event, instrument, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every stage against `ctx_data`.
  ///
  /// Per stage: a true skip condition skips it; a stage without hooks is
  /// skipped when optional and fails with `FlowError::HandlerMissing`
  /// otherwise; then `before`, `on` and `after` handlers run in
  /// registration order. The first `Stop` ends the run as `Stopped`, the
  /// first error ends it with that error.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_stages = self.stages.len(),
    )
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (stage_idx, stage) in self.stages.iter().enumerate() {
      let stage_span = span!(
        Level::DEBUG,
        "pipeline_stage",
        stage_name = stage.name.as_str(),
        stage_index = stage_idx,
        optional = stage.optional
      );
      let control = self.run_stage(stage, ctx_data.clone()).instrument(stage_span).await?;
      if control == StageControl::Stop {
        event!(Level::INFO, stage_name = %stage.name, "Pipeline stopped.");
        return Ok(PipelineResult::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_stage(&self, stage: &StageDef<TData>, ctx_data: ContextData<TData>) -> Result<StageControl, Err> {
    if let Some(skip_if) = &stage.skip_if {
      if skip_if(ctx_data.clone()) {
        event!(Level::DEBUG, "Stage skipped by its skip condition.");
        return Ok(StageControl::Continue);
      }
    }

    let Some(hooks) = self.hooks.get(&stage.name).filter(|hooks| !hooks.is_empty()) else {
      if stage.optional {
        event!(Level::DEBUG, "Optional stage has no handlers, skipping.");
        return Ok(StageControl::Continue);
      }
      event!(Level::ERROR, "Non-optional stage has no handlers.");
      return Err(Err::from(FlowError::HandlerMissing {
        stage_name: stage.name.clone(),
      }));
    };

    for phase in HookPhase::ALL {
      let handlers = match phase {
        HookPhase::Before => &hooks.before,
        HookPhase::On => &hooks.on,
        HookPhase::After => &hooks.after,
      };
      for (handler_idx, handler_fn) in handlers.iter().enumerate() {
        match handler_fn(ctx_data.clone()).await {
          Ok(StageControl::Continue) => {}
          Ok(StageControl::Stop) => {
            event!(Level::DEBUG, ?phase, handler_index = handler_idx, "Handler requested stop.");
            return Ok(StageControl::Stop);
          }
          Err(e) => {
            event!(Level::DEBUG, ?phase, handler_index = handler_idx, error = %e, "Handler failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::TRACE, "Stage finished.");
    Ok(StageControl::Continue)
  }
}
