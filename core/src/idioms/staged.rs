// orderflow/src/idioms/staged.rs

//! The steps as named stages of a `Pipeline`, passing the order along in a
//! shared `ContextData<OrderContext>`.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineResult, StageControl};
use crate::error::{FlowError, FlowResult};
use crate::idioms::{Idiom, OrderPipeline};
use crate::order::{Order, OrderRun, OrderService, Outcome};
use crate::pipeline::Pipeline;
use async_trait::async_trait;
use std::sync::Arc;

pub const RETRIEVE_STAGE: &str = "retrieve";
pub const DISCOUNT_STAGE: &str = "discount";
pub const UPDATE_STAGE: &str = "update";

/// State flowing between the stages of one run.
#[derive(Debug, Clone)]
pub struct OrderContext {
  pub run: OrderRun,
  /// Output of the previous stage. Each stage takes it and puts back its own result.
  pub order: Option<Order>,
}

impl OrderContext {
  pub fn new(run: OrderRun) -> Self {
    Self { run, order: None }
  }
}

pub struct StagedPipeline {
  service: Arc<dyn OrderService>,
  stages: Pipeline<OrderContext, FlowError>,
}

impl StagedPipeline {
  pub fn new(service: Arc<dyn OrderService>) -> FlowResult<Self> {
    let mut stages = Pipeline::new(&[RETRIEVE_STAGE, DISCOUNT_STAGE, UPDATE_STAGE]);

    stages.on(RETRIEVE_STAGE, |ctx: ContextData<OrderContext>| async move {
      let run = ctx.read().run.clone();
      let order = run.retrieve().await?;
      ctx.write().order = Some(order);
      Ok::<_, FlowError>(StageControl::Continue)
    })?;

    stages.on(DISCOUNT_STAGE, |ctx: ContextData<OrderContext>| async move {
      let (run, order) = take_order(&ctx, DISCOUNT_STAGE)?;
      let order = run.discount(order).await?;
      ctx.write().order = Some(order);
      Ok::<_, FlowError>(StageControl::Continue)
    })?;

    stages.on(UPDATE_STAGE, |ctx: ContextData<OrderContext>| async move {
      let (run, order) = take_order(&ctx, UPDATE_STAGE)?;
      run.update(&order).await?;
      ctx.write().order = Some(order);
      Ok::<_, FlowError>(StageControl::Continue)
    })?;

    Ok(Self { service, stages })
  }

  /// The underlying stage pipeline.
  pub fn stages(&self) -> &Pipeline<OrderContext, FlowError> {
    &self.stages
  }
}

fn take_order(ctx: &ContextData<OrderContext>, stage_name: &str) -> FlowResult<(OrderRun, Order)> {
  let mut guard = ctx.write();
  let order = guard
    .order
    .take()
    .ok_or_else(|| FlowError::Internal(format!("stage '{}' started without an order", stage_name)))?;
  Ok((guard.run.clone(), order))
}

#[async_trait]
impl OrderPipeline for StagedPipeline {
  fn idiom(&self) -> Idiom {
    Idiom::Staged
  }

  fn service(&self) -> Arc<dyn OrderService> {
    self.service.clone()
  }

  async fn run(&self, run: OrderRun) -> Outcome {
    let ctx = ContextData::new(OrderContext::new(run.clone()));
    let result = match self.stages.run(ctx).await {
      Ok(PipelineResult::Completed) => Ok(()),
      Ok(PipelineResult::Stopped) => Err(FlowError::Internal(
        "stage pipeline stopped before the update stage completed".to_string(),
      )),
      Err(e) => Err(e),
    };
    run.conclude(result)
  }
}
