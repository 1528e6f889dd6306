// orderflow/src/idioms/sequential.rs

use crate::error::FlowResult;
use crate::idioms::{Idiom, OrderPipeline};
use crate::order::{OrderRun, OrderService, Outcome};
use async_trait::async_trait;
use std::sync::Arc;

/// The three steps as straight-line `async` code; `?` short-circuits.
pub async fn run_steps(run: &OrderRun) -> FlowResult<()> {
  let order = run.retrieve().await?;
  let order = run.discount(order).await?;
  run.update(&order).await
}

pub struct SequentialPipeline {
  service: Arc<dyn OrderService>,
}

impl SequentialPipeline {
  pub fn new(service: Arc<dyn OrderService>) -> Self {
    Self { service }
  }
}

#[async_trait]
impl OrderPipeline for SequentialPipeline {
  fn idiom(&self) -> Idiom {
    Idiom::Sequential
  }

  fn service(&self) -> Arc<dyn OrderService> {
    self.service.clone()
  }

  async fn run(&self, run: OrderRun) -> Outcome {
    let result = run_steps(&run).await;
    run.conclude(result)
  }
}
