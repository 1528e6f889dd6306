// orderflow/src/idioms/continuation.rs

use crate::idioms::{Idiom, OrderPipeline};
use crate::order::{OrderRun, OrderService, Outcome};
use async_trait::async_trait;
use futures::TryFutureExt;
use std::sync::Arc;
use tracing::{event, Level};

/// Each step is attached as a continuation of the previous one with
/// `TryFutureExt::and_then`. The chain is built up front and driven once;
/// the first `Err` skips every remaining continuation.
pub struct ContinuationPipeline {
  service: Arc<dyn OrderService>,
}

impl ContinuationPipeline {
  pub fn new(service: Arc<dyn OrderService>) -> Self {
    Self { service }
  }
}

#[async_trait]
impl OrderPipeline for ContinuationPipeline {
  fn idiom(&self) -> Idiom {
    Idiom::Continuation
  }

  fn service(&self) -> Arc<dyn OrderService> {
    self.service.clone()
  }

  async fn run(&self, run: OrderRun) -> Outcome {
    let steps = &run;
    let chain = steps
      .retrieve()
      .and_then(move |order| steps.discount(order))
      .and_then(move |order| async move { steps.update(&order).await })
      .inspect_err(|e| event!(Level::DEBUG, error = %e, "Continuation chain short-circuited."));

    let result = chain.await;
    run.conclude(result)
  }
}
