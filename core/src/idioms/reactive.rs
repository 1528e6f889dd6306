// orderflow/src/idioms/reactive.rs

//! The steps as asynchronous transform operators over a one-element stream,
//! consumed by a single observer.

use crate::error::{FlowError, FlowResult};
use crate::idioms::{Idiom, OrderPipeline};
use crate::order::{OrderId, OrderRun, OrderService, Outcome};
use async_trait::async_trait;
use futures::future;
use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use std::sync::Arc;

/// Receives the notifications of one subscription.
///
/// At most one of `on_error` / `on_completed` is called, and nothing is
/// delivered after it.
pub trait Observer<T> {
  fn on_next(&mut self, value: T);
  fn on_error(&mut self, error: FlowError);
  fn on_completed(&mut self);
}

/// Drives `source` to its end, forwarding every item to `observer`.
/// Stops at the first error.
pub async fn subscribe<S, T, O>(source: S, observer: &mut O)
where
  S: Stream<Item = FlowResult<T>>,
  O: Observer<T> + ?Sized,
{
  futures::pin_mut!(source);
  while let Some(item) = source.next().await {
    match item {
      Ok(value) => observer.on_next(value),
      Err(e) => {
        observer.on_error(e);
        return;
      }
    }
  }
  observer.on_completed();
}

/// retrieve -> discount -> update as stream operators. Emits a single `true`
/// once the order was updated, or the first fault.
pub fn order_stream(run: &OrderRun) -> impl Stream<Item = FlowResult<bool>> + Send + '_ {
  stream::once(future::ready(Ok::<OrderId, FlowError>(run.order_id())))
    .and_then(move |_order_id| run.retrieve())
    .and_then(move |order| run.discount(order))
    .and_then(move |order| async move { run.update(&order).await.map(|()| true) })
}

/// Terminal observer turning the stream's notifications into a run result.
#[derive(Debug, Default)]
pub struct OutcomeObserver {
  result: Option<FlowResult<()>>,
}

impl OutcomeObserver {
  pub fn into_result(self) -> FlowResult<()> {
    self
      .result
      .unwrap_or_else(|| Err(FlowError::Internal("observer was never notified".to_string())))
  }
}

impl Observer<bool> for OutcomeObserver {
  fn on_next(&mut self, updated: bool) {
    if self.result.is_none() {
      self.result = Some(if updated {
        Ok(())
      } else {
        Err(FlowError::Internal("update stage emitted no confirmation".to_string()))
      });
    }
  }

  fn on_error(&mut self, error: FlowError) {
    self.result = Some(Err(error));
  }

  fn on_completed(&mut self) {
    if self.result.is_none() {
      self.result = Some(Err(FlowError::Internal(
        "order stream completed without a result".to_string(),
      )));
    }
  }
}

pub struct ReactivePipeline {
  service: Arc<dyn OrderService>,
}

impl ReactivePipeline {
  pub fn new(service: Arc<dyn OrderService>) -> Self {
    Self { service }
  }
}

#[async_trait]
impl OrderPipeline for ReactivePipeline {
  fn idiom(&self) -> Idiom {
    Idiom::Reactive
  }

  fn service(&self) -> Arc<dyn OrderService> {
    self.service.clone()
  }

  async fn run(&self, run: OrderRun) -> Outcome {
    let mut observer = OutcomeObserver::default();
    subscribe(order_stream(&run), &mut observer).await;
    run.conclude(observer.into_result())
  }
}
