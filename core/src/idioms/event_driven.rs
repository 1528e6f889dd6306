// orderflow/src/idioms/event_driven.rs

//! Order processing decoupled through an `EventAggregator`.
//!
//! The requesting side publishes `ProcessOrderRequested` and listens on the
//! `order.processed` / `order.failed` topics; an `OrderProcessor` listening
//! on `order.process_requested` does the work and publishes the outcome.
//! Neither side holds a reference to the other.

use crate::error::FlowError;
use crate::events::{Event, EventAggregator, SubscriptionId};
use crate::idioms::sequential::run_steps;
use crate::idioms::{Idiom, OrderPipeline};
use crate::order::{OrderId, OrderRun, OrderService, Outcome, PipelineState, RunId};
use async_trait::async_trait;
use futures::future;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{event, instrument, Level};

#[derive(Debug, Clone)]
pub struct ProcessOrderRequested {
  pub run: OrderRun,
}

impl Event for ProcessOrderRequested {
  const TOPIC: &'static str = "order.process_requested";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderProcessed {
  pub run_id: RunId,
  pub order_id: OrderId,
}

impl Event for OrderProcessed {
  const TOPIC: &'static str = "order.processed";
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderFailed {
  pub run_id: RunId,
  pub order_id: OrderId,
  pub message: String,
}

impl Event for OrderFailed {
  const TOPIC: &'static str = "order.failed";
}

/// Handles `ProcessOrderRequested` events.
pub struct OrderProcessor;

impl OrderProcessor {
  /// Subscribes a processor on `aggregator`.
  ///
  /// The processor only keeps a weak handle to the aggregator. A request
  /// whose run has already left `Pending` was claimed by another processor
  /// and is ignored.
  pub fn attach(aggregator: &Arc<EventAggregator>) -> SubscriptionId {
    let weak_aggregator = Arc::downgrade(aggregator);
    aggregator.subscribe(move |request: ProcessOrderRequested| {
      let weak_aggregator = weak_aggregator.clone();
      async move {
        let run = request.run;
        if run.state() != PipelineState::Pending {
          event!(Level::DEBUG, run_id = %run.id(), "Request already claimed, ignoring.");
          return;
        }

        let result = run_steps(&run).await;
        let outcome = run.conclude(result);

        let Some(aggregator) = weak_aggregator.upgrade() else {
          event!(Level::WARN, run_id = %run.id(), "Aggregator dropped before the outcome could be published.");
          return;
        };
        match outcome {
          Outcome::Success => {
            aggregator
              .publish(OrderProcessed {
                run_id: run.id(),
                order_id: run.order_id(),
              })
              .await;
          }
          Outcome::Failure(message) => {
            aggregator
              .publish(OrderFailed {
                run_id: run.id(),
                order_id: run.order_id(),
                message,
              })
              .await;
          }
        }
      }
    })
  }
}

type ReplySlot = Arc<Mutex<Option<oneshot::Sender<Outcome>>>>;

fn resolve(slot: &ReplySlot, outcome: Outcome) {
  if let Some(reply) = slot.lock().take() {
    // The receiver only disappears once the requester has given up on the run.
    let _ = reply.send(outcome);
  }
}

pub struct EventDrivenPipeline {
  service: Arc<dyn OrderService>,
  aggregator: Arc<EventAggregator>,
  processor: SubscriptionId,
}

impl EventDrivenPipeline {
  /// Creates the pipeline on a private aggregator.
  pub fn new(service: Arc<dyn OrderService>) -> Self {
    Self::with_aggregator(service, Arc::new(EventAggregator::new()))
  }

  /// Creates the pipeline on a shared aggregator, attaching one `OrderProcessor`.
  pub fn with_aggregator(service: Arc<dyn OrderService>, aggregator: Arc<EventAggregator>) -> Self {
    let processor = OrderProcessor::attach(&aggregator);
    Self {
      service,
      aggregator,
      processor,
    }
  }

  pub fn aggregator(&self) -> &Arc<EventAggregator> {
    &self.aggregator
  }
}

impl Drop for EventDrivenPipeline {
  fn drop(&mut self) {
    self.aggregator.unsubscribe(self.processor);
  }
}

#[async_trait]
impl OrderPipeline for EventDrivenPipeline {
  fn idiom(&self) -> Idiom {
    Idiom::EventDriven
  }

  fn service(&self) -> Arc<dyn OrderService> {
    self.service.clone()
  }

  #[instrument(name = "EventDrivenPipeline::run", skip_all, fields(run_id = %run.id(), order_id = run.order_id()))]
  async fn run(&self, run: OrderRun) -> Outcome {
    let run_id = run.id();
    let (reply_tx, reply_rx) = oneshot::channel();
    let slot: ReplySlot = Arc::new(Mutex::new(Some(reply_tx)));

    let processed_slot = slot.clone();
    let on_processed = self.aggregator.subscribe(move |processed: OrderProcessed| {
      if processed.run_id == run_id {
        resolve(&processed_slot, Outcome::Success);
      }
      future::ready(())
    });
    let failed_slot = slot.clone();
    let on_failed = self.aggregator.subscribe(move |failed: OrderFailed| {
      if failed.run_id == run_id {
        resolve(&failed_slot, Outcome::Failure(failed.message));
      }
      future::ready(())
    });

    let notified = self.aggregator.publish(ProcessOrderRequested { run: run.clone() }).await;
    event!(Level::TRACE, processors = notified, "Process request published.");

    self.aggregator.unsubscribe(on_processed);
    self.aggregator.unsubscribe(on_failed);
    drop(slot);

    match reply_rx.await {
      Ok(outcome) => outcome,
      Err(_) => run.conclude(Err(FlowError::NoOutcome {
        order_id: run.order_id(),
      })),
    }
  }
}
