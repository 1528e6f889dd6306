// tests/event_aggregator_tests.rs
mod common;

use common::*;
use orderflow::idioms::{EventDrivenPipeline, OrderFailed, OrderProcessed, ProcessOrderRequested};
use orderflow::{Event, EventAggregator, OrderPipeline, Outcome, StubBehavior};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
struct Ping(u32);

impl Event for Ping {
  const TOPIC: &'static str = "test.ping";
}

#[derive(Debug, Clone, PartialEq)]
struct Pong(u32);

impl Event for Pong {
  const TOPIC: &'static str = "test.pong";
}

#[tokio::test]
async fn publish_without_listeners_notifies_nobody() {
  setup_tracing();
  let aggregator = EventAggregator::new();
  assert_eq!(aggregator.publish(Ping(1)).await, 0);
  assert_eq!(aggregator.listener_count::<Ping>(), 0);
}

#[tokio::test]
async fn listeners_run_in_subscription_order() {
  setup_tracing();
  let aggregator = EventAggregator::new();
  let seen = Arc::new(Mutex::new(Vec::new()));

  for tag in ["first", "second", "third"] {
    let seen = seen.clone();
    aggregator.subscribe(move |ping: Ping| {
      let seen = seen.clone();
      async move {
        tokio::task::yield_now().await;
        seen.lock().push(format!("{}:{}", tag, ping.0));
      }
    });
  }

  assert_eq!(aggregator.publish(Ping(7)).await, 3);
  assert_eq!(*seen.lock(), vec!["first:7", "second:7", "third:7"]);
}

#[tokio::test]
async fn topics_are_isolated_by_event_type() {
  setup_tracing();
  let aggregator = EventAggregator::new();
  let pings = Arc::new(Mutex::new(Vec::new()));
  let pongs = Arc::new(Mutex::new(Vec::new()));

  let sink = pings.clone();
  aggregator.subscribe(move |ping: Ping| {
    sink.lock().push(ping.0);
    futures::future::ready(())
  });
  let sink = pongs.clone();
  aggregator.subscribe(move |pong: Pong| {
    sink.lock().push(pong.0);
    futures::future::ready(())
  });

  aggregator.publish(Ping(1)).await;
  aggregator.publish(Pong(2)).await;
  aggregator.publish(Ping(3)).await;

  assert_eq!(*pings.lock(), vec![1, 3]);
  assert_eq!(*pongs.lock(), vec![2]);
}

#[tokio::test]
async fn unsubscribed_listeners_stop_receiving() {
  setup_tracing();
  let aggregator = EventAggregator::new();
  let count = Arc::new(Mutex::new(0));

  let sink = count.clone();
  let id = aggregator.subscribe(move |_ping: Ping| {
    *sink.lock() += 1;
    futures::future::ready(())
  });

  aggregator.publish(Ping(1)).await;
  assert!(aggregator.unsubscribe(id));
  assert!(!aggregator.unsubscribe(id));
  assert_eq!(aggregator.publish(Ping(2)).await, 0);
  assert_eq!(*count.lock(), 1);
}

#[tokio::test]
async fn listeners_may_publish_while_handling() {
  setup_tracing();
  let aggregator = Arc::new(EventAggregator::new());
  let pongs = Arc::new(Mutex::new(Vec::new()));

  let weak = Arc::downgrade(&aggregator);
  aggregator.subscribe(move |ping: Ping| {
    let weak = weak.clone();
    async move {
      if let Some(aggregator) = weak.upgrade() {
        aggregator.publish(Pong(ping.0 * 10)).await;
      }
    }
  });
  let sink = pongs.clone();
  aggregator.subscribe(move |pong: Pong| {
    sink.lock().push(pong.0);
    futures::future::ready(())
  });

  aggregator.publish(Ping(4)).await;
  assert_eq!(*pongs.lock(), vec![40]);
}

#[tokio::test]
async fn event_driven_pipeline_publishes_outcome_events() {
  setup_tracing();
  let aggregator = Arc::new(EventAggregator::new());
  let processed = Arc::new(Mutex::new(Vec::new()));
  let failed = Arc::new(Mutex::new(Vec::new()));

  let sink = processed.clone();
  aggregator.subscribe(move |event: OrderProcessed| {
    sink.lock().push(event);
    futures::future::ready(())
  });
  let sink = failed.clone();
  aggregator.subscribe(move |event: OrderFailed| {
    sink.lock().push(event);
    futures::future::ready(())
  });

  let ok_service = stub(StubBehavior::instant());
  let ok_pipeline = EventDrivenPipeline::with_aggregator(ok_service.clone(), aggregator.clone());
  let ok_run = new_run(&ok_service, 123);
  assert_eq!(ok_pipeline.run(ok_run.clone()).await, Outcome::Success);
  drop(ok_pipeline);

  let bad_service = stub(StubBehavior::instant().order_absent());
  let bad_pipeline = EventDrivenPipeline::with_aggregator(bad_service.clone(), aggregator.clone());
  let bad_run = new_run(&bad_service, 456);
  assert_eq!(
    bad_pipeline.run(bad_run.clone()).await,
    Outcome::failure("Order not found.")
  );

  assert_eq!(
    *processed.lock(),
    vec![OrderProcessed {
      run_id: ok_run.id(),
      order_id: 123
    }]
  );
  assert_eq!(
    *failed.lock(),
    vec![OrderFailed {
      run_id: bad_run.id(),
      order_id: 456,
      message: "Order not found.".to_string()
    }]
  );
}

#[tokio::test]
async fn shared_aggregator_processes_each_request_once() {
  setup_tracing();
  let aggregator = Arc::new(EventAggregator::new());
  let service = stub(StubBehavior::instant());

  let first = EventDrivenPipeline::with_aggregator(service.clone(), aggregator.clone());
  let second = EventDrivenPipeline::with_aggregator(service.clone(), aggregator.clone());
  assert_eq!(aggregator.listener_count::<ProcessOrderRequested>(), 2);

  assert_eq!(first.process(1).await, Outcome::Success);
  assert_eq!(second.process(2).await, Outcome::Success);
  assert_eq!(service.calls().total(), 6);

  drop(second);
  assert_eq!(aggregator.listener_count::<ProcessOrderRequested>(), 1);
  // Per-run outcome listeners are removed once each run finished.
  assert_eq!(aggregator.listener_count::<OrderProcessed>(), 0);
  assert_eq!(aggregator.listener_count::<OrderFailed>(), 0);
  assert!(Arc::ptr_eq(first.aggregator(), &aggregator));
}

#[tokio::test]
async fn unanswered_request_fails_the_run() {
  setup_tracing();
  let aggregator = Arc::new(EventAggregator::new());
  // Claims every request before the processor sees it and never answers.
  aggregator.subscribe(|request: ProcessOrderRequested| async move {
    let _ = request.run.retrieve().await;
  });

  let service = stub(StubBehavior::instant());
  let pipeline = EventDrivenPipeline::with_aggregator(service.clone(), aggregator.clone());
  let run = new_run(&service, 77);

  let outcome = pipeline.run(run.clone()).await;

  assert_eq!(outcome, Outcome::failure("No outcome was published for order 77."));
  assert_eq!(run.state(), orderflow::PipelineState::Failed);
  assert_eq!(service.calls(), orderflow::CallCounts { retrieve: 1, discount: 0, update: 0 });
}
