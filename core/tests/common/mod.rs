// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every helper

use orderflow::{ContextData, FlowError, OrderRun, OrderService, StageControl, StubBehavior, StubOrderService};
use std::sync::{
  atomic::{AtomicUsize, Ordering},
  Arc,
};
use tracing::Level;

// --- Context for engine tests ---
#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub stages_executed: Vec<String>,
  pub should_stop_at: Option<String>,
}

// --- Error type for engine tests ---
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("orderflow error: {0}")]
  Flow(String), // FlowError is not PartialEq, keep its Debug text

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(fe: FlowError) -> Self {
    TestError::Flow(format!("{:?}", fe))
  }
}

// --- Handler creators ---
pub fn create_simple_handler(stage_name: &'static str, message_to_append: &'static str) -> orderflow::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      HANDLER_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.stages_executed.push(stage_name.to_string());
      tracing::debug!(target: "test_handlers", stage = stage_name, "executed, counter: {}", guard.counter);
      if guard.should_stop_at.as_deref() == Some(stage_name) {
        return Ok(StageControl::Stop);
      }
      Ok(StageControl::Continue)
    })
  })
}

pub fn create_failing_handler(stage_name: &'static str, error_message: &'static str) -> orderflow::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| {
    Box::pin(async move {
      HANDLER_EXEC_COUNTER.fetch_add(1, Ordering::SeqCst);
      ctx.write().stages_executed.push(stage_name.to_string());
      tracing::warn!(target: "test_handlers", stage = stage_name, "failing with: '{}'", error_message);
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

// --- Order helpers ---
pub fn stub(behavior: StubBehavior) -> Arc<StubOrderService> {
  Arc::new(StubOrderService::new(behavior))
}

pub fn new_run(service: &Arc<StubOrderService>, order_id: i64) -> OrderRun {
  let service: Arc<dyn OrderService> = service.clone();
  OrderRun::new(service, order_id)
}

// --- Tracing setup (once per test binary) ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Shared execution counter; tests reading it run #[serial] ---
pub static HANDLER_EXEC_COUNTER: Lazy<Arc<AtomicUsize>> = Lazy::new(|| Arc::new(AtomicUsize::new(0)));

pub fn reset_counters() {
  HANDLER_EXEC_COUNTER.store(0, Ordering::SeqCst);
}
