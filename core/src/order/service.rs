// orderflow/src/order/service.rs

//! The three steps every idiom sequences, and a stub implementation of them.

use crate::error::FlowError;
use crate::order::model::{Order, OrderId};
use async_trait::async_trait;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{event, instrument, Level};

/// The retrieve / discount / update operations behind every pipeline.
///
/// Faults are plain `anyhow::Error`s; the run turns them into the matching
/// `FlowError` variant and keeps their message as the failure message.
#[async_trait]
pub trait OrderService: Send + Sync {
  /// `Ok(None)` means the order does not exist.
  async fn retrieve(&self, order_id: OrderId) -> anyhow::Result<Option<Order>>;

  async fn apply_discount(&self, order: Order) -> anyhow::Result<Order>;

  async fn update(&self, order: &Order) -> anyhow::Result<()>;
}

/// The situations the stub can simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scenario {
  #[default]
  Success,
  NotFound,
  DiscountFault,
  UpdateFault,
}

impl FromStr for Scenario {
  type Err = FlowError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
      "success" => Ok(Scenario::Success),
      "not-found" => Ok(Scenario::NotFound),
      "discount-fault" => Ok(Scenario::DiscountFault),
      "update-fault" => Ok(Scenario::UpdateFault),
      other => Err(FlowError::Config {
        message: format!(
          "unknown scenario '{}' (expected success, not-found, discount-fault or update-fault)",
          other
        ),
      }),
    }
  }
}

pub const DEFAULT_DISCOUNT_FAULT: &str = "Discount could not be applied.";
pub const DEFAULT_UPDATE_FAULT: &str = "Order could not be saved.";

/// How the stub behaves. The default mirrors the reference demo: one second
/// per step and every step succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubBehavior {
  pub latency: Duration,
  pub order_absent: bool,
  pub discount_fault: Option<String>,
  pub update_fault: Option<String>,
}

impl Default for StubBehavior {
  fn default() -> Self {
    Self {
      latency: Duration::from_secs(1),
      order_absent: false,
      discount_fault: None,
      update_fault: None,
    }
  }
}

impl StubBehavior {
  /// Every step succeeds immediately.
  pub fn instant() -> Self {
    Self::default().with_latency(Duration::ZERO)
  }

  pub fn for_scenario(scenario: Scenario) -> Self {
    let behavior = Self::default();
    match scenario {
      Scenario::Success => behavior,
      Scenario::NotFound => behavior.order_absent(),
      Scenario::DiscountFault => behavior.failing_discount(DEFAULT_DISCOUNT_FAULT),
      Scenario::UpdateFault => behavior.failing_update(DEFAULT_UPDATE_FAULT),
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = latency;
    self
  }

  pub fn order_absent(mut self) -> Self {
    self.order_absent = true;
    self
  }

  pub fn failing_discount(mut self, message: impl Into<String>) -> Self {
    self.discount_fault = Some(message.into());
    self
  }

  pub fn failing_update(mut self, message: impl Into<String>) -> Self {
    self.update_fault = Some(message.into());
    self
  }
}

/// Snapshot of how often each step was invoked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
  pub retrieve: usize,
  pub discount: usize,
  pub update: usize,
}

impl CallCounts {
  pub fn total(&self) -> usize {
    self.retrieve + self.discount + self.update
  }
}

#[derive(Debug, Default)]
struct CallCounters {
  retrieve: AtomicUsize,
  discount: AtomicUsize,
  update: AtomicUsize,
}

/// `OrderService` that sleeps for the configured latency and then succeeds
/// or fails as its `StubBehavior` says. Counts every call.
#[derive(Debug, Default)]
pub struct StubOrderService {
  behavior: StubBehavior,
  calls: CallCounters,
}

impl StubOrderService {
  pub fn new(behavior: StubBehavior) -> Self {
    Self {
      behavior,
      calls: CallCounters::default(),
    }
  }

  pub fn behavior(&self) -> &StubBehavior {
    &self.behavior
  }

  pub fn calls(&self) -> CallCounts {
    CallCounts {
      retrieve: self.calls.retrieve.load(Ordering::SeqCst),
      discount: self.calls.discount.load(Ordering::SeqCst),
      update: self.calls.update.load(Ordering::SeqCst),
    }
  }

  async fn simulate_latency(&self) {
    if !self.behavior.latency.is_zero() {
      tokio::time::sleep(self.behavior.latency).await;
    }
  }
}

#[async_trait]
impl OrderService for StubOrderService {
  #[instrument(level = "debug", skip(self))]
  async fn retrieve(&self, order_id: OrderId) -> anyhow::Result<Option<Order>> {
    self.calls.retrieve.fetch_add(1, Ordering::SeqCst);
    self.simulate_latency().await;
    if self.behavior.order_absent {
      event!(Level::DEBUG, "Stub reports the order as absent.");
      return Ok(None);
    }
    Ok(Some(Order::new(order_id)))
  }

  #[instrument(level = "debug", skip(self, order), fields(order_id = order.id))]
  async fn apply_discount(&self, order: Order) -> anyhow::Result<Order> {
    self.calls.discount.fetch_add(1, Ordering::SeqCst);
    self.simulate_latency().await;
    if let Some(message) = &self.behavior.discount_fault {
      anyhow::bail!("{}", message);
    }
    Ok(order)
  }

  #[instrument(level = "debug", skip(self, order), fields(order_id = order.id))]
  async fn update(&self, order: &Order) -> anyhow::Result<()> {
    self.calls.update.fetch_add(1, Ordering::SeqCst);
    self.simulate_latency().await;
    if let Some(message) = &self.behavior.update_fault {
      anyhow::bail!("{}", message);
    }
    event!(Level::DEBUG, "Order {} updated.", order.id);
    Ok(())
  }
}
