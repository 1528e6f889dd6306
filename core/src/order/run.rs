// orderflow/src/order/run.rs

//! `OrderRun`: the handle every idiom drives its three steps through.

use crate::error::{FlowError, FlowResult};
use crate::order::model::{Order, OrderId, Outcome, PipelineState, RunId};
use crate::order::service::OrderService;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{event, Level};

struct RunInner {
  id: RunId,
  order_id: OrderId,
  service: Arc<dyn OrderService>,
  history: Mutex<Vec<PipelineState>>,
  outcome: Mutex<Option<Outcome>>,
}

/// One invocation of the order pipeline.
///
/// Owns the run's state machine and its single terminal `Outcome`. Each step
/// method first advances the state machine, so calling the steps out of order
/// (or twice) fails with `FlowError::InvalidTransition` instead of reaching
/// the service. Clones share the same run.
#[derive(Clone)]
pub struct OrderRun {
  inner: Arc<RunInner>,
}

impl OrderRun {
  pub fn new(service: Arc<dyn OrderService>, order_id: OrderId) -> Self {
    Self {
      inner: Arc::new(RunInner {
        id: RunId::new(),
        order_id,
        service,
        history: Mutex::new(vec![PipelineState::Pending]),
        outcome: Mutex::new(None),
      }),
    }
  }

  pub fn id(&self) -> RunId {
    self.inner.id
  }

  pub fn order_id(&self) -> OrderId {
    self.inner.order_id
  }

  pub fn state(&self) -> PipelineState {
    self
      .inner
      .history
      .lock()
      .last()
      .copied()
      .unwrap_or(PipelineState::Pending)
  }

  /// Every state the run has been in, starting with `Pending`.
  pub fn history(&self) -> Vec<PipelineState> {
    self.inner.history.lock().clone()
  }

  /// The terminal outcome, once `conclude` has been called.
  pub fn outcome(&self) -> Option<Outcome> {
    self.inner.outcome.lock().clone()
  }

  pub async fn retrieve(&self) -> FlowResult<Order> {
    self.advance(PipelineState::Retrieving)?;
    let order_id = self.order_id();
    event!(Level::INFO, run_id = %self.id(), "Retrieving order {}.", order_id);
    match self.inner.service.retrieve(order_id).await {
      Ok(Some(order)) => Ok(order),
      Ok(None) => Err(FlowError::NotFound { order_id }),
      Err(source) => Err(FlowError::RetrieveFault { source }),
    }
  }

  pub async fn discount(&self, order: Order) -> FlowResult<Order> {
    self.advance(PipelineState::Discounting)?;
    event!(Level::INFO, run_id = %self.id(), "Applying discount to order {}.", order.id);
    self
      .inner
      .service
      .apply_discount(order)
      .await
      .map_err(|source| FlowError::DiscountFault { source })
  }

  pub async fn update(&self, order: &Order) -> FlowResult<()> {
    self.advance(PipelineState::Updating)?;
    event!(Level::INFO, run_id = %self.id(), "Updating order {}.", order.id);
    self
      .inner
      .service
      .update(order)
      .await
      .map_err(|source| FlowError::UpdateFault { source })
  }

  /// Records the terminal state and returns the run's outcome.
  ///
  /// Only the first call decides the outcome; later calls return it unchanged.
  /// A success reported before the update step finished is recorded as a
  /// failure.
  pub fn conclude(&self, result: FlowResult<()>) -> Outcome {
    let mut slot = self.inner.outcome.lock();
    if let Some(existing) = slot.as_ref() {
      event!(Level::WARN, run_id = %self.id(), "Run already concluded, keeping the first outcome.");
      return existing.clone();
    }

    let result = match result {
      Ok(()) => self.advance(PipelineState::Succeeded),
      Err(e) => Err(e),
    };
    let outcome = Outcome::from(&result);
    if let Err(e) = &result {
      if let Err(transition_err) = self.advance(PipelineState::Failed) {
        event!(Level::WARN, run_id = %self.id(), error = %transition_err, "Could not record the failed state.");
      }
      event!(Level::DEBUG, run_id = %self.id(), error = %e, "Run failed.");
    } else {
      event!(Level::DEBUG, run_id = %self.id(), "Run succeeded.");
    }

    *slot = Some(outcome.clone());
    outcome
  }

  fn advance(&self, next: PipelineState) -> FlowResult<()> {
    let mut history = self.inner.history.lock();
    let current = history.last().copied().unwrap_or(PipelineState::Pending);
    if !current.can_advance_to(next) {
      return Err(FlowError::InvalidTransition { from: current, to: next });
    }
    history.push(next);
    Ok(())
  }
}

impl std::fmt::Debug for OrderRun {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OrderRun")
      .field("id", &self.inner.id)
      .field("order_id", &self.inner.order_id)
      .field("state", &self.state())
      .finish()
  }
}
