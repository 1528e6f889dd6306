// orderflow/src/idioms/mod.rs

//! Five interchangeable ways to sequence retrieve -> discount -> update.
//!
//! All of them drive an `OrderRun`, so from the outside they are the same
//! black box: one order id in, exactly one `Outcome` out.

pub mod continuation;
pub mod event_driven;
pub mod reactive;
pub mod sequential;
pub mod staged;

pub use continuation::ContinuationPipeline;
pub use event_driven::{EventDrivenPipeline, OrderFailed, OrderProcessed, OrderProcessor, ProcessOrderRequested};
pub use reactive::{subscribe, Observer, OutcomeObserver, ReactivePipeline};
pub use sequential::SequentialPipeline;
pub use staged::{OrderContext, StagedPipeline};

use crate::error::{FlowError, FlowResult};
use crate::order::{OrderId, OrderRun, OrderService, Outcome};
use async_trait::async_trait;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[async_trait]
pub trait OrderPipeline: Send + Sync {
  fn idiom(&self) -> Idiom;

  fn service(&self) -> Arc<dyn OrderService>;

  /// Drives `run` through its steps and returns its terminal outcome.
  async fn run(&self, run: OrderRun) -> Outcome;

  /// Processes `order_id` in a fresh run.
  async fn process(&self, order_id: OrderId) -> Outcome {
    self.run(OrderRun::new(self.service(), order_id)).await
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Idiom {
  /// Future combinators (`and_then`) chained into one fallible future.
  Continuation,
  /// Plain `.await` with `?`.
  Sequential,
  /// Named stages on the `Pipeline` engine.
  Staged,
  /// Transform operators over a single-element stream.
  Reactive,
  /// Request and outcome events through an `EventAggregator`.
  EventDriven,
}

impl Idiom {
  pub const ALL: [Idiom; 5] = [
    Idiom::Continuation,
    Idiom::Sequential,
    Idiom::Staged,
    Idiom::Reactive,
    Idiom::EventDriven,
  ];

  pub fn name(self) -> &'static str {
    match self {
      Idiom::Continuation => "continuation",
      Idiom::Sequential => "sequential",
      Idiom::Staged => "staged",
      Idiom::Reactive => "reactive",
      Idiom::EventDriven => "event-driven",
    }
  }

  pub fn build(self, service: Arc<dyn OrderService>) -> FlowResult<Arc<dyn OrderPipeline>> {
    Ok(match self {
      Idiom::Continuation => Arc::new(ContinuationPipeline::new(service)),
      Idiom::Sequential => Arc::new(SequentialPipeline::new(service)),
      Idiom::Staged => Arc::new(StagedPipeline::new(service)?),
      Idiom::Reactive => Arc::new(ReactivePipeline::new(service)),
      Idiom::EventDriven => Arc::new(EventDrivenPipeline::new(service)),
    })
  }
}

impl fmt::Display for Idiom {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Idiom {
  type Err = FlowError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
    Idiom::ALL
      .into_iter()
      .find(|idiom| idiom.name() == normalized)
      .ok_or_else(|| FlowError::Config {
        message: format!(
          "unknown idiom '{}' (expected one of: {})",
          s.trim(),
          Idiom::ALL.map(Idiom::name).join(", ")
        ),
      })
  }
}
