// orderflow/src/lib.rs

//! orderflow: one trivial order pipeline, sequenced five different ways.
//!
//! Every idiom runs the same three stub steps (retrieve, apply discount,
//! update) for one order id and reports exactly one `Outcome`:
//!  - `continuation`: future combinators chained with `and_then`.
//!  - `sequential`: plain `async`/`.await` with `?`.
//!  - `staged`: named stages with before/on/after hooks on the `Pipeline` engine.
//!  - `reactive`: transform operators over a one-element stream and an observer.
//!  - `event-driven`: request/outcome events through an `EventAggregator`.
//!
//! The staged pipeline engine and the event aggregator are usable on their own.

pub mod core;
pub mod error;
pub mod events;
pub mod idioms;
pub mod order;
pub mod pipeline;

// --- Re-exports for the Public API ---

pub use crate::core::context::Handler;
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineResult, StageControl};
pub use crate::core::stage::{SkipCondition, StageDef};

pub use crate::pipeline::{HookPhase, Pipeline};

pub use crate::events::{Event, EventAggregator, SubscriptionId};

pub use crate::idioms::{Idiom, OrderPipeline};

pub use crate::order::{
  CallCounts, Order, OrderId, OrderRun, OrderService, Outcome, PipelineState, RunId, Scenario, StubBehavior,
  StubOrderService,
};

pub use crate::error::{FlowError, FlowResult};

/*
    Typical use:
    1. Pick a service: `StubOrderService::new(StubBehavior::instant())`, or your own `OrderService`.
    2. Build an idiom: `Idiom::Staged.build(Arc::new(service))?`.
    3. `pipeline.process(123).await` yields `Outcome::Success` or `Outcome::Failure(message)`.
    4. To inspect the state machine, create an `OrderRun` yourself and pass it to `pipeline.run(run.clone())`.
*/
