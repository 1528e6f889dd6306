// orderflow/src/order/mod.rs

//! The order being processed, the steps that process it, and the per-run
//! bookkeeping shared by every idiom.

pub mod model;
pub mod run;
pub mod service;

pub use model::{Order, OrderId, Outcome, PipelineState, RunId};
pub use run::OrderRun;
pub use service::{CallCounts, OrderService, Scenario, StubBehavior, StubOrderService};
