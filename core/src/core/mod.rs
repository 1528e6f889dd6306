pub mod context;
pub mod context_data;
pub mod control;
pub mod stage;

pub use context::{boxed_handler, Handler};
pub use context_data::ContextData;
pub use control::{PipelineResult, StageControl};
pub use stage::{SkipCondition, StageDef};
