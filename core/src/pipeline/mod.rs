// orderflow/src/pipeline/mod.rs

//! The staged pipeline engine: definition, hook registration and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::Pipeline;
pub use hooks::HookPhase;
