// orderflow/src/core/context.rs

//! The boxed handler type stored by the pipeline engine.

use crate::core::context_data::ContextData;
use crate::core::control::StageControl;
use std::future::Future;
use std::pin::Pin;

/// A stage handler.
///
/// Receives a clone of the run's `ContextData<TData>` and resolves to
/// `Result<StageControl, Err>`. Handlers take whatever locks they need,
/// release them before awaiting, and report `Continue` or `Stop`.
pub type Handler<TData, Err> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<StageControl, Err>> + Send>> + Send + Sync,
>;

/// Boxes an async closure into a `Handler`, converting its error into `Err`.
pub fn boxed_handler<TData, Err, F, E>(
  handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
) -> Handler<TData, Err>
where
  TData: 'static + Send + Sync,
  F: Future<Output = Result<StageControl, E>> + Send + 'static,
  E: Into<Err> + Send + Sync + 'static,
  Err: 'static,
{
  Box::new(move |ctx_data| {
    let fut = handler_fn(ctx_data);
    Box::pin(async move { fut.await.map_err(Into::into) })
  })
}
