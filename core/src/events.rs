// orderflow/src/events.rs

//! A typed, in-process publish/subscribe hub.
//!
//! Listeners are keyed by the `TypeId` of the event they accept, so a
//! publisher only needs the aggregator and an event value; it never learns
//! who, if anyone, is listening.

use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{event, instrument, Level};

/// An event that can travel through an `EventAggregator`.
pub trait Event: Clone + Send + Sync + 'static {
  /// Name of the topic this event is published under, used in logs.
  const TOPIC: &'static str;
}

/// Returned by `subscribe`; pass it to `unsubscribe` to remove the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener<E> = Arc<dyn Fn(E) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

struct Subscription {
  id: SubscriptionId,
  // Always a `Listener<E>` for the `E` whose TypeId keys the enclosing list.
  listener: Box<dyn Any + Send + Sync>,
}

#[derive(Default)]
pub struct EventAggregator {
  topics: RwLock<HashMap<TypeId, Vec<Subscription>>>,
  next_id: AtomicU64,
}

impl EventAggregator {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `listener_fn` for every future event of type `E`.
  pub fn subscribe<E, F, Fut>(&self, listener_fn: F) -> SubscriptionId
  where
    E: Event,
    F: Fn(E) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
  {
    let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
    let listener: Listener<E> = Arc::new(move |event| Box::pin(listener_fn(event)));
    self
      .topics
      .write()
      .entry(TypeId::of::<E>())
      .or_default()
      .push(Subscription {
        id,
        listener: Box::new(listener),
      });
    event!(Level::DEBUG, topic = E::TOPIC, subscription = id.0, "Listener subscribed.");
    id
  }

  /// Removes a listener. Returns `false` if it was not subscribed.
  pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
    let mut topics = self.topics.write();
    for subscriptions in topics.values_mut() {
      if let Some(idx) = subscriptions.iter().position(|s| s.id == id) {
        subscriptions.remove(idx);
        event!(Level::DEBUG, subscription = id.0, "Listener unsubscribed.");
        return true;
      }
    }
    false
  }

  pub fn listener_count<E: Event>(&self) -> usize {
    self.topics.read().get(&TypeId::of::<E>()).map_or(0, Vec::len)
  }

  /// Delivers `event` to every listener of its type, one after another in
  /// subscription order, and returns how many were notified.
  ///
  /// The listener table is not locked while listeners run; they may
  /// subscribe, unsubscribe or publish themselves. Listeners added during
  /// delivery only see later events.
  #[instrument(name = "EventAggregator::publish", skip_all, fields(topic = E::TOPIC))]
  pub async fn publish<E: Event>(&self, event: E) -> usize {
    let listeners: Vec<Listener<E>> = {
      let topics = self.topics.read();
      topics
        .get(&TypeId::of::<E>())
        .map(|subscriptions| {
          subscriptions
            .iter()
            .filter_map(|s| s.listener.downcast_ref::<Listener<E>>().cloned())
            .collect()
        })
        .unwrap_or_default()
    };

    if listeners.is_empty() {
      event!(Level::DEBUG, "No listeners for topic.");
      return 0;
    }

    event!(Level::TRACE, listeners = listeners.len(), "Publishing event.");
    for listener in &listeners {
      listener(event.clone()).await;
    }
    listeners.len()
  }
}

impl std::fmt::Debug for EventAggregator {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let topics = self.topics.read();
    f.debug_struct("EventAggregator")
      .field("event_types", &topics.len())
      .field("listeners", &topics.values().map(Vec::len).sum::<usize>())
      .finish()
  }
}
