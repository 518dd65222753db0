//! Per-instance lifecycle events.

use crate::core::Result;
use futures::future::{BoxFuture, try_join_all};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Raised before a user-initiated merge touches the data record.
    Merging,
}

impl IntoIterator for EventKind {
    type Item = EventKind;
    type IntoIter = std::iter::Once<EventKind>;

    fn into_iter(self) -> Self::IntoIter {
        std::iter::once(self)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EntityEvent {
    Merging {
        /// Data record as it was before the merge.
        current: Map<String, Value>,
        incoming: Map<String, Value>,
    },
}

impl EntityEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            EntityEvent::Merging { .. } => EventKind::Merging,
        }
    }
}

type Subscriber = Arc<dyn Fn(Arc<EntityEvent>) -> BoxFuture<'static, Result<Value>> + Send + Sync>;

/// Typed publish/subscribe channel owned by one entity instance.
#[derive(Clone, Default)]
pub struct EventChannel {
    subscribers: HashMap<EventKind, Vec<Subscriber>>,
}

impl EventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for every kind in `kinds`.
    pub fn on<I, F, Fut>(&mut self, kinds: I, callback: F)
    where
        I: IntoIterator<Item = EventKind>,
        F: Fn(Arc<EntityEvent>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value>> + Send + 'static,
    {
        let subscriber: Subscriber =
            Arc::new(move |event: Arc<EntityEvent>| -> BoxFuture<'static, Result<Value>> {
                Box::pin(callback(event))
            });
        for kind in kinds {
            self.subscribers
                .entry(kind)
                .or_default()
                .push(subscriber.clone());
        }
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers.get(&kind).map_or(0, Vec::len)
    }

    /// Runs every subscriber of the event's kind concurrently and waits for
    /// all of them. Results come back in registration order; the first
    /// failure is returned as the emit's failure.
    pub async fn emit(&self, event: EntityEvent) -> Result<Vec<Value>> {
        let subscribers = match self.subscribers.get(&event.kind()) {
            Some(subscribers) if !subscribers.is_empty() => subscribers,
            _ => return Ok(Vec::new()),
        };

        let event = Arc::new(event);
        try_join_all(subscribers.iter().map(|subscriber| subscriber(event.clone()))).await
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .subscribers
            .iter()
            .map(|(kind, subscribers)| (*kind, subscribers.len()))
            .collect();
        f.debug_struct("EventChannel")
            .field("subscribers", &counts)
            .finish()
    }
}
