//! In-process synchronous command bus.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

use crate::bus::{CommandBus, SharedSubscriber, SubscriptionId};
use crate::command::Command;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InMemoryBusError {
    /// Publish failed due to internal lock poisoning.
    #[error("command bus lock poisoned")]
    Poisoned,
}

/// In-memory pub/sub bus with direct, synchronous dispatch.
///
/// - No IO / no async / no queueing
/// - Subscribers visited in registration order
/// - Dispatch runs over a snapshot of the subscriber list
pub struct InMemoryCommandBus<C, R> {
    subscribers: Mutex<Vec<(SubscriptionId, SharedSubscriber<C, R>)>>,
    next_id: AtomicU64,
}

impl<C, R> InMemoryCommandBus<C, R> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C, R> Default for InMemoryCommandBus<C, R> {
    fn default() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<C, R> core::fmt::Debug for InMemoryCommandBus<C, R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let count = self.subscribers.lock().map(|subs| subs.len()).ok();
        f.debug_struct("InMemoryCommandBus")
            .field("subscribers", &count)
            .finish()
    }
}

impl<C, R> CommandBus<C, R> for InMemoryCommandBus<C, R>
where
    C: Command,
    R: Send + 'static,
{
    type Error = InMemoryBusError;

    fn publish(&self, command: &C) -> Result<Vec<R>, Self::Error> {
        let snapshot: Vec<(SubscriptionId, SharedSubscriber<C, R>)> = {
            let subs = self.subscribers.lock().map_err(|_| InMemoryBusError::Poisoned)?;
            subs.iter().map(|(id, s)| (*id, s.clone())).collect()
        };

        let mut replies = Vec::new();
        for (id, subscriber) in &snapshot {
            let mut subscriber = subscriber.lock().map_err(|_| InMemoryBusError::Poisoned)?;
            if let Some(reply) = subscriber.receive(command) {
                tracing::trace!(command = command.name(), subscription = %id, "subscriber replied");
                replies.push(reply);
            }
        }

        tracing::debug!(
            command = command.name(),
            target = ?command.target(),
            delivered = snapshot.len(),
            replies = replies.len(),
            "command published"
        );
        Ok(replies)
    }

    fn subscribe(&self, subscriber: SharedSubscriber<C, R>) -> SubscriptionId {
        let id = SubscriptionId::new(self.next_id.fetch_add(1, Ordering::Relaxed));

        // If the lock is poisoned we still hand out an id;
        // the subscriber just won't receive commands.
        if let Ok(mut subs) = self.subscribers.lock() {
            subs.push((id, subscriber));
        }
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut subs) = self.subscribers.lock() else {
            return false;
        };
        let before = subs.len();
        subs.retain(|(sub_id, _)| *sub_id != id);
        subs.len() != before
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().map(|subs| subs.len()).unwrap_or(0)
    }
}
