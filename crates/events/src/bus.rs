//! Command publishing/subscription abstraction (mechanics only).
//!
//! This module provides the **command bus pattern**: a synchronous pub/sub mechanism
//! that routes commands to live entities without callers holding references to them.
//!
//! ## Delivery Model
//!
//! - **Broadcast**: every subscriber sees every command and decides for itself whether
//!   the command addresses it
//! - **Synchronous**: `publish` visits all subscribers on the caller's stack before
//!   returning; nothing is queued or deferred
//! - **Ordered**: subscribers are visited in registration order
//! - **Replies**: a subscriber may answer a command; `publish` returns the answers in
//!   dispatch order, which is how query-style commands return values
//!
//! ## Reentrancy
//!
//! Handlers must not subscribe or unsubscribe while handling a command. Implementations
//! may dispatch over a snapshot of the subscriber list, in which case such changes only
//! take effect for the next command.

use std::sync::{Arc, Mutex};

use crate::command::Command;

/// Handle returned by [`CommandBus::subscribe`], used to unsubscribe later.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Receives every command published on a bus.
///
/// Returns `Some(reply)` when the command was meant for this subscriber (an
/// acknowledgement, a query answer or a failure), `None` to stay silent.
pub trait Subscriber<C, R>: Send {
    fn receive(&mut self, command: &C) -> Option<R>;
}

impl<C, R, F> Subscriber<C, R> for F
where
    F: FnMut(&C) -> Option<R> + Send,
{
    fn receive(&mut self, command: &C) -> Option<R> {
        self(command)
    }
}

/// Subscriber handle shared between the bus and whoever owns the subscriber.
pub type SharedSubscriber<C, R> = Arc<Mutex<dyn Subscriber<C, R>>>;

/// Domain-agnostic command bus (pub/sub abstraction).
///
/// ## Architecture Role
///
/// ```text
/// Caller → CommandBus::publish(command) → Subscriber 1 → reply?
///                                       → Subscriber 2 → reply?
///                                       → ...
///        ← Vec<reply> (dispatch order)
/// ```
///
/// ## Error Handling
///
/// `publish()` fails only for infrastructure reasons (e.g. a poisoned lock). Domain
/// failures travel back as replies so that one subscriber's failure does not hide
/// another subscriber's answer.
pub trait CommandBus<C, R>: Send + Sync
where
    C: Command,
{
    type Error: core::fmt::Debug + Send + Sync + 'static;

    /// Deliver `command` to every subscriber, collecting their replies.
    fn publish(&self, command: &C) -> Result<Vec<R>, Self::Error>;

    /// Register a subscriber; it receives commands published from now on.
    fn subscribe(&self, subscriber: SharedSubscriber<C, R>) -> SubscriptionId;

    /// Remove a subscriber. Returns `false` if it was not subscribed.
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Number of currently registered subscribers.
    fn subscriber_count(&self) -> usize;
}

impl<C, R, B> CommandBus<C, R> for Arc<B>
where
    C: Command,
    B: CommandBus<C, R> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, command: &C) -> Result<Vec<R>, Self::Error> {
        (**self).publish(command)
    }

    fn subscribe(&self, subscriber: SharedSubscriber<C, R>) -> SubscriptionId {
        (**self).subscribe(subscriber)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        (**self).unsubscribe(id)
    }

    fn subscriber_count(&self) -> usize {
        (**self).subscriber_count()
    }
}
