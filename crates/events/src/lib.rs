//! Command routing: a synchronous publish/subscribe bus.

pub mod bus;
pub mod command;
pub mod in_memory_bus;

pub use bus::{CommandBus, SharedSubscriber, Subscriber, SubscriptionId};
pub use command::Command;
pub use in_memory_bus::{InMemoryBusError, InMemoryCommandBus};
