//! Owning collection of live wares.

use stockroom_core::{DomainError, DomainResult, WareId};
use stockroom_events::{CommandBus, SubscriptionId};

use crate::command::{WareCommand, WareReply};
use crate::live::{LiveWare, SharedWare};
use crate::ware::Ware;

/// Live wares in insertion order, each paired with its bus subscription.
#[derive(Debug, Default)]
pub struct WareStore {
    entries: Vec<(SubscriptionId, SharedWare)>,
}

impl WareStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Subscribe `ware` to `bus` and keep it. An id already in the store is a conflict.
    pub fn attach<B>(&mut self, ware: Ware, bus: &B) -> DomainResult<SubscriptionId>
    where
        B: CommandBus<WareCommand, WareReply> + ?Sized,
    {
        self.ensure_absent(ware.ware_id())?;
        let (shared, subscription) = LiveWare::attach(ware, bus);
        self.entries.push((subscription, shared));
        Ok(subscription)
    }

    /// Keep an already-subscribed ware.
    pub fn add(&mut self, ware: SharedWare, subscription: SubscriptionId) -> DomainResult<()> {
        let id = lock(&ware)?.ware().ware_id().clone();
        self.ensure_absent(&id)?;
        self.entries.push((subscription, ware));
        Ok(())
    }

    /// Unsubscribe and drop the first ware with `id`. Returns whether one was found.
    ///
    /// The ware stays in the store when the bus refuses to unsubscribe it.
    pub fn remove<B>(&mut self, id: &WareId, bus: &B) -> DomainResult<bool>
    where
        B: CommandBus<WareCommand, WareReply> + ?Sized,
    {
        let Some(idx) = self.position(id)? else {
            return Ok(false);
        };

        let subscription = self.entries[idx].0;
        if !bus.unsubscribe(subscription) {
            tracing::warn!(%id, %subscription, "bus refused to unsubscribe ware");
            return Err(DomainError::invariant(format!(
                "could not unsubscribe ware {id} ({subscription})"
            )));
        }
        self.entries.remove(idx);
        tracing::debug!(%id, %subscription, "ware removed");
        Ok(true)
    }

    fn position(&self, id: &WareId) -> DomainResult<Option<usize>> {
        for (idx, (_, shared)) in self.entries.iter().enumerate() {
            if lock(shared)?.ware().ware_id() == id {
                return Ok(Some(idx));
            }
        }
        Ok(None)
    }

    fn ensure_absent(&self, id: &WareId) -> DomainResult<()> {
        if self.position(id)?.is_some() {
            return Err(DomainError::conflict(format!("id {id} is already in use")));
        }
        Ok(())
    }

    /// Snapshot of every ware, in insertion order.
    pub fn list(&self) -> DomainResult<Vec<Ware>> {
        self.entries
            .iter()
            .map(|(_, shared)| -> DomainResult<Ware> {
                Ok(lock(shared)?.ware().clone())
            })
            .collect()
    }

    pub fn get(&self, id: &WareId) -> DomainResult<Option<Ware>> {
        for (_, shared) in &self.entries {
            let live = lock(shared)?;
            if live.ware().ware_id() == id {
                return Ok(Some(live.ware().clone()));
            }
        }
        Ok(None)
    }

    pub fn ids(&self) -> DomainResult<Vec<WareId>> {
        self.entries
            .iter()
            .map(|(_, shared)| -> DomainResult<WareId> {
                Ok(lock(shared)?.ware().ware_id().clone())
            })
            .collect()
    }

    pub fn contains(&self, id: &WareId) -> DomainResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}

fn lock(shared: &SharedWare) -> DomainResult<std::sync::MutexGuard<'_, LiveWare>> {
    shared
        .lock()
        .map_err(|_| DomainError::invariant("ware lock poisoned"))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::command::AddAmount;
    use crate::live::WareBus;
    use crate::ware::WareBase;

    fn liquid(name: &str, id: &str, amount: i64) -> Ware {
        Ware::liquid(WareBase::new(name, WareId::new(id), amount))
    }

    #[test]
    fn list_preserves_insertion_order() {
        let bus = WareBus::new();
        let mut store = WareStore::new();
        store.attach(liquid("Water", "ID-55t", 25), &bus).unwrap();
        store.attach(liquid("Milk", "ID-55t2", 1), &bus).unwrap();

        let names: Vec<_> = store.list().unwrap().iter().map(|w| w.name().to_string()).collect();
        assert_eq!(names, vec!["Water", "Milk"]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn removed_wares_stop_receiving_commands() {
        let bus = WareBus::new();
        let mut store = WareStore::new();
        store.attach(liquid("Water", "ID-55t", 25), &bus).unwrap();

        assert!(store.remove(&WareId::new("ID-55t"), &bus).unwrap());
        assert!(store.is_empty());
        assert_eq!(bus.subscriber_count(), 0);

        let replies = bus
            .publish(&WareCommand::AddAmount(AddAmount { id: WareId::new("ID-55t"), amount: 1 }))
            .unwrap();
        assert!(replies.is_empty());
    }

    #[test]
    fn removing_an_unknown_id_is_a_no_op() {
        let bus = WareBus::new();
        let mut store = WareStore::new();
        store.attach(liquid("Water", "ID-55t", 25), &bus).unwrap();
        assert!(!store.remove(&WareId::new("ID-nope"), &bus).unwrap());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn list_is_a_snapshot() {
        let bus = WareBus::new();
        let mut store = WareStore::new();
        store.attach(liquid("Water", "ID-55t", 25), &bus).unwrap();
        let before = store.list().unwrap();

        bus.publish(&WareCommand::AddAmount(AddAmount { id: WareId::new("ID-55t"), amount: 5 }))
            .unwrap();
        assert_eq!(before[0].amount(), 25);
        assert_eq!(store.get(&WareId::new("ID-55t")).unwrap().unwrap().amount(), 30);
    }

    /// Bus that delivers commands but never lets a subscriber go.
    struct RefusingBus(WareBus);

    impl CommandBus<WareCommand, WareReply> for RefusingBus {
        type Error = stockroom_events::InMemoryBusError;

        fn publish(&self, command: &WareCommand) -> Result<Vec<WareReply>, Self::Error> {
            self.0.publish(command)
        }

        fn subscribe(&self, subscriber: stockroom_events::SharedSubscriber<WareCommand, WareReply>) -> SubscriptionId {
            self.0.subscribe(subscriber)
        }

        fn unsubscribe(&self, _id: SubscriptionId) -> bool {
            false
        }

        fn subscriber_count(&self) -> usize {
            self.0.subscriber_count()
        }
    }

    #[test]
    fn failed_unsubscribe_keeps_the_ware() {
        let bus = RefusingBus(WareBus::new());
        let mut store = WareStore::new();
        store.attach(liquid("Water", "ID-55t", 25), &bus).unwrap();

        let err = store.remove(&WareId::new("ID-55t"), &bus).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&WareId::new("ID-55t")).unwrap());
    }

    #[test]
    fn duplicate_ids_are_refused() {
        let bus = WareBus::new();
        let mut store = WareStore::new();
        store.attach(liquid("Water", "ID-55t", 25), &bus).unwrap();

        let err = store.attach(liquid("Ice", "ID-55t", 3), &bus).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(store.len(), 1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    proptest! {
        #[test]
        fn ids_follow_attach_and_remove(n in 1usize..12, pick in 0usize..12) {
            let bus = WareBus::new();
            let mut store = WareStore::new();
            for i in 0..n {
                store.attach(liquid("W", &format!("ID-{i}a"), 1), &bus).unwrap();
            }
            let target = WareId::new(format!("ID-{}a", pick % n));
            prop_assert!(store.remove(&target, &bus).unwrap());
            let ids = store.ids().unwrap();
            prop_assert_eq!(ids.len(), n - 1);
            prop_assert!(!ids.contains(&target));
            prop_assert_eq!(bus.subscriber_count(), n - 1);
        }
    }
}
