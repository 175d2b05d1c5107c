//! A ware attached to the command bus.

use std::sync::{Arc, Mutex};

use stockroom_core::{DomainError, DomainResult, Entity};
use stockroom_events::{Command, CommandBus, Subscriber, SubscriptionId};

use crate::command::{WareCommand, WareReply};
use crate::mutation::alter;
use crate::ware::Ware;

/// Bus carrying ware commands.
pub type WareBus = stockroom_events::InMemoryCommandBus<WareCommand, WareReply>;

/// Shared handle to a live ware (held by the store and by the bus).
pub type SharedWare = Arc<Mutex<LiveWare>>;

/// Subscriber wrapper that lets a ware react to the commands addressed to it.
///
/// Every command is delivered to every live ware; a ware only answers when the
/// command's target matches its own id.
#[derive(Debug)]
pub struct LiveWare {
    ware: Ware,
}

impl LiveWare {
    pub fn new(ware: Ware) -> Self {
        Self { ware }
    }

    pub fn ware(&self) -> &Ware {
        &self.ware
    }

    /// Subscribe `ware` to `bus`, returning the shared handle and its subscription.
    pub fn attach<B>(ware: Ware, bus: &B) -> (SharedWare, SubscriptionId)
    where
        B: CommandBus<WareCommand, WareReply> + ?Sized,
    {
        let shared: SharedWare = Arc::new(Mutex::new(LiveWare::new(ware)));
        let subscription = bus.subscribe(shared.clone());
        (shared, subscription)
    }

    fn handle(&mut self, command: &WareCommand) -> DomainResult<WareReply> {
        let id = self.ware.id().clone();
        match command {
            WareCommand::AddAmount(c) => {
                let amount = self.ware.adjust_amount(c.amount)?;
                Ok(WareReply::AmountChanged { id, amount })
            }
            WareCommand::RemoveAmount(c) => {
                let delta = c
                    .amount
                    .checked_neg()
                    .ok_or_else(|| DomainError::invariant("amount overflow"))?;
                let amount = self.ware.adjust_amount(delta)?;
                Ok(WareReply::AmountChanged { id, amount })
            }
            WareCommand::GetType(_) => Ok(WareReply::Kind {
                id,
                kind: self.ware.kind(),
            }),
            WareCommand::AlterProperty(c) => {
                let outcome = alter(&mut self.ware, &c.key, &c.payload)?;
                Ok(WareReply::Altered { id, outcome })
            }
            WareCommand::CreateRequested => Err(DomainError::invariant(
                "creation requests are not addressed to wares",
            )),
        }
    }
}

impl Subscriber<WareCommand, WareReply> for LiveWare {
    fn receive(&mut self, command: &WareCommand) -> Option<WareReply> {
        let target = command.target()?;
        if !self.ware.is_addressed_by(target) {
            return None;
        }

        let reply = self.handle(command).unwrap_or_else(|error| {
            tracing::warn!(id = %target, command = command.name(), %error, "command rejected");
            WareReply::Failed {
                id: target.clone(),
                error,
            }
        });
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use stockroom_core::WareId;

    use super::*;
    use crate::command::{AddAmount, AlterProperty, GetType, RemoveAmount};
    use crate::kind::WareKind;
    use crate::mutation::AlterOutcome;
    use crate::ware::WareBase;

    fn water() -> Ware {
        Ware::liquid(WareBase::new("Water", WareId::new("ID-55t"), 25))
    }

    fn id() -> WareId {
        WareId::new("ID-55t")
    }

    #[test]
    fn ignores_commands_for_other_ids() {
        let mut live = LiveWare::new(water());
        let cmd = WareCommand::AddAmount(AddAmount {
            id: WareId::new("ID-123q"),
            amount: 5,
        });
        assert_eq!(live.receive(&cmd), None);
        assert_eq!(live.receive(&WareCommand::CreateRequested), None);
        assert_eq!(live.ware().amount(), 25);
    }

    #[test]
    fn answers_amount_changes_and_type_queries() {
        let mut live = LiveWare::new(water());
        let add = WareCommand::AddAmount(AddAmount { id: id(), amount: 5 });
        assert_eq!(live.receive(&add), Some(WareReply::AmountChanged { id: id(), amount: 30 }));

        let remove = WareCommand::RemoveAmount(RemoveAmount { id: id(), amount: 10 });
        assert_eq!(live.receive(&remove), Some(WareReply::AmountChanged { id: id(), amount: 20 }));

        let get = WareCommand::GetType(GetType { id: id() });
        assert_eq!(live.receive(&get), Some(WareReply::Kind { id: id(), kind: WareKind::Liquid }));
    }

    #[test]
    fn failed_alterations_come_back_as_replies() {
        let mut live = LiveWare::new(water());
        let cmd = WareCommand::AlterProperty(AlterProperty::single(id(), json!("hot"), "boilingPoint"));
        match live.receive(&cmd) {
            Some(WareReply::Failed { error: DomainError::Conversion(_), .. }) => {}
            other => panic!("expected conversion failure, got {other:?}"),
        }

        let cmd = WareCommand::AlterProperty(AlterProperty::single(id(), json!(100), "boilingPoint"));
        assert_eq!(
            live.receive(&cmd),
            Some(WareReply::Altered { id: id(), outcome: AlterOutcome::Applied })
        );
    }

    #[test]
    fn attach_subscribes_to_the_bus() {
        let bus = WareBus::new();
        let (shared, _sub) = LiveWare::attach(water(), &bus);
        let replies = bus
            .publish(&WareCommand::AddAmount(AddAmount { id: id(), amount: 1 }))
            .unwrap();
        assert_eq!(replies, vec![WareReply::AmountChanged { id: id(), amount: 26 }]);
        assert_eq!(shared.lock().unwrap().ware().amount(), 26);
    }
}
