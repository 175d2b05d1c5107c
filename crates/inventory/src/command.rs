//! Commands routed to live wares over the command bus, and their replies.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, WareId};
use stockroom_events::Command;

use crate::kind::WareKind;
use crate::mutation::AlterOutcome;

/// Command: AddAmount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddAmount {
    pub id: WareId,
    pub amount: i64,
}

/// Command: RemoveAmount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveAmount {
    pub id: WareId,
    pub amount: i64,
}

/// Query: GetType.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetType {
    pub id: WareId,
}

/// New value(s) for a field, in generic form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlterPayload {
    Single(JsonValue),
    Many(Vec<JsonValue>),
}

/// Command: AlterProperty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlterProperty {
    pub id: WareId,
    pub payload: AlterPayload,
    /// Persistence key of the field to change.
    pub key: String,
}

impl AlterProperty {
    pub fn single(id: WareId, value: JsonValue, key: impl Into<String>) -> Self {
        Self {
            id,
            payload: AlterPayload::Single(value),
            key: key.into(),
        }
    }

    pub fn many(id: WareId, values: Vec<JsonValue>, key: impl Into<String>) -> Self {
        Self {
            id,
            payload: AlterPayload::Many(values),
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WareCommand {
    /// Someone asked to start creating a ware; no ware answers this.
    CreateRequested,
    AddAmount(AddAmount),
    RemoveAmount(RemoveAmount),
    GetType(GetType),
    AlterProperty(AlterProperty),
}

impl Command for WareCommand {
    type Target = WareId;

    fn target(&self) -> Option<&WareId> {
        match self {
            WareCommand::CreateRequested => None,
            WareCommand::AddAmount(c) => Some(&c.id),
            WareCommand::RemoveAmount(c) => Some(&c.id),
            WareCommand::GetType(c) => Some(&c.id),
            WareCommand::AlterProperty(c) => Some(&c.id),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            WareCommand::CreateRequested => "ware.create_requested",
            WareCommand::AddAmount(_) => "ware.add_amount",
            WareCommand::RemoveAmount(_) => "ware.remove_amount",
            WareCommand::GetType(_) => "ware.get_type",
            WareCommand::AlterProperty(_) => "ware.alter_property",
        }
    }
}

/// Answer from a subscriber that handled a command.
#[derive(Debug, Clone, PartialEq)]
pub enum WareReply {
    /// The amount changed; carries the new amount.
    AmountChanged { id: WareId, amount: i64 },
    Kind { id: WareId, kind: WareKind },
    Altered { id: WareId, outcome: AlterOutcome },
    /// The addressed ware rejected the command; its state is unchanged.
    Failed { id: WareId, error: DomainError },
    /// A non-ware subscriber picked up a creation request.
    CreateAcknowledged,
}

impl WareReply {
    pub fn ware_id(&self) -> Option<&WareId> {
        match self {
            WareReply::AmountChanged { id, .. }
            | WareReply::Kind { id, .. }
            | WareReply::Altered { id, .. }
            | WareReply::Failed { id, .. } => Some(id),
            WareReply::CreateAcknowledged => None,
        }
    }
}
