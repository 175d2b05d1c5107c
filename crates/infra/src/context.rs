//! Storage context: the registry plus exactly one storage backend.
//!
//! In memory mode every id-targeted operation is published on the command bus
//! and answered by the live ware with that id; no answer means the id is not
//! live. In relational mode the same operations become calls against the
//! inventory table, with the registry still deciding which fields exist.

use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, DomainResult, WareId};
use stockroom_events::CommandBus;
use stockroom_inventory::{
    AddAmount, AlterOutcome, AlterPayload, AlterProperty, FieldTable, FieldValue, GetType,
    NameColumn, PreparedAlter, RemoveAmount, Ware, WareBus, WareCommand, WareKind, WareRegistry,
    WareReply, WareStore, prepare,
};

use crate::config::{Backend, StorageConfig};
use crate::creator::CreateWare;
use crate::information::{self, SearchHit, WareSummary};
use crate::relational::{InMemoryWareTable, WareRow, WareTable};

/// Where the wares of a context live.
pub enum StorageBackend {
    Memory { bus: WareBus, store: WareStore },
    Relational { table: Box<dyn WareTable> },
}

impl core::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            StorageBackend::Memory { bus, store } => f
                .debug_struct("Memory")
                .field("bus", bus)
                .field("store", store)
                .finish(),
            StorageBackend::Relational { .. } => f.debug_struct("Relational").finish_non_exhaustive(),
        }
    }
}

#[derive(Debug)]
pub struct StorageContext {
    registry: WareRegistry,
    backend: StorageBackend,
}

impl StorageContext {
    pub fn in_memory(registry: WareRegistry) -> Self {
        Self {
            registry,
            backend: StorageBackend::Memory {
                bus: WareBus::new(),
                store: WareStore::new(),
            },
        }
    }

    pub fn relational(registry: WareRegistry, table: Box<dyn WareTable>) -> Self {
        Self {
            registry,
            backend: StorageBackend::Relational { table },
        }
    }

    /// Context for `config`. The relational backend uses the in-memory table.
    pub fn from_config(registry: WareRegistry, config: &StorageConfig) -> Self {
        match config.backend {
            Backend::Memory => Self::in_memory(registry),
            Backend::Relational => Self::relational(registry, Box::new(InMemoryWareTable::new())),
        }
    }

    pub fn registry(&self) -> &WareRegistry {
        &self.registry
    }

    pub fn backend(&self) -> Backend {
        match self.backend {
            StorageBackend::Memory { .. } => Backend::Memory,
            StorageBackend::Relational { .. } => Backend::Relational,
        }
    }

    /// The command bus, in memory mode.
    pub fn bus(&self) -> Option<&WareBus> {
        match &self.backend {
            StorageBackend::Memory { bus, .. } => Some(bus),
            StorageBackend::Relational { .. } => None,
        }
    }

    // ==================== Creation & Removal ====================

    /// Announce that a ware is about to be created.
    ///
    /// Returns how many listeners acknowledged the request. Relational mode has
    /// no bus and always returns zero.
    pub fn request_create(&self) -> DomainResult<usize> {
        let StorageBackend::Memory { bus, .. } = &self.backend else {
            return Ok(0);
        };
        let replies = publish(bus, &WareCommand::CreateRequested)?;
        Ok(replies
            .iter()
            .filter(|reply| matches!(reply, WareReply::CreateAcknowledged))
            .count())
    }

    /// Validate `request` and add the ware it describes.
    pub fn create(&mut self, request: &CreateWare) -> DomainResult<WareId> {
        let validated = request.validate()?;
        if !self.is_unique(validated.id.as_str())? {
            tracing::warn!(id = %validated.id, "ware id already in use");
            return Err(DomainError::conflict(format!("id {} is already in use", validated.id)));
        }

        let ware = self
            .registry
            .build(&validated.kind, validated.shape, &validated.build_values())?;
        self.insert(ware)?;
        tracing::info!(id = %validated.id, kind = %validated.kind, "ware created");
        Ok(validated.id)
    }

    /// Store an already-built ware, bypassing request validation.
    pub fn insert(&mut self, ware: Ware) -> DomainResult<()> {
        match &mut self.backend {
            StorageBackend::Memory { bus, store } => store.attach(ware, &*bus).map(|_| ()),
            StorageBackend::Relational { table } => table.insert(WareRow::from_ware(&ware)),
        }
    }

    /// Remove ware `id`. Returns `false` when no such ware exists.
    pub fn remove(&mut self, id: &WareId) -> DomainResult<bool> {
        let removed = match &mut self.backend {
            StorageBackend::Memory { bus, store } => store.remove(id, &*bus)?,
            StorageBackend::Relational { table } => table.delete(id)?,
        };
        if removed {
            tracing::info!(%id, "ware removed");
        } else {
            tracing::warn!(%id, "no ware to remove");
        }
        Ok(removed)
    }

    // ==================== Listing ====================

    /// Snapshot of every ware.
    pub fn list(&self) -> DomainResult<Vec<Ware>> {
        match &self.backend {
            StorageBackend::Memory { store, .. } => store.list(),
            StorageBackend::Relational { table } => table
                .rows()?
                .iter()
                .map(|row| row.to_ware(&self.registry))
                .collect(),
        }
    }

    pub fn ids(&self) -> DomainResult<Vec<WareId>> {
        match &self.backend {
            StorageBackend::Memory { store, .. } => store.ids(),
            StorageBackend::Relational { table } => table.ids(),
        }
    }

    /// Whether `id` is not used by any current ware.
    pub fn is_unique(&self, id: &str) -> DomainResult<bool> {
        Ok(!self.ids()?.iter().any(|existing| existing.as_str() == id))
    }

    // ==================== Id-targeted Operations ====================

    pub fn add_amount(&self, id: &WareId, amount: i64) -> DomainResult<i64> {
        match &self.backend {
            StorageBackend::Memory { bus, .. } => {
                let command = WareCommand::AddAmount(AddAmount { id: id.clone(), amount });
                expect_amount(dispatch(bus, id, &command)?)
            }
            StorageBackend::Relational { table } => table.adjust_amount(id, amount),
        }
    }

    pub fn remove_amount(&self, id: &WareId, amount: i64) -> DomainResult<i64> {
        match &self.backend {
            StorageBackend::Memory { bus, .. } => {
                let command = WareCommand::RemoveAmount(RemoveAmount { id: id.clone(), amount });
                expect_amount(dispatch(bus, id, &command)?)
            }
            StorageBackend::Relational { table } => {
                let delta = amount
                    .checked_neg()
                    .ok_or_else(|| DomainError::invariant("amount overflow"))?;
                table.adjust_amount(id, delta)
            }
        }
    }

    /// Kind of the live ware `id`.
    pub fn kind_of(&self, id: &WareId) -> DomainResult<WareKind> {
        match &self.backend {
            StorageBackend::Memory { bus, .. } => {
                let command = WareCommand::GetType(GetType { id: id.clone() });
                match dispatch(bus, id, &command)? {
                    WareReply::Kind { kind, .. } => Ok(kind),
                    other => Err(unexpected(&other)),
                }
            }
            StorageBackend::Relational { table } => self.registry.resolve(&table.kind_of(id)?),
        }
    }

    /// Change field `key` of ware `id`.
    pub fn alter(&self, id: &WareId, key: &str, payload: AlterPayload) -> DomainResult<AlterOutcome> {
        match &self.backend {
            StorageBackend::Memory { bus, .. } => {
                let command = WareCommand::AlterProperty(AlterProperty {
                    id: id.clone(),
                    payload,
                    key: key.to_string(),
                });
                match dispatch(bus, id, &command)? {
                    WareReply::Altered { outcome, .. } => Ok(outcome),
                    other => Err(unexpected(&other)),
                }
            }
            StorageBackend::Relational { table } => {
                let kind = self.registry.resolve(&table.kind_of(id)?)?;
                match prepare(FieldTable::for_kind(kind), key, &payload)? {
                    PreparedAlter::Skip(outcome) => {
                        tracing::debug!(%id, key, ?outcome, "alteration ignored");
                        Ok(outcome)
                    }
                    PreparedAlter::Assign { key, value } => {
                        table.update(id, key, value)?;
                        Ok(AlterOutcome::Applied)
                    }
                }
            }
        }
    }

    /// Convenience for a single-value alteration.
    pub fn alter_value(&self, id: &WareId, key: &str, value: JsonValue) -> DomainResult<AlterOutcome> {
        self.alter(id, key, AlterPayload::Single(value))
    }

    // ==================== Queries ====================

    pub fn summaries(&self) -> DomainResult<Vec<WareSummary>> {
        Ok(information::summaries(&self.list()?))
    }

    pub fn details(&self, id: &WareId) -> DomainResult<Vec<(&'static str, FieldValue)>> {
        information::details(&self.list()?, id)
    }

    pub fn search(&self, names: &[&str]) -> DomainResult<Vec<SearchHit>> {
        Ok(information::search(&self.list()?, names))
    }

    pub fn searchable_names(&self, column: NameColumn) -> Vec<&'static str> {
        let mut names = self.registry.searchable_names(column);
        if column == NameColumn::Display {
            names.push(information::TYPE_ATTRIBUTE);
        }
        names
    }
}

fn publish(bus: &WareBus, command: &WareCommand) -> DomainResult<Vec<WareReply>> {
    bus.publish(command)
        .map_err(|err| DomainError::invariant(err.to_string()))
}

/// Publish an id-targeted command and return the single reply for `id`.
fn dispatch(bus: &WareBus, id: &WareId, command: &WareCommand) -> DomainResult<WareReply> {
    let mut replies: Vec<WareReply> = publish(bus, command)?
        .into_iter()
        .filter(|reply| reply.ware_id() == Some(id))
        .collect();

    let reply = match replies.len() {
        0 => return Err(DomainError::NotFound),
        1 => replies.remove(0),
        n => {
            tracing::warn!(%id, answers = n, "more than one ware answered");
            return Err(DomainError::conflict(format!("{n} wares answered for id {id}")));
        }
    };

    match reply {
        WareReply::Failed { error, .. } => Err(error),
        reply => Ok(reply),
    }
}

fn expect_amount(reply: WareReply) -> DomainResult<i64> {
    match reply {
        WareReply::AmountChanged { amount, .. } => Ok(amount),
        other => Err(unexpected(&other)),
    }
}

fn unexpected(reply: &WareReply) -> DomainError {
    DomainError::invariant(format!("unexpected reply {reply:?}"))
}
