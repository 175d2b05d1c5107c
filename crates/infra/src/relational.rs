//! Relational backend: one wide inventory table keyed by ware id.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use stockroom_core::{DomainError, DomainResult, WareId};
use stockroom_inventory::field::{KEY_AMOUNT, KEY_ID, KEY_NAME};
use stockroom_inventory::{FieldValue, Ware, WareRegistry};

/// Nullable columns of the inventory table.
pub const OPTIONAL_COLUMNS: [&str; 6] = [
    "information",
    "dangerCategory",
    "flashPoint",
    "minTemp",
    "boilingPoint",
    "volatile",
];

/// One row of the inventory table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WareRow {
    pub id: WareId,
    pub name: String,
    pub amount: i64,
    #[serde(rename = "type")]
    pub kind: String,
    /// Non-null optional columns only.
    pub optional: BTreeMap<String, FieldValue>,
}

impl WareRow {
    pub fn new(id: WareId, name: impl Into<String>, amount: i64, kind: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            amount,
            kind: kind.into(),
            optional: BTreeMap::new(),
        }
    }

    /// Row for a ware: its kind and every non-null optional field.
    pub fn from_ware(ware: &Ware) -> Self {
        let mut row = Self::new(
            ware.ware_id().clone(),
            ware.name(),
            ware.amount(),
            ware.kind().display_name(),
        );
        for descriptor in ware.field_table().optional_fields() {
            if let Some(value) = ware.field(descriptor.key).filter(|v| !v.is_null()) {
                row.optional.insert(descriptor.key.to_string(), value);
            }
        }
        row
    }

    /// Rebuild the ware this row describes. Columns the kind does not have are ignored.
    pub fn to_ware(&self, registry: &WareRegistry) -> DomainResult<Ware> {
        let mut ware = registry.build(
            &self.kind,
            0,
            &[
                JsonValue::from(self.name.as_str()),
                JsonValue::from(self.id.as_str()),
                JsonValue::from(self.amount),
            ],
        )?;
        for (column, value) in &self.optional {
            if ware.field_table().by_key(column).is_some() {
                ware.assign(column, value.clone())?;
            }
        }
        Ok(ware)
    }

    /// Set a column. `Null` clears an optional column.
    pub fn set(&mut self, column: &str, value: FieldValue) -> DomainResult<()> {
        match (column, value) {
            (KEY_ID, _) => return Err(DomainError::invariant("id cannot be changed")),
            (KEY_NAME, FieldValue::Text(name)) => self.name = name,
            (KEY_AMOUNT, FieldValue::Integer(amount)) => self.amount = amount,
            (column, FieldValue::Null) if OPTIONAL_COLUMNS.contains(&column) => {
                self.optional.remove(column);
            }
            (column, value) if OPTIONAL_COLUMNS.contains(&column) => {
                self.optional.insert(column.to_string(), value);
            }
            (column, value) => {
                return Err(DomainError::validation(format!(
                    "cannot store {value:?} in column {column}"
                )));
            }
        }
        Ok(())
    }
}

/// The inventory table as seen by the storage context.
pub trait WareTable: Send + Sync {
    /// Insert a new row; an existing id is a conflict.
    fn insert(&self, row: WareRow) -> DomainResult<()>;
    /// Add `delta` to a row's amount and return the new amount.
    fn adjust_amount(&self, id: &WareId, delta: i64) -> DomainResult<i64>;
    /// Delete a row. Returns whether it existed.
    fn delete(&self, id: &WareId) -> DomainResult<bool>;
    /// Kind display name stored for `id`.
    fn kind_of(&self, id: &WareId) -> DomainResult<String>;
    fn ids(&self) -> DomainResult<Vec<WareId>>;
    fn rows(&self) -> DomainResult<Vec<WareRow>>;
    fn update(&self, id: &WareId, column: &str, value: FieldValue) -> DomainResult<()>;
}

impl<T> WareTable for Arc<T>
where
    T: WareTable + ?Sized,
{
    fn insert(&self, row: WareRow) -> DomainResult<()> {
        (**self).insert(row)
    }

    fn adjust_amount(&self, id: &WareId, delta: i64) -> DomainResult<i64> {
        (**self).adjust_amount(id, delta)
    }

    fn delete(&self, id: &WareId) -> DomainResult<bool> {
        (**self).delete(id)
    }

    fn kind_of(&self, id: &WareId) -> DomainResult<String> {
        (**self).kind_of(id)
    }

    fn ids(&self) -> DomainResult<Vec<WareId>> {
        (**self).ids()
    }

    fn rows(&self) -> DomainResult<Vec<WareRow>> {
        (**self).rows()
    }

    fn update(&self, id: &WareId, column: &str, value: FieldValue) -> DomainResult<()> {
        (**self).update(id, column, value)
    }
}

/// In-memory inventory table for tests/dev. Rows keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryWareTable {
    rows: RwLock<Vec<WareRow>>,
}

impl InMemoryWareTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_row<T>(&self, id: &WareId, f: impl FnOnce(&mut WareRow) -> DomainResult<T>) -> DomainResult<T> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let row = rows
            .iter_mut()
            .find(|row| &row.id == id)
            .ok_or(DomainError::NotFound)?;
        f(row)
    }
}

impl WareTable for InMemoryWareTable {
    fn insert(&self, row: WareRow) -> DomainResult<()> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        if rows.iter().any(|existing| existing.id == row.id) {
            return Err(DomainError::conflict(format!("id {} already exists", row.id)));
        }
        rows.push(row);
        Ok(())
    }

    fn adjust_amount(&self, id: &WareId, delta: i64) -> DomainResult<i64> {
        self.with_row(id, |row| {
            row.amount = row
                .amount
                .checked_add(delta)
                .ok_or_else(|| DomainError::invariant("amount overflow"))?;
            Ok(row.amount)
        })
    }

    fn delete(&self, id: &WareId) -> DomainResult<bool> {
        let mut rows = self.rows.write().map_err(|_| poisoned())?;
        let before = rows.len();
        rows.retain(|row| &row.id != id);
        Ok(rows.len() != before)
    }

    fn kind_of(&self, id: &WareId) -> DomainResult<String> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        rows.iter()
            .find(|row| &row.id == id)
            .map(|row| row.kind.clone())
            .ok_or(DomainError::NotFound)
    }

    fn ids(&self) -> DomainResult<Vec<WareId>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.iter().map(|row| row.id.clone()).collect())
    }

    fn rows(&self) -> DomainResult<Vec<WareRow>> {
        let rows = self.rows.read().map_err(|_| poisoned())?;
        Ok(rows.clone())
    }

    fn update(&self, id: &WareId, column: &str, value: FieldValue) -> DomainResult<()> {
        self.with_row(id, |row| row.set(column, value))
    }
}

fn poisoned() -> DomainError {
    DomainError::invariant("inventory table lock poisoned")
}

#[cfg(test)]
mod tests {
    use stockroom_inventory::WareBase;

    use super::*;

    fn water_row() -> WareRow {
        WareRow::new(WareId::new("ID-55t"), "Water", 25, "Liquid")
    }

    #[test]
    fn insert_rejects_duplicate_ids() {
        let table = InMemoryWareTable::new();
        table.insert(water_row()).unwrap();
        assert!(matches!(table.insert(water_row()), Err(DomainError::Conflict(_))));
        assert_eq!(table.ids().unwrap(), vec![WareId::new("ID-55t")]);
    }

    #[test]
    fn amount_and_columns_update_in_place() {
        let table = InMemoryWareTable::new();
        table.insert(water_row()).unwrap();
        let id = WareId::new("ID-55t");

        assert_eq!(table.adjust_amount(&id, -5).unwrap(), 20);
        table.update(&id, "boilingPoint", FieldValue::Float(100.0)).unwrap();
        table.update(&id, KEY_NAME, FieldValue::Text("Tap water".into())).unwrap();

        let row = &table.rows().unwrap()[0];
        assert_eq!(row.name, "Tap water");
        assert_eq!(row.optional.get("boilingPoint"), Some(&FieldValue::Float(100.0)));

        table.update(&id, "boilingPoint", FieldValue::Null).unwrap();
        assert!(table.rows().unwrap()[0].optional.is_empty());
    }

    #[test]
    fn unknown_columns_and_ids_are_rejected() {
        let table = InMemoryWareTable::new();
        table.insert(water_row()).unwrap();
        let id = WareId::new("ID-55t");

        assert!(table.update(&id, "colour", FieldValue::Text("red".into())).is_err());
        assert!(table.update(&id, KEY_ID, FieldValue::Text("x".into())).is_err());
        assert_eq!(
            table.kind_of(&WareId::new("ID-zz")).unwrap_err(),
            DomainError::NotFound
        );
        assert!(!table.delete(&WareId::new("ID-zz")).unwrap());
        assert!(table.delete(&id).unwrap());
    }

    #[test]
    fn rows_round_trip_through_the_registry() {
        let registry = WareRegistry::standard().unwrap();
        let mut ware = Ware::combustible_liquid(WareBase::new("FOOF", WareId::new("ID-5q1"), 10));
        ware.assign("dangerCategory", FieldValue::Category(1)).unwrap();
        ware.assign("minTemp", FieldValue::Float(-163.0)).unwrap();

        let row = WareRow::from_ware(&ware);
        assert_eq!(row.kind, "Combustible Liquid");
        assert_eq!(row.optional.len(), 2);
        assert_eq!(row.to_ware(&registry).unwrap(), ware);
    }
}
