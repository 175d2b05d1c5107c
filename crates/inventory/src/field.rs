//! Per-field metadata: which fields each ware kind exposes, and how.
//!
//! Every kind declares its own descriptors statically. The table consulted at
//! run time is the ancestor-merged list (base fields first, then each ancestor's,
//! then the kind's own), built once per kind and never per instance, so
//! metadata is available before any ware exists.

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::Serialize;

use crate::kind::WareKind;

/// Declared value type of a field.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    OptionalText,
    Integer,
    OptionalFloat,
    /// Optional danger category; values outside 1–4 read as unset.
    Category,
    /// Optional list of floats.
    FloatList,
}

impl FieldType {
    /// Whether the field may be unset (`null`).
    pub fn is_optional(self) -> bool {
        !matches!(self, FieldType::Text | FieldType::Integer)
    }

    pub fn is_list(self) -> bool {
        matches!(self, FieldType::FloatList)
    }

    pub fn type_name(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::OptionalText => "text?",
            FieldType::Integer => "integer",
            FieldType::OptionalFloat => "float?",
            FieldType::Category => "category?",
            FieldType::FloatList => "float[]?",
        }
    }
}

impl core::fmt::Display for FieldType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Metadata for one externally visible field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FieldDescriptor {
    /// Human-readable name shown in menus and search results.
    pub display_name: &'static str,
    /// Stable key used for mutation matching and relational column mapping.
    pub key: &'static str,
    pub field_type: FieldType,
    /// Unique and immutable once assigned (only the id).
    pub unique: bool,
}

impl FieldDescriptor {
    const fn new(display_name: &'static str, key: &'static str, field_type: FieldType) -> Self {
        Self {
            display_name,
            key,
            field_type,
            unique: false,
        }
    }

    const fn unique(self) -> Self {
        Self {
            unique: true,
            ..self
        }
    }
}

pub const KEY_NAME: &str = "name";
pub const KEY_AMOUNT: &str = "amount";
pub const KEY_INFORMATION: &str = "information";
pub const KEY_ID: &str = "id";
pub const KEY_MIN_TEMP: &str = "minTemp";
pub const KEY_BOILING_POINT: &str = "boilingPoint";
pub const KEY_CATEGORY: &str = "dangerCategory";
pub const KEY_FLASH_POINT: &str = "flashPoint";

/// Keys every constructor takes positionally ahead of any shape parameters.
pub const BASE_KEYS: [&str; 3] = [KEY_NAME, KEY_ID, KEY_AMOUNT];

/// Fields of the abstract base ware.
pub static WARE_FIELDS: [FieldDescriptor; 4] = [
    FieldDescriptor::new("Name", KEY_NAME, FieldType::Text),
    FieldDescriptor::new("Amount", KEY_AMOUNT, FieldType::Integer),
    FieldDescriptor::new("Information", KEY_INFORMATION, FieldType::OptionalText),
    FieldDescriptor::new("ID", KEY_ID, FieldType::Text).unique(),
];

static LIQUID_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("Minimum Temperature", KEY_MIN_TEMP, FieldType::OptionalFloat),
    FieldDescriptor::new("Boiling Point", KEY_BOILING_POINT, FieldType::OptionalFloat),
];

static COMBUSTIBLE_LIQUID_FIELDS: [FieldDescriptor; 2] = [
    FieldDescriptor::new("Category", KEY_CATEGORY, FieldType::Category),
    FieldDescriptor::new("Flash Point", KEY_FLASH_POINT, FieldType::FloatList),
];

/// Descriptors a kind declares itself (excluding anything inherited).
pub fn own_fields(kind: WareKind) -> &'static [FieldDescriptor] {
    match kind {
        WareKind::Liquid => &LIQUID_FIELDS,
        WareKind::CombustibleLiquid => &COMBUSTIBLE_LIQUID_FIELDS,
        WareKind::Electronic => &[],
    }
}

/// Ancestor-merged field table of one kind.
#[derive(Debug)]
pub struct FieldTable {
    kind: WareKind,
    fields: Vec<&'static FieldDescriptor>,
    by_key: HashMap<&'static str, usize>,
}

static TABLES: LazyLock<HashMap<WareKind, FieldTable>> = LazyLock::new(|| {
    WareKind::ALL
        .into_iter()
        .map(|kind| (kind, FieldTable::build(kind)))
        .collect()
});

impl FieldTable {
    fn build(kind: WareKind) -> Self {
        let fields: Vec<&'static FieldDescriptor> = WARE_FIELDS
            .iter()
            .chain(kind.lineage().into_iter().flat_map(own_fields))
            .collect();
        let by_key = fields
            .iter()
            .enumerate()
            .map(|(idx, field)| (field.key, idx))
            .collect();
        Self { kind, fields, by_key }
    }

    /// The merged table for `kind`, built on first use.
    pub fn for_kind(kind: WareKind) -> &'static FieldTable {
        // Every kind is inserted when the map is built.
        &TABLES[&kind]
    }

    pub fn kind(&self) -> WareKind {
        self.kind
    }

    /// All fields in declaration order (base first).
    pub fn fields(&self) -> &[&'static FieldDescriptor] {
        &self.fields
    }

    pub fn by_key(&self, key: &str) -> Option<&'static FieldDescriptor> {
        self.by_key.get(key).map(|idx| self.fields[*idx])
    }

    pub fn by_display_name(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().copied().find(|f| f.display_name == name)
    }

    /// Fields beyond the positional base (`name`, `id`, `amount`).
    pub fn optional_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> + '_ {
        self.fields
            .iter()
            .copied()
            .filter(|f| !BASE_KEYS.contains(&f.key))
    }
}
