//! Inventory domain: ware kinds, field metadata, the kind registry, and live
//! wares that react to commands on the bus.
//!
//! This crate holds the domain logic only. Persistence backends and the
//! creation workflow live in `stockroom-infra`.

pub mod command;
pub mod field;
pub mod kind;
pub mod live;
pub mod mutation;
pub mod registry;
pub mod store;
pub mod value;
pub mod ware;

pub use command::{AddAmount, AlterPayload, AlterProperty, GetType, RemoveAmount, WareCommand, WareReply};
pub use field::{FieldDescriptor, FieldTable, FieldType};
pub use kind::WareKind;
pub use live::{LiveWare, SharedWare, WareBus};
pub use mutation::{AlterOutcome, PreparedAlter, alter, prepare};
pub use registry::{
    ConstructorShape, NameColumn, RegistryError, ShapeParam, VariantDef, WareRegistry,
    WareRegistryBuilder,
};
pub use store::WareStore;
pub use value::{CATEGORY_RANGE, FieldValue, coerce, coerce_list, normalize_category};
pub use ware::{CombustibleProps, LiquidProps, Ware, WareBase, WareDetails};
