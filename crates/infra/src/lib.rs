//! Infrastructure layer: configuration, storage backends, the creation
//! workflow and read-only queries over the inventory.

pub mod config;
pub mod context;
pub mod creator;
pub mod information;
pub mod relational;
pub mod seed;


pub use config::{Backend, ConfigError, StorageConfig};
pub use context::{StorageBackend, StorageContext};
pub use creator::{CreateWare, ValidatedWare};
pub use information::{SearchHit, TYPE_ATTRIBUTE, WareSummary};
pub use relational::{InMemoryWareTable, WareRow, WareTable};
pub use seed::{default_wares, seed_defaults};
