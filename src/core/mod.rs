//! Domain types shared by every store: cases, the tool catalog, persistence and
//! change events.

pub mod case;
pub mod catalog;
pub mod error;
pub mod events;
pub mod storage;

pub use case::{Case, CaseData, CaseRole};
pub use catalog::{parse_listing, Catalog, CatalogCommand, CommandKey, Package};
pub use error::{Error, Result};
pub use events::{EventBus, StoreEvent};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageKey};
