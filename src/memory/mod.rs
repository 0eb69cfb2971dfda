pub mod factory;
pub mod file;
pub mod in_memory;
pub mod snapshot;
pub mod sqlite;
pub mod transfer;
pub mod traits;

pub use factory::create_memory_store;
pub use file::FileMemoryStore;
pub use in_memory::InMemoryStore;
pub use snapshot::{MemorySnapshot, TIER_ARCHIVE, TIER_IMMUTABLE, TIER_MUTABLE, TIERS};
pub use sqlite::SqliteMemoryStore;
pub use transfer::{export_to_file, seed_from_file};
pub use traits::MemoryStore;
