// spinwheel-core/src/repositories/mod.rs

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryDrawRecordRepository;
pub use sqlite::SqliteDrawRecordRepository;
