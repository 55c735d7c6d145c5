// src/repositories/sqlite/mod.rs

pub mod draw_records;

pub use self::draw_records::SqliteDrawRecordRepository;
