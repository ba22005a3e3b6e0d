//! Persistence layer for roster: entity models, built-in defaults, and the
//! key-value store the four roster records live in.

pub mod config;
pub mod kv;
pub mod models;
pub mod records;
pub mod seed;

pub use kv::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use models::{Mentor, Module, RecordKey, ScheduleItem, Starter};
