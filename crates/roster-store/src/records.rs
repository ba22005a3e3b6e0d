//! Typed access to the four persisted records.
//!
//! Loading never fails: an absent record yields the built-in default, and an
//! unreadable or corrupt one is logged and also yields the default. Saving
//! reports errors so callers can decide whether to surface or just log them.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::kv::{KeyValueStore, StoreError};
use crate::models::{Mentor, Module, RecordKey, ScheduleItem, Starter};
use crate::seed;

/// Everything the store holds, loaded in one go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRoster {
    pub starters: Vec<Starter>,
    pub mentors: Vec<Mentor>,
    pub modules: Vec<Module>,
    pub schedule: Vec<ScheduleItem>,
}

impl StoredRoster {
    /// The built-in defaults with an empty schedule.
    pub fn defaults() -> Self {
        Self {
            starters: seed::default_starters(),
            mentors: seed::default_mentors(),
            modules: seed::default_modules(),
            schedule: seed::default_schedule(),
        }
    }
}

/// Load all four records, falling back per record.
pub fn load_all(store: &dyn KeyValueStore) -> StoredRoster {
    StoredRoster {
        starters: load_starters(store),
        mentors: load_mentors(store),
        modules: load_modules(store),
        schedule: load_schedule(store),
    }
}

pub fn load_starters(store: &dyn KeyValueStore) -> Vec<Starter> {
    load_or(store, RecordKey::Starters, seed::default_starters)
}

pub fn load_mentors(store: &dyn KeyValueStore) -> Vec<Mentor> {
    load_or(store, RecordKey::Mentors, seed::default_mentors)
}

pub fn load_modules(store: &dyn KeyValueStore) -> Vec<Module> {
    load_or(store, RecordKey::Modules, seed::default_modules)
}

pub fn load_schedule(store: &dyn KeyValueStore) -> Vec<ScheduleItem> {
    load_or(store, RecordKey::Schedule, seed::default_schedule)
}

/// Serialize `items` as a JSON array and write it under `key`.
pub fn save<T: Serialize>(
    store: &dyn KeyValueStore,
    key: RecordKey,
    items: &[T],
) -> Result<(), StoreError> {
    let json =
        serde_json::to_string(items).map_err(|source| StoreError::Serialize { key, source })?;
    store.set(key, &json)
}

/// Remove all four records.
///
/// Every key is attempted even if an earlier removal fails; the first error
/// is returned.
pub fn clear_all(store: &dyn KeyValueStore) -> Result<(), StoreError> {
    let mut first_err = None;
    for key in RecordKey::ALL {
        if let Err(e) = store.remove(key) {
            warn!(record = %key, error = %e, "failed to clear record");
            first_err.get_or_insert(e);
        }
    }
    match first_err {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn load_or<T, F>(store: &dyn KeyValueStore, key: RecordKey, fallback: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    match store.get(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                warn!(record = %key, error = %e, "corrupt record, using defaults");
                fallback()
            }
        },
        Ok(None) => fallback(),
        Err(e) => {
            warn!(record = %key, error = %e, "failed to read record, using defaults");
            fallback()
        }
    }
}
