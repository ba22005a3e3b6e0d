//! Shared test utilities for roster integration tests.
//!
//! Provides throwaway file-backed stores and canned schedules so each test
//! crate builds its fixtures the same way.
//!
//! Every store returned here lives in its own temporary directory. Keep the
//! returned [`TempDir`] alive for as long as the store is in use; dropping it
//! deletes the directory.

use roster_store::config::StoreConfig;
use roster_store::{FileStore, ScheduleItem};
use tempfile::TempDir;

/// Create a [`FileStore`] rooted in a fresh temporary directory.
///
/// Returns `(store, dir)`. Nothing is written until the first `set`.
pub fn create_test_store() -> (FileStore, TempDir) {
    let dir = TempDir::new().expect("failed to create temp data dir");
    let store = FileStore::new(StoreConfig::new(dir.path().join("data")));
    (store, dir)
}

/// Build a schedule entry with an explicit id.
pub fn schedule_item(
    id: &str,
    day: &str,
    time: &str,
    starter: &str,
    mentor: &str,
    module: &str,
    location: Option<&str>,
) -> ScheduleItem {
    ScheduleItem {
        id: id.to_owned(),
        day: day.to_owned(),
        time: time.to_owned(),
        starter_name: starter.to_owned(),
        mentor_name: mentor.to_owned(),
        module_name: module.to_owned(),
        location: location.map(str::to_owned),
    }
}

/// Five sessions across three days, two of them for `"John Doe"`.
///
/// Deliberately stored out of display order: Wednesday first, and Monday's
/// sessions in reverse time order.
pub fn sample_schedule() -> Vec<ScheduleItem> {
    vec![
        schedule_item(
            "s1",
            "Wednesday",
            "09:00 - 10:00",
            "Sarah Connor",
            "Dr. Emily White",
            "Lab Safety Induction",
            Some("Lab 1"),
        ),
        schedule_item(
            "s2",
            "Monday",
            "11:00 - 12:00",
            "John Doe",
            "Tech Lead Mike",
            "IT Systems Setup",
            Some("Room A"),
        ),
        schedule_item(
            "s3",
            "Monday",
            "09:00 - 10:00",
            "Sarah Connor",
            "Prof. Alan Grant",
            "Research Ethics",
            None,
        ),
        schedule_item(
            "s4",
            "Tuesday",
            "14:00 - 17:00",
            "John Doe",
            "Prof. Alan Grant",
            "Equipment Handling",
            Some("Workshop"),
        ),
        schedule_item(
            "s5",
            "Tuesday",
            "09:00 - 11:00",
            "Sarah Connor",
            "Tech Lead Mike",
            "IT Systems Setup",
            Some("Online"),
        ),
    ]
}

/// A well-formed generation reply: two sessions, the second without a
/// location.
pub fn sample_generation_reply() -> String {
    serde_json::json!([
        {
            "day": "Monday",
            "time": "09:00 - 10:00",
            "starterName": "John Doe",
            "mentorName": "Dr. Emily White",
            "moduleName": "Lab Safety Induction",
            "location": "Lab 1"
        },
        {
            "day": "Monday",
            "time": "10:00 - 12:00",
            "starterName": "John Doe",
            "mentorName": "Tech Lead Mike",
            "moduleName": "IT Systems Setup"
        }
    ])
    .to_string()
}
