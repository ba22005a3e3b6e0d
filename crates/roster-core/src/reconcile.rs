//! Turn generator output into schedule items.
//!
//! Every generated session gets a fresh id; nothing else is inspected or
//! corrected. Order is preserved.

use roster_store::ScheduleItem;
use uuid::Uuid;

use crate::generate::GeneratedSession;

/// Prefix on every generated session id.
pub const SESSION_ID_PREFIX: &str = "sched-";

/// A new globally unique session id, e.g. `sched-3f2a...`.
pub fn new_session_id() -> String {
    format!("{SESSION_ID_PREFIX}{}", Uuid::new_v4().simple())
}

pub fn reconcile(sessions: Vec<GeneratedSession>) -> Vec<ScheduleItem> {
    sessions
        .into_iter()
        .map(|s| ScheduleItem {
            id: new_session_id(),
            day: s.day,
            time: s.time,
            starter_name: s.starter_name,
            mentor_name: s.mentor_name,
            module_name: s.module_name,
            location: s.location,
        })
        .collect()
}
