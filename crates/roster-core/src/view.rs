//! Derived, read-only views over the schedule plus the edit draft.
//!
//! Ordering rules:
//! - Days follow the canonical week (Monday first). Labels outside the week
//!   sort after Sunday, keeping the order in which they first appear.
//! - Within a day, sessions sort by the `time` string compared
//!   lexicographically, so `"10:00"` comes before `"9:00"`. Ties keep
//!   schedule order.

use std::collections::BTreeSet;

use serde::Serialize;

use roster_store::ScheduleItem;

/// Canonical weekday order used for grouping.
pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Position of `day` in the canonical week; unrecognized labels rank last.
pub fn day_rank(day: &str) -> usize {
    WEEKDAYS
        .iter()
        .position(|d| *d == day)
        .unwrap_or(WEEKDAYS.len())
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Which sessions to show. Names match exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ScheduleFilter {
    #[default]
    All,
    Starter(String),
    Mentor(String),
}

impl ScheduleFilter {
    /// Build a filter from optional starter/mentor names. A starter name
    /// takes precedence when both are given.
    pub fn from_options(starter: Option<&str>, mentor: Option<&str>) -> Self {
        match (starter, mentor) {
            (Some(s), _) => Self::Starter(s.to_owned()),
            (None, Some(m)) => Self::Mentor(m.to_owned()),
            (None, None) => Self::All,
        }
    }

    pub fn matches(&self, item: &ScheduleItem) -> bool {
        match self {
            Self::All => true,
            Self::Starter(name) => item.starter_name == *name,
            Self::Mentor(name) => item.mentor_name == *name,
        }
    }

    /// Short human label, e.g. `"trainee: John Doe"`.
    pub fn label(&self) -> String {
        match self {
            Self::All => "all sessions".to_owned(),
            Self::Starter(name) => format!("trainee: {name}"),
            Self::Mentor(name) => format!("mentor: {name}"),
        }
    }
}

/// Sessions matching `filter`, in schedule order.
pub fn apply_filter<'a>(schedule: &'a [ScheduleItem], filter: &ScheduleFilter) -> Vec<&'a ScheduleItem> {
    schedule.iter().filter(|item| filter.matches(item)).collect()
}

/// Distinct starter and mentor names in the unfiltered schedule, sorted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterCandidates {
    pub starters: Vec<String>,
    pub mentors: Vec<String>,
}

pub fn filter_candidates(schedule: &[ScheduleItem]) -> FilterCandidates {
    let starters: BTreeSet<&str> = schedule.iter().map(|s| s.starter_name.as_str()).collect();
    let mentors: BTreeSet<&str> = schedule.iter().map(|s| s.mentor_name.as_str()).collect();
    FilterCandidates {
        starters: starters.into_iter().map(str::to_owned).collect(),
        mentors: mentors.into_iter().map(str::to_owned).collect(),
    }
}

// ---------------------------------------------------------------------------
// Grouping
// ---------------------------------------------------------------------------

/// All sessions for one day, already time-sorted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayGroup<'a> {
    pub day: &'a str,
    pub sessions: Vec<&'a ScheduleItem>,
}

/// Partition `items` by day and order both days and sessions.
pub fn group_by_day<'a, I>(items: I) -> Vec<DayGroup<'a>>
where
    I: IntoIterator<Item = &'a ScheduleItem>,
{
    let mut groups: Vec<DayGroup<'a>> = Vec::new();
    for item in items {
        match groups.iter_mut().find(|g| g.day == item.day) {
            Some(group) => group.sessions.push(item),
            None => groups.push(DayGroup {
                day: &item.day,
                sessions: vec![item],
            }),
        }
    }

    // Both sorts are stable: unknown days keep first-appearance order and
    // equal times keep schedule order.
    groups.sort_by_key(|g| day_rank(g.day));
    for group in &mut groups {
        group.sessions.sort_by(|a, b| a.time.cmp(&b.time));
    }
    groups
}

/// Filter, then group, then flatten: the order sessions are displayed in.
pub fn display_order<'a>(schedule: &'a [ScheduleItem], filter: &ScheduleFilter) -> Vec<&'a ScheduleItem> {
    group_by_day(apply_filter(schedule, filter))
        .into_iter()
        .flat_map(|g| g.sessions)
        .collect()
}

// ---------------------------------------------------------------------------
// Editing
// ---------------------------------------------------------------------------

/// The editable subset of a session, captured when edit mode starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditDraft {
    pub day: String,
    pub time: String,
    /// Empty means "no location".
    pub location: String,
}

impl EditDraft {
    pub fn from_item(item: &ScheduleItem) -> Self {
        Self {
            day: item.day.clone(),
            time: item.time.clone(),
            location: item.location.clone().unwrap_or_default(),
        }
    }

    /// Overwrite the draft fields on `item`, leaving everything else alone.
    pub fn apply_to(&self, item: &mut ScheduleItem) {
        item.day = self.day.trim().to_owned();
        item.time = self.time.trim().to_owned();
        let location = self.location.trim();
        item.location = if location.is_empty() {
            None
        } else {
            Some(location.to_owned())
        };
    }
}
