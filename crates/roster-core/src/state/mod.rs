//! Application state and its reducer.
//!
//! [`apply`] is pure: it takes the current [`AppState`] and a [`Mutation`]
//! and returns the next state, or an error and no change. Persistence is
//! the caller's concern (see [`crate::session::Session`]); each mutation
//! reports which records it touched via [`Mutation::records`].
//!
//! Invariants kept here:
//! - Schedule mutations never touch starters, mentors, or modules.
//! - Entity edits replace the whole object matched by id.
//! - A rejected mutation leaves the state exactly as it was.

use serde::Serialize;
use thiserror::Error;

use roster_store::records::StoredRoster;
use roster_store::{Mentor, Module, RecordKey, ScheduleItem, Starter};

use crate::error::{EntityKind, ValidationError};
use crate::view::EditDraft;

/// The three input collections plus the active schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub starters: Vec<Starter>,
    pub mentors: Vec<Mentor>,
    pub modules: Vec<Module>,
    pub schedule: Vec<ScheduleItem>,
}

impl AppState {
    /// Built-in defaults with an empty schedule.
    pub fn defaults() -> Self {
        StoredRoster::defaults().into()
    }

    pub fn session(&self, id: &str) -> Option<&ScheduleItem> {
        self.schedule.iter().find(|s| s.id == id)
    }
}

impl From<StoredRoster> for AppState {
    fn from(stored: StoredRoster) -> Self {
        Self {
            starters: stored.starters,
            mentors: stored.mentors,
            modules: stored.modules,
            schedule: stored.schedule,
        }
    }
}

/// A single accepted change to the state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    AddStarter(Starter),
    RemoveStarter(String),
    ClearStarters,

    AddMentor(Mentor),
    /// Replace the mentor with the same id (expertise edits).
    ReplaceMentor(Mentor),
    RemoveMentor(String),
    ClearMentors,

    AddModule(Module),
    /// Replace the module with the same id (duration edits).
    ReplaceModule(Module),
    RemoveModule(String),
    ClearModules,

    /// Swap in a freshly generated schedule wholesale.
    ReplaceSchedule(Vec<ScheduleItem>),
    /// Confirm an edit draft against the session with this id.
    EditSession { id: String, draft: EditDraft },
    DeleteSession(String),

    /// Restore the built-in defaults and empty the schedule.
    Reset,
}

impl Mutation {
    /// The persisted records this mutation changes.
    pub fn records(&self) -> &'static [RecordKey] {
        match self {
            Self::AddStarter(_) | Self::RemoveStarter(_) | Self::ClearStarters => {
                &[RecordKey::Starters]
            }
            Self::AddMentor(_)
            | Self::ReplaceMentor(_)
            | Self::RemoveMentor(_)
            | Self::ClearMentors => &[RecordKey::Mentors],
            Self::AddModule(_)
            | Self::ReplaceModule(_)
            | Self::RemoveModule(_)
            | Self::ClearModules => &[RecordKey::Modules],
            Self::ReplaceSchedule(_) | Self::EditSession { .. } | Self::DeleteSession(_) => {
                &[RecordKey::Schedule]
            }
            Self::Reset => &RecordKey::ALL,
        }
    }
}

/// Why a mutation was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("{kind} {id:?} not found")]
    NotFound { kind: EntityKind, id: String },
}

/// Compute the state that results from applying `mutation` to `state`.
pub fn apply(state: &AppState, mutation: Mutation) -> Result<AppState, StateError> {
    let mut next = state.clone();
    match mutation {
        Mutation::AddStarter(starter) => {
            require_name(&starter.name, EntityKind::Starter)?;
            next.starters.push(starter);
        }
        Mutation::RemoveStarter(id) => {
            remove_by_id(&mut next.starters, &id, |s| &s.id, EntityKind::Starter)?
        }
        Mutation::ClearStarters => next.starters.clear(),

        Mutation::AddMentor(mentor) => {
            require_name(&mentor.name, EntityKind::Mentor)?;
            next.mentors.push(mentor);
        }
        Mutation::ReplaceMentor(mentor) => {
            require_name(&mentor.name, EntityKind::Mentor)?;
            replace_by_id(&mut next.mentors, mentor, |m| &m.id, EntityKind::Mentor)?;
        }
        Mutation::RemoveMentor(id) => {
            remove_by_id(&mut next.mentors, &id, |m| &m.id, EntityKind::Mentor)?
        }
        Mutation::ClearMentors => next.mentors.clear(),

        Mutation::AddModule(module) => {
            require_name(&module.name, EntityKind::Module)?;
            next.modules.push(module);
        }
        Mutation::ReplaceModule(module) => {
            require_name(&module.name, EntityKind::Module)?;
            replace_by_id(&mut next.modules, module, |m| &m.id, EntityKind::Module)?;
        }
        Mutation::RemoveModule(id) => {
            remove_by_id(&mut next.modules, &id, |m| &m.id, EntityKind::Module)?
        }
        Mutation::ClearModules => next.modules.clear(),

        Mutation::ReplaceSchedule(schedule) => next.schedule = schedule,
        Mutation::EditSession { id, draft } => {
            let item = next
                .schedule
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or(StateError::NotFound {
                    kind: EntityKind::Session,
                    id,
                })?;
            draft.apply_to(item);
        }
        Mutation::DeleteSession(id) => {
            remove_by_id(&mut next.schedule, &id, |s| &s.id, EntityKind::Session)?
        }

        Mutation::Reset => next = AppState::defaults(),
    }
    Ok(next)
}

fn require_name(name: &str, kind: EntityKind) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName(kind));
    }
    Ok(())
}

fn remove_by_id<T>(
    items: &mut Vec<T>,
    id: &str,
    id_of: impl Fn(&T) -> &String,
    kind: EntityKind,
) -> Result<(), StateError> {
    let pos = items
        .iter()
        .position(|item| id_of(item) == id)
        .ok_or_else(|| StateError::NotFound {
            kind,
            id: id.to_owned(),
        })?;
    items.remove(pos);
    Ok(())
}

fn replace_by_id<T>(
    items: &mut [T],
    replacement: T,
    id_of: impl Fn(&T) -> &String,
    kind: EntityKind,
) -> Result<(), StateError> {
    let id = id_of(&replacement).clone();
    let slot = items
        .iter_mut()
        .find(|item| *id_of(&**item) == id)
        .ok_or(StateError::NotFound { kind, id })?;
    *slot = replacement;
    Ok(())
}
