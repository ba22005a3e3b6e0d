//! The single live planning session.
//!
//! A [`Session`] owns the current [`AppState`] and the store it was loaded
//! from. Every accepted mutation is written through to the store right away;
//! write failures are logged and the in-memory state is kept regardless.
//!
//! Generation is split in two so a UI can run the network call on a
//! background task and keep handling input:
//!
//! ```text
//! begin_generation(date) -> RosterRequest   (busy = true)
//!        ... generator.generate(&request).await ...
//! finish_generation(result)                 (busy = false)
//! ```

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{error, info, warn};

use roster_store::records;
use roster_store::{KeyValueStore, RecordKey};

use crate::error::ValidationError;
use crate::generate::{GENERATION_FAILED_MESSAGE, GeneratedSession, GenerationError, RosterGenerator};
use crate::reconcile::reconcile;
use crate::request::RosterRequest;
use crate::state::{self, AppState, Mutation, StateError};

/// Errors surfaced to the user by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rendered as the generic failure message. The cause is carried for
    /// logging only and is not exposed through `source()`.
    #[error("{}", GENERATION_FAILED_MESSAGE)]
    Generation(GenerationError),

    #[error(transparent)]
    State(#[from] StateError),

    #[error("a roster is already being generated")]
    Busy,
}

impl From<GenerationError> for SessionError {
    fn from(e: GenerationError) -> Self {
        SessionError::Generation(e)
    }
}

pub struct Session {
    state: AppState,
    store: Arc<dyn KeyValueStore>,
    busy: bool,
}

impl Session {
    /// Load every record from `store`, falling back to defaults per record.
    pub fn open(store: Arc<dyn KeyValueStore>) -> Self {
        let state = records::load_all(store.as_ref()).into();
        Self {
            state,
            store,
            busy: false,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// True between [`begin_generation`](Self::begin_generation) and
    /// [`finish_generation`](Self::finish_generation).
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Apply one mutation and write the touched records through.
    pub fn apply(&mut self, mutation: Mutation) -> Result<&AppState, SessionError> {
        let touched = mutation.records();
        let reset = matches!(mutation, Mutation::Reset);

        self.state = state::apply(&self.state, mutation)?;

        if reset {
            if let Err(e) = records::clear_all(self.store.as_ref()) {
                warn!(error = %e, "failed to clear stored records");
            }
        } else {
            self.persist(touched);
        }
        Ok(&self.state)
    }

    /// Restore the built-in defaults and clear the store.
    pub fn reset(&mut self) -> &AppState {
        // Reset cannot be rejected by the reducer.
        if let Err(e) = self.apply(Mutation::Reset) {
            warn!(error = %e, "reset rejected");
        }
        &self.state
    }

    /// Validate the inputs and mark the session busy.
    ///
    /// Fails with [`SessionError::Busy`] if a generation is outstanding, or
    /// with a validation error naming every empty collection. Neither
    /// failure changes the busy flag.
    pub fn begin_generation(&mut self, start_date: NaiveDate) -> Result<RosterRequest, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        let request = RosterRequest::from_state(&self.state, start_date)?;
        self.busy = true;
        info!(
            %start_date,
            expected_sessions = request.expected_sessions(),
            "roster generation started"
        );
        Ok(request)
    }

    /// Clear the busy flag and, on success, replace the schedule.
    ///
    /// On failure the previous schedule is kept. Returns the number of
    /// sessions in the new schedule.
    pub fn finish_generation(
        &mut self,
        result: Result<Vec<GeneratedSession>, GenerationError>,
    ) -> Result<usize, SessionError> {
        self.busy = false;
        match result {
            Ok(sessions) => {
                let schedule = reconcile(sessions);
                let count = schedule.len();
                self.apply(Mutation::ReplaceSchedule(schedule))?;
                info!(sessions = count, "roster generation finished");
                Ok(count)
            }
            Err(e) => {
                error!(error = %e, "roster generation failed");
                Err(e.into())
            }
        }
    }

    /// Run one full generation with `generator`.
    pub async fn generate(
        &mut self,
        generator: &dyn RosterGenerator,
        start_date: NaiveDate,
    ) -> Result<usize, SessionError> {
        let request = self.begin_generation(start_date)?;
        let result = generator.generate(&request).await;
        self.finish_generation(result)
    }

    fn persist(&self, keys: &[RecordKey]) {
        for &key in keys {
            let saved = match key {
                RecordKey::Starters => records::save(self.store.as_ref(), key, &self.state.starters),
                RecordKey::Mentors => records::save(self.store.as_ref(), key, &self.state.mentors),
                RecordKey::Modules => records::save(self.store.as_ref(), key, &self.state.modules),
                RecordKey::Schedule => records::save(self.store.as_ref(), key, &self.state.schedule),
            };
            if let Err(e) = saved {
                warn!(record = %key, error = %e, "failed to persist record");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_store::{MemoryStore, Starter};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn open_on_empty_store_uses_defaults() {
        let session = Session::open(Arc::new(MemoryStore::new()));
        assert_eq!(session.state(), &AppState::defaults());
        assert!(!session.is_busy());
    }

    #[test]
    fn accepted_mutation_is_written_through() {
        let store = Arc::new(MemoryStore::new());
        let mut session = Session::open(store.clone());
        session
            .apply(Mutation::AddStarter(Starter::new("Grace", Some("Analyst"))))
            .unwrap();

        let stored = records::load_starters(store.as_ref());
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[2].name, "Grace");
        assert!(store.get(RecordKey::Mentors).unwrap().is_none());
    }

    #[test]
    fn rejected_mutation_writes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let mut session = Session::open(store.clone());
        assert!(session.apply(Mutation::RemoveStarter("missing".into())).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let store = Arc::new(MemoryStore::failing());
        let mut session = Session::open(store.clone());
        session.apply(Mutation::ClearModules).unwrap();
        assert!(session.state().modules.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn begin_generation_validates_and_sets_busy() {
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        session.apply(Mutation::ClearMentors).unwrap();
        let err = session.begin_generation(date()).unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert!(err.to_string().contains("mentor"));
        assert!(!session.is_busy());
    }

    #[test]
    fn second_begin_is_busy() {
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        session.begin_generation(date()).unwrap();
        assert!(session.is_busy());
        assert!(matches!(session.begin_generation(date()), Err(SessionError::Busy)));

        session.finish_generation(Ok(vec![])).unwrap();
        assert!(!session.is_busy());
        assert!(session.begin_generation(date()).is_ok());
    }

    #[test]
    fn generation_error_shows_generic_message() {
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        session.begin_generation(date()).unwrap();
        let err = session
            .finish_generation(Err(GenerationError::Schema("truncated".into())))
            .unwrap_err();
        assert_eq!(err.to_string(), GENERATION_FAILED_MESSAGE);
        assert!(!session.is_busy());
    }

    #[test]
    fn generation_error_hides_its_cause() {
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        let mut rendered = Vec::new();
        for cause in [
            GenerationError::Transport("connection refused".into()),
            GenerationError::Schema("expected value at line 1".into()),
        ] {
            session.begin_generation(date()).unwrap();
            let err = session.finish_generation(Err(cause)).unwrap_err();
            assert!(std::error::Error::source(&err).is_none());
            rendered.push(err.to_string());
        }
        assert_eq!(rendered[0], rendered[1]);
        assert_eq!(rendered[0], GENERATION_FAILED_MESSAGE);
    }

    #[test]
    fn reset_clears_store() {
        let store = Arc::new(MemoryStore::new());
        let mut session = Session::open(store.clone());
        session.apply(Mutation::ClearStarters).unwrap();
        assert!(!store.is_empty());

        session.reset();
        assert_eq!(session.state(), &AppState::defaults());
        assert!(store.is_empty());
    }
}
