//! Core logic for roster: the entity state and its reducer, the generation
//! request/response contract, reconciliation of generated sessions, and the
//! derived views (grouping, filtering, export, print).
//!
//! ```text
//! Session::apply(Mutation) ------> state::apply --> write-through to KeyValueStore
//! Session::begin_generation ----> request::RosterRequest
//!                                    |
//!                        RosterGenerator::generate (Gemini / scripted)
//!                                    |
//! Session::finish_generation <-- Vec<GeneratedSession> --> reconcile --> schedule
//! ```

pub mod error;
pub mod export;
pub mod generate;
pub mod print;
pub mod reconcile;
pub mod request;
pub mod session;
pub mod state;
pub mod view;

pub use error::{EntityKind, ValidationError};
pub use generate::{GeneratedSession, GenerationError, RosterGenerator};
pub use request::RosterRequest;
pub use session::{Session, SessionError};
pub use state::{AppState, Mutation, StateError};
pub use view::{EditDraft, ScheduleFilter};
