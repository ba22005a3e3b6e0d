//! Roster generation: the generator interface and the reply contract.
//!
//! A [`RosterGenerator`] turns a [`RosterRequest`] into an ordered list of
//! [`GeneratedSession`]s. The reply must be a JSON array of objects with the
//! required string fields `day`, `time`, `starterName`, `mentorName`,
//! `moduleName` and the optional string `location`; anything else is a
//! [`GenerationError::Schema`].
//!
//! ```text
//! RosterRequest --generate()--> Ok(Vec<GeneratedSession>)
//!                           \-> Err(Transport | Schema)
//! ```

pub mod gemini;
pub mod scripted;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::RosterRequest;

pub use gemini::{GeminiClient, GeminiConfig};
pub use scripted::{NaiveGenerator, ScriptedGenerator};

/// The single message shown to users for every generation failure.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate roster. Please check your API key and try again.";

/// One session as returned by the generator, before it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GeneratedSession {
    pub day: String,
    pub time: String,
    pub starter_name: String,
    pub mentor_name: String,
    pub module_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Why a generation call produced no schedule.
///
/// Both variants render the same message to users; the detail is for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// The service could not be reached or answered with an error status.
    #[error("generation service error: {0}")]
    Transport(String),

    /// The reply was empty, not JSON, or did not match the session schema.
    #[error("generation reply rejected: {0}")]
    Schema(String),
}

impl GenerationError {
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

/// Adapter interface for schedule generators.
///
/// Object-safe so the CLI can hold an `Arc<dyn RosterGenerator>` and tests
/// can swap in a [`ScriptedGenerator`].
#[async_trait]
pub trait RosterGenerator: Send + Sync {
    /// Human-readable name (e.g. `"gemini-2.5-flash"`).
    fn name(&self) -> &str;

    /// Issue one generation call. No retries.
    async fn generate(
        &self,
        request: &RosterRequest,
    ) -> Result<Vec<GeneratedSession>, GenerationError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn RosterGenerator) {}
};

/// Parse reply text into sessions, enforcing the schema.
pub fn parse_sessions(text: &str) -> Result<Vec<GeneratedSession>, GenerationError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(GenerationError::Schema("empty response".to_owned()));
    }
    serde_json::from_str(text).map_err(|e| GenerationError::Schema(e.to_string()))
}
