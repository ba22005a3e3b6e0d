//! Scheduling request: prompt construction and the output schema.
//!
//! The request restates the scheduling policy as instructions to the model.
//! None of it is enforced locally; whatever schedule comes back is trusted.
//! This module is pure logic (no I/O).

use chrono::NaiveDate;
use serde::Serialize;

use roster_store::{Mentor, Module, Starter};

use crate::error::ValidationError;
use crate::state::AppState;

/// Everything the generator needs to produce a roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterRequest {
    pub starters: Vec<Starter>,
    pub mentors: Vec<Mentor>,
    pub modules: Vec<Module>,
    pub start_date: NaiveDate,
}

impl RosterRequest {
    /// Build a request from the three collections.
    ///
    /// Fails when any collection is empty; the error lists every empty one.
    pub fn build(
        starters: &[Starter],
        mentors: &[Mentor],
        modules: &[Module],
        start_date: NaiveDate,
    ) -> Result<Self, ValidationError> {
        let missing: Vec<&'static str> = [
            ("starter", starters.is_empty()),
            ("mentor", mentors.is_empty()),
            ("module", modules.is_empty()),
        ]
        .into_iter()
        .filter_map(|(name, empty)| empty.then_some(name))
        .collect();

        if !missing.is_empty() {
            return Err(ValidationError::MissingInputs(missing));
        }

        Ok(Self {
            starters: starters.to_vec(),
            mentors: mentors.to_vec(),
            modules: modules.to_vec(),
            start_date,
        })
    }

    pub fn from_state(state: &AppState, start_date: NaiveDate) -> Result<Self, ValidationError> {
        Self::build(&state.starters, &state.mentors, &state.modules, start_date)
    }

    /// Number of sessions a complete roster contains (every starter takes
    /// every module).
    pub fn expected_sessions(&self) -> usize {
        self.starters.len() * self.modules.len()
    }

    /// Render the natural-language instruction sent to the model.
    pub fn prompt(&self) -> String {
        let mut prompt = String::with_capacity(2048);

        prompt.push_str(PROMPT_PREAMBLE);
        prompt.push_str(&format!(
            "Start Date: {} ({}). Assume a standard work week, Monday to Friday, \
             beginning on that date.\n\n",
            self.start_date,
            self.start_date.format("%A"),
        ));
        prompt.push_str(POLICY);

        prompt.push_str("\n## Data\n\n");
        prompt.push_str(&format!("Starters: {}\n", to_json(&self.starters)));
        prompt.push_str(&format!("Mentors: {}\n", to_json(&self.mentors)));
        prompt.push_str(&format!("Modules: {}\n", to_json(&self.modules)));

        prompt
    }
}

/// JSON schema the reply must conform to, in the dialect the Gemini
/// `responseSchema` field accepts.
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "day": { "type": "STRING", "description": "Day of the week (e.g., Monday)" },
                "time": { "type": "STRING", "description": "Time slot (e.g., 09:00 - 10:00)" },
                "starterName": { "type": "STRING" },
                "mentorName": { "type": "STRING" },
                "moduleName": { "type": "STRING" },
                "location": {
                    "type": "STRING",
                    "description": "Suggested location (e.g., Room A, Online, Lab 1)"
                }
            },
            "required": ["day", "time", "starterName", "mentorName", "moduleName"]
        }
    })
}

fn to_json<T: Serialize>(items: &[T]) -> String {
    // Plain structs of strings cannot fail to serialize.
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_owned())
}

const PROMPT_PREAMBLE: &str = "You are an expert training coordinator and scheduler.

Task: Create a training roster for new starters.
";

const POLICY: &str = "Work Hours: 09:00 - 17:00.
Lunch Break: Ensure everyone has a break between 12:00 and 14:00.

Constraints:
1. Each STARTER must complete EVERY MODULE.
2. Assign a MENTOR to each session.
3. Expertise Matching: If a module requires specific expertise, you MUST assign a mentor with that exact expertise.
4. Conflict Resolution:
   - A Mentor cannot teach two sessions at the same time.
   - A Starter cannot attend two sessions at the same time.
5. Spread sessions across the five working days starting on the start date.
6. Optimization: Group sessions logically to avoid 1-hour gaps if possible.
7. Output: Return a clean JSON array of scheduled sessions.
";
