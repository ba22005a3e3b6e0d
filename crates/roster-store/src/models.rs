use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role assigned to a starter when none is given.
pub const DEFAULT_ROLE: &str = "Trainee";

/// Duration assigned to a new module when none is given.
pub const DEFAULT_DURATION: &str = "1 hour";

/// Generate a fresh entity id.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_role() -> String {
    DEFAULT_ROLE.to_owned()
}

/// Trim `value`, returning `None` when nothing is left.
fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

// ---------------------------------------------------------------------------
// Record keys
// ---------------------------------------------------------------------------

/// The four independently persisted records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKey {
    Starters,
    Mentors,
    Modules,
    Schedule,
}

impl RecordKey {
    pub const ALL: [RecordKey; 4] = [
        RecordKey::Starters,
        RecordKey::Mentors,
        RecordKey::Modules,
        RecordKey::Schedule,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Starters => "starters",
            Self::Mentors => "mentors",
            Self::Modules => "modules",
            Self::Schedule => "schedule",
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKey {
    type Err = RecordKeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starters" => Ok(Self::Starters),
            "mentors" => Ok(Self::Mentors),
            "modules" => Ok(Self::Modules),
            "schedule" => Ok(Self::Schedule),
            other => Err(RecordKeyParseError(other.to_owned())),
        }
    }
}

/// Error returned when parsing an invalid [`RecordKey`] string.
#[derive(Debug, Clone)]
pub struct RecordKeyParseError(pub String);

impl fmt::Display for RecordKeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid record key: {:?}", self.0)
    }
}

impl std::error::Error for RecordKeyParseError {}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A new employee who must complete every module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Starter {
    pub id: String,
    pub name: String,
    #[serde(default = "default_role")]
    pub role: String,
}

impl Starter {
    /// Create a starter with a fresh id. A blank role becomes [`DEFAULT_ROLE`].
    pub fn new(name: impl Into<String>, role: Option<&str>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            role: non_blank(role).unwrap_or_else(default_role),
        }
    }
}

/// A staff member who can teach sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mentor {
    pub id: String,
    pub name: String,
    /// Ordered expertise tags. Empty means no specialization.
    #[serde(default)]
    pub expertise: Vec<String>,
}

impl Mentor {
    pub fn new(name: impl Into<String>, expertise: Vec<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            expertise,
        }
    }

    /// Whether this mentor carries exactly `tag` among their expertise.
    pub fn has_expertise(&self, tag: &str) -> bool {
        self.expertise.iter().any(|t| t == tag)
    }
}

/// Split a comma-separated expertise string into trimmed, non-empty tags.
///
/// `"Safety, Lab ,, IT"` becomes `["Safety", "Lab", "IT"]`.
pub fn parse_expertise(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}

/// A unit of training content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub name: String,
    /// Free-text magnitude such as `"1 hour"` or `"Half Day"`.
    pub duration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required_expertise: Option<String>,
}

impl Module {
    /// Create a module with a fresh id. A blank duration becomes
    /// [`DEFAULT_DURATION`] and a blank requirement is stored as absent.
    pub fn new(name: impl Into<String>, duration: Option<&str>, required: Option<&str>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            duration: non_blank(duration).unwrap_or_else(|| DEFAULT_DURATION.to_owned()),
            required_expertise: non_blank(required),
        }
    }
}

/// One scheduled session: a starter attending a module with a mentor.
///
/// Names are copied strings, not references into the entity collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItem {
    pub id: String,
    pub day: String,
    pub time: String,
    pub starter_name: String,
    pub mentor_name: String,
    pub module_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}
