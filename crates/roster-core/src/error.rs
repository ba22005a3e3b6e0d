//! Errors shared between the state reducer and the request builder.

use std::fmt;

use thiserror::Error;

/// The kinds of record a user can address by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Starter,
    Mentor,
    Module,
    Session,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Starter => "starter",
            Self::Mentor => "mentor",
            Self::Module => "module",
            Self::Session => "session",
        };
        f.write_str(s)
    }
}

/// Input rejected before any state change or network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more input collections are empty, so no roster can be built.
    /// Holds the names of the empty collections in display order.
    #[error("cannot generate roster: add at least one {}", join_missing(.0))]
    MissingInputs(Vec<&'static str>),

    #[error("{0} name must not be blank")]
    BlankName(EntityKind),
}

fn join_missing(missing: &[&'static str]) -> String {
    match missing {
        [] => String::new(),
        [one] => one.to_string(),
        [a, b] => format!("{a} and {b}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_inputs_message_lists_every_category() {
        let err = ValidationError::MissingInputs(vec!["starter"]);
        assert_eq!(err.to_string(), "cannot generate roster: add at least one starter");

        let err = ValidationError::MissingInputs(vec!["mentor", "module"]);
        assert_eq!(
            err.to_string(),
            "cannot generate roster: add at least one mentor and module"
        );

        let err = ValidationError::MissingInputs(vec!["starter", "mentor", "module"]);
        assert_eq!(
            err.to_string(),
            "cannot generate roster: add at least one starter, mentor, and module"
        );
    }

    #[test]
    fn blank_name_message() {
        assert_eq!(
            ValidationError::BlankName(EntityKind::Mentor).to_string(),
            "mentor name must not be blank"
        );
    }
}
