//! Built-in demo data, restored on reset and used whenever a persisted
//! record is missing or unreadable.

use crate::models::{Mentor, Module, ScheduleItem, Starter};

pub fn default_starters() -> Vec<Starter> {
    vec![
        Starter {
            id: "1".into(),
            name: "John Doe".into(),
            role: "Researcher".into(),
        },
        Starter {
            id: "2".into(),
            name: "Sarah Connor".into(),
            role: "Lab Tech".into(),
        },
    ]
}

pub fn default_mentors() -> Vec<Mentor> {
    vec![
        Mentor {
            id: "1".into(),
            name: "Dr. Emily White".into(),
            expertise: vec!["Safety".into(), "Chemistry".into()],
        },
        Mentor {
            id: "2".into(),
            name: "Prof. Alan Grant".into(),
            expertise: vec!["Paleontology".into(), "Field Work".into()],
        },
        Mentor {
            id: "3".into(),
            name: "Tech Lead Mike".into(),
            expertise: vec!["IT".into(), "Systems".into()],
        },
    ]
}

pub fn default_modules() -> Vec<Module> {
    vec![
        Module {
            id: "1".into(),
            name: "Lab Safety Induction".into(),
            duration: "1 hour".into(),
            required_expertise: Some("Safety".into()),
        },
        Module {
            id: "2".into(),
            name: "IT Systems Setup".into(),
            duration: "2 hours".into(),
            required_expertise: Some("IT".into()),
        },
        Module {
            id: "3".into(),
            name: "Research Ethics".into(),
            duration: "1 hour".into(),
            required_expertise: None,
        },
        Module {
            id: "4".into(),
            name: "Equipment Handling".into(),
            duration: "Half Day".into(),
            required_expertise: None,
        },
    ]
}

pub fn default_schedule() -> Vec<ScheduleItem> {
    Vec::new()
}
