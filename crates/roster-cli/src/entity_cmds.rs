//! CLI handlers for the three input lists.
//!
//! Implements:
//! - `roster starter add|list|remove|clear`
//! - `roster mentor add|list|remove|clear|set-expertise`
//! - `roster module add|list|remove|clear|set-duration`

use anyhow::{Result, bail};

use roster_core::{EntityKind, Mutation, Session};
use roster_store::models::parse_expertise;
use roster_store::{Mentor, Module, Starter};

use crate::confirm::confirm;
use crate::resolve::resolve;
use crate::{MentorCommands, ModuleCommands, StarterCommands};

// -----------------------------------------------------------------------
// Starters
// -----------------------------------------------------------------------

pub fn run_starter_command(command: StarterCommands, session: &mut Session) -> Result<()> {
    match command {
        StarterCommands::Add { name, role } => {
            let starter = Starter::new(name, role.as_deref());
            let summary = format!("{} ({})", starter.name, starter.role);
            let id = starter.id.clone();
            session.apply(Mutation::AddStarter(starter))?;
            println!("Added starter {summary} [{id}].");
        }
        StarterCommands::List => list_starters(&session.state().starters),
        StarterCommands::Remove { starter } => {
            let target = resolve(&session.state().starters, &starter, EntityKind::Starter)?;
            let (id, name) = (target.id.clone(), target.name.clone());
            session.apply(Mutation::RemoveStarter(id.clone()))?;
            println!("Removed starter {name} [{id}].");
        }
        StarterCommands::Clear { yes } => {
            let count = session.state().starters.len();
            if confirm_clear(count, "starter", yes)? {
                session.apply(Mutation::ClearStarters)?;
                println!("Cleared {count} starter(s).");
            }
        }
    }
    Ok(())
}

fn list_starters(starters: &[Starter]) {
    if starters.is_empty() {
        println!("No starters. Use `roster starter add <name>` to add one.");
        return;
    }
    let id_w = column_width(starters.iter().map(|s| s.id.len()), 2);
    let name_w = column_width(starters.iter().map(|s| s.name.len()), 4);
    println!("{:<id_w$}  {:<name_w$}  Role", "ID", "Name");
    println!("{:-<id_w$}  {:-<name_w$}  {:-<4}", "", "", "");
    for s in starters {
        println!("{:<id_w$}  {:<name_w$}  {}", s.id, s.name, s.role);
    }
}

// -----------------------------------------------------------------------
// Mentors
// -----------------------------------------------------------------------

pub fn run_mentor_command(command: MentorCommands, session: &mut Session) -> Result<()> {
    match command {
        MentorCommands::Add { name, expertise } => {
            let tags = parse_expertise(expertise.as_deref().unwrap_or_default());
            let mentor = Mentor::new(name, tags);
            let summary = format!("{} [{}]", mentor.name, mentor.expertise.join(", "));
            let id = mentor.id.clone();
            session.apply(Mutation::AddMentor(mentor))?;
            println!("Added mentor {summary} [{id}].");
        }
        MentorCommands::List => list_mentors(&session.state().mentors),
        MentorCommands::Remove { mentor } => {
            let target = resolve(&session.state().mentors, &mentor, EntityKind::Mentor)?;
            let (id, name) = (target.id.clone(), target.name.clone());
            session.apply(Mutation::RemoveMentor(id.clone()))?;
            println!("Removed mentor {name} [{id}].");
        }
        MentorCommands::Clear { yes } => {
            let count = session.state().mentors.len();
            if confirm_clear(count, "mentor", yes)? {
                session.apply(Mutation::ClearMentors)?;
                println!("Cleared {count} mentor(s).");
            }
        }
        MentorCommands::SetExpertise { mentor, expertise } => {
            let mut updated = resolve(&session.state().mentors, &mentor, EntityKind::Mentor)?.clone();
            updated.expertise = parse_expertise(&expertise);
            let summary = if updated.expertise.is_empty() {
                "no specialization".to_owned()
            } else {
                updated.expertise.join(", ")
            };
            let name = updated.name.clone();
            session.apply(Mutation::ReplaceMentor(updated))?;
            println!("Mentor {name}: {summary}.");
        }
    }
    Ok(())
}

fn list_mentors(mentors: &[Mentor]) {
    if mentors.is_empty() {
        println!("No mentors. Use `roster mentor add <name> --expertise <tags>` to add one.");
        return;
    }
    let id_w = column_width(mentors.iter().map(|m| m.id.len()), 2);
    let name_w = column_width(mentors.iter().map(|m| m.name.len()), 4);
    println!("{:<id_w$}  {:<name_w$}  Expertise", "ID", "Name");
    println!("{:-<id_w$}  {:-<name_w$}  {:-<9}", "", "", "");
    for m in mentors {
        let tags = if m.expertise.is_empty() {
            "-".to_owned()
        } else {
            m.expertise.join(", ")
        };
        println!("{:<id_w$}  {:<name_w$}  {tags}", m.id, m.name);
    }
}

// -----------------------------------------------------------------------
// Modules
// -----------------------------------------------------------------------

pub fn run_module_command(command: ModuleCommands, session: &mut Session) -> Result<()> {
    match command {
        ModuleCommands::Add {
            name,
            duration,
            requires,
        } => {
            let module = Module::new(name, duration.as_deref(), requires.as_deref());
            let id = module.id.clone();
            let summary = module_summary(&module);
            session.apply(Mutation::AddModule(module))?;
            println!("Added module {summary} [{id}].");
        }
        ModuleCommands::List => list_modules(&session.state().modules),
        ModuleCommands::Remove { module } => {
            let target = resolve(&session.state().modules, &module, EntityKind::Module)?;
            let (id, name) = (target.id.clone(), target.name.clone());
            session.apply(Mutation::RemoveModule(id.clone()))?;
            println!("Removed module {name} [{id}].");
        }
        ModuleCommands::Clear { yes } => {
            let count = session.state().modules.len();
            if confirm_clear(count, "module", yes)? {
                session.apply(Mutation::ClearModules)?;
                println!("Cleared {count} module(s).");
            }
        }
        ModuleCommands::SetDuration { module, duration } => {
            let duration = duration.trim();
            if duration.is_empty() {
                bail!("duration must not be blank");
            }
            let mut updated = resolve(&session.state().modules, &module, EntityKind::Module)?.clone();
            updated.duration = duration.to_owned();
            let summary = module_summary(&updated);
            session.apply(Mutation::ReplaceModule(updated))?;
            println!("Module {summary}.");
        }
    }
    Ok(())
}

fn module_summary(module: &Module) -> String {
    match &module.required_expertise {
        Some(req) => format!("{} ({}, requires {req})", module.name, module.duration),
        None => format!("{} ({})", module.name, module.duration),
    }
}

fn list_modules(modules: &[Module]) {
    if modules.is_empty() {
        println!("No modules. Use `roster module add <name>` to add one.");
        return;
    }
    let id_w = column_width(modules.iter().map(|m| m.id.len()), 2);
    let name_w = column_width(modules.iter().map(|m| m.name.len()), 4);
    let dur_w = column_width(modules.iter().map(|m| m.duration.len()), 8);
    println!("{:<id_w$}  {:<name_w$}  {:<dur_w$}  Requires", "ID", "Name", "Duration");
    println!("{:-<id_w$}  {:-<name_w$}  {:-<dur_w$}  {:-<8}", "", "", "", "");
    for m in modules {
        println!(
            "{:<id_w$}  {:<name_w$}  {:<dur_w$}  {}",
            m.id,
            m.name,
            m.duration,
            m.required_expertise.as_deref().unwrap_or("-"),
        );
    }
}

// -----------------------------------------------------------------------
// Helpers
// -----------------------------------------------------------------------

fn confirm_clear(count: usize, noun: &str, yes: bool) -> Result<bool> {
    if count == 0 {
        println!("No {noun}s to clear.");
        return Ok(false);
    }
    let agreed = confirm(&format!("Remove all {count} {noun}(s)?"), yes)?;
    if !agreed {
        println!("Aborted.");
    }
    Ok(agreed)
}

/// Widest value in a column, but never narrower than its header.
pub fn column_width(lengths: impl Iterator<Item = usize>, header: usize) -> usize {
    lengths.max().unwrap_or(header).max(header)
}
