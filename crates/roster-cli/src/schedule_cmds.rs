//! CLI handlers for the generated schedule.
//!
//! Implements:
//! - `roster generate`  -- one generation call, replacing the schedule
//! - `roster show`      -- schedule table with ids, optionally filtered
//! - `roster edit`      -- change day, time, or location of one session
//! - `roster delete`    -- remove one session
//! - `roster reset`     -- restore the built-in defaults

use anyhow::{Result, bail};
use chrono::NaiveDate;

use roster_core::print::render_text;
use roster_core::view::{ScheduleFilter, display_order, filter_candidates, group_by_day};
use roster_core::{EditDraft, EntityKind, Mutation, RosterGenerator, Session};
use roster_store::ScheduleItem;

use crate::confirm::confirm;
use crate::entity_cmds::column_width;
use crate::resolve::resolve;

/// Characters of a session id shown in tables; enough to stay unique.
const SHORT_ID_LEN: usize = 14;

// -----------------------------------------------------------------------
// roster generate
// -----------------------------------------------------------------------

pub async fn run_generate(
    session: &mut Session,
    generator: &dyn RosterGenerator,
    start_date: NaiveDate,
) -> Result<()> {
    let state = session.state();
    println!(
        "Generating roster for the week of {start_date} ({} starters, {} mentors, {} modules) using {}...",
        state.starters.len(),
        state.mentors.len(),
        state.modules.len(),
        generator.name(),
    );

    let count = session.generate(generator, start_date).await?;

    println!("Generated {count} session(s).");
    println!();
    print!("{}", render_text(&session.state().schedule, &ScheduleFilter::All));
    Ok(())
}

// -----------------------------------------------------------------------
// roster show
// -----------------------------------------------------------------------

pub fn run_show(session: &Session, filter: &ScheduleFilter, json: bool) -> Result<()> {
    let schedule = &session.state().schedule;

    if json {
        let days = group_by_day(display_order(schedule, filter));
        println!("{}", serde_json::to_string_pretty(&days)?);
        return Ok(());
    }

    if schedule.is_empty() {
        println!("No schedule generated. Use `roster generate` to create one.");
        return Ok(());
    }

    let shown = display_order(schedule, filter);
    if shown.is_empty() {
        let candidates = filter_candidates(schedule);
        let known = match filter {
            ScheduleFilter::Starter(_) => ("trainees", candidates.starters),
            ScheduleFilter::Mentor(_) => ("mentors", candidates.mentors),
            ScheduleFilter::All => ("sessions", Vec::new()),
        };
        println!("No sessions for {}.", filter.label());
        if !known.1.is_empty() {
            println!("Known {}: {}", known.0, known.1.join(", "));
        }
        return Ok(());
    }

    print_session_table(&shown);
    println!();
    println!("{} of {} session(s) shown ({}).", shown.len(), schedule.len(), filter.label());
    Ok(())
}

fn print_session_table(sessions: &[&ScheduleItem]) {
    let id_w = SHORT_ID_LEN;
    let day_w = column_width(sessions.iter().map(|s| s.day.len()), 3);
    let time_w = column_width(sessions.iter().map(|s| s.time.len()), 4);
    let starter_w = column_width(sessions.iter().map(|s| s.starter_name.len()), 7);
    let mentor_w = column_width(sessions.iter().map(|s| s.mentor_name.len()), 6);
    let module_w = column_width(sessions.iter().map(|s| s.module_name.len()), 6);

    println!(
        "{:<id_w$}  {:<day_w$}  {:<time_w$}  {:<starter_w$}  {:<mentor_w$}  {:<module_w$}  Location",
        "ID", "Day", "Time", "Trainee", "Mentor", "Module"
    );
    for s in sessions {
        println!(
            "{:<id_w$}  {:<day_w$}  {:<time_w$}  {:<starter_w$}  {:<mentor_w$}  {:<module_w$}  {}",
            short_id(&s.id),
            s.day,
            s.time,
            s.starter_name,
            s.mentor_name,
            s.module_name,
            s.location.as_deref().unwrap_or("-"),
        );
    }
}

fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

// -----------------------------------------------------------------------
// roster edit / delete
// -----------------------------------------------------------------------

/// Fields given on the command line; `None` keeps the current value.
#[derive(Debug, Default)]
pub struct EditFields {
    pub day: Option<String>,
    pub time: Option<String>,
    /// `Some("")` clears the location.
    pub location: Option<String>,
}

pub fn run_edit(session: &mut Session, reference: &str, fields: EditFields) -> Result<()> {
    if fields.day.is_none() && fields.time.is_none() && fields.location.is_none() {
        bail!("nothing to change; pass --day, --time, or --location");
    }

    let target = resolve(&session.state().schedule, reference, EntityKind::Session)?;
    let id = target.id.clone();
    let mut draft = EditDraft::from_item(target);
    if let Some(day) = fields.day {
        draft.day = day;
    }
    if let Some(time) = fields.time {
        draft.time = time;
    }
    if let Some(location) = fields.location {
        draft.location = location;
    }

    session.apply(Mutation::EditSession {
        id: id.clone(),
        draft,
    })?;

    if let Some(item) = session.state().session(&id) {
        println!(
            "Updated {}: {} {} {}",
            short_id(&item.id),
            item.day,
            item.time,
            item.location.as_deref().unwrap_or("(no location)"),
        );
    }
    Ok(())
}

pub fn run_delete(session: &mut Session, reference: &str, yes: bool) -> Result<()> {
    let target = resolve(&session.state().schedule, reference, EntityKind::Session)?;
    let id = target.id.clone();
    let description = format!(
        "{} for {} with {} on {} {}",
        target.module_name, target.starter_name, target.mentor_name, target.day, target.time
    );

    if !confirm(&format!("Delete session {description}?"), yes)? {
        println!("Aborted.");
        return Ok(());
    }

    session.apply(Mutation::DeleteSession(id))?;
    println!("Deleted session {description}.");
    Ok(())
}

// -----------------------------------------------------------------------
// roster reset
// -----------------------------------------------------------------------

pub fn run_reset(session: &mut Session, yes: bool) -> Result<()> {
    let question = "Reset starters, mentors, and modules to the built-in defaults and \
                    discard the current schedule?";
    if !confirm(question, yes)? {
        println!("Aborted.");
        return Ok(());
    }
    let state = session.reset();
    println!(
        "Reset to defaults: {} starters, {} mentors, {} modules, empty schedule.",
        state.starters.len(),
        state.mentors.len(),
        state.modules.len(),
    );
    Ok(())
}
