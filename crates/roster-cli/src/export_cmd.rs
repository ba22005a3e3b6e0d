//! `roster export` and `roster print`.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use roster_core::Session;
use roster_core::export::{self, DEFAULT_EXPORT_FILE};
use roster_core::print::{render_html, render_text};
use roster_core::view::ScheduleFilter;

/// Export the schedule as CSV to `output`, the default file, or stdout.
///
/// An empty schedule writes nothing.
pub fn run_export(session: &Session, output: Option<&Path>, to_stdout: bool) -> Result<()> {
    let schedule = &session.state().schedule;

    if to_stdout {
        match export::to_csv(schedule) {
            Some(csv) => std::io::stdout().lock().write_all(csv.as_bytes())?,
            None => eprintln!("Schedule is empty; nothing to export."),
        }
        return Ok(());
    }

    let path = output.unwrap_or_else(|| Path::new(DEFAULT_EXPORT_FILE));
    match export::write_csv(schedule, path)
        .with_context(|| format!("cannot write export file: {}", path.display()))?
    {
        Some(written) => println!("Exported {} session(s) to {}", schedule.len(), written.display()),
        None => println!("Schedule is empty; nothing to export."),
    }
    Ok(())
}

/// Print the roster as plain text, or as a standalone HTML page.
pub fn run_print(
    session: &Session,
    filter: &ScheduleFilter,
    html: bool,
    output: Option<&Path>,
) -> Result<()> {
    let schedule = &session.state().schedule;
    let rendered = if html {
        render_html(schedule, filter, "Training Roster")
    } else {
        render_text(schedule, filter)
    };

    match output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use roster_core::Mutation;
    use roster_store::MemoryStore;
    use roster_test_utils::sample_schedule;

    #[test]
    fn export_to_file_and_skip_when_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut session = Session::open(Arc::new(MemoryStore::new()));

        run_export(&session, Some(&path), false).unwrap();
        assert!(!path.exists());

        session
            .apply(Mutation::ReplaceSchedule(sample_schedule()))
            .unwrap();
        run_export(&session, Some(&path), false).unwrap();
        let csv = std::fs::read_to_string(&path).unwrap();
        assert!(csv.starts_with("Day,Time,Trainee,Mentor,Module,Location\n"));
        assert_eq!(csv.lines().count(), 6);
    }

    #[test]
    fn print_html_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roster.html");
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        session
            .apply(Mutation::ReplaceSchedule(sample_schedule()))
            .unwrap();

        let filter = ScheduleFilter::Mentor("Tech Lead Mike".into());
        run_print(&session, &filter, true, Some(&path)).unwrap();
        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("2 Sessions"));
        assert!(html.contains("Showing mentor: Tech Lead Mike"));
    }
}
