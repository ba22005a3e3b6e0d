//! CSV export of the schedule.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use roster_store::ScheduleItem;
use tracing::info;

use crate::view::{ScheduleFilter, display_order};

/// Column header, always the first line.
pub const CSV_HEADER: &str = "Day,Time,Trainee,Mentor,Module,Location";

/// File name used when no output path is given.
pub const DEFAULT_EXPORT_FILE: &str = "training_roster.csv";

/// Render the whole schedule as CSV, rows in display order.
///
/// Returns `None` for an empty schedule: there is nothing to export.
pub fn to_csv(schedule: &[ScheduleItem]) -> Option<String> {
    if schedule.is_empty() {
        return None;
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + schedule.len() * 96);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for item in display_order(schedule, &ScheduleFilter::All) {
        let fields = [
            item.day.as_str(),
            item.time.as_str(),
            item.starter_name.as_str(),
            item.mentor_name.as_str(),
            item.module_name.as_str(),
            item.location.as_deref().unwrap_or(""),
        ];
        let row: Vec<String> = fields.iter().map(|f| escape_field(f)).collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    Some(out)
}

/// Write the CSV to `path`. Returns `Ok(None)` without touching the
/// filesystem when the schedule is empty.
pub fn write_csv(schedule: &[ScheduleItem], path: &Path) -> io::Result<Option<PathBuf>> {
    let Some(csv) = to_csv(schedule) else {
        return Ok(None);
    };
    fs::write(path, csv)?;
    info!(path = %path.display(), rows = schedule.len(), "roster exported");
    Ok(Some(path.to_path_buf()))
}

/// Quote a field if it contains a delimiter, quote, or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_owned()
    }
}
