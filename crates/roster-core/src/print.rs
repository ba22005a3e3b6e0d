//! Printable renderings of the schedule: plain text for the terminal and a
//! standalone HTML page for the local web view.
//!
//! Both show the same content: a session count header, then sessions grouped
//! by day in display order. Neither carries any input controls.

use std::fmt::Write as _;

use roster_store::ScheduleItem;

use crate::view::{ScheduleFilter, apply_filter, group_by_day};

pub const EMPTY_TITLE: &str = "No Schedule Generated";
pub const EMPTY_HINT: &str =
    "Add your starters, mentors, and modules, then generate a roster.";

/// "1 Session" / "N Sessions".
pub fn session_count_label(count: usize) -> String {
    if count == 1 {
        "1 Session".to_owned()
    } else {
        format!("{count} Sessions")
    }
}

/// Plain-text roster for `roster print` and `roster show`.
pub fn render_text(schedule: &[ScheduleItem], filter: &ScheduleFilter) -> String {
    let mut out = String::new();
    if schedule.is_empty() {
        let _ = writeln!(out, "{EMPTY_TITLE}");
        let _ = writeln!(out, "{EMPTY_HINT}");
        return out;
    }

    let shown = apply_filter(schedule, filter);
    let _ = writeln!(out, "Generated Schedule ({})", session_count_label(shown.len()));
    if *filter != ScheduleFilter::All {
        let _ = writeln!(out, "Showing {}", filter.label());
    }

    for group in group_by_day(shown) {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", group.day.to_uppercase());
        for item in group.sessions {
            let _ = writeln!(out, "  {:<15} {}", item.time, item.module_name);
            let _ = writeln!(out, "  {:<15} Trainee: {}", "", item.starter_name);
            let _ = writeln!(out, "  {:<15} Mentor:  {}", "", item.mentor_name);
            if let Some(location) = &item.location {
                let _ = writeln!(out, "  {:<15} @ {location}", "");
            }
        }
    }
    out
}

/// A self-contained HTML page. `title` goes into `<title>` and `<h1>`.
pub fn render_html(schedule: &[ScheduleItem], filter: &ScheduleFilter, title: &str) -> String {
    let mut body = String::new();

    if schedule.is_empty() {
        let _ = write!(
            body,
            "<section class=\"empty\"><h2>{}</h2><p>{}</p></section>",
            EMPTY_TITLE,
            escape_html(EMPTY_HINT)
        );
    } else {
        let shown = apply_filter(schedule, filter);
        let _ = write!(
            body,
            "<header><h2>Generated Schedule</h2><span class=\"count\">{}</span>",
            session_count_label(shown.len())
        );
        if *filter != ScheduleFilter::All {
            let _ = write!(
                body,
                "<p class=\"filter\">Showing {}</p>",
                escape_html(&filter.label())
            );
        }
        body.push_str("</header>");

        for group in group_by_day(shown) {
            let _ = write!(body, "<section class=\"day\"><h3>{}</h3>", escape_html(group.day));
            for item in group.sessions {
                let _ = write!(
                    body,
                    "<article class=\"session\"><h4>{}</h4><p class=\"time\">{}</p>\
                     <p><b>Trainee:</b> {}</p><p><b>Mentor:</b> {}</p>",
                    escape_html(&item.module_name),
                    escape_html(&item.time),
                    escape_html(&item.starter_name),
                    escape_html(&item.mentor_name),
                );
                if let Some(location) = &item.location {
                    let _ = write!(body, "<p class=\"location\">{}</p>", escape_html(location));
                }
                body.push_str("</article>");
            }
            body.push_str("</section>");
        }
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{title}</title><style>{STYLE}</style></head>\
         <body><h1>{title}</h1>{body}</body></html>\n",
        title = escape_html(title),
    )
}

/// Escape text for an HTML body or a double- or single-quoted attribute.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;color:#1e293b}\
header{display:flex;gap:1rem;align-items:baseline}\
.count{font-size:.8rem;background:#dbeafe;color:#1d4ed8;padding:.1rem .5rem;border-radius:1rem}\
.day h3{text-transform:uppercase;color:#94a3b8;font-size:.85rem;border-bottom:1px solid #e2e8f0}\
.session{border:1px solid #e2e8f0;border-radius:.5rem;padding:.5rem 1rem;margin:.5rem 0;\
break-inside:avoid}\
.session h4{margin:.2rem 0}.session p{margin:.1rem 0}\
.time{font-size:.8rem;color:#64748b}.location{font-size:.8rem;color:#64748b}\
.empty{text-align:center;color:#64748b;border:2px dashed #e2e8f0;padding:3rem}";

#[cfg(test)]
mod tests {
    use super::*;
    use roster_test_utils::sample_schedule;

    #[test]
    fn empty_schedule_renders_empty_state() {
        let text = render_text(&[], &ScheduleFilter::All);
        assert!(text.starts_with(EMPTY_TITLE));

        let html = render_html(&[], &ScheduleFilter::All, "Roster");
        assert!(html.contains(EMPTY_TITLE));
        assert!(!html.contains("Sessions"));
    }

    #[test]
    fn text_groups_days_in_order_with_count() {
        let text = render_text(&sample_schedule(), &ScheduleFilter::All);
        assert!(text.starts_with("Generated Schedule (5 Sessions)"));

        let monday = text.find("MONDAY").unwrap();
        let tuesday = text.find("TUESDAY").unwrap();
        let wednesday = text.find("WEDNESDAY").unwrap();
        assert!(monday < tuesday && tuesday < wednesday);

        // Within Monday the 09:00 session comes first.
        let ethics = text.find("Research Ethics").unwrap();
        let it = text.find("IT Systems Setup").unwrap();
        assert!(ethics < it);
        assert!(text.contains("@ Room A"));
    }

    #[test]
    fn text_respects_filter() {
        let filter = ScheduleFilter::Starter("John Doe".into());
        let text = render_text(&sample_schedule(), &filter);
        assert!(text.starts_with("Generated Schedule (2 Sessions)"));
        assert!(text.contains("Showing trainee: John Doe"));
        assert!(!text.contains("Sarah Connor"));
        assert!(!text.contains("WEDNESDAY"));
    }

    #[test]
    fn html_escapes_content() {
        let mut schedule = sample_schedule();
        schedule[0].module_name = "<script>alert(1)</script>".into();
        let html = render_html(&schedule, &ScheduleFilter::All, "Onboarding & Training");
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("<title>Onboarding &amp; Training</title>"));
        assert!(html.contains("5 Sessions"));
        assert!(!html.contains("<input") && !html.contains("<button"));
    }

    #[test]
    fn count_label_singular() {
        assert_eq!(session_count_label(1), "1 Session");
        assert_eq!(session_count_label(0), "0 Sessions");
    }
}
