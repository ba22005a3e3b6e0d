//! TUI rendering using ratatui.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table};

use roster_core::print::{EMPTY_HINT, EMPTY_TITLE, session_count_label};

use super::app::{App, EditField, Mode};

/// Render the dashboard and any overlay for the current mode.
pub fn render(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // main content
            Constraint::Length(1), // status bar
        ])
        .split(f.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(40)])
        .split(chunks[0]);

    render_inputs(f, app, columns[0]);
    render_schedule(f, app, columns[1]);
    render_status_bar(f, app, chunks[1]);

    match &app.mode {
        Mode::Normal => {}
        Mode::Editing { draft, field, .. } => {
            let lines = [
                (EditField::Day, draft.day.as_str()),
                (EditField::Time, draft.time.as_str()),
                (EditField::Location, draft.location.as_str()),
            ]
            .into_iter()
            .map(|(kind, value)| {
                let style = if kind == *field {
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let cursor = if kind == *field { "_" } else { "" };
                Line::from(vec![
                    Span::styled(format!(" {:<9}", kind.label()), style),
                    Span::raw(format!("{value}{cursor}")),
                ])
            })
            .chain([
                Line::from(""),
                Line::from(Span::styled(
                    " Tab: next field  Enter: save  Esc: cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .collect::<Vec<_>>();
            render_popup(f, " Edit Session ", lines, 60, 8);
        }
        Mode::ConfirmDelete(id) => {
            let summary = app
                .session
                .state()
                .session(id)
                .map(|s| format!(" {} / {} / {} {}", s.module_name, s.starter_name, s.day, s.time))
                .unwrap_or_default();
            let lines = vec![
                Line::from(" Delete this session?"),
                Line::from(summary),
                Line::from(""),
                Line::from(Span::styled(" y: delete  any other key: cancel", Style::default().fg(Color::DarkGray))),
            ];
            render_popup(f, " Confirm Delete ", lines, 60, 6);
        }
        Mode::ConfirmReset => {
            let lines = vec![
                Line::from(" Restore default starters, mentors, and modules"),
                Line::from(" and discard the current schedule?"),
                Line::from(""),
                Line::from(Span::styled(" y: reset  any other key: cancel", Style::default().fg(Color::DarkGray))),
            ];
            render_popup(f, " Confirm Reset ", lines, 60, 6);
        }
        Mode::Help => render_help(f),
    }
}

fn render_inputs(f: &mut Frame, app: &App, area: Rect) {
    let state = app.session.state();
    let heading = |text: String| {
        Line::from(Span::styled(
            text,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        ))
    };

    let mut lines = vec![heading(format!("Starters ({})", state.starters.len()))];
    lines.extend(
        state
            .starters
            .iter()
            .map(|s| Line::from(format!("  {} - {}", s.name, s.role))),
    );
    lines.push(Line::from(""));

    lines.push(heading(format!("Mentors ({})", state.mentors.len())));
    for m in &state.mentors {
        lines.push(Line::from(format!("  {}", m.name)));
        if !m.expertise.is_empty() {
            lines.push(Line::from(Span::styled(
                format!("    {}", m.expertise.join(", ")),
                Style::default().fg(Color::Cyan),
            )));
        }
    }
    lines.push(Line::from(""));

    lines.push(heading(format!("Modules ({})", state.modules.len())));
    for m in &state.modules {
        lines.push(Line::from(format!("  {} ({})", m.name, m.duration)));
        if let Some(req) = &m.required_expertise {
            lines.push(Line::from(Span::styled(
                format!("    requires {req}"),
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" Inputs | week of {} ", app.start_date)),
    );
    f.render_widget(panel, area);
}

fn render_schedule(f: &mut Frame, app: &App, area: Rect) {
    let schedule = &app.session.state().schedule;

    if schedule.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("  {EMPTY_TITLE}"),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(format!("  {EMPTY_HINT}")),
            Line::from(""),
            Line::from(Span::styled(
                "  Press g to generate a roster.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let empty = Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Generated Schedule "),
        );
        f.render_widget(empty, area);
        return;
    }

    let visible = app.visible();
    let header_cells = ["Day", "Time", "Trainee", "Mentor", "Module", "Location"]
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow)));
    let header = Row::new(header_cells).height(1);

    let mut previous_day: Option<&str> = None;
    let rows = visible.iter().enumerate().map(|(i, s)| {
        // Show each day label once, on the first row of its group.
        let day = if previous_day == Some(s.day.as_str()) {
            String::new()
        } else {
            s.day.clone()
        };
        previous_day = Some(s.day.as_str());

        let style = if i == app.selected {
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };

        Row::new(vec![
            Cell::from(day).style(Style::default().fg(Color::Cyan)),
            Cell::from(s.time.clone()),
            Cell::from(s.starter_name.clone()),
            Cell::from(s.mentor_name.clone()),
            Cell::from(s.module_name.clone()),
            Cell::from(s.location.clone().unwrap_or_else(|| "-".to_owned())),
        ])
        .style(style)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(10),
            Constraint::Length(14),
            Constraint::Percentage(18),
            Constraint::Percentage(20),
            Constraint::Percentage(25),
            Constraint::Min(8),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(
                " Generated Schedule ({}) | {} ",
                session_count_label(visible.len()),
                app.filter.label()
            )),
    );

    f.render_widget(table, area);
}

fn render_help(f: &mut Frame) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(
            title,
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )])
    };
    let text = vec![
        Line::from(""),
        section("  Navigation"),
        Line::from("    j/Down    Move down"),
        Line::from("    k/Up      Move up"),
        Line::from("    f/Tab     Cycle filter: all, trainees, mentors"),
        Line::from("    q/Esc     Quit"),
        Line::from(""),
        section("  Actions"),
        Line::from("    g         Generate a roster (replaces the schedule)"),
        Line::from("    e/Enter   Edit day, time, and location"),
        Line::from("    d/Del     Delete selected session"),
        Line::from("    x         Export CSV"),
        Line::from("    R         Reset to defaults"),
        Line::from(""),
        section("  Other"),
        Line::from("    ?         Show this help"),
        Line::from(""),
    ];
    render_popup(f, " Help ", text, 60, 20);
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let generation = if app.is_generating() {
        Span::styled("Generating...", Style::default().fg(Color::Yellow))
    } else {
        let name = app
            .generator
            .as_ref()
            .map(|g| g.name().to_owned())
            .unwrap_or_else(|| "no generator".to_owned());
        Span::styled(name, Style::default().fg(Color::DarkGray))
    };

    let status_msg = app.status_message.as_deref().unwrap_or("");

    let bar = Line::from(vec![
        Span::styled(" Roster ", Style::default().bg(Color::Blue).fg(Color::White)),
        Span::raw("  "),
        generation,
        Span::raw("  "),
        Span::styled(status_msg, Style::default().fg(Color::Green)),
        Span::raw("  q:quit  ?:help  g:generate  f:filter"),
    ]);

    f.render_widget(Paragraph::new(bar), area);
}

// -- Helpers --

fn render_popup(f: &mut Frame, title: &str, lines: Vec<Line>, width: u16, height: u16) {
    let area = centered(f.area(), width, height);
    f.render_widget(Clear, area);
    let popup = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(title.to_owned()));
    f.render_widget(popup, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
