//! TUI application state and key handling.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::task::JoinHandle;

use roster_core::export::{self, DEFAULT_EXPORT_FILE};
use roster_core::view::{display_order, filter_candidates};
use roster_core::{
    EditDraft, GeneratedSession, GenerationError, Mutation, RosterGenerator, ScheduleFilter,
    Session,
};
use roster_store::ScheduleItem;

type PendingGeneration = JoinHandle<Result<Vec<GeneratedSession>, GenerationError>>;

/// Which field of the edit draft receives keystrokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Day,
    Time,
    Location,
}

impl EditField {
    fn next(self) -> Self {
        match self {
            Self::Day => Self::Time,
            Self::Time => Self::Location,
            Self::Location => Self::Day,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Day => "Day",
            Self::Time => "Time",
            Self::Location => "Location",
        }
    }
}

/// What the keyboard is currently driving.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Editing {
        id: String,
        draft: EditDraft,
        field: EditField,
    },
    ConfirmDelete(String),
    ConfirmReset,
    Help,
}

/// Application state for the TUI.
pub struct App {
    pub session: Session,
    pub generator: Option<Arc<dyn RosterGenerator>>,
    pub start_date: NaiveDate,
    pub filter: ScheduleFilter,
    pub selected: usize,
    pub mode: Mode,
    pub export_path: PathBuf,
    pub tick_rate: Duration,
    pub should_quit: bool,
    pub status_message: Option<String>,
    pending: Option<PendingGeneration>,
}

impl App {
    /// `generator` is `None` when no API key is configured; the dashboard
    /// still opens and pressing `g` explains what is missing.
    pub fn new(
        session: Session,
        generator: Option<Arc<dyn RosterGenerator>>,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            session,
            generator,
            start_date,
            filter: ScheduleFilter::All,
            selected: 0,
            mode: Mode::Normal,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            tick_rate: Duration::from_millis(250),
            should_quit: false,
            status_message: None,
            pending: None,
        }
    }

    /// Sessions in display order under the current filter.
    pub fn visible(&self) -> Vec<&ScheduleItem> {
        display_order(&self.session.state().schedule, &self.filter)
    }

    pub fn selected_item(&self) -> Option<&ScheduleItem> {
        self.visible().get(self.selected).copied()
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some() || self.session.is_busy()
    }

    // -- Key dispatch --

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.mode.clone() {
            Mode::Normal => self.handle_normal_key(key.code),
            Mode::Editing { .. } => self.handle_edit_key(key.code),
            Mode::ConfirmDelete(id) => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.delete_session(&id);
                } else {
                    self.status_message = Some("Delete cancelled".to_owned());
                }
                self.mode = Mode::Normal;
            }
            Mode::ConfirmReset => {
                if matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y')) {
                    self.reset();
                } else {
                    self.status_message = Some("Reset cancelled".to_owned());
                }
                self.mode = Mode::Normal;
            }
            Mode::Help => self.mode = Mode::Normal,
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        self.status_message = None;
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_down(),
            KeyCode::Char('k') | KeyCode::Up => self.move_up(),
            KeyCode::Char('f') | KeyCode::Tab => self.cycle_filter(),
            KeyCode::Char('g') => self.start_generation(),
            KeyCode::Char('e') | KeyCode::Enter => self.begin_edit(),
            KeyCode::Char('d') | KeyCode::Delete => self.request_delete(),
            KeyCode::Char('x') => self.export(),
            KeyCode::Char('R') => self.mode = Mode::ConfirmReset,
            KeyCode::Char('?') => self.mode = Mode::Help,
            _ => {}
        }
    }

    fn handle_edit_key(&mut self, code: KeyCode) {
        let Mode::Editing { id, draft, field } = &mut self.mode else {
            return;
        };
        let target = match field {
            EditField::Day => &mut draft.day,
            EditField::Time => &mut draft.time,
            EditField::Location => &mut draft.location,
        };
        match code {
            KeyCode::Char(c) => target.push(c),
            KeyCode::Backspace => {
                target.pop();
            }
            KeyCode::Tab => *field = field.next(),
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.status_message = Some("Edit cancelled".to_owned());
            }
            KeyCode::Enter => {
                let mutation = Mutation::EditSession {
                    id: id.clone(),
                    draft: draft.clone(),
                };
                self.mode = Mode::Normal;
                self.status_message = Some(match self.session.apply(mutation) {
                    Ok(_) => "Session updated".to_owned(),
                    Err(e) => format!("Edit failed: {e}"),
                });
            }
            _ => {}
        }
    }

    // -- Navigation --

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn move_down(&mut self) {
        let len = self.visible().len();
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
        }
    }

    /// All, then each trainee, then each mentor, then back to All.
    pub fn cycle_filter(&mut self) {
        let candidates = filter_candidates(&self.session.state().schedule);
        let options: Vec<ScheduleFilter> = std::iter::once(ScheduleFilter::All)
            .chain(candidates.starters.into_iter().map(ScheduleFilter::Starter))
            .chain(candidates.mentors.into_iter().map(ScheduleFilter::Mentor))
            .collect();
        let next = options
            .iter()
            .position(|f| *f == self.filter)
            .map_or(0, |i| (i + 1) % options.len());
        self.filter = options[next].clone();
        self.selected = 0;
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    // -- Actions --

    pub fn begin_edit(&mut self) {
        if let Some(item) = self.selected_item() {
            self.mode = Mode::Editing {
                id: item.id.clone(),
                draft: EditDraft::from_item(item),
                field: EditField::Day,
            };
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(item) = self.selected_item() {
            self.mode = Mode::ConfirmDelete(item.id.clone());
        }
    }

    fn delete_session(&mut self, id: &str) {
        self.status_message = Some(match self.session.apply(Mutation::DeleteSession(id.to_owned())) {
            Ok(_) => "Session deleted".to_owned(),
            Err(e) => format!("Delete failed: {e}"),
        });
        self.clamp_selection();
    }

    fn reset(&mut self) {
        self.session.reset();
        self.filter = ScheduleFilter::All;
        self.selected = 0;
        self.status_message = Some("Reset to defaults".to_owned());
    }

    pub fn export(&mut self) {
        let schedule = &self.session.state().schedule;
        self.status_message = Some(match export::write_csv(schedule, &self.export_path) {
            Ok(Some(path)) => format!("Exported {} session(s) to {}", schedule.len(), path.display()),
            Ok(None) => "Schedule is empty; nothing to export".to_owned(),
            Err(e) => format!("Export failed: {e}"),
        });
    }

    /// Spawn the generation call on a background task.
    ///
    /// Ignored while a generation is outstanding.
    pub fn start_generation(&mut self) {
        if self.is_generating() {
            return;
        }
        let Some(generator) = self.generator.clone() else {
            self.status_message =
                Some("No API key configured; run `roster init` or set ROSTER_API_KEY".to_owned());
            return;
        };
        match self.session.begin_generation(self.start_date) {
            Ok(request) => {
                self.pending = Some(tokio::spawn(async move {
                    generator.generate(&request).await
                }));
                self.status_message = Some("Generating...".to_owned());
            }
            Err(e) => self.status_message = Some(e.to_string()),
        }
    }

    /// Collect a finished generation, if any. Called on every tick.
    pub async fn poll_generation(&mut self) {
        if !self.pending.as_ref().is_some_and(|h| h.is_finished()) {
            return;
        }
        let Some(handle) = self.pending.take() else {
            return;
        };
        self.complete_generation(handle).await;
    }

    /// Wait for the outstanding generation, however long it takes.
    pub async fn wait_for_generation(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.complete_generation(handle).await;
        }
    }

    async fn complete_generation(&mut self, handle: PendingGeneration) {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(GenerationError::Transport(format!("generation task failed: {e}"))),
        };
        self.status_message = Some(match self.session.finish_generation(result) {
            Ok(count) => {
                self.filter = ScheduleFilter::All;
                self.selected = 0;
                format!("Generated {count} session(s)")
            }
            Err(e) => e.to_string(),
        });
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::generate::{GENERATION_FAILED_MESSAGE, ScriptedGenerator};
    use roster_store::MemoryStore;
    use roster_test_utils::{sample_generation_reply, sample_schedule};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn app_with_schedule() -> App {
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        session
            .apply(Mutation::ReplaceSchedule(sample_schedule()))
            .unwrap();
        App::new(session, None, date())
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn selection_follows_display_order_and_stays_in_bounds() {
        let mut app = app_with_schedule();
        assert_eq!(app.selected_item().unwrap().id, "s3");
        press(&mut app, KeyCode::Up);
        assert_eq!(app.selected, 0);
        for _ in 0..10 {
            press(&mut app, KeyCode::Down);
        }
        assert_eq!(app.selected, 4);
        assert_eq!(app.selected_item().unwrap().id, "s1");
    }

    #[test]
    fn filter_cycles_through_trainees_then_mentors() {
        let mut app = app_with_schedule();
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, ScheduleFilter::Starter("John Doe".into()));
        assert_eq!(app.visible().len(), 2);

        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, ScheduleFilter::Starter("Sarah Connor".into()));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, ScheduleFilter::Mentor("Dr. Emily White".into()));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, ScheduleFilter::All);
    }

    #[test]
    fn edit_location_and_confirm() {
        let mut app = app_with_schedule();
        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.mode, Mode::Editing { field: EditField::Day, .. }));

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Lab 2");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.mode, Mode::Normal);
        let item = app.session.state().session("s3").unwrap();
        assert_eq!(item.location.as_deref(), Some("Lab 2"));
        assert_eq!(item.day, "Monday");
    }

    #[test]
    fn edit_cancel_changes_nothing() {
        let mut app = app_with_schedule();
        let before = app.session.state().clone();
        press(&mut app, KeyCode::Enter);
        type_text(&mut app, "day");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.session.state(), &before);
    }

    #[test]
    fn delete_requires_confirmation() {
        let mut app = app_with_schedule();
        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.mode, Mode::ConfirmDelete("s3".into()));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.session.state().schedule.len(), 5);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.session.state().schedule.len(), 4);
        assert!(app.session.state().session("s3").is_none());
    }

    #[test]
    fn delete_last_visible_clamps_selection() {
        let mut app = app_with_schedule();
        app.filter = ScheduleFilter::Starter("John Doe".into());
        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.visible().len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn reset_requires_confirmation() {
        let mut app = app_with_schedule();
        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.mode, Mode::ConfirmReset);
        press(&mut app, KeyCode::Char('y'));
        assert!(app.session.state().schedule.is_empty());
        assert_eq!(app.session.state().starters.len(), 2);
    }

    #[test]
    fn generate_without_generator_reports_missing_key() {
        let mut app = app_with_schedule();
        press(&mut app, KeyCode::Char('g'));
        assert!(!app.is_generating());
        assert!(app.status_message.as_deref().unwrap().contains("API key"));
    }

    #[test]
    fn export_writes_to_export_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_schedule();
        app.export_path = dir.path().join("roster.csv");
        press(&mut app, KeyCode::Char('x'));
        assert!(app.export_path.exists());
        assert!(app.status_message.as_deref().unwrap().starts_with("Exported 5"));
    }

    #[tokio::test]
    async fn generation_runs_in_background_and_replaces_schedule() {
        let generator = Arc::new(ScriptedGenerator::from_reply(&sample_generation_reply()));
        let session = Session::open(Arc::new(MemoryStore::new()));
        let mut app = App::new(session, Some(generator.clone()), date());

        press(&mut app, KeyCode::Char('g'));
        assert!(app.is_generating());
        assert_eq!(app.status_message.as_deref(), Some("Generating..."));

        // A second press while busy is ignored.
        press(&mut app, KeyCode::Char('g'));

        app.wait_for_generation().await;
        assert!(!app.is_generating());
        assert_eq!(app.session.state().schedule.len(), 2);
        assert_eq!(generator.calls(), 1);
        assert_eq!(app.status_message.as_deref(), Some("Generated 2 session(s)"));
    }

    #[tokio::test]
    async fn failed_generation_keeps_schedule() {
        let generator = Arc::new(ScriptedGenerator::failing(GenerationError::Transport(
            "HTTP 500".into(),
        )));
        let mut session = Session::open(Arc::new(MemoryStore::new()));
        session
            .apply(Mutation::ReplaceSchedule(sample_schedule()))
            .unwrap();
        let mut app = App::new(session, Some(generator), date());

        press(&mut app, KeyCode::Char('g'));
        app.wait_for_generation().await;
        assert_eq!(app.session.state().schedule.len(), 5);
        assert_eq!(
            app.status_message.as_deref(),
            Some(GENERATION_FAILED_MESSAGE)
        );
    }
}
