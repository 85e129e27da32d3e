use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use ratatui::layout::Rect;
use squiggles_core::{Notifier, Severity, SettingsStore, StatusIndicator, Targets, ToggleEngine};
use tracing::warn;

/// Messages raised by the engine, held until they expire or are dismissed.
#[derive(Debug, Default)]
struct Notices {
    message: Option<(String, Instant, Duration)>,
    error: Option<String>,
}

impl Notifier for Notices {
    fn transient(&mut self, message: &str, ttl: Duration) {
        self.message = Some((message.to_string(), Instant::now(), ttl));
    }

    fn error(&mut self, message: &str) {
        self.message = None;
        self.error = Some(message.to_string());
    }
}

pub struct App<S> {
    engine: ToggleEngine<S>,
    settings_path: PathBuf,
    targets: Vec<Severity>,
    notices: Notices,
    indicator_area: Rect,
    should_quit: bool,
}

impl<S: SettingsStore> App<S> {
    pub fn new(engine: ToggleEngine<S>, settings_path: PathBuf) -> Self {
        let mut app = Self {
            engine,
            settings_path,
            targets: Vec::new(),
            notices: Notices::default(),
            indicator_area: Rect::default(),
            should_quit: false,
        };
        app.load_targets();
        app
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn indicator(&self) -> &StatusIndicator {
        self.engine.indicator()
    }

    /// Severity classes the next toggle will touch.
    pub fn targets(&self) -> &[Severity] {
        &self.targets
    }

    pub fn message(&self) -> Option<&str> {
        self.notices.message.as_ref().map(|(text, _, _)| text.as_str())
    }

    pub fn error(&self) -> Option<&str> {
        self.notices.error.as_deref()
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Where the indicator was last drawn, for mouse hit-testing.
    pub fn set_indicator_area(&mut self, area: Rect) {
        self.indicator_area = area;
    }

    pub fn handle_key(&mut self, code: KeyCode) {
        if self.notices.error.is_some() {
            match code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Char(' ') => self.notices.error = None,
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('t') | KeyCode::Char(' ') | KeyCode::Enter => self.toggle(),
            KeyCode::Char('r') => self.refresh(),
            _ => {}
        }
    }

    /// Left click at a terminal cell; toggles when it lands on the indicator.
    pub fn click(&mut self, column: u16, row: u16) {
        if self.notices.error.is_some() {
            return;
        }
        let area = self.indicator_area;
        let inside = column >= area.x
            && column < area.x.saturating_add(area.width)
            && row >= area.y
            && row < area.y.saturating_add(area.height);
        if inside {
            self.toggle();
        }
    }

    pub fn toggle(&mut self) {
        self.engine.invoke(&mut self.notices);
        self.load_targets();
    }

    /// Re-read settings after outside edits.
    pub fn refresh(&mut self) {
        if let Err(err) = self.engine.refresh() {
            warn!(error = %err, "failed to refresh squiggle state");
            self.notices.error(&format!("Could not read settings: {err}"));
        }
        self.load_targets();
    }

    /// Drop the transient message once its time is up.
    pub fn tick(&mut self, now: Instant) {
        let expired = matches!(
            &self.notices.message,
            Some((_, shown, ttl)) if now.saturating_duration_since(*shown) >= *ttl
        );
        if expired {
            self.notices.message = None;
        }
    }

    fn load_targets(&mut self) {
        match self.engine.store().read_preferences() {
            Ok(prefs) => self.targets = Targets::from_preferences(&prefs).severities().to_vec(),
            Err(err) => warn!(error = %err, "failed to read squiggle preferences"),
        }
    }
}
