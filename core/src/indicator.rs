//! Two-state status indicator mirroring whether squiggles are hidden.

use std::fmt;

/// Whether the targeted squiggles currently render.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DisplayState {
    Visible,
    Hidden,
}

impl fmt::Display for DisplayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayState::Visible => f.write_str("visible"),
            DisplayState::Hidden => f.write_str("hidden"),
        }
    }
}

/// Label and tooltip shown in a status bar; clicking it runs the toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusIndicator {
    state: DisplayState,
    text: &'static str,
    tooltip: &'static str,
}

impl StatusIndicator {
    pub fn new(state: DisplayState) -> Self {
        let mut indicator = Self {
            state,
            text: "",
            tooltip: "",
        };
        indicator.show(state);
        indicator
    }

    /// Squiggles are showing; offer to hide them.
    pub fn set_visible(&mut self) {
        self.state = DisplayState::Visible;
        self.text = "Squiggles: ●";
        self.tooltip = "Hide squiggles";
    }

    /// Squiggles are transparent; offer to show them.
    pub fn set_hidden(&mut self) {
        self.state = DisplayState::Hidden;
        self.text = "Squiggles: ○";
        self.tooltip = "Show squiggles";
    }

    pub fn show(&mut self, state: DisplayState) {
        match state {
            DisplayState::Visible => self.set_visible(),
            DisplayState::Hidden => self.set_hidden(),
        }
    }

    pub fn state(&self) -> DisplayState {
        self.state
    }

    pub fn text(&self) -> &str {
        self.text
    }

    pub fn tooltip(&self) -> &str {
        self.tooltip
    }
}

impl Default for StatusIndicator {
    fn default() -> Self {
        Self::new(DisplayState::Visible)
    }
}
