//! Toggle between transparent squiggles and the colors they had before.

use crate::indicator::{DisplayState, StatusIndicator};
use crate::overrides::{ColorOverrides, BACKUP_KEY};
use crate::severity::{is_transparent, Severity, TRANSPARENT_COLOR};
use crate::store::SettingsStore;
use crate::{Preferences, Result};
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How long transient toggle messages stay up.
pub const STATUS_MESSAGE_TTL: Duration = Duration::from_millis(2500);

/// Shown when a toggle fails for any reason; details go to the log.
pub const FAILURE_MESSAGE: &str =
    "An error occurred while toggling squiggle settings. Check logs for details.";

/// Surface for user-facing messages raised by [`ToggleEngine::invoke`].
pub trait Notifier {
    /// Short-lived message that disappears after `ttl`.
    fn transient(&mut self, message: &str, ttl: Duration);
    /// Failure that should stay visible until acknowledged.
    fn error(&mut self, message: &str);
}

/// Override keys the toggle reads and writes for a set of preferences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    severities: Vec<Severity>,
    keys: Vec<String>,
}

impl Targets {
    pub fn new(severities: impl IntoIterator<Item = Severity>) -> Self {
        let severities: Vec<_> = severities.into_iter().collect();
        let keys = severities.iter().flat_map(|s| s.keys()).collect();
        Self { severities, keys }
    }

    pub fn from_preferences(prefs: &Preferences) -> Self {
        Self::new(Severity::ALL.into_iter().filter(|s| prefs.hides(*s)))
    }

    pub fn severities(&self) -> &[Severity] {
        &self.severities
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Hidden only when every targeted key holds the transparent sentinel.
    ///
    /// An empty target set hides nothing and is therefore `Visible`.
    pub fn display_state(&self, overrides: &ColorOverrides) -> DisplayState {
        if self.is_empty() {
            return DisplayState::Visible;
        }
        let hidden = self
            .keys
            .iter()
            .all(|key| overrides.get(key).is_some_and(is_transparent));
        if hidden {
            DisplayState::Hidden
        } else {
            DisplayState::Visible
        }
    }
}

/// What a toggle did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Change {
    /// Targeted squiggles were made transparent.
    Hidden,
    /// Targeted squiggles got their saved colors back.
    Restored,
    /// Preferences exclude every class; nothing was written.
    NothingTargeted,
}

impl Change {
    /// Indicator state after this change.
    pub fn state(self) -> DisplayState {
        match self {
            Change::Hidden => DisplayState::Hidden,
            Change::Restored | Change::NothingTargeted => DisplayState::Visible,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Change::Hidden => "Selected squiggles are now transparent.",
            Change::Restored => "Squiggles restored to previous visibility.",
            Change::NothingTargeted => "No squiggle types are selected for hiding.",
        }
    }
}

/// Result of a successful [`ToggleEngine::toggle`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Toggled {
    pub change: Change,
    /// Whether preferences ask for a transient message.
    pub show_message: bool,
}

/// Compute the override object that follows `current` for `targets`.
///
/// Keys outside `targets` are carried over untouched.
pub fn plan(current: &ColorOverrides, targets: &Targets) -> (Change, ColorOverrides) {
    let mut next = current.clone();
    if targets.is_empty() {
        return (Change::NothingTargeted, next);
    }

    match targets.display_state(current) {
        DisplayState::Hidden => {
            let backup = read_backup(current);
            for key in targets.keys() {
                match backup.get(key) {
                    Some(value) => next.insert_raw(key.as_str(), value.clone()),
                    None => {
                        next.remove(key);
                    }
                }
            }
            next.remove(BACKUP_KEY);
            (Change::Restored, next)
        }
        DisplayState::Visible => {
            // Every present value is saved verbatim, whatever its type.
            let backup: Map<String, Value> = targets
                .keys()
                .iter()
                .filter_map(|key| current.get_raw(key).map(|value| (key.clone(), value.clone())))
                .collect();
            let serialized = serde_json::to_string(&backup).unwrap_or_else(|_| "{}".to_string());
            next.set(BACKUP_KEY, serialized);
            for key in targets.keys() {
                next.set(key.as_str(), TRANSPARENT_COLOR);
            }
            (Change::Hidden, next)
        }
    }
}

/// Saved colors from the reserved key. Anything unreadable counts as no backup.
fn read_backup(overrides: &ColorOverrides) -> Map<String, Value> {
    let Some(raw) = overrides.get(BACKUP_KEY) else {
        if overrides.contains(BACKUP_KEY) {
            warn!(key = BACKUP_KEY, "color backup is not a string, ignoring it");
        }
        return Map::new();
    };
    match serde_json::from_str(raw) {
        Ok(backup) => backup,
        Err(err) => {
            warn!(key = BACKUP_KEY, error = %err, "color backup is not a JSON object, ignoring it");
            Map::new()
        }
    }
}

/// Runs the toggle command against a store and keeps the indicator in sync.
///
/// `toggle` takes `&mut self`, so invocations on one engine never overlap.
#[derive(Debug)]
pub struct ToggleEngine<S> {
    store: S,
    indicator: StatusIndicator,
}

impl<S: SettingsStore> ToggleEngine<S> {
    /// Create the engine and detect the initial indicator state.
    pub fn new(store: S) -> Self {
        let mut engine = Self {
            store,
            indicator: StatusIndicator::default(),
        };
        if let Err(err) = engine.refresh() {
            warn!(error = %err, "could not detect initial squiggle state, assuming visible");
        }
        engine
    }

    /// Re-read the store and project its state onto the indicator.
    pub fn refresh(&mut self) -> Result<DisplayState> {
        let prefs = self.store.read_preferences()?;
        let overrides = self.store.read_overrides()?;
        let state = Targets::from_preferences(&prefs).display_state(&overrides);
        self.indicator.show(state);
        Ok(state)
    }

    /// Flip the targeted squiggles between transparent and their saved colors.
    ///
    /// The indicator only changes after the store accepted the write.
    pub fn toggle(&mut self) -> Result<Toggled> {
        let prefs = self.store.read_preferences()?;
        let current = self.store.read_overrides()?;
        let targets = Targets::from_preferences(&prefs);

        let (change, next) = plan(&current, &targets);
        debug!(?change, targets = ?targets.severities(), "computed squiggle transition");

        if change != Change::NothingTargeted {
            self.store.write_overrides(&next)?;
            info!(?change, "toggled squiggle visibility");
        }
        self.indicator.show(change.state());

        Ok(Toggled {
            change,
            show_message: prefs.show_status_message,
        })
    }

    /// Command entry point: toggle, then report through `notifier`.
    ///
    /// Errors are logged and shown as a generic failure; `None` is returned.
    pub fn invoke(&mut self, notifier: &mut impl Notifier) -> Option<Toggled> {
        match self.toggle() {
            Ok(toggled) => {
                if toggled.show_message {
                    notifier.transient(toggled.change.message(), STATUS_MESSAGE_TTL);
                }
                Some(toggled)
            }
            Err(err) => {
                error!(error = %err, "error toggling squiggle visibility");
                notifier.error(FAILURE_MESSAGE);
                None
            }
        }
    }

    pub fn indicator(&self) -> &StatusIndicator {
        &self.indicator
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{JsonSettingsStore, MemoryStore};
    use pretty_assertions::assert_eq;

    const ALL_KEYS: [&str; 9] = [
        "editorError.border",
        "editorError.background",
        "editorError.foreground",
        "editorWarning.border",
        "editorWarning.background",
        "editorWarning.foreground",
        "editorInfo.border",
        "editorInfo.background",
        "editorInfo.foreground",
    ];

    #[derive(Default)]
    struct Recorder {
        transient: Vec<(String, Duration)>,
        errors: Vec<String>,
    }

    impl Notifier for Recorder {
        fn transient(&mut self, message: &str, ttl: Duration) {
            self.transient.push((message.to_string(), ttl));
        }

        fn error(&mut self, message: &str) {
            self.errors.push(message.to_string());
        }
    }

    fn overrides(pairs: &[(&str, &str)]) -> ColorOverrides {
        pairs.iter().copied().collect()
    }

    fn engine(initial: ColorOverrides, prefs: Preferences) -> ToggleEngine<MemoryStore> {
        ToggleEngine::new(MemoryStore::new(initial, prefs))
    }

    fn all_transparent() -> ColorOverrides {
        ALL_KEYS.iter().map(|key| (*key, TRANSPARENT_COLOR)).collect()
    }

    #[test]
    fn empty_map_scenario() {
        let mut engine = engine(ColorOverrides::new(), Preferences::default());
        assert_eq!(engine.indicator().state(), DisplayState::Visible);

        let toggled = engine.toggle().unwrap();
        assert_eq!(toggled.change, Change::Hidden);
        assert_eq!(engine.indicator().state(), DisplayState::Hidden);

        let stored = &engine.store().overrides;
        assert_eq!(stored.len(), 10);
        for key in ALL_KEYS {
            assert_eq!(stored.get(key), Some(TRANSPARENT_COLOR));
        }
        assert_eq!(stored.get(BACKUP_KEY), Some("{}"));

        let toggled = engine.toggle().unwrap();
        assert_eq!(toggled.change, Change::Restored);
        assert_eq!(engine.store().overrides, ColorOverrides::new());
        assert_eq!(engine.indicator().state(), DisplayState::Visible);
        assert_eq!(engine.store().writes, 2);
    }

    #[test]
    fn round_trip_restores_touched_and_keeps_untouched_keys() {
        let mut original = overrides(&[
            ("editorError.border", "#ff0000"),
            ("editorWarning.foreground", "#ffaa00"),
            ("editorInfo.background", "#0000ff22"),
            ("editor.background", "#1e1e1e"),
        ]);
        original.set("statusBar.background", "#007acc");

        let mut engine = engine(original.clone(), Preferences::default());
        engine.toggle().unwrap();

        let hidden = &engine.store().overrides;
        assert_eq!(hidden.get("editor.background"), Some("#1e1e1e"));
        assert_eq!(hidden.get("statusBar.background"), Some("#007acc"));

        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn round_trip_keeps_nested_theme_scopes() {
        let raw = serde_json::json!({
            "[Default Dark+]": { "editorError.foreground": "#ff0000" },
            "editorError.foreground": "#ee0000"
        });
        let original: ColorOverrides = serde_json::from_value(raw).unwrap();

        let mut engine = engine(original.clone(), Preferences::default());
        engine.toggle().unwrap();
        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn detects_hidden_state_regardless_of_case() {
        let mut stored = all_transparent();
        stored.set("editorWarning.border", "#00000000".to_ascii_uppercase());
        let targets = Targets::from_preferences(&Preferences::default());
        assert_eq!(targets.display_state(&stored), DisplayState::Hidden);

        let engine = engine(stored, Preferences::default());
        assert_eq!(engine.indicator().state(), DisplayState::Hidden);
    }

    #[test]
    fn absent_key_is_not_transparent() {
        let mut stored = all_transparent();
        stored.remove("editorInfo.foreground");
        let targets = Targets::from_preferences(&Preferences::default());
        assert_eq!(targets.display_state(&stored), DisplayState::Visible);
    }

    #[test]
    fn selective_targeting_leaves_excluded_class_alone() {
        let prefs = Preferences {
            hide_warnings: false,
            ..Preferences::default()
        };
        let original = overrides(&[
            ("editorWarning.border", "#ffaa00"),
            ("editorWarning.background", "not-a-color"),
        ]);

        let mut engine = engine(original.clone(), prefs);
        engine.toggle().unwrap();
        let hidden = engine.store().overrides.clone();
        assert_eq!(hidden.get("editorWarning.border"), Some("#ffaa00"));
        assert_eq!(hidden.get("editorWarning.background"), Some("not-a-color"));
        assert!(!hidden.contains("editorWarning.foreground"));
        assert_eq!(hidden.get("editorError.border"), Some(TRANSPARENT_COLOR));
        assert_eq!(hidden.get("editorInfo.foreground"), Some(TRANSPARENT_COLOR));
        assert_eq!(engine.indicator().state(), DisplayState::Hidden);

        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn excluded_class_transparency_does_not_affect_detection() {
        let prefs = Preferences {
            hide_warnings: false,
            ..Preferences::default()
        };
        let mut stored = all_transparent();
        stored.set("editorWarning.border", "#ffaa00");

        let targets = Targets::from_preferences(&prefs);
        assert_eq!(targets.display_state(&stored), DisplayState::Hidden);
    }

    #[test]
    fn backup_fidelity() {
        let original = overrides(&[("editorError.border", "#ff0000")]);
        let mut engine = engine(original.clone(), Preferences::default());

        engine.toggle().unwrap();
        assert_eq!(
            engine.store().overrides.get(BACKUP_KEY),
            Some(r##"{"editorError.border":"#ff0000"}"##)
        );

        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn corrupt_backup_deletes_targeted_keys() {
        let mut stored = all_transparent();
        stored.set(BACKUP_KEY, "not json");
        stored.set("editor.background", "#1e1e1e");

        let mut engine = engine(stored, Preferences::default());
        let toggled = engine.toggle().unwrap();

        assert_eq!(toggled.change, Change::Restored);
        assert_eq!(engine.store().overrides, overrides(&[("editor.background", "#1e1e1e")]));
    }

    #[test]
    fn non_string_backup_counts_as_empty() {
        let mut raw = all_transparent().into_value();
        raw[BACKUP_KEY] = serde_json::json!({ "editorError.border": "#ff0000" });
        let stored: ColorOverrides = serde_json::from_value(raw).unwrap();

        let (change, next) = plan(&stored, &Targets::from_preferences(&Preferences::default()));
        assert_eq!(change, Change::Restored);
        assert!(next.is_empty());
    }

    #[test]
    fn partially_transparent_map_is_backed_up_as_is() {
        let original = overrides(&[("editorError.border", "#00000000"), ("editorInfo.border", "")]);
        let mut engine = engine(original.clone(), Preferences::default());

        engine.toggle().unwrap();
        assert_eq!(
            engine.store().overrides.get(BACKUP_KEY),
            Some(r##"{"editorError.border":"#00000000","editorInfo.border":""}"##)
        );

        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn empty_string_value_survives_round_trip() {
        let original = overrides(&[("editorError.border", "")]);
        let mut engine = engine(original.clone(), Preferences::default());

        engine.toggle().unwrap();
        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn non_string_target_values_survive_round_trip() {
        let raw = serde_json::json!({
            "editorError.border": 123,
            "editorWarning.background": null,
            "editorInfo.foreground": { "nested": true }
        });
        let original: ColorOverrides = serde_json::from_value(raw).unwrap();
        let mut engine = engine(original.clone(), Preferences::default());

        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides.get("editorError.border"), Some(TRANSPARENT_COLOR));

        engine.toggle().unwrap();
        assert_eq!(engine.store().overrides, original);
    }

    #[test]
    fn nothing_targeted_is_visible_and_writes_nothing() {
        let prefs = Preferences {
            hide_errors: false,
            hide_warnings: false,
            hide_info: false,
            show_status_message: true,
        };
        let mut engine = engine(all_transparent(), prefs);
        assert_eq!(engine.indicator().state(), DisplayState::Visible);

        let toggled = engine.toggle().unwrap();
        assert_eq!(toggled.change, Change::NothingTargeted);
        assert_eq!(engine.store().writes, 0);
        assert_eq!(engine.store().overrides, all_transparent());
        assert_eq!(engine.indicator().state(), DisplayState::Visible);
    }

    #[test]
    fn rereads_store_before_each_toggle() {
        let mut engine = engine(ColorOverrides::new(), Preferences::default());
        engine.toggle().unwrap();

        // Someone else restores a color behind our back.
        engine
            .store_mut()
            .overrides
            .set("editorError.border", "#ff0000");

        let toggled = engine.toggle().unwrap();
        assert_eq!(toggled.change, Change::Hidden);
        assert_eq!(
            engine.store().overrides.get("editorError.border"),
            Some(TRANSPARENT_COLOR)
        );
    }

    #[test]
    fn refresh_follows_external_changes() {
        let mut engine = engine(ColorOverrides::new(), Preferences::default());
        engine.store_mut().overrides = all_transparent();

        assert_eq!(engine.refresh().unwrap(), DisplayState::Hidden);
        assert_eq!(engine.indicator().text(), "Squiggles: ○");
    }

    #[test]
    fn invoke_sends_transient_message() {
        let mut engine = engine(ColorOverrides::new(), Preferences::default());
        let mut notes = Recorder::default();

        engine.invoke(&mut notes).unwrap();
        engine.invoke(&mut notes).unwrap();

        assert_eq!(
            notes.transient,
            vec![
                ("Selected squiggles are now transparent.".to_string(), STATUS_MESSAGE_TTL),
                ("Squiggles restored to previous visibility.".to_string(), STATUS_MESSAGE_TTL),
            ]
        );
        assert!(notes.errors.is_empty());
    }

    #[test]
    fn invoke_respects_message_preference() {
        let prefs = Preferences {
            show_status_message: false,
            ..Preferences::default()
        };
        let mut engine = engine(ColorOverrides::new(), prefs);
        let mut notes = Recorder::default();

        let toggled = engine.invoke(&mut notes).unwrap();
        assert_eq!(toggled.change, Change::Hidden);
        assert!(notes.transient.is_empty());
    }

    #[test]
    fn failed_write_leaves_state_untouched() {
        let original = overrides(&[("editorError.border", "#ff0000")]);
        let mut engine = engine(original.clone(), Preferences::default());
        engine.store_mut().fail_writes = true;
        let mut notes = Recorder::default();

        assert_eq!(engine.invoke(&mut notes), None);
        assert_eq!(notes.errors, vec![FAILURE_MESSAGE.to_string()]);
        assert!(notes.transient.is_empty());
        assert_eq!(engine.store().overrides, original);
        assert_eq!(engine.indicator().state(), DisplayState::Visible);

        // The next invocation works once the store recovers.
        engine.store_mut().fail_writes = false;
        assert_eq!(engine.invoke(&mut notes).map(|t| t.change), Some(Change::Hidden));
        assert_eq!(engine.indicator().state(), DisplayState::Hidden);
    }

    #[test]
    fn failed_read_is_reported_without_writing() {
        let original = overrides(&[("editorError.border", "#ff0000")]);
        let mut engine = engine(original.clone(), Preferences::default());
        engine.store_mut().fail_reads = true;
        let mut notes = Recorder::default();

        assert_eq!(engine.invoke(&mut notes), None);
        assert_eq!(notes.errors, vec![FAILURE_MESSAGE.to_string()]);
        assert_eq!(engine.store().writes, 0);
        assert_eq!(engine.store().overrides, original);
        assert_eq!(engine.indicator().state(), DisplayState::Visible);
    }

    #[test]
    fn settings_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r##"{
    "editor.fontSize": 14,
    "invisibleSquiggles.hideInfo": false,
    "workbench.colorCustomizations": {
        "editorError.border": "#ff0000",
        "editorInfo.border": "#0000ff"
    }
}
"##,
        )
        .unwrap();
        let before: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();

        let mut engine = ToggleEngine::new(JsonSettingsStore::new(&path));
        assert_eq!(engine.toggle().unwrap().change, Change::Hidden);

        let hidden = engine.store().read_overrides().unwrap();
        assert_eq!(hidden.get("editorError.border"), Some(TRANSPARENT_COLOR));
        assert_eq!(hidden.get("editorWarning.foreground"), Some(TRANSPARENT_COLOR));
        assert_eq!(hidden.get("editorInfo.border"), Some("#0000ff"));
        assert_eq!(engine.indicator().state(), DisplayState::Hidden);

        // A fresh engine sees the persisted state.
        let mut engine = ToggleEngine::new(JsonSettingsStore::new(&path));
        assert_eq!(engine.indicator().state(), DisplayState::Hidden);
        assert_eq!(engine.toggle().unwrap().change, Change::Restored);

        let after: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(after, before);
    }
}
