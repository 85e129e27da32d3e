//! Settings store abstractions.
//!
//! The editor owns its settings document; this crate only reads preferences
//! and reads/writes the color override object through [`SettingsStore`].

use crate::overrides::ColorOverrides;
use crate::{Error, Preferences, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Settings key holding the color override object.
pub const COLOR_CUSTOMIZATIONS_KEY: &str = "workbench.colorCustomizations";

const HIDE_ERRORS_KEY: &str = "invisibleSquiggles.hideErrors";
const HIDE_WARNINGS_KEY: &str = "invisibleSquiggles.hideWarnings";
const HIDE_INFO_KEY: &str = "invisibleSquiggles.hideInfo";
const SHOW_MESSAGE_KEY: &str = "invisibleSquiggles.showStatusBarMessage";

/// Port to the externally owned settings.
///
/// Every read must reflect the current persisted state; implementations do
/// not cache between calls.
pub trait SettingsStore {
    fn read_preferences(&self) -> Result<Preferences>;
    fn read_overrides(&self) -> Result<ColorOverrides>;
    /// Replace the whole override object in one update.
    fn write_overrides(&mut self, overrides: &ColorOverrides) -> Result<()>;
}

/// Store backed by an editor `settings.json` file.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole settings document. A missing or blank file is an empty object.
    fn read_document(&self) -> Result<Map<String, Value>> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "settings file missing, treating as empty");
                return Ok(Map::new());
            }
            Err(source) => {
                return Err(Error::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        let value: Value = serde_json::from_str(&contents).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Err(self.invalid("top-level value is not an object")),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<()> {
        let io_err = |source: std::io::Error| Error::Io {
            path: self.path.clone(),
            source,
        };

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut ser).map_err(|source| Error::Json {
            path: self.path.clone(),
            source,
        })?;
        buf.push(b'\n');

        // Replace the file a symlinked settings.json points at, not the link.
        let target = match fs::canonicalize(&self.path) {
            Ok(resolved) => resolved,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => self.path.clone(),
            Err(source) => return Err(io_err(source)),
        };
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let permissions = fs::metadata(&target).ok().map(|meta| meta.permissions());

        // Write beside the target and rename so readers never see a partial file.
        let mut tmp = target.clone().into_os_string();
        tmp.push(".squiggles-tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, &buf).map_err(io_err)?;
        let replaced = permissions
            .map_or(Ok(()), |permissions| fs::set_permissions(&tmp, permissions))
            .and_then(|()| fs::rename(&tmp, &target));
        replaced.map_err(|source| {
            let _ = fs::remove_file(&tmp);
            io_err(source)
        })
    }

    fn invalid(&self, reason: &str) -> Error {
        Error::InvalidSettings {
            path: self.path.clone(),
            reason: reason.to_string(),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn read_preferences(&self) -> Result<Preferences> {
        let document = self.read_document()?;
        let defaults = Preferences::default();
        let flag = |key: &str, default: bool| match document.get(key) {
            None | Some(Value::Null) => default,
            Some(Value::Bool(value)) => *value,
            Some(other) => {
                warn!(key, value = %other, "ignoring non-boolean preference");
                default
            }
        };

        Ok(Preferences {
            hide_errors: flag(HIDE_ERRORS_KEY, defaults.hide_errors),
            hide_warnings: flag(HIDE_WARNINGS_KEY, defaults.hide_warnings),
            hide_info: flag(HIDE_INFO_KEY, defaults.hide_info),
            show_status_message: flag(SHOW_MESSAGE_KEY, defaults.show_status_message),
        })
    }

    fn read_overrides(&self) -> Result<ColorOverrides> {
        let mut document = self.read_document()?;
        match document.remove(COLOR_CUSTOMIZATIONS_KEY) {
            None | Some(Value::Null) => Ok(ColorOverrides::new()),
            Some(Value::Object(map)) => Ok(map.into()),
            Some(_) => Err(self.invalid("`workbench.colorCustomizations` is not an object")),
        }
    }

    fn write_overrides(&mut self, overrides: &ColorOverrides) -> Result<()> {
        let mut document = self.read_document()?;
        document.insert(
            COLOR_CUSTOMIZATIONS_KEY.to_string(),
            overrides.clone().into_value(),
        );
        self.write_document(&document)?;
        info!(path = %self.path.display(), keys = overrides.len(), "wrote color customizations");
        Ok(())
    }
}

/// In-memory store for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub preferences: Preferences,
    pub overrides: ColorOverrides,
    /// When set, every read fails with [`Error::Unavailable`].
    pub fail_reads: bool,
    /// When set, every write fails with [`Error::Unavailable`].
    pub fail_writes: bool,
    /// Number of successful writes.
    pub writes: usize,
}

impl MemoryStore {
    pub fn new(overrides: ColorOverrides, preferences: Preferences) -> Self {
        Self {
            preferences,
            overrides,
            ..Self::default()
        }
    }

    fn check_reads(&self) -> Result<()> {
        if self.fail_reads {
            return Err(Error::Unavailable("reads disabled".into()));
        }
        Ok(())
    }
}

impl SettingsStore for MemoryStore {
    fn read_preferences(&self) -> Result<Preferences> {
        self.check_reads()?;
        Ok(self.preferences)
    }

    fn read_overrides(&self) -> Result<ColorOverrides> {
        self.check_reads()?;
        Ok(self.overrides.clone())
    }

    fn write_overrides(&mut self, overrides: &ColorOverrides) -> Result<()> {
        if self.fail_writes {
            return Err(Error::Unavailable("writes disabled".into()));
        }
        self.overrides = overrides.clone();
        self.writes += 1;
        Ok(())
    }
}
