//! Configuration models and loaders.
//!
//! Two kinds of settings live here:
//! - [`Preferences`]: which squiggles to hide, read from the editor's own
//!   `settings.json` on every toggle (see [`crate::store`]).
//! - [`Config`]: how the tool itself finds that file and logs, read from TOML.

use crate::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable overriding [`Config::settings_path`].
pub const SETTINGS_ENV: &str = "SQUIGGLES_SETTINGS";

const APP_DIR: &str = "squiggles";
const CONFIG_FILENAME: &str = "config.toml";

/// Per-class hide flags plus the transient message switch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Preferences {
    pub hide_errors: bool,
    pub hide_warnings: bool,
    pub hide_info: bool,
    /// Show a short-lived message after each toggle.
    pub show_status_message: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            hide_errors: true,
            hide_warnings: true,
            hide_info: true,
            show_status_message: true,
        }
    }
}

impl Preferences {
    pub fn hides(&self, severity: crate::Severity) -> bool {
        match severity {
            crate::Severity::Error => self.hide_errors,
            crate::Severity::Warning => self.hide_warnings,
            crate::Severity::Info => self.hide_info,
        }
    }
}

/// Configuration for the squiggles binaries.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// Editor `settings.json` to rewrite. Falls back to the VS Code user settings.
    pub settings_path: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_filter: Option<String>,
}

impl Config {
    /// Default location: `<config dir>/squiggles/config.toml`.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILENAME))
    }

    /// Load from an explicit path, or from [`Config::default_path`] when it exists.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        match explicit {
            Some(path) => load_config(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => load_config(path),
                _ => {
                    debug!("no config file found, using defaults");
                    Ok(Config::default())
                }
            },
        }
    }

    /// Resolve the settings file, honoring `flag` first, then
    /// [`SETTINGS_ENV`], then the config file, then the VS Code default.
    pub fn resolve_settings_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        let from_env = std::env::var_os(SETTINGS_ENV).map(PathBuf::from);
        self.resolve_settings_path_with(flag, from_env)
    }

    fn resolve_settings_path_with(
        &self,
        flag: Option<&Path>,
        from_env: Option<PathBuf>,
    ) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or(from_env)
            .or_else(|| self.settings_path.clone())
            .or_else(default_settings_path)
    }

    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or("warn")
    }
}

/// `<config dir>/Code/User/settings.json`.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("Code").join("User").join("settings.json"))
}

/// Load configuration from the provided path.
///
/// Expected TOML keys:
/// - `settings_path` as a path string
/// - `log_filter` as a `tracing` filter directive
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&contents).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded config");
    Ok(config)
}
