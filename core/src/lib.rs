//! Core crate for toggling diagnostic squiggles through editor color overrides.

pub mod config;
pub mod indicator;
pub mod overrides;
pub mod severity;
pub mod store;
pub mod toggle;

pub use config::{Config, Preferences};
pub use indicator::{DisplayState, StatusIndicator};
pub use overrides::ColorOverrides;
pub use severity::{Attribute, Severity, TRANSPARENT_COLOR};
pub use store::{JsonSettingsStore, MemoryStore, SettingsStore};
pub use toggle::{Change, Notifier, Targets, ToggleEngine, Toggled, STATUS_MESSAGE_TTL};

use std::path::PathBuf;
use thiserror::Error;

/// Common error type for the squiggles workspace.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {} as JSON: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The settings document parsed but does not have the expected shape.
    #[error("invalid settings in {}: {reason}", path.display())]
    InvalidSettings { path: PathBuf, reason: String },

    #[error("failed to parse config {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Raised by stores that cannot currently serve reads or writes.
    #[error("settings store unavailable: {0}")]
    Unavailable(String),
}

/// Convenient alias for results returned by the core crate.
pub type Result<T> = std::result::Result<T, Error>;
