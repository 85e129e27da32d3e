//! The persisted `workbench.colorCustomizations` object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Reserved key holding the colors that existed before squiggles were hidden.
pub const BACKUP_KEY: &str = "invisibleSquiggles.originalColors";

/// Theme color overrides keyed by theme attribute identifier.
///
/// Values stay raw JSON so entries this crate does not own (including
/// theme-scoped nested objects) pass through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorOverrides(Map<String, Value>);

impl ColorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// String value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Raw JSON stored under `key`, whatever its type.
    pub fn get_raw(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), Value::String(value.into()));
    }

    pub fn insert_raw(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for ColorOverrides {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ColorOverrides {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut overrides = Self::new();
        for (key, value) in iter {
            overrides.set(key, value);
        }
        overrides
    }
}
