//! # Settings Store
//!
//! Typed key/value settings persisted as a flat TOML table.
//!
//! ## Persistence
//!
//! ```text
//! data_dir/
//! ├── settings.toml          primary
//! └── settings_backup.toml   written first on every save
//! ```
//!
//! A save that dies halfway leaves at least one intact copy. [`Settings::load`]
//! prefers the primary and falls back to the backup when the primary is
//! missing or corrupt.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tempo_shared::constants::{SETTINGS_BACKUP_FILE_NAME, SETTINGS_FILE_NAME};

use crate::error::{MockError, MockResult};

/// A single stored value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// Boolean flag.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl From<bool> for SettingValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for SettingValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for SettingValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for SettingValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for SettingValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for SettingValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

#[derive(Debug)]
struct State {
    data_dir: PathBuf,
    values: BTreeMap<String, SettingValue>,
    defaults: HashMap<String, SettingValue>,
    modified: bool,
    loaded: bool,
    autosave: bool,
}

/// Thread-safe settings store.
#[derive(Debug)]
pub struct Settings {
    state: Mutex<State>,
}

impl Settings {
    /// Creates an empty store persisting into `data_dir`. Nothing is read
    /// until [`load`](Self::load).
    #[must_use]
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Mutex::new(State {
                data_dir: data_dir.into(),
                values: BTreeMap::new(),
                defaults: HashMap::new(),
                modified: false,
                loaded: false,
                autosave: true,
            }),
        }
    }

    /// Path of the primary settings file.
    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.state.lock().data_dir.join(SETTINGS_FILE_NAME)
    }

    /// Path of the backup settings file.
    #[must_use]
    pub fn backup_file(&self) -> PathBuf {
        self.state.lock().data_dir.join(SETTINGS_BACKUP_FILE_NAME)
    }

    /// Enables or disables [`autosave`](Self::autosave).
    pub fn set_autosave(&self, enabled: bool) {
        self.state.lock().autosave = enabled;
    }

    /// Registers fallback values returned when a key has no stored value.
    pub fn defaults<K, V>(&self, defaults: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<SettingValue>,
    {
        let mut state = self.state.lock();
        for (key, value) in defaults {
            state.defaults.insert(key.into(), value.into());
        }
    }

    /// Returns `true` if a value (not a default) is stored under `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.state.lock().values.contains_key(key)
    }

    /// Stored value, falling back to the registered default.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<SettingValue> {
        let state = self.state.lock();
        state
            .values
            .get(key)
            .or_else(|| state.defaults.get(key))
            .cloned()
    }

    /// Boolean value or `default` if absent or of another type.
    #[must_use]
    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(SettingValue::Bool(value)) => value,
            _ => default,
        }
    }

    /// Integer value or `default` if absent or of another type.
    #[must_use]
    pub fn get_int(&self, key: &str, default: i64) -> i64 {
        match self.get(key) {
            Some(SettingValue::Int(value)) => value,
            _ => default,
        }
    }

    /// Float value or `default`. Integers are widened.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn get_float(&self, key: &str, default: f64) -> f64 {
        match self.get(key) {
            Some(SettingValue::Float(value)) => value,
            Some(SettingValue::Int(value)) => value as f64,
            _ => default,
        }
    }

    /// Text value or `default` if absent or of another type.
    #[must_use]
    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(SettingValue::Text(value)) => value,
            _ => default.to_string(),
        }
    }

    /// Stores a value and marks the store modified.
    pub fn put(&self, key: impl Into<String>, value: impl Into<SettingValue>) {
        let mut state = self.state.lock();
        state.values.insert(key.into(), value.into());
        state.modified = true;
    }

    /// Removes a stored value, returning it.
    pub fn remove(&self, key: &str) -> Option<SettingValue> {
        let mut state = self.state.lock();
        let removed = state.values.remove(key);
        if removed.is_some() {
            state.modified = true;
        }
        removed
    }

    /// Stored keys in sorted order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.state.lock().values.keys().cloned().collect()
    }

    /// Removes every stored value. Defaults are kept.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        if !state.values.is_empty() {
            state.values.clear();
            state.modified = true;
        }
    }

    /// Returns `true` if values changed since the last load or save.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.state.lock().modified
    }

    /// Returns `true` once [`load`](Self::load) has run.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.state.lock().loaded
    }

    /// Reads persisted values, replacing the stored ones.
    ///
    /// Falls back to the backup when the primary file is missing or corrupt.
    /// Does nothing when neither exists. The store counts as loaded
    /// afterwards even if both files are corrupt, so the next save replaces
    /// them.
    ///
    /// # Errors
    ///
    /// [`MockError::SettingsParse`] when no readable copy exists,
    /// [`MockError::Io`] when a file exists but cannot be read.
    pub fn load(&self) -> MockResult<()> {
        let mut state = self.state.lock();
        state.loaded = true;

        let primary = state.data_dir.join(SETTINGS_FILE_NAME);
        let backup = state.data_dir.join(SETTINGS_BACKUP_FILE_NAME);

        let values = match read_values(&primary) {
            Ok(Some(values)) => values,
            Ok(None) => match read_values(&backup)? {
                Some(values) => {
                    tracing::warn!(path = %backup.display(), "settings file missing, restored from backup");
                    values
                }
                None => return Ok(()),
            },
            Err(err) => {
                tracing::warn!(error = %err, "settings file unreadable, trying backup");
                match read_values(&backup) {
                    Ok(Some(values)) => values,
                    Ok(None) => return Err(err),
                    Err(backup_err) => return Err(backup_err),
                }
            }
        };

        tracing::debug!(count = values.len(), "settings loaded");
        state.values = values;
        state.modified = false;
        Ok(())
    }

    /// Writes every stored value: the backup first, then the primary.
    ///
    /// Does nothing if [`load`](Self::load) never ran, so a store that was
    /// never read cannot clobber existing files.
    ///
    /// # Errors
    ///
    /// [`MockError::SettingsEncode`] or [`MockError::Io`].
    pub fn force_save(&self) -> MockResult<()> {
        let mut state = self.state.lock();
        if !state.loaded {
            return Ok(());
        }

        let text = toml::to_string(&state.values)?;
        fs::create_dir_all(&state.data_dir).map_err(|err| MockError::io(&state.data_dir, err))?;
        for name in [SETTINGS_BACKUP_FILE_NAME, SETTINGS_FILE_NAME] {
            let path = state.data_dir.join(name);
            fs::write(&path, &text).map_err(|err| MockError::io(path, err))?;
        }

        state.modified = false;
        Ok(())
    }

    /// Saves if values were modified and autosave is enabled.
    ///
    /// Returns whether a save happened.
    ///
    /// # Errors
    ///
    /// As [`force_save`](Self::force_save).
    pub fn autosave(&self) -> MockResult<bool> {
        {
            let state = self.state.lock();
            if !(state.modified && state.autosave && state.loaded) {
                return Ok(false);
            }
        }
        self.force_save()?;
        Ok(true)
    }
}

fn read_values(path: &Path) -> MockResult<Option<BTreeMap<String, SettingValue>>> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(MockError::io(path, err)),
    };
    toml::from_str(&text)
        .map(Some)
        .map_err(|source| MockError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_access_and_defaults() {
        let settings = Settings::new("unused");
        settings.defaults([("volume", SettingValue::from(0.5)), ("name", "anon".into())]);
        settings.put("fullscreen", true);
        settings.put("level", 7);

        assert!(settings.get_bool("fullscreen", false));
        assert_eq!(settings.get_int("level", 0), 7);
        assert!((settings.get_float("level", 0.0) - 7.0).abs() < f64::EPSILON);
        assert!((settings.get_float("volume", 1.0) - 0.5).abs() < f64::EPSILON);
        assert_eq!(settings.get_string("name", ""), "anon");

        // Wrong type falls back to the caller's default.
        assert_eq!(settings.get_int("fullscreen", -1), -1);

        assert!(settings.has("level"));
        assert!(!settings.has("volume"));
        assert_eq!(settings.keys(), vec!["fullscreen", "level"]);
        assert!(settings.is_modified());
    }

    #[test]
    fn test_remove_and_clear() {
        let settings = Settings::new("unused");
        settings.put("a", 1);
        settings.put("b", 2);

        assert_eq!(settings.remove("a"), Some(SettingValue::Int(1)));
        assert_eq!(settings.remove("a"), None);
        settings.clear();
        assert!(settings.keys().is_empty());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();

        let settings = Settings::new(dir.path());
        settings.load().unwrap();
        settings.put("name", "relay");
        settings.put("port", 6567);
        settings.put("ratio", 1.5);
        settings.put("public", false);
        settings.force_save().unwrap();
        assert!(!settings.is_modified());
        assert!(settings.settings_file().exists());
        assert!(settings.backup_file().exists());

        let reloaded = Settings::new(dir.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_string("name", ""), "relay");
        assert_eq!(reloaded.get_int("port", 0), 6567);
        assert!((reloaded.get_float("ratio", 0.0) - 1.5).abs() < f64::EPSILON);
        assert!(!reloaded.get_bool("public", true));
    }

    #[test]
    fn test_corrupt_primary_falls_back_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path());
        settings.load().unwrap();
        settings.put("kept", 42);
        settings.force_save().unwrap();

        fs::write(settings.settings_file(), "this is [not toml").unwrap();

        let reloaded = Settings::new(dir.path());
        reloaded.load().unwrap();
        assert_eq!(reloaded.get_int("kept", 0), 42);
    }

    #[test]
    fn test_both_corrupt_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path());
        fs::write(settings.settings_file(), "[[[").unwrap();
        fs::write(settings.backup_file(), "[[[").unwrap();

        let err = settings.load().unwrap_err();
        assert!(matches!(err, MockError::SettingsParse { .. }));
        assert!(settings.is_loaded());
    }

    #[test]
    fn test_save_before_load_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path().join("data"));
        settings.put("x", 1);

        settings.force_save().unwrap();
        assert!(!settings.settings_file().exists());
        assert!(!settings.autosave().unwrap());
    }

    #[test]
    fn test_autosave_only_when_modified_and_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::new(dir.path());
        settings.load().unwrap();

        assert!(!settings.autosave().unwrap());

        settings.put("x", 1);
        settings.set_autosave(false);
        assert!(!settings.autosave().unwrap());

        settings.set_autosave(true);
        assert!(settings.autosave().unwrap());
        assert!(!settings.is_modified());
        assert!(settings.settings_file().exists());
    }
}
