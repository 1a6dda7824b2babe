//! Loading and saving settings files.
//!
//! Each run writes the full settings twice: to `workspace_latest.json`,
//! which the next run preloads, and to a `workspace_<timestamp>.json`
//! history file. History files are never pruned.

use super::Settings;
use crate::errors::SettingsError;
use crate::utils::{file_stamp, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// File the next run preloads.
pub const LATEST_FILE: &str = "workspace_latest.json";

/// Paths written by [`SettingsStore::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedSettings {
    /// The overwritten latest file.
    pub latest: PathBuf,
    /// The timestamped history file.
    pub snapshot: PathBuf,
}

impl SavedSettings {
    /// Both paths, latest first, in the order they are written.
    #[must_use]
    pub fn paths(&self) -> [&Path; 2] {
        [&self.latest, &self.snapshot]
    }
}

/// Reads and writes settings files in one directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    dir: PathBuf,
}

impl SettingsStore {
    /// Creates a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory files are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the latest settings file.
    #[must_use]
    pub fn latest_path(&self) -> PathBuf {
        self.dir.join(LATEST_FILE)
    }

    /// Path of the history file for a given time.
    #[must_use]
    pub fn snapshot_path(&self, at: &Timestamp) -> PathBuf {
        self.dir.join(format!("workspace_{}.json", file_stamp(at)))
    }

    /// Reads a settings file. Keys missing from the file take defaults, and
    /// so does any key whose value cannot be read as that field's type.
    ///
    /// Fails only when the file cannot be read or is not a JSON object.
    pub fn load(path: &Path) -> Result<Settings, SettingsError> {
        let text = fs::read_to_string(path)?;
        let saved: Map<String, Value> = serde_json::from_str(&text)?;
        merge_fields(saved)
    }

    /// Reads a settings file, falling back to defaults when it is missing,
    /// unreadable or malformed.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Settings {
        match Self::load(path) {
            Ok(settings) => {
                debug!(path = %path.display(), "Loaded previous settings");
                settings
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Using default settings");
                Settings::default()
            }
        }
    }

    /// Loads the settings a run starts from: `explicit` when it names an
    /// existing file, otherwise the latest file in this store.
    #[must_use]
    pub fn load_previous(&self, explicit: Option<&Path>) -> Settings {
        let path = explicit
            .filter(|path| path.exists())
            .map_or_else(|| self.latest_path(), Path::to_path_buf);
        Self::load_or_default(&path)
    }

    /// Writes `settings` to the latest file and to a history file stamped
    /// with `at`.
    pub fn save(&self, settings: &Settings, at: &Timestamp) -> Result<SavedSettings, SettingsError> {
        fs::create_dir_all(&self.dir)?;

        let saved = SavedSettings {
            latest: self.latest_path(),
            snapshot: self.snapshot_path(at),
        };
        write_json(&saved.latest, settings)?;
        write_json(&saved.snapshot, settings)?;

        info!(
            latest = %saved.latest.display(),
            snapshot = %saved.snapshot.display(),
            "Settings saved"
        );
        Ok(saved)
    }
}

fn merge_fields(saved: Map<String, Value>) -> Result<Settings, SettingsError> {
    let mut merged = match serde_json::to_value(Settings::default())? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    for (key, value) in saved {
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value);
        match serde_json::from_value::<Settings>(Value::Object(candidate.clone())) {
            Ok(_) => merged = candidate,
            Err(e) => warn!(key = %key, error = %e, "Ignoring saved setting"),
        }
    }

    Ok(serde_json::from_value(Value::Object(merged))?)
}

fn write_json(path: &Path, settings: &Settings) -> Result<(), SettingsError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    settings.serialize(&mut serializer)?;
    fs::write(path, buf)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::complete_settings;
    use chrono::{Local, TimeZone};
    use pretty_assertions::assert_eq;

    fn at() -> Timestamp {
        Local.with_ymd_and_hms(2024, 5, 17, 8, 4, 2).unwrap()
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let settings = complete_settings();

        let saved = store.save(&settings, &at()).unwrap();

        assert_eq!(SettingsStore::load(&saved.latest).unwrap(), settings);
        assert_eq!(SettingsStore::load(&saved.snapshot).unwrap(), settings);
    }

    #[test]
    fn test_save_writes_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        let saved = store.save(&complete_settings(), &at()).unwrap();

        assert_eq!(saved.latest, dir.path().join("workspace_latest.json"));
        assert_eq!(saved.snapshot, dir.path().join("workspace_20240517_080402.json"));
        assert!(saved.latest.exists());
        assert!(saved.snapshot.exists());
        assert_eq!(
            saved.paths(),
            [saved.latest.as_path(), saved.snapshot.as_path()]
        );
    }

    #[test]
    fn test_history_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let later = Local.with_ymd_and_hms(2024, 5, 18, 9, 0, 0).unwrap();

        store.save(&complete_settings(), &at()).unwrap();
        store.save(&Settings::default(), &later).unwrap();

        let count = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(count, 3);
        assert_eq!(SettingsStore::load(&store.latest_path()).unwrap(), Settings::default());
    }

    #[test]
    fn test_one_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let saved = store.save(&complete_settings(), &at()).unwrap();

        let text = fs::read_to_string(saved.latest).unwrap();
        assert!(text.starts_with("{\n \"License\": \"lic-0001\""));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        assert_eq!(store.load_previous(None), Settings::default());
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        assert!(SettingsStore::load(&path).is_err());
        assert_eq!(SettingsStore::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_bad_field_keeps_the_other_saved_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        fs::write(
            &path,
            r#"{"Project_ID": "P3", "Extract_radius": "12.5", "Email": "a@b.org", "Pize_A": "0.83"}"#,
        )
        .unwrap();

        let loaded = SettingsStore::load_or_default(&path);
        assert_eq!(loaded.project_id, "P3");
        assert_eq!(loaded.email, "a@b.org");
        assert_eq!(loaded.psize_a, Some(0.83));
        assert_eq!(loaded.extract_radius, Settings::default().extract_radius);
    }

    #[test]
    fn test_non_object_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("list.json");
        fs::write(&path, "[1, 2]").unwrap();

        assert!(SettingsStore::load(&path).is_err());
        assert_eq!(SettingsStore::load_or_default(&path), Settings::default());
    }

    #[test]
    fn test_explicit_file_wins_over_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save(&Settings::default(), &at()).unwrap();

        let explicit = dir.path().join("mine.json");
        fs::write(&explicit, r#"{"Project_ID": "P44", "Compute_num_cpus": "4"}"#).unwrap();

        let loaded = store.load_previous(Some(&explicit));
        assert_eq!(loaded.project_id, "P44");
        assert_eq!(loaded.compute_num_cpus, 4);
    }

    #[test]
    fn test_nonexistent_explicit_file_uses_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save(&complete_settings(), &at()).unwrap();

        let loaded = store.load_previous(Some(&dir.path().join("nope.json")));
        assert_eq!(loaded, complete_settings());
    }
}
