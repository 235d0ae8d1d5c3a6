use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

pub const KEY_THEME: &str = "theme";

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PrefsError {
    pub fn user_message(&self) -> String {
        match self {
            PrefsError::NoConfigDir => "Preferences are unavailable on this system".to_string(),
            PrefsError::Io(e) => format!("Could not save preferences: {}", e),
            PrefsError::Serialization(e) => format!("Preferences file is invalid: {}", e),
        }
    }
}

/// String-keyed store for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
    fn save(&self) -> Result<(), PrefsError>;
}

/// In-memory store; `save` is a no-op.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn save(&self) -> Result<(), PrefsError> {
        Ok(())
    }
}

/// Store persisted as a flat JSON object.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// `preferences.json` under the platform config directory.
    pub fn default_path() -> Result<PathBuf, PrefsError> {
        let dirs = directories::ProjectDirs::from("com", "catalog-explorer", "catalog-explorer")
            .ok_or(PrefsError::NoConfigDir)?;
        Ok(dirs.config_dir().join("preferences.json"))
    }

    /// Open the store. A missing file gives an empty store; an unreadable
    /// one is logged and ignored.
    pub fn open(path: &Path) -> Self {
        let entries = match std::fs::read(path) {
            Ok(bytes) => match serde_json::from_slice(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("ignoring corrupt preferences file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!("could not read preferences {}: {}", path.display(), e);
                BTreeMap::new()
            }
        };
        debug!("loaded {} preference entries", entries.len());
        Self {
            path: path.to_path_buf(),
            entries,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn save(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_vec_pretty(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Colour scheme. `Auto` currently resolves to dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    Dark,
    #[default]
    Auto,
}

impl Theme {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::Auto => "auto",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Auto,
            Self::Auto => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        !matches!(self, Self::Light)
    }

    pub fn from_store(store: &dyn PreferenceStore) -> Self {
        store
            .get(KEY_THEME)
            .and_then(|t| Self::parse(&t))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        assert_eq!(store.get("theme"), None);
        store.set("theme", "dark");
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
        store.remove("theme");
        assert_eq!(store.get("theme"), None);
        assert!(store.save().is_ok());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut store = JsonFileStore::open(&path);
        assert_eq!(store.get("sort"), None);
        store.set("sort", "rating");
        store.set("layout", "list");
        store.save().unwrap();

        let reopened = JsonFileStore::open(&path);
        assert_eq!(reopened.get("sort").as_deref(), Some("rating"));
        assert_eq!(reopened.get("layout").as_deref(), Some("list"));
        assert_eq!(reopened.path(), path.as_path());
    }

    #[test]
    fn test_corrupt_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, b"{not json").unwrap();
        let store = JsonFileStore::open(&path);
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_theme() {
        let mut store = MemoryStore::default();
        assert_eq!(Theme::from_store(&store), Theme::Auto);
        store.set(KEY_THEME, "light");
        assert_eq!(Theme::from_store(&store), Theme::Light);
        store.set(KEY_THEME, "sepia");
        assert_eq!(Theme::from_store(&store), Theme::Auto);
        assert_eq!(Theme::Light.next().next().next(), Theme::Light);
        assert!(Theme::Auto.is_dark());
        assert!(!Theme::Light.is_dark());
    }

    #[test]
    fn test_prefs_error_user_message() {
        let msg = PrefsError::NoConfigDir.user_message();
        assert!(msg.contains("unavailable"));
    }
}
