//! Persisted UI preferences.
//!
//! Only the active tab is stored, under [`ACTIVE_TAB_KEY`]. Reads never fail
//! the caller and write failures are logged and ignored.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use thiserror::Error;
use tracing::{debug, warn};

use coffee_compass_core::MainTab;

/// Key the active tab is stored under.
pub const ACTIVE_TAB_KEY: &str = "coffeeapp.activeTab";

/// Errors from a preference backend.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("Preference file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Small string key/value store.
pub trait PreferenceStore: Send + Sync {
    /// Read a value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError>;

    /// Write a value.
    ///
    /// # Errors
    ///
    /// Returns an error when the backend cannot be written.
    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError>;
}

/// Preferences kept as a JSON object in one file.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FilePreferences {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, PreferenceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = match self.read_all() {
            Ok(values) => values,
            Err(PreferenceError::Json(e)) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Replacing unreadable preference file"
                );
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_vec_pretty(&values)?)?;
        Ok(())
    }
}

/// Preferences that live only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with one stored value.
    #[must_use]
    pub fn with_value(key: &str, value: &str) -> Self {
        let prefs = Self::default();
        prefs
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        prefs
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Result<Option<String>, PreferenceError> {
        Ok(self
            .values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Restore the active tab; anything missing, unreadable or invalid is `Map`.
///
/// `Scan` is not a resting tab (selecting it starts the ordering flow), so it
/// is restored as `Map` too.
#[must_use]
pub fn load_active_tab(store: &dyn PreferenceStore) -> MainTab {
    match store.get(ACTIVE_TAB_KEY) {
        Ok(Some(value)) => match value.parse() {
            Ok(MainTab::Scan) => MainTab::default(),
            Ok(tab) => tab,
            Err(e) => {
                debug!(error = %e, "Ignoring stored tab");
                MainTab::default()
            }
        },
        Ok(None) => MainTab::default(),
        Err(e) => {
            warn!(error = %e, "Failed to read preferences");
            MainTab::default()
        }
    }
}

/// Persist the active tab, logging failures.
pub fn save_active_tab(store: &dyn PreferenceStore, tab: MainTab) {
    if let Err(e) = store.set(ACTIVE_TAB_KEY, &tab.to_string()) {
        warn!(error = %e, %tab, "Failed to save active tab");
    }
}
