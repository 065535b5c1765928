//! Persisted per-view layout preferences.
//!
//! Only layout survives a restart: the page size and sort of each view.
//! Search terms, filters and selections are session state and are never
//! written. Preferences live in a TOML file keyed by view name.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;
use crate::view::SortSpec;

const PREFERENCES_FILE: &str = "preferences.toml";

/// Stored layout of one view.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewPreferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PreferencesFile {
    #[serde(default)]
    views: BTreeMap<String, ViewPreferences>,
}

/// TOML-backed preference storage.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    file: PreferencesFile,
}

impl PreferenceStore {
    /// `<config dir>/ragdash/preferences.toml`, if the platform has a
    /// config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("ragdash").join(PREFERENCES_FILE))
    }

    /// Open the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let file = match fs::read_to_string(&path) {
            Ok(contents) => toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No preferences at {}, starting empty", path.display());
                PreferencesFile::default()
            }
            Err(error) => return Err(ConfigError::io(&path, error)),
        };
        Ok(Self { path, file })
    }

    /// Open the store, falling back to an empty one on unreadable files.
    ///
    /// Preferences are a convenience; a corrupt file must not block the
    /// dashboard from starting.
    pub fn load_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::load(&path) {
            Ok(store) => store,
            Err(error) => {
                log::warn!("Ignoring preferences: {}", error);
                Self {
                    path,
                    file: PreferencesFile::default(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, view: &str) -> Option<&ViewPreferences> {
        self.file.views.get(view)
    }

    /// Record preferences for `view`; returns whether anything changed.
    pub fn set(&mut self, view: impl Into<String>, preferences: ViewPreferences) -> bool {
        let view = view.into();
        if self.file.views.get(&view) == Some(&preferences) {
            return false;
        }
        self.file.views.insert(view, preferences);
        true
    }

    pub fn remove(&mut self, view: &str) -> bool {
        self.file.views.remove(view).is_some()
    }

    /// Write the store, creating parent directories as needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::io(parent, e))?;
        }
        let contents = toml::to_string_pretty(&self.file)?;
        fs::write(&self.path, contents).map_err(|e| ConfigError::io(&self.path, e))?;
        log::debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}
