//! Dashboard configuration.
//!
//! Configuration is read from `.ragdash.toml`, searched for in the current
//! directory and its ancestors. Every section is optional and missing values
//! fall back to defaults, so an empty file (or none at all) is a valid
//! configuration.
//!
//! ```toml
//! [view]
//! default_page_size = 20
//! page_size_options = [10, 20, 50]
//! locale = "tr"
//!
//! [refresh]
//! enabled = true
//! interval_secs = 30
//!
//! [preferences]
//! path = "/home/me/.config/ragdash/preferences.toml"
//! ```

mod loader;

pub use loader::{
    directory_ancestors, find_config, load_config, load_config_from, parse_and_validate_config,
};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::preferences::PreferenceStore;
use crate::view::pagination::{DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use crate::view::refresh::DEFAULT_REFRESH_INTERVAL;
use crate::view::{ControllerOptions, Locale};

/// Name of the configuration file searched for.
pub const CONFIG_FILE_NAME: &str = ".ragdash.toml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagdashConfig {
    pub view: ViewConfig,
    pub refresh: RefreshConfig,
    pub preferences: PreferencesConfig,
}

impl RagdashConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.view.validate()?;
        self.refresh.validate()
    }
}

/// Defaults applied to every collection view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    pub default_page_size: usize,
    pub page_size_options: Vec<usize>,
    /// BCP 47 tag used for text comparison ("en", "tr", ...)
    pub locale: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            locale: "en".to_string(),
        }
    }
}

impl ViewConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size_options.is_empty() {
            return Err(ConfigError::invalid(
                "view.page_size_options",
                "at least one page size is required",
            ));
        }
        if self.page_size_options.contains(&0) {
            return Err(ConfigError::invalid(
                "view.page_size_options",
                "page sizes must be positive",
            ));
        }
        if !self.page_size_options.contains(&self.default_page_size) {
            return Err(ConfigError::invalid(
                "view.default_page_size",
                format!(
                    "{} is not one of {:?}",
                    self.default_page_size, self.page_size_options
                ),
            ));
        }
        Ok(())
    }

    pub fn locale(&self) -> Locale {
        Locale::from_tag(&self.locale)
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            page_size_options: self.page_size_options.clone(),
            default_page_size: self.default_page_size,
            locale: self.locale(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: DEFAULT_REFRESH_INTERVAL.as_secs(),
        }
    }
}

impl RefreshConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_secs == 0 {
            return Err(ConfigError::invalid(
                "refresh.interval_secs",
                "interval must be at least one second",
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferencesConfig {
    /// Overrides the platform config directory location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl PreferencesConfig {
    pub fn resolved_path(&self) -> Option<PathBuf> {
        self.path.clone().or_else(PreferenceStore::default_path)
    }
}
