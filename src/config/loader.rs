use std::fs;
use std::path::{Path, PathBuf};

use super::{RagdashConfig, RefreshConfig, ViewConfig, CONFIG_FILE_NAME};
use crate::error::ConfigError;

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Parse a config file and repair invalid sections.
///
/// Syntax errors are returned. A section that parses but fails validation is
/// replaced by its defaults with a warning.
pub fn parse_and_validate_config(
    path: &Path,
    contents: &str,
) -> Result<RagdashConfig, ConfigError> {
    let mut config: RagdashConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Err(e) = config.view.validate() {
        log::warn!("{}: {}. Using default view settings.", path.display(), e);
        config.view = ViewConfig::default();
    }
    if let Err(e) = config.refresh.validate() {
        log::warn!("{}: {}. Using default refresh settings.", path.display(), e);
        config.refresh = RefreshConfig::default();
    }

    Ok(config)
}

/// Load the config at an explicit path. Unlike [`load_config`], a missing
/// file is an error.
pub fn load_config_from(path: &Path) -> Result<RagdashConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    let config = parse_and_validate_config(path, &contents)?;
    log::debug!("Loaded config from {}", path.display());
    Ok(config)
}

fn try_load_config_from_path(config_path: &Path) -> Option<RagdashConfig> {
    match load_config_from(config_path) {
        Ok(config) => Some(config),
        Err(ConfigError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            None
        }
        Err(e) => {
            log::warn!("{}. Using defaults.", e);
            None
        }
    }
}

/// `start` followed by up to `max_depth - 1` of its ancestors.
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for the config file.
pub fn find_config(start: PathBuf) -> RagdashConfig {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_config_from_path(&path))
        .unwrap_or_else(|| {
            log::debug!(
                "No {} found after checking {} directories. Using default config.",
                CONFIG_FILE_NAME,
                MAX_TRAVERSAL_DEPTH
            );
            RagdashConfig::default()
        })
}

/// Load the config for the current directory, or defaults.
pub fn load_config() -> RagdashConfig {
    match std::env::current_dir() {
        Ok(dir) => find_config(dir),
        Err(e) => {
            log::warn!(
                "Failed to get current directory: {}. Using default config.",
                e
            );
            RagdashConfig::default()
        }
    }
}
