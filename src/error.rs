//! Error types for collection views, configuration and preferences.
//!
//! Errors are values: nothing in the view layer panics or propagates past a
//! controller. The rendering layer only ever sees a [`FetchError`] in the
//! `error` field of a view; everything else is returned from the mutator that
//! caused it and leaves controller state untouched.

use std::path::PathBuf;
use thiserror::Error;

/// The remote collection could not be retrieved.
///
/// Cloneable so the controller can keep it in its view state while also
/// returning it to the caller of `load()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to fetch collection: {message}")]
pub struct FetchError {
    /// Human-readable description shown in the error banner.
    pub message: String,
    /// HTTP status reported by the data source, if any.
    pub status: Option<u16>,
}

impl FetchError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Client errors other than 408/429 are not transient.
    pub fn is_transient(&self) -> bool {
        match self.status {
            None => true,
            Some(408) | Some(429) => true,
            Some(code) => code >= 500,
        }
    }
}

/// Main error type for view controller operations
#[derive(Debug, Error)]
pub enum ViewError {
    /// Remote fetch failed; previous collection stays displayed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Field filter outside its declared domain
    #[error("invalid filter for `{key}`: {reason}")]
    InvalidFilterValue { key: String, reason: String },

    /// Sort key not declared sortable by the schema
    #[error("`{0}` is not a sortable field")]
    InvalidSortKey(String),

    /// Page size outside the configured options
    #[error("page size {0} is not one of the allowed options")]
    InvalidPageSize(usize),

    /// A load result arrived after a newer request or after disposal
    #[error("stale response #{sequence} discarded")]
    StaleResponseDiscarded { sequence: u64 },

    /// The bulk-action handler rejected the dispatch
    #[error("bulk action `{action}` failed: {source}")]
    BulkAction {
        action: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Operation on a disposed controller or scheduler
    #[error("view has been disposed")]
    Disposed,
}

impl ViewError {
    pub fn invalid_filter(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidFilterValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn bulk_action(action: impl Into<String>, source: anyhow::Error) -> Self {
        Self::BulkAction {
            action: action.into(),
            source: source.into(),
        }
    }

    /// Whether the controller can keep serving views after this error.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, ViewError::Disposed)
    }

    /// Whether the error belongs in front of the user.
    ///
    /// Stale responses and rejected mutator arguments are internal signals.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(self, ViewError::Fetch(_) | ViewError::BulkAction { .. })
    }
}

/// Result type alias using the view error type
pub type Result<T> = std::result::Result<T, ViewError>;

/// Configuration and preference file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for `{field}`: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the user can fix this by editing a file.
    #[must_use]
    pub fn is_user_fixable(&self) -> bool {
        matches!(self, ConfigError::Parse { .. } | ConfigError::Invalid { .. })
    }

    /// Config problems never stop the dashboard; defaults are used instead.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        true
    }

    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        self.is_user_fixable()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_transience() {
        assert!(FetchError::new("timeout").is_transient());
        assert!(FetchError::new("bad gateway").with_status(502).is_transient());
        assert!(FetchError::new("rate limited").with_status(429).is_transient());
        assert!(!FetchError::new("forbidden").with_status(403).is_transient());
    }

    #[test]
    fn test_fetch_error_display() {
        let err = FetchError::new("connection refused");
        assert_eq!(
            err.to_string(),
            "failed to fetch collection: connection refused"
        );
    }

    #[test]
    fn test_view_error_classification() {
        assert!(ViewError::from(FetchError::new("x")).is_user_visible());
        assert!(!ViewError::StaleResponseDiscarded { sequence: 3 }.is_user_visible());
        assert!(!ViewError::invalid_filter("status", "unknown").is_user_visible());
        assert!(!ViewError::Disposed.is_recoverable());
        assert!(ViewError::InvalidPageSize(7).is_recoverable());
    }

    #[test]
    fn test_bulk_action_error_keeps_source() {
        let err = ViewError::bulk_action("delete", anyhow::anyhow!("server said no"));
        assert_eq!(err.to_string(), "bulk action `delete` failed: server said no");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_config_error_fixability() {
        assert!(ConfigError::invalid("view.default_page_size", "must be listed").is_user_fixable());
        let io = ConfigError::io(
            "/nope",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!io.is_user_fixable());
    }
}
