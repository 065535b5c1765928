//! View layer of the ragdash administration dashboard.
//!
//! The core is a generic tabular view controller: it takes a collection
//! fetched from the backend and derives a filtered, sorted, paginated and
//! selectable view with aggregate stats, optionally refreshed in the
//! background. Users, roles, sessions, document chunks and assistant
//! interactions are all shown through it.
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ragdash::{config, dashboard::EntityView, entities::User, preferences::PreferenceStore};
//!
//! let config = config::load_config();
//! let prefs = PreferenceStore::load_or_default(config.preferences.resolved_path().unwrap());
//! let mut users = EntityView::<User, _>::open(&config, &prefs, Arc::new(api.users()));
//! users.start().await?;
//! users.handle().with(|view| view.set_search_term("ayşe"));
//! ```

pub mod config;
pub mod dashboard;
pub mod entities;
pub mod error;
pub mod observability;
pub mod preferences;
pub mod testkit;
pub mod view;

pub use crate::config::{load_config, RagdashConfig};
pub use crate::dashboard::EntityView;
pub use crate::entities::Entity;
pub use crate::error::{ConfigError, FetchError, Result, ViewError};
pub use crate::preferences::{PreferenceStore, ViewPreferences};
pub use crate::view::{
    BulkActionHandler, CheckState, CollectionController, CollectionSource, CollectionView,
    ControllerHandle, EntitySchema, FieldFilter, FieldKind, FieldSpec, FieldValue, LoadOutcome,
    Record, RefreshScheduler, SortOrder, SortSpec, StatsSnapshot, StatsSpec,
};
