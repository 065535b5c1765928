//! Tabular collection views.
//!
//! A [`CollectionController`] takes a raw collection fetched from a
//! [`CollectionSource`] and derives a filtered, sorted and paginated view,
//! aggregate stats and a selection. Entities describe themselves to the
//! controller through an [`EntitySchema`]; the same controller serves every
//! entity type.
//!
//! - `field`, `schema`: the record abstraction and its declared fields
//! - `filter`, `sort`, `pagination`, `collation`: pure derivation steps
//! - `stats`, `selection`: consumers of the derived view
//! - `controller`, `handle`, `refresh`: state ownership and loading

pub mod collation;
pub mod controller;
pub mod field;
pub mod filter;
pub mod handle;
pub mod pagination;
pub mod refresh;
pub mod schema;
pub mod selection;
pub mod sort;
pub mod source;
pub mod stats;
pub mod view_state;

pub use collation::{Collator, Locale};
pub use controller::{
    CollectionController, CollectionView, ControllerOptions, LoadOutcome, LoadTicket,
};
pub use field::{FieldKind, FieldValue, Record};
pub use filter::FieldFilter;
pub use handle::ControllerHandle;
pub use refresh::{RefreshScheduler, RefreshState, RefreshStats};
pub use schema::{CompareFn, EntitySchema, FieldSpec};
pub use selection::{BulkActionHandler, CheckState, SelectionManager};
pub use sort::{SortOrder, SortSpec};
pub use source::{CollectionSource, StaticSource};
pub use stats::{StatsSnapshot, StatsSpec};
pub use view_state::ViewState;
