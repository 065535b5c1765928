//! Record types of the dashboard's collection views.
//!
//! Each entity pairs a serde record (as returned by the backend API) with the
//! schema and stats its view uses. [`JsonRecord`] covers payloads the
//! dashboard only displays and never models, such as evaluation results.

pub mod chunk;
pub mod interaction;
pub mod json;
pub mod role;
pub mod session;
pub mod user;

pub use chunk::{Chunk, EmbeddingStatus};
pub use interaction::{Feedback, Interaction};
pub use json::JsonRecord;
pub use role::Role;
pub use session::{Session, SessionStatus};
pub use user::{User, UserRole};

use crate::view::{CollectionController, ControllerOptions, EntitySchema, Record, StatsSpec};

/// A record type with a dedicated dashboard view.
pub trait Entity: Record {
    /// View name, also the key of stored preferences
    const NAME: &'static str;

    fn schema() -> EntitySchema;

    fn stats_spec() -> StatsSpec<Self> {
        StatsSpec::new()
    }
}

/// A controller configured with the entity's schema and stats.
pub fn controller<E: Entity>(options: ControllerOptions) -> CollectionController<E> {
    CollectionController::with_options(E::schema(), options).with_stats(E::stats_spec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_schema_consistent<E: Entity>() {
        let schema = E::schema();
        assert_eq!(schema.entity(), E::NAME);
        assert!(schema.searchable().next().is_some(), "{} has no searchable field", E::NAME);
        for spec in schema.fields().iter().filter(|spec| spec.sortable) {
            assert!(schema.validate_sort_key(&spec.key).is_ok());
        }
    }

    #[test]
    fn test_every_entity_schema_is_consistent() {
        assert_schema_consistent::<User>();
        assert_schema_consistent::<Role>();
        assert_schema_consistent::<Session>();
        assert_schema_consistent::<Chunk>();
        assert_schema_consistent::<Interaction>();
    }

    #[test]
    fn test_controller_uses_entity_stats() {
        let controller = controller::<User>(ControllerOptions::default());
        assert_eq!(controller.schema().entity(), "users");
        assert!(controller.get_stats().distribution("role").is_some());
    }
}
