//! Wiring of one entity view: config, preferences, loading and refresh.

use std::sync::Arc;

use crate::config::RagdashConfig;
use crate::entities::{self, Entity};
use crate::error::Result;
use crate::preferences::PreferenceStore;
use crate::view::{CollectionSource, ControllerHandle, LoadOutcome, RefreshScheduler};

/// A dashboard page showing one entity collection.
pub struct EntityView<E: Entity, S: ?Sized> {
    handle: ControllerHandle<E, S>,
    scheduler: Option<RefreshScheduler>,
}

impl<E: Entity, S: ?Sized> EntityView<E, S> {
    /// Build the view from configuration and restore stored layout.
    ///
    /// Nothing is fetched until [`start`](Self::start).
    pub fn open(config: &RagdashConfig, preferences: &PreferenceStore, source: Arc<S>) -> Self {
        let mut controller = entities::controller::<E>(config.view.controller_options());
        if let Some(stored) = preferences.get(E::NAME) {
            controller.restore_preferences(stored);
        }
        let scheduler = config
            .refresh
            .enabled
            .then(|| RefreshScheduler::new(config.refresh.interval()));
        Self {
            handle: ControllerHandle::new(controller, source),
            scheduler,
        }
    }

    pub fn handle(&self) -> &ControllerHandle<E, S> {
        &self.handle
    }

    pub fn scheduler(&self) -> Option<&RefreshScheduler> {
        self.scheduler.as_ref()
    }

    /// Store the current layout under the entity's view name.
    pub fn save_preferences(&self, store: &mut PreferenceStore) -> bool {
        store.set(E::NAME, self.handle.with(|c| c.preferences()))
    }

    /// Stop refreshing and drop any late results.
    pub fn dispose(&mut self) {
        if let Some(scheduler) = &self.scheduler {
            scheduler.dispose();
        }
        self.handle.dispose();
    }
}

impl<E, S> EntityView<E, S>
where
    E: Entity,
    S: CollectionSource<E> + ?Sized + 'static,
{
    /// Initial load, then periodic refresh when enabled.
    ///
    /// The scheduler starts even when the first load fails, so the view
    /// recovers on its own once the backend is back.
    pub async fn start(&mut self) -> Result<LoadOutcome> {
        let outcome = self.handle.load().await;
        if let Some(scheduler) = &mut self.scheduler {
            scheduler.start(self.handle.clone());
        }
        outcome
    }
}

impl<E: Entity, S: ?Sized> Drop for EntityView<E, S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
