//! Shared handle to a controller and its data source.
//!
//! A [`ControllerHandle`] lets the UI keep mutating the view while a load is
//! in flight: the controller lock is only held for synchronous state changes
//! and never across an `.await`.

use parking_lot::Mutex;
use std::sync::Arc;

use super::controller::{CollectionController, CollectionView, LoadOutcome, LoadTicket};
use super::field::Record;
use super::selection::BulkActionHandler;
use super::source::CollectionSource;
use super::stats::StatsSnapshot;
use crate::error::{FetchError, Result, ViewError};

pub struct ControllerHandle<R: Record, S: ?Sized> {
    inner: Arc<Mutex<CollectionController<R>>>,
    source: Arc<S>,
}

impl<R: Record, S: ?Sized> Clone for ControllerHandle<R, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            source: Arc::clone(&self.source),
        }
    }
}

/// Abandons the ticket if the load future is dropped before the fetch
/// resolves.
struct LoadGuard<'a, R: Record> {
    inner: &'a Mutex<CollectionController<R>>,
    ticket: LoadTicket,
    armed: bool,
}

impl<R: Record> LoadGuard<'_, R> {
    fn finish(mut self, result: std::result::Result<Vec<R>, FetchError>) -> Result<LoadOutcome> {
        self.armed = false;
        self.inner.lock().complete_load(self.ticket, result)
    }
}

impl<R: Record> Drop for LoadGuard<'_, R> {
    fn drop(&mut self) {
        if self.armed {
            self.inner.lock().abandon_load(self.ticket);
        }
    }
}

impl<R, S> ControllerHandle<R, S>
where
    R: Record,
    S: CollectionSource<R> + ?Sized,
{
    /// Fetch from the source and apply the result.
    ///
    /// Cancel-safe: dropping the returned future abandons the load, so the
    /// view stops reporting `loading`.
    pub async fn load(&self) -> Result<LoadOutcome> {
        let ticket = self.inner.lock().begin_load()?;
        let guard = LoadGuard {
            inner: &self.inner,
            ticket,
            armed: true,
        };
        let result = self.source.fetch_collection().await;
        guard.finish(result)
    }

    pub async fn retry(&self) -> Result<LoadOutcome> {
        self.load().await
    }
}

impl<R: Record, S: ?Sized> ControllerHandle<R, S> {
    pub fn new(controller: CollectionController<R>, source: Arc<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
            source,
        }
    }

    /// Run `f` against the controller under the lock.
    pub fn with<T>(&self, f: impl FnOnce(&mut CollectionController<R>) -> T) -> T {
        f(&mut self.inner.lock())
    }

    pub fn view(&self) -> CollectionView<R> {
        self.inner.lock().get_view()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.lock().get_stats().clone()
    }

    /// Dispatch the current selection to `handler` without holding the
    /// controller while the handler runs.
    ///
    /// Ids selected or deselected while the handler runs are left alone;
    /// only the dispatched ids are cleared on success.
    pub async fn dispatch_bulk_action<H>(&self, action: &str, handler: &H) -> Result<usize>
    where
        H: BulkActionHandler<R::Id> + ?Sized,
    {
        let ids = {
            let controller = self.inner.lock();
            if controller.is_disposed() {
                return Err(ViewError::Disposed);
            }
            controller.selection().selected_ids()
        };
        if ids.is_empty() {
            return Ok(0);
        }
        handler
            .handle(action, &ids)
            .await
            .map_err(|e| ViewError::bulk_action(action, e))?;
        self.inner.lock().selection_mut().complete_dispatch(&ids);
        Ok(ids.len())
    }

    pub fn dispose(&self) {
        self.inner.lock().dispose();
    }

    pub fn is_disposed(&self) -> bool {
        self.inner.lock().is_disposed()
    }

    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    pub(crate) fn begin_load(&self) -> Result<LoadTicket> {
        self.inner.lock().begin_load()
    }

    pub(crate) fn complete_load(
        &self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<R>, FetchError>,
    ) -> Result<LoadOutcome> {
        self.inner.lock().complete_load(ticket, result)
    }

    pub(crate) fn abandon_load(&self, ticket: LoadTicket) -> bool {
        self.inner.lock().abandon_load(ticket)
    }
}
