//! Selection of item identifiers across pages.
//!
//! The selection is independent of pagination: moving between pages never
//! changes it. Only identifiers present in the current full collection can
//! be selected; the controller refreshes the known set after every load and
//! selections of vanished items are pruned.

use async_trait::async_trait;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

use crate::error::{Result, ViewError};

/// Tri-state of a page-level "select all" checkbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    Indeterminate,
    Checked,
}

/// External collaborator performing a bulk action on selected ids.
#[async_trait]
pub trait BulkActionHandler<Id: Send + Sync>: Send + Sync {
    async fn handle(&self, action: &str, ids: &[Id]) -> anyhow::Result<()>;
}

/// Tracks selected identifiers for one controller.
#[derive(Debug, Clone)]
pub struct SelectionManager<Id: Clone + Eq + Hash> {
    selected: im::HashSet<Id>,
    /// Position of every known id in the full collection
    known: HashMap<Id, usize>,
}

impl<Id: Clone + Eq + Hash> Default for SelectionManager<Id> {
    fn default() -> Self {
        Self {
            selected: im::HashSet::new(),
            known: HashMap::new(),
        }
    }
}

impl<Id: Clone + Eq + Hash> SelectionManager<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the known ids (in collection order) and prune the selection.
    ///
    /// Returns the number of selected ids dropped.
    pub fn set_known(&mut self, ids: impl IntoIterator<Item = Id>) -> usize {
        self.known = ids
            .into_iter()
            .enumerate()
            .map(|(position, id)| (id, position))
            .collect();
        let before = self.selected.len();
        let known = &self.known;
        self.selected.retain(|id| known.contains_key(id));
        before - self.selected.len()
    }

    pub fn is_known(&self, id: &Id) -> bool {
        self.known.contains_key(id)
    }

    /// Flip membership. Unknown ids are ignored.
    ///
    /// Returns whether the id is selected afterwards.
    pub fn toggle(&mut self, id: &Id) -> bool {
        if !self.is_known(id) {
            return false;
        }
        if self.selected.remove(id).is_some() {
            false
        } else {
            self.selected.insert(id.clone());
            true
        }
    }

    /// Select every visible id; returns how many were newly selected.
    pub fn select_all_visible(&mut self, visible: &[Id]) -> usize {
        let mut added = 0;
        for id in visible.iter().filter(|id| self.known.contains_key(*id)) {
            if self.selected.insert(id.clone()).is_none() {
                added += 1;
            }
        }
        added
    }

    /// Deselect every visible id; returns how many were removed.
    pub fn deselect_all_visible(&mut self, visible: &[Id]) -> usize {
        visible
            .iter()
            .filter(|id| self.selected.remove(*id).is_some())
            .count()
    }

    pub fn clear(&mut self) {
        self.selected = im::HashSet::new();
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// True iff every visible id is selected.
    ///
    /// An empty page is never "all selected": it agrees with
    /// [`check_state`](Self::check_state), which reports such a page as
    /// unchecked, so the page checkbox cannot show a tick over no rows.
    pub fn is_all_visible_selected(&self, visible: &[Id]) -> bool {
        !visible.is_empty() && visible.iter().all(|id| self.selected.contains(id))
    }

    pub fn check_state(&self, visible: &[Id]) -> CheckState {
        let count = visible
            .iter()
            .filter(|id| self.selected.contains(*id))
            .count();
        match count {
            0 => CheckState::Unchecked,
            n if n == visible.len() => CheckState::Checked,
            _ => CheckState::Indeterminate,
        }
    }

    /// Selected ids in collection order.
    pub fn selected_ids(&self) -> Vec<Id> {
        let mut ids: Vec<(usize, Id)> = self
            .selected
            .iter()
            .map(|id| (self.known.get(id).copied().unwrap_or(usize::MAX), id.clone()))
            .collect();
        ids.sort_by_key(|(position, _)| *position);
        ids.into_iter().map(|(_, id)| id).collect()
    }

    /// Remove ids after a successful dispatch.
    pub(crate) fn complete_dispatch(&mut self, dispatched: &[Id]) {
        for id in dispatched {
            self.selected.remove(id);
        }
    }
}

impl<Id: Clone + Eq + Hash + Send + Sync> SelectionManager<Id> {
    /// Hand the selection to `handler`; clear it once the handler succeeds.
    ///
    /// An empty selection dispatches nothing and returns `Ok(0)`. On failure
    /// the selection is kept so the user can retry.
    pub async fn dispatch_bulk_action<H>(&mut self, action: &str, handler: &H) -> Result<usize>
    where
        H: BulkActionHandler<Id> + ?Sized,
    {
        let ids = self.selected_ids();
        if ids.is_empty() {
            return Ok(0);
        }
        handler
            .handle(action, &ids)
            .await
            .map_err(|e| ViewError::bulk_action(action, e))?;
        debug!(action, count = ids.len(), "bulk action dispatched");
        self.complete_dispatch(&ids);
        Ok(ids.len())
    }
}
