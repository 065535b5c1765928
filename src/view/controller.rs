//! Collection controller: the authoritative view of a remote collection.
//!
//! The controller owns the raw collection, the [`ViewState`] and the
//! selection. Every mutator recomputes the derived view (visible indices and
//! stats) only when the parameters actually changed, so reads are plain
//! field accesses and repeated calls with the same value are free.
//!
//! Loading is split into [`begin_load`](CollectionController::begin_load) and
//! [`complete_load`](CollectionController::complete_load). Each load gets a
//! sequence number; only the most recently issued load may apply its result,
//! so a slow response can never overwrite a newer one.

use serde::Serialize;
use tracing::{debug, trace, warn};

use super::collation::{Collator, Locale};
use super::field::Record;
use super::filter::{self, FieldFilter};
use super::pagination::{self, DEFAULT_PAGE_SIZE, DEFAULT_PAGE_SIZE_OPTIONS};
use super::schema::EntitySchema;
use super::selection::{BulkActionHandler, CheckState, SelectionManager};
use super::sort::{self, SortOrder, SortSpec};
use super::source::CollectionSource;
use super::stats::{self, StatsSnapshot, StatsSpec};
use super::view_state::ViewState;
use crate::error::{FetchError, Result, ViewError};
use crate::preferences::ViewPreferences;

/// Construction parameters shared by every controller of an application.
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerOptions {
    pub page_size_options: Vec<usize>,
    pub default_page_size: usize,
    pub locale: Locale,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            default_page_size: DEFAULT_PAGE_SIZE,
            locale: Locale::Default,
        }
    }
}

/// Handle for one issued load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    sequence: u64,
}

impl LoadTicket {
    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetched collection replaced the previous one
    Applied { item_count: usize },
    /// A newer load was issued, the load was abandoned, or the controller
    /// was disposed; state is untouched
    Discarded { sequence: u64 },
}

/// What the rendering layer draws.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionView<R> {
    /// Items of the current page
    pub items: Vec<R>,
    pub total_count: usize,
    pub filtered_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub loading: bool,
    #[serde(skip)]
    pub error: Option<FetchError>,
}

/// Filtered, sorted, paginated and selectable view over a remote collection.
pub struct CollectionController<R: Record> {
    schema: EntitySchema,
    stats_spec: StatsSpec<R>,
    collator: Collator,
    page_size_options: Vec<usize>,
    collection: im::Vector<R>,
    state: ViewState,
    selection: SelectionManager<R::Id>,
    /// Filtered and sorted indices into `collection`
    visible: Vec<usize>,
    stats: StatsSnapshot,
    revision: u64,
    next_sequence: u64,
    pending: Option<u64>,
    has_loaded: bool,
    error: Option<FetchError>,
    disposed: bool,
}

impl<R: Record> CollectionController<R> {
    pub fn new(schema: EntitySchema) -> Self {
        Self::with_options(schema, ControllerOptions::default())
    }

    pub fn with_options(schema: EntitySchema, options: ControllerOptions) -> Self {
        let mut page_size_options = options.page_size_options;
        page_size_options.retain(|&size| size > 0);
        page_size_options.sort_unstable();
        page_size_options.dedup();
        if page_size_options.is_empty() {
            page_size_options = DEFAULT_PAGE_SIZE_OPTIONS.to_vec();
        }
        let page_size = if page_size_options.contains(&options.default_page_size) {
            options.default_page_size
        } else {
            page_size_options[0]
        };

        let mut controller = Self {
            schema,
            stats_spec: StatsSpec::default(),
            collator: Collator::new(options.locale),
            page_size_options,
            collection: im::Vector::new(),
            state: ViewState::with_page_size(page_size),
            selection: SelectionManager::new(),
            visible: Vec::new(),
            stats: StatsSnapshot::default(),
            revision: 0,
            next_sequence: 0,
            pending: None,
            has_loaded: false,
            error: None,
            disposed: false,
        };
        controller.recompute();
        controller
    }

    /// Replace the stats configuration.
    pub fn with_stats(mut self, spec: StatsSpec<R>) -> Self {
        self.stats_spec = spec;
        self.recompute();
        self
    }

    // ------------------------------------------------------------------
    // Loading
    // ------------------------------------------------------------------

    /// Issue a new load; any load issued earlier becomes stale.
    pub fn begin_load(&mut self) -> Result<LoadTicket> {
        if self.disposed {
            return Err(ViewError::Disposed);
        }
        self.next_sequence += 1;
        let ticket = LoadTicket {
            sequence: self.next_sequence,
        };
        if let Some(previous) = self.pending.replace(ticket.sequence) {
            trace!(entity = self.schema.entity(), previous, "superseding pending load");
        }
        debug!(
            entity = self.schema.entity(),
            sequence = ticket.sequence,
            "load issued"
        );
        Ok(ticket)
    }

    fn check_ticket(&self, ticket: LoadTicket) -> Result<()> {
        if self.disposed {
            return Err(ViewError::Disposed);
        }
        if self.pending != Some(ticket.sequence) {
            return Err(ViewError::StaleResponseDiscarded {
                sequence: ticket.sequence,
            });
        }
        Ok(())
    }

    /// Apply the result of a load issued with `ticket`.
    ///
    /// Success replaces the collection underneath the current view state.
    /// Failure keeps the previous collection and records the error. Results
    /// for superseded or abandoned tickets are dropped.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: std::result::Result<Vec<R>, FetchError>,
    ) -> Result<LoadOutcome> {
        if let Err(reason) = self.check_ticket(ticket) {
            debug!(
                entity = self.schema.entity(),
                sequence = ticket.sequence,
                %reason,
                "load result dropped"
            );
            return Ok(LoadOutcome::Discarded {
                sequence: ticket.sequence,
            });
        }
        self.pending = None;

        match result {
            Ok(items) => {
                self.collection = items.into_iter().collect();
                self.has_loaded = true;
                self.error = None;
                let pruned = self
                    .selection
                    .set_known(self.collection.iter().map(R::id));
                self.recompute();
                debug!(
                    entity = self.schema.entity(),
                    sequence = ticket.sequence,
                    items = self.collection.len(),
                    filtered = self.visible.len(),
                    pruned,
                    "collection applied"
                );
                Ok(LoadOutcome::Applied {
                    item_count: self.collection.len(),
                })
            }
            Err(error) => {
                warn!(
                    entity = self.schema.entity(),
                    sequence = ticket.sequence,
                    first_load = !self.has_loaded,
                    %error,
                    "collection fetch failed"
                );
                self.error = Some(error.clone());
                Err(ViewError::Fetch(error))
            }
        }
    }

    /// Give up on a load; a late result for it will be dropped.
    ///
    /// Returns whether the ticket was the pending one.
    pub fn abandon_load(&mut self, ticket: LoadTicket) -> bool {
        if self.pending == Some(ticket.sequence) {
            self.pending = None;
            debug!(
                entity = self.schema.entity(),
                sequence = ticket.sequence,
                "load abandoned"
            );
            true
        } else {
            false
        }
    }

    /// Fetch the full collection from `source` and apply it.
    pub async fn load<S>(&mut self, source: &S) -> Result<LoadOutcome>
    where
        S: CollectionSource<R> + ?Sized,
    {
        let ticket = self.begin_load()?;
        let result = source.fetch_collection().await;
        self.complete_load(ticket, result)
    }

    /// The retry action of the error banner.
    pub async fn retry<S>(&mut self, source: &S) -> Result<LoadOutcome>
    where
        S: CollectionSource<R> + ?Sized,
    {
        self.load(source).await
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    /// Tear the controller down. Later load results are dropped.
    pub fn dispose(&mut self) {
        if !self.disposed {
            debug!(entity = self.schema.entity(), "controller disposed");
        }
        self.disposed = true;
        self.pending = None;
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_loaded(&self) -> bool {
        self.has_loaded
    }

    // ------------------------------------------------------------------
    // View state mutators
    // ------------------------------------------------------------------

    /// Set the free-text search term. Resets to page 1 when it changes.
    pub fn set_search_term(&mut self, term: impl Into<String>) -> bool {
        if !self.state.set_search_term(term.into()) {
            return false;
        }
        self.state.reset_page();
        self.recompute();
        true
    }

    /// Set a field filter after checking it against the schema.
    ///
    /// Invalid filters are rejected and leave the view untouched.
    pub fn set_field_filter(
        &mut self,
        key: impl Into<String>,
        filter: FieldFilter,
    ) -> Result<bool> {
        let key = key.into();
        if let Err(error) = self.schema.validate_filter(&key, &filter) {
            debug!(entity = self.schema.entity(), %error, "filter rejected");
            return Err(error);
        }
        if !self.state.set_field_filter(key, filter) {
            return Ok(false);
        }
        self.state.reset_page();
        self.recompute();
        Ok(true)
    }

    pub fn clear_field_filter(&mut self, key: &str) -> bool {
        if !self.state.remove_field_filter(key) {
            return false;
        }
        self.state.reset_page();
        self.recompute();
        true
    }

    /// Reset search and field filters. Sort and selection are kept.
    pub fn clear_filters(&mut self) -> bool {
        let changed = self.state.clear_filters();
        let moved = self.state.page() != 1;
        self.state.reset_page();
        if changed {
            self.recompute();
        }
        changed || moved
    }

    /// Sort on a sortable field. Resets to page 1 when it changes.
    pub fn set_sort(&mut self, key: impl Into<String>, order: SortOrder) -> Result<bool> {
        let key = key.into();
        self.schema.validate_sort_key(&key)?;
        if !self.state.set_sort(Some(SortSpec::new(key, order))) {
            return Ok(false);
        }
        self.state.reset_page();
        self.recompute();
        Ok(true)
    }

    /// Back to collection order.
    pub fn clear_sort(&mut self) -> bool {
        if !self.state.set_sort(None) {
            return false;
        }
        self.state.reset_page();
        self.recompute();
        true
    }

    /// Go to page `page`, clamped to the available pages. Returns the page
    /// actually shown.
    pub fn set_page(&mut self, page: usize) -> usize {
        if self.state.set_page(page, self.visible.len()) {
            self.revision += 1;
        }
        self.state.page()
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.state.page() + 1)
    }

    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.state.page().saturating_sub(1))
    }

    /// Change the page size, keeping the first visible item on screen.
    pub fn set_page_size(&mut self, page_size: usize) -> Result<bool> {
        if !self.page_size_options.contains(&page_size) {
            return Err(ViewError::InvalidPageSize(page_size));
        }
        if !self.state.set_page_size(page_size, self.visible.len()) {
            return Ok(false);
        }
        self.revision += 1;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------

    /// Current page plus counts, loading flag and error.
    pub fn get_view(&self) -> CollectionView<R> {
        let range = self.page_range();
        CollectionView {
            items: self.visible[range]
                .iter()
                .filter_map(|&idx| self.collection.get(idx).cloned())
                .collect(),
            total_count: self.collection.len(),
            filtered_count: self.visible.len(),
            page: self.state.page(),
            page_size: self.state.page_size(),
            total_pages: pagination::total_pages(self.visible.len(), self.state.page_size()),
            loading: self.is_loading(),
            error: self.error.clone(),
        }
    }

    /// Aggregates over the filtered collection.
    pub fn get_stats(&self) -> &StatsSnapshot {
        &self.stats
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    pub fn page_size_options(&self) -> &[usize] {
        &self.page_size_options
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// Bumped every time the derived view changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// All filtered items in display order.
    pub fn filtered_items(&self) -> impl Iterator<Item = &R> {
        self.visible
            .iter()
            .filter_map(|&idx| self.collection.get(idx))
    }

    /// Ids of the items on the current page.
    pub fn visible_ids(&self) -> Vec<R::Id> {
        self.visible[self.page_range()]
            .iter()
            .filter_map(|&idx| self.collection.get(idx).map(R::id))
            .collect()
    }

    fn page_range(&self) -> std::ops::Range<usize> {
        pagination::page_range(
            self.state.page(),
            self.state.page_size(),
            self.visible.len(),
        )
    }

    // ------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------

    pub fn selection(&self) -> &SelectionManager<R::Id> {
        &self.selection
    }

    pub fn toggle_selection(&mut self, id: &R::Id) -> bool {
        self.selection.toggle(id)
    }

    pub fn select_all_visible(&mut self) -> usize {
        let visible = self.visible_ids();
        self.selection.select_all_visible(&visible)
    }

    pub fn deselect_all_visible(&mut self) -> usize {
        let visible = self.visible_ids();
        self.selection.deselect_all_visible(&visible)
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_all_visible_selected(&self) -> bool {
        self.selection.is_all_visible_selected(&self.visible_ids())
    }

    /// State of the page-level "select all" checkbox.
    pub fn page_check_state(&self) -> CheckState {
        self.selection.check_state(&self.visible_ids())
    }

    pub async fn dispatch_bulk_action<H>(&mut self, action: &str, handler: &H) -> Result<usize>
    where
        H: BulkActionHandler<R::Id> + ?Sized,
    {
        self.selection.dispatch_bulk_action(action, handler).await
    }

    pub(crate) fn selection_mut(&mut self) -> &mut SelectionManager<R::Id> {
        &mut self.selection
    }

    // ------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------

    /// Layout preferences worth persisting for this view.
    pub fn preferences(&self) -> ViewPreferences {
        ViewPreferences {
            page_size: Some(self.state.page_size()),
            sort: self.state.sort().cloned(),
        }
    }

    /// Apply stored preferences; entries that no longer fit the schema or
    /// the page size options are skipped.
    pub fn restore_preferences(&mut self, preferences: &ViewPreferences) {
        if let Some(size) = preferences.page_size {
            if let Err(error) = self.set_page_size(size) {
                debug!(entity = self.schema.entity(), %error, "stored page size ignored");
            }
        }
        if let Some(spec) = &preferences.sort {
            if let Err(error) = self.set_sort(spec.key.clone(), spec.order) {
                debug!(entity = self.schema.entity(), %error, "stored sort ignored");
            }
        }
    }

    // ------------------------------------------------------------------
    // Derivation
    // ------------------------------------------------------------------

    fn recompute(&mut self) {
        let folded = self.collator.fold_case(self.state.search_term());
        let mut visible: Vec<usize> = self
            .collection
            .iter()
            .enumerate()
            .filter(|(_, item)| {
                filter::passes(
                    *item,
                    &self.schema,
                    &folded,
                    self.state.field_filters(),
                    &self.collator,
                )
            })
            .map(|(idx, _)| idx)
            .collect();

        if let Some(spec) = self.state.sort() {
            sort::sort_indices(
                &mut visible,
                &self.collection,
                spec,
                &self.schema,
                &self.collator,
            );
        }

        self.stats = stats::compute_stats(
            visible.iter().filter_map(|&idx| self.collection.get(idx)),
            &self.stats_spec,
            &self.schema,
            &self.collator,
        );
        self.visible = visible;
        self.state.clamp_page(self.visible.len());
        self.revision += 1;
        trace!(
            entity = self.schema.entity(),
            revision = self.revision,
            filtered = self.visible.len(),
            "view recomputed"
        );
    }
}
