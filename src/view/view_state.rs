//! Search, filter, sort and page parameters of one collection view.
//!
//! Setters report whether anything changed so the controller can skip
//! recomputing the derived view when a mutator is called with the current
//! value.

use std::collections::BTreeMap;

use super::filter::FieldFilter;
use super::pagination::{self, DEFAULT_PAGE_SIZE};
use super::sort::SortSpec;

/// View parameters owned by a single controller.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    search_term: String,
    field_filters: BTreeMap<String, FieldFilter>,
    sort: Option<SortSpec>,
    page: usize,
    page_size: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl ViewState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            search_term: String::new(),
            field_filters: BTreeMap::new(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn field_filters(&self) -> &BTreeMap<String, FieldFilter> {
        &self.field_filters
    }

    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// True when neither a search term nor a field filter is active.
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.is_empty() && self.field_filters.is_empty()
    }

    pub(crate) fn set_search_term(&mut self, term: String) -> bool {
        if self.search_term == term {
            return false;
        }
        self.search_term = term;
        true
    }

    pub(crate) fn set_field_filter(&mut self, key: String, filter: FieldFilter) -> bool {
        if self.field_filters.get(&key) == Some(&filter) {
            return false;
        }
        self.field_filters.insert(key, filter);
        true
    }

    pub(crate) fn remove_field_filter(&mut self, key: &str) -> bool {
        self.field_filters.remove(key).is_some()
    }

    pub(crate) fn clear_filters(&mut self) -> bool {
        let changed = !self.is_unfiltered();
        self.search_term.clear();
        self.field_filters.clear();
        changed
    }

    pub(crate) fn set_sort(&mut self, sort: Option<SortSpec>) -> bool {
        if self.sort == sort {
            return false;
        }
        self.sort = sort;
        true
    }

    pub(crate) fn reset_page(&mut self) {
        self.page = 1;
    }

    /// Set the page, clamped to the pages available for `filtered` items.
    pub(crate) fn set_page(&mut self, page: usize, filtered: usize) -> bool {
        let clamped = pagination::clamp_page(page, filtered, self.page_size);
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    /// Change the page size, keeping the first visible item on screen.
    pub(crate) fn set_page_size(&mut self, page_size: usize, filtered: usize) -> bool {
        if page_size == self.page_size || page_size == 0 {
            return false;
        }
        let first_visible = (self.page - 1) * self.page_size;
        self.page_size = page_size;
        self.page = pagination::clamp_page(
            pagination::page_containing(first_visible, page_size),
            filtered,
            page_size,
        );
        true
    }

    pub(crate) fn clamp_page(&mut self, filtered: usize) {
        self.page = pagination::clamp_page(self.page, filtered, self.page_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::sort::SortOrder;

    #[test]
    fn test_default_state() {
        let state = ViewState::default();
        assert_eq!(state.page(), 1);
        assert_eq!(state.page_size(), DEFAULT_PAGE_SIZE);
        assert!(state.is_unfiltered());
        assert!(state.sort().is_none());
    }

    #[test]
    fn test_setters_report_changes() {
        let mut state = ViewState::default();
        assert!(state.set_search_term("abc".into()));
        assert!(!state.set_search_term("abc".into()));
        assert!(state.set_field_filter("status".into(), FieldFilter::equals("active")));
        assert!(!state.set_field_filter("status".into(), FieldFilter::equals("active")));
        assert!(state.set_sort(Some(SortSpec::new("name", SortOrder::Ascending))));
        assert!(!state.set_sort(Some(SortSpec::new("name", SortOrder::Ascending))));
    }

    #[test]
    fn test_set_page_clamps() {
        let mut state = ViewState::default();
        state.set_page(9, 25);
        assert_eq!(state.page(), 3);
        state.set_page(0, 25);
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_page_size_keeps_first_visible_item() {
        let mut state = ViewState::with_page_size(10);
        state.set_page(3, 95);
        // first visible item is #20; with 5 per page it sits on page 5
        assert!(state.set_page_size(5, 95));
        assert_eq!(state.page(), 5);
        // with 50 per page item #20 is on page 1
        assert!(state.set_page_size(50, 95));
        assert_eq!(state.page(), 1);
    }

    #[test]
    fn test_clear_filters_keeps_sort() {
        let mut state = ViewState::default();
        state.set_search_term("x".into());
        state.set_sort(Some(SortSpec::new("name", SortOrder::Descending)));
        assert!(state.clear_filters());
        assert!(state.is_unfiltered());
        assert!(state.sort().is_some());
        assert!(!state.clear_filters());
    }
}
