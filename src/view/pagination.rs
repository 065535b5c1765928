//! Page arithmetic for collection views.
//!
//! All functions are pure. Pages are 1-based; an empty collection still has
//! one (empty) page.

use std::ops::Range;

/// Page sizes offered by default.
pub const DEFAULT_PAGE_SIZE_OPTIONS: [usize; 5] = [5, 10, 20, 50, 100];

/// Page size used when nothing else is configured.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Total number of pages: `max(1, ceil(filtered / page_size))`.
pub fn total_pages(filtered: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    filtered.div_ceil(page_size).max(1)
}

/// Clamps a page number into `[1, total_pages]` (pure).
pub fn clamp_page(page: usize, filtered: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(filtered, page_size))
}

/// Index range of the items visible on `page` (pure).
pub fn page_range(page: usize, page_size: usize, filtered: usize) -> Range<usize> {
    let start = page.saturating_sub(1).saturating_mul(page_size).min(filtered);
    let end = start.saturating_add(page_size).min(filtered);
    start..end
}

/// Page on which the item at `index` appears.
pub fn page_containing(index: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 1;
    }
    index / page_size + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_empty() {
        assert_eq!(total_pages(0, 10), 1);
    }

    #[test]
    fn test_total_pages_partial_page() {
        assert_eq!(total_pages(25, 10), 3);
        assert_eq!(total_pages(30, 10), 3);
        assert_eq!(total_pages(31, 10), 4);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 25, 10), 1);
        assert_eq!(clamp_page(3, 25, 10), 3);
        assert_eq!(clamp_page(7, 25, 10), 3);
        assert_eq!(clamp_page(3, 3, 10), 1);
    }

    #[test]
    fn test_page_range() {
        assert_eq!(page_range(1, 10, 25), 0..10);
        assert_eq!(page_range(3, 10, 25), 20..25);
        assert_eq!(page_range(4, 10, 25), 25..25);
        assert_eq!(page_range(1, 10, 0), 0..0);
    }

    #[test]
    fn test_page_containing() {
        assert_eq!(page_containing(0, 10), 1);
        assert_eq!(page_containing(9, 10), 1);
        assert_eq!(page_containing(10, 10), 2);
        assert_eq!(page_containing(20, 20), 2);
    }
}
