//! Page arithmetic shared by the state machine, the fetchers and the view.
//!
//! Page numbers are 1-based everywhere. An empty result set still has one
//! (empty) page so that "page 1 of 1" is always a valid position.

use std::ops::{Range, RangeInclusive};

/// Number of pages needed to show `total_items`, never less than 1
pub fn page_count(total_items: u64, page_size: u32) -> u32 {
    if total_items == 0 || page_size == 0 {
        1
    } else {
        let pages = total_items.div_ceil(page_size as u64);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }
}

/// Clamp a requested page into `[1, page_count]`
pub fn clamp_page(page: u32, total_items: u64, page_size: u32) -> u32 {
    page.clamp(1, page_count(total_items, page_size))
}

/// Zero-based slice of the full list covered by `page`
pub fn item_range(page: u32, page_size: u32, total_items: u64) -> Range<usize> {
    let total = usize::try_from(total_items).unwrap_or(usize::MAX);
    let start = (page.max(1) as usize - 1)
        .saturating_mul(page_size as usize)
        .min(total);
    let end = start.saturating_add(page_size as usize).min(total);
    start..end
}

/// How many items a page should hold: `min(size, total - size * (page - 1))`, floored at 0
pub fn expected_len(page: u32, page_size: u32, total_items: u64) -> usize {
    item_range(page, page_size, total_items).len()
}

/// Window of at most `max_pages_shown` page numbers centred on `current`
pub fn page_window(current: u32, max_page: u32, max_pages_shown: u32) -> RangeInclusive<u32> {
    let max_page = max_page.max(1);
    let shown = max_pages_shown.clamp(1, max_page);
    let current = current.clamp(1, max_page);
    let half = shown / 2;

    let mut start = current.saturating_sub(half).max(1);
    let end = start.saturating_add(shown - 1).min(max_page);
    // Shift left when the window ran into the last page
    start = end.saturating_sub(shown - 1).max(1);
    start..=end
}

/// Interpret "go to page" text input. Non-numeric input yields `None`.
pub fn parse_page_input(text: &str, max_page: u32) -> Option<u32> {
    let requested: i64 = text.trim().parse().ok()?;
    let clamped = requested.clamp(1, max_page.max(1) as i64);
    u32::try_from(clamped).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(0, 5), 1);
        assert_eq!(page_count(1, 5), 1);
        assert_eq!(page_count(5, 5), 1);
        assert_eq!(page_count(6, 5), 2);
        assert_eq!(page_count(23, 5), 5);
    }

    #[test]
    fn test_clamp_page_boundaries() {
        // 23 items at 5 per page: max page is 5
        assert_eq!(clamp_page(0, 23, 5), 1);
        assert_eq!(clamp_page(3, 23, 5), 3);
        assert_eq!(clamp_page(10, 23, 5), 5);
        // Nothing loaded yet
        assert_eq!(clamp_page(4, 0, 25), 1);
    }

    #[test]
    fn test_expected_len_for_23_items() {
        for page in 1..=4 {
            assert_eq!(expected_len(page, 5, 23), 5);
        }
        assert_eq!(expected_len(5, 5, 23), 3);
        assert_eq!(expected_len(6, 5, 23), 0);
        assert_eq!(item_range(5, 5, 23), 20..23);
    }

    #[test]
    fn test_page_window_centred() {
        assert_eq!(page_window(10, 20, 5), 8..=12);
        assert_eq!(page_window(10, 20, 4), 8..=11);
    }

    #[test]
    fn test_page_window_at_edges() {
        assert_eq!(page_window(1, 20, 5), 1..=5);
        assert_eq!(page_window(2, 20, 5), 1..=5);
        assert_eq!(page_window(20, 20, 5), 16..=20);
        assert_eq!(page_window(19, 20, 5), 16..=20);
        // Fewer pages than the window
        assert_eq!(page_window(2, 3, 9), 1..=3);
        assert_eq!(page_window(1, 1, 9), 1..=1);
    }

    #[test]
    fn test_page_window_near_u32_max() {
        assert_eq!(page_window(u32::MAX, u32::MAX, 9), u32::MAX - 8..=u32::MAX);
        assert_eq!(page_window(u32::MAX - 2, u32::MAX, 9), u32::MAX - 8..=u32::MAX);
        assert_eq!(page_count(u64::MAX, 5), u32::MAX);
    }

    #[test]
    fn test_parse_page_input() {
        assert_eq!(parse_page_input(" 3 ", 5), Some(3));
        assert_eq!(parse_page_input("0", 5), Some(1));
        assert_eq!(parse_page_input("-4", 5), Some(1));
        assert_eq!(parse_page_input("99", 5), Some(5));
        assert_eq!(parse_page_input("next", 5), None);
        assert_eq!(parse_page_input("", 5), None);
    }
}
