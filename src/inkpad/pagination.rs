//! Page-based slicing of an already-ordered result set.
//!
//! No cursors: a page is `[offset, offset + page_size)` over the full
//! ordered list, with `total_pages` and `current_page` derived the way
//! the admin frontend expects (`pages = ceil(total / size)`,
//! `current_page = offset / size`).

use serde::Serialize;

/// One page of an ordered result set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

/// Slice `items` at `offset`. A missing `page_size` means "everything on
/// one page": it defaults to the full result count, or 1 when the result
/// is empty. Callers validate that an explicit page size is non-zero.
pub fn paginate<T>(items: Vec<T>, page_size: Option<usize>, offset: usize) -> Page<T> {
    let total = items.len();
    let page_size = page_size.unwrap_or_else(|| total.max(1));
    let page_items: Vec<T> = items.into_iter().skip(offset).take(page_size).collect();
    Page {
        items: page_items,
        total,
        total_pages: total.div_ceil(page_size),
        current_page: offset / page_size,
    }
}

/// The offset that puts the item at `position` on its natural page.
pub fn anchored_offset(position: usize, page_size: usize) -> usize {
    position / page_size * page_size
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pages_concatenate_to_the_full_set() {
        let items: Vec<u32> = (0..25).collect();
        let mut seen = Vec::new();
        let mut offset = 0;
        loop {
            let page = paginate(items.clone(), Some(10), offset);
            if page.items.is_empty() {
                break;
            }
            seen.extend(page.items);
            offset += 10;
        }
        assert_eq!(seen, items);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page = paginate((0..25).collect::<Vec<_>>(), Some(10), 0);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total, 25);
    }

    #[test]
    fn current_page_tracks_offset() {
        let page = paginate((0..25).collect::<Vec<_>>(), Some(10), 20);
        assert_eq!(page.current_page, 2);
        assert_eq!(page.items, vec![20, 21, 22, 23, 24]);
    }

    #[test]
    fn default_page_size_is_the_whole_set() {
        let page = paginate(vec![1, 2, 3], None, 0);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.current_page, 0);
    }

    #[test]
    fn empty_set_defaults_to_page_size_one() {
        let page = paginate(Vec::<u32>::new(), None, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
        assert_eq!(page.current_page, 0);
    }

    #[test]
    fn anchored_offset_floors_to_page_start() {
        assert_eq!(anchored_offset(12, 10), 10);
        assert_eq!(anchored_offset(9, 10), 0);
        assert_eq!(anchored_offset(20, 10), 20);
    }
}
