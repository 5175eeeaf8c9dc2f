//! Page-count bookkeeping for a carousel presenting favorites pages followed
//! by regular pages.

use serde::{Deserialize, Serialize};

/// Which group a carousel page belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageGroup {
    Favorites,
    Regular,
}

/// One step of a repagination edit script, in carousel-absolute positions.
///
/// `Remove` positions index the page list as it was when `repaginate` was
/// called: an adapter collects the removals against that snapshot, applies
/// them, then applies the insertions against the resulting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageEdit {
    Remove { position: usize },
    Insert { position: usize, group: PageGroup, page_index: usize },
}

/// Tracks how many pages each group currently occupies and diffs that
/// against new item counts.
#[derive(Debug, Default)]
pub struct CarouselPages {
    n_favorites_pages: usize,
    n_regular_pages: usize,
}

impl CarouselPages {
    pub fn new() -> Self { Self::default() }

    pub fn favorites_pages(&self) -> usize { self.n_favorites_pages }

    pub fn regular_pages(&self) -> usize { self.n_regular_pages }

    pub fn total_pages(&self) -> usize { self.n_favorites_pages + self.n_regular_pages }

    pub fn page_count(items: usize, page_size: usize) -> usize { items.div_ceil(page_size) }

    /// Diff against new per-group item counts.
    ///
    /// Surplus favorites pages go first (no shift), then surplus regular
    /// pages (still offset by the *old* favorites page count); missing
    /// favorites pages are inserted next (no shift), then missing regular
    /// pages (offset by the *new* favorites page count).
    pub fn repaginate(
        &mut self,
        n_favorites_items: usize,
        n_regular_items: usize,
        page_size: usize,
    ) -> Vec<PageEdit> {
        let old_favorites = self.n_favorites_pages;
        let new_favorites = Self::page_count(n_favorites_items, page_size);
        let old_regular = self.n_regular_pages;
        let new_regular = Self::page_count(n_regular_items, page_size);

        self.n_favorites_pages = new_favorites;
        self.n_regular_pages = new_regular;

        let mut edits = Vec::new();
        for i in new_favorites..old_favorites {
            edits.push(PageEdit::Remove { position: i });
        }
        for i in new_regular..old_regular {
            edits.push(PageEdit::Remove { position: i + old_favorites });
        }
        for i in old_favorites..new_favorites {
            edits.push(PageEdit::Insert {
                position: i,
                group: PageGroup::Favorites,
                page_index: i,
            });
        }
        for i in old_regular..new_regular {
            edits.push(PageEdit::Insert {
                position: i + new_favorites,
                group: PageGroup::Regular,
                page_index: i,
            });
        }
        edits
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::PageEdit::{Insert, Remove};
    use super::PageGroup::{Favorites, Regular};
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(CarouselPages::page_count(0, 24), 0);
        assert_eq!(CarouselPages::page_count(1, 24), 1);
        assert_eq!(CarouselPages::page_count(24, 24), 1);
        assert_eq!(CarouselPages::page_count(25, 24), 2);
    }

    #[test]
    fn initial_population_inserts_favorites_first() {
        let mut pages = CarouselPages::new();
        let edits = pages.repaginate(3, 5, 2);

        assert_eq!(edits, vec![
            Insert { position: 0, group: Favorites, page_index: 0 },
            Insert { position: 1, group: Favorites, page_index: 1 },
            Insert { position: 2, group: Regular, page_index: 0 },
            Insert { position: 3, group: Regular, page_index: 1 },
            Insert { position: 4, group: Regular, page_index: 2 },
        ]);
        assert_eq!(pages.favorites_pages(), 2);
        assert_eq!(pages.regular_pages(), 3);
        assert_eq!(pages.total_pages(), 5);
    }

    #[test]
    fn growing_favorites_inserts_before_regular_pages() {
        let mut pages = CarouselPages::new();
        pages.repaginate(2, 4, 2);

        // One more favorites page; regular pages untouched.
        let edits = pages.repaginate(4, 4, 2);
        assert_eq!(edits, vec![Insert {
            position: 1,
            group: Favorites,
            page_index: 1
        }]);
    }

    #[test]
    fn shrinking_regular_group_removes_with_old_favorites_shift() {
        let mut pages = CarouselPages::new();
        pages.repaginate(4, 6, 2);
        assert_eq!((pages.favorites_pages(), pages.regular_pages()), (2, 3));

        // Both groups shrink; removals are positioned against the snapshot,
        // with the regular removal shifted by the old favorites page count.
        let edits = pages.repaginate(2, 4, 2);
        assert_eq!(edits, vec![
            Remove { position: 1 },
            Remove { position: 2 + 2 },
        ]);
        assert_eq!((pages.favorites_pages(), pages.regular_pages()), (1, 2));
    }

    #[test]
    fn swapping_groups_uses_new_favorites_count_for_inserts() {
        let mut pages = CarouselPages::new();
        pages.repaginate(0, 4, 2);

        let edits = pages.repaginate(4, 4, 2);
        assert_eq!(edits, vec![
            Insert { position: 0, group: Favorites, page_index: 0 },
            Insert { position: 1, group: Favorites, page_index: 1 },
        ]);

        let edits = pages.repaginate(0, 4, 2);
        assert_eq!(edits, vec![Remove { position: 0 }, Remove { position: 1 }]);
        assert_eq!(pages.total_pages(), 2);
    }

    #[test]
    fn emptying_both_groups_removes_everything() {
        let mut pages = CarouselPages::new();
        pages.repaginate(2, 3, 2);
        assert_eq!(pages.total_pages(), 3);

        let edits = pages.repaginate(0, 0, 2);
        assert_eq!(edits, vec![
            Remove { position: 0 },
            Remove { position: 1 },
            Remove { position: 2 },
        ]);
        assert_eq!(pages.total_pages(), 0);
    }
}
