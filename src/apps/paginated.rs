//! A model presenting one fixed-size page of a larger, mutating collection.

use thiserror::Error;

use super::list_model::{ListChange, ListModel};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PageError {
    #[error("page size must be positive")]
    InvalidPageSize,
    #[error("index {index} out of range for page of {len} items")]
    OutOfRange { index: usize, len: usize },
}

/// `items-changed` payload: the page's effective size before and after a
/// collection mutation that touched it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemsChanged {
    pub previous: usize,
    pub current: usize,
}

/// Window of at most `page_size` consecutive items of a larger collection.
///
/// The view does not own the collection; callers pass it to each query so
/// bounds are always computed against the collection's current size. The
/// invariant is `item_at(i) == collection.item_at(page_index * page_size + i)`
/// for every `i` in `[0, item_count())`.
#[derive(Debug, Clone)]
pub struct PaginatedView {
    page_size: usize,
    page_index: usize,
    n_items: usize,
}

impl PaginatedView {
    pub fn new<T>(
        model: &ListModel<T>,
        page_size: usize,
        page_index: usize,
    ) -> Result<Self, PageError> {
        if page_size == 0 {
            return Err(PageError::InvalidPageSize);
        }
        let mut view = Self { page_size, page_index, n_items: 0 };
        view.n_items = view.compute_n_items(model.len());
        Ok(view)
    }

    pub fn page_size(&self) -> usize { self.page_size }

    pub fn page_index(&self) -> usize { self.page_index }

    pub fn set_page_index<T>(&mut self, model: &ListModel<T>, page_index: usize) {
        self.page_index = page_index;
        self.n_items = self.compute_n_items(model.len());
    }

    /// First collection index covered by this page.
    fn start(&self) -> usize { self.page_index * self.page_size }

    fn compute_n_items(&self, collection_len: usize) -> usize {
        collection_len.saturating_sub(self.start()).min(self.page_size)
    }

    /// Number of items on this page, recomputed lazily against the
    /// collection's current size.
    pub fn item_count<T>(&mut self, model: &ListModel<T>) -> usize {
        self.n_items = self.compute_n_items(model.len());
        self.n_items
    }

    pub fn item_at<'m, T>(&self, model: &'m ListModel<T>, index: usize) -> Result<&'m T, PageError> {
        let len = self.compute_n_items(model.len());
        if index >= len {
            return Err(PageError::OutOfRange { index, len });
        }
        model
            .item_at(self.start() + index)
            .ok_or(PageError::OutOfRange { index, len })
    }

    /// React to a collection mutation.
    ///
    /// Returns the page's own `items-changed` counts when the mutation
    /// touches this page or anything before its end; a mutation entirely
    /// past the page end only affects later pages and yields `None`.
    pub fn apply_change<T>(
        &mut self,
        model: &ListModel<T>,
        change: &ListChange,
    ) -> Option<ItemsChanged> {
        let end = self.start() + self.page_size;
        if change.position >= end {
            return None;
        }
        let previous = self.n_items;
        self.n_items = self.compute_n_items(model.len());
        Some(ItemsChanged { previous, current: self.n_items })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn model_of(n: usize) -> ListModel<usize> {
        ListModel::from_items((0..n).collect())
    }

    #[test]
    fn zero_page_size_is_rejected() {
        assert_eq!(
            PaginatedView::new(&model_of(5), 0, 0).unwrap_err(),
            PageError::InvalidPageSize
        );
    }

    #[test]
    fn five_items_page_size_two_gives_three_pages() {
        let model = ListModel::from_items(vec!['a', 'b', 'c', 'd', 'e']);

        let mut pages: Vec<_> =
            (0..3).map(|i| PaginatedView::new(&model, 2, i).unwrap()).collect();

        assert_eq!(pages[0].item_count(&model), 2);
        assert_eq!(pages[1].item_count(&model), 2);
        assert_eq!(pages[2].item_count(&model), 1);

        assert_eq!(pages[0].item_at(&model, 0), Ok(&'a'));
        assert_eq!(pages[0].item_at(&model, 1), Ok(&'b'));
        assert_eq!(pages[1].item_at(&model, 0), Ok(&'c'));
        assert_eq!(pages[1].item_at(&model, 1), Ok(&'d'));
        assert_eq!(pages[2].item_at(&model, 0), Ok(&'e'));
        assert_eq!(
            pages[2].item_at(&model, 1),
            Err(PageError::OutOfRange { index: 1, len: 1 })
        );
    }

    #[test]
    fn pages_partition_the_collection() {
        for len in 0..40usize {
            for page_size in 1..8usize {
                let model = model_of(len);
                let n_pages = len.div_ceil(page_size);

                let mut covered = Vec::new();
                for page_index in 0..n_pages {
                    let mut page = PaginatedView::new(&model, page_size, page_index).unwrap();
                    let count = page.item_count(&model);
                    assert!(count <= page_size);
                    for i in 0..count {
                        covered.push(*page.item_at(&model, i).unwrap());
                    }
                }

                // Contiguous, in order, no overlap, total == collection size.
                assert_eq!(covered, (0..len).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn item_count_is_idempotent() {
        let model = model_of(5);
        let mut page = PaginatedView::new(&model, 2, 1).unwrap();
        assert_eq!(page.item_count(&model), page.item_count(&model));
    }

    #[test]
    fn empty_collection_and_pages_past_the_end() {
        let empty = model_of(0);
        let mut page = PaginatedView::new(&empty, 1, 0).unwrap();
        assert_eq!(page.item_count(&empty), 0);

        let model = model_of(5);
        let mut beyond = PaginatedView::new(&model, 2, 7).unwrap();
        assert_eq!(beyond.item_count(&model), 0);
        assert_eq!(
            beyond.item_at(&model, 0),
            Err(PageError::OutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn item_count_tracks_collection_growth() {
        let mut model = model_of(0);
        let mut page = PaginatedView::new(&model, 3, 0).unwrap();
        assert_eq!(page.item_count(&model), 0);

        model.push(0);
        model.push(1);
        assert_eq!(page.item_count(&model), 2);

        model.push(2);
        model.push(3);
        assert_eq!(page.item_count(&model), 3);
    }

    #[test]
    fn mutation_past_the_page_end_is_ignored() {
        let mut model = model_of(4);
        let mut page = PaginatedView::new(&model, 2, 0).unwrap();
        assert_eq!(page.item_count(&model), 2);

        // Touches only indices past this page's end.
        let change = model.push(4);
        assert_eq!(page.apply_change(&model, &change), None);
        assert_eq!(page.item_count(&model), 2);
    }

    #[test]
    fn overlapping_mutation_reports_old_and_new_counts() {
        let mut model = model_of(3);
        let mut last = PaginatedView::new(&model, 2, 1).unwrap();
        assert_eq!(last.item_count(&model), 1);

        let change = model.push(3);
        assert_eq!(
            last.apply_change(&model, &change),
            Some(ItemsChanged { previous: 1, current: 2 })
        );

        // A removal before the page shifts its contents; the page still
        // reports its own counts.
        let (_, change) = model.remove(0);
        assert_eq!(
            last.apply_change(&model, &change),
            Some(ItemsChanged { previous: 2, current: 1 })
        );
        assert_eq!(last.item_at(&model, 0), Ok(&3));
    }

    #[test]
    fn set_page_index_recomputes_bounds() {
        let model = model_of(5);
        let mut page = PaginatedView::new(&model, 2, 0).unwrap();
        assert_eq!(page.item_count(&model), 2);

        page.set_page_index(&model, 2);
        assert_eq!(page.page_index(), 2);
        assert_eq!(page.item_count(&model), 1);
        assert_eq!(page.item_at(&model, 0), Ok(&4));
    }
}
