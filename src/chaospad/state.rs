//! View state held by the panel: the list page, its pagination, and the
//! create/edit dialog.

use crate::model::{Pad, PadDraft};
use crate::watch::Watched;
use std::cell::Cell;
use std::rc::Rc;

pub const DEFAULT_SORT_FIELD: &str = "updated_at";
pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub descending: bool,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: DEFAULT_SORT_FIELD.to_string(),
            descending: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub sort: Sort,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
    /// Server-side count of matching records, independent of `page_size`.
    pub total_count: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            sort: Sort::default(),
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total_count: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Saturates instead of overflowing on absurd page numbers.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.page_size)
    }

    pub fn page_count(&self) -> usize {
        if self.page_size == 0 {
            return 1;
        }
        self.total_count.div_ceil(self.page_size).max(1)
    }

    pub fn apply(&mut self, request: &PageRequest) {
        if let Some(sort) = &request.sort {
            self.sort = sort.clone();
        }
        if let Some(page) = request.page {
            self.page = page.max(1);
        }
        if let Some(size) = request.page_size {
            self.page_size = size.max(1);
        }
    }
}

/// Pagination/sort parameters a table emits when the user pages or sorts.
/// Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    pub sort: Option<Sort>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl PageRequest {
    pub fn page(page: usize) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }

    pub fn with_page_size(mut self, size: usize) -> Self {
        self.page_size = Some(size);
        self
    }

    pub fn with_sort(mut self, field: impl Into<String>, descending: bool) -> Self {
        self.sort = Some(Sort {
            field: field.into(),
            descending,
        });
        self
    }
}

/// Shared view of the "request in flight" flag.
///
/// Clones observe the same flag, so a renderer can hold one while the panel
/// runs a fetch.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Rc<Cell<bool>>);

impl LoadingFlag {
    pub fn is_loading(&self) -> bool {
        self.0.get()
    }

    /// Raise the flag until the returned guard drops.
    pub fn hold(&self) -> LoadingGuard {
        self.0.set(true);
        LoadingGuard(Rc::clone(&self.0))
    }
}

#[must_use = "the loading flag clears as soon as the guard is dropped"]
pub struct LoadingGuard(Rc<Cell<bool>>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

#[derive(Debug, Default)]
pub struct PadsListState {
    pub items: Vec<Pad>,
    pub search: Watched<String>,
    pub loading: LoadingFlag,
    pub pagination: Pagination,
}

impl PadsListState {
    pub fn search_term(&self) -> &str {
        self.search.get()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_loading()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PadFormState {
    pub visible: bool,
    pub draft: PadDraft,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_clears_flag_on_drop() {
        let flag = LoadingFlag::default();
        let observer = flag.clone();
        {
            let _guard = flag.hold();
            assert!(observer.is_loading());
        }
        assert!(!observer.is_loading());
    }

    #[test]
    fn guard_clears_flag_on_early_return() {
        fn failing(flag: &LoadingFlag) -> Result<(), &'static str> {
            let _guard = flag.hold();
            if flag.is_loading() {
                return Err("boom");
            }
            Ok(())
        }

        let flag = LoadingFlag::default();
        assert!(failing(&flag).is_err());
        assert!(!flag.is_loading());
    }

    #[test]
    fn offset_and_page_count() {
        let pagination = Pagination {
            page: 3,
            page_size: 10,
            total_count: 21,
            ..Pagination::default()
        };
        assert_eq!(pagination.offset(), 20);
        assert_eq!(pagination.page_count(), 3);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let mut pagination = Pagination::default();
        pagination.apply(&PageRequest::page(usize::MAX));
        assert_eq!(pagination.offset(), usize::MAX);
    }

    #[test]
    fn apply_keeps_unset_fields() {
        let mut pagination = Pagination::default();
        pagination.apply(&PageRequest::page(4));
        assert_eq!(pagination.page, 4);
        assert_eq!(pagination.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(pagination.sort, Sort::default());

        pagination.apply(&PageRequest::default().with_sort("name", false).with_page_size(0));
        assert_eq!(pagination.sort.field, "name");
        assert!(!pagination.sort.descending);
        assert_eq!(pagination.page_size, 1);
        assert_eq!(pagination.page, 4);
    }
}
