// src/domain/paging.rs

pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One page of results plus the pre-slice total, so callers can
/// compute a page count.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

/// Slice `items` into 1-indexed pages. Out-of-range page numbers give
/// an empty slice, not an error; `total` is always the full count.
pub fn page<T>(items: Vec<T>, page_no: usize, page_size: usize) -> Page<T> {
    let total = items.len();

    if page_no == 0 || page_size == 0 {
        return Page { items: Vec::new(), total };
    }

    let start = (page_no - 1).saturating_mul(page_size);
    let items = items.into_iter().skip(start).take(page_size).collect();

    Page { items, total }
}
