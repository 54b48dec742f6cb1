// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;
use std::ops::Range;

pub const DEFAULT_PAGE_WINDOW: u32 = 2;
pub const DEFAULT_PAGE_SIZE: usize = 25;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Gap,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "{page}"),
            Self::Gap => f.write_str("…"),
        }
    }
}

/// Page numbers to show around `current`: always 1 and `total`, the window
/// `current ± delta`, and one gap marker per break. Empty when `total <= 1`.
pub fn visible_pages(current: u32, total: u32, delta: u32) -> Vec<PageItem> {
    if total <= 1 {
        return Vec::new();
    }
    let current = current.clamp(1, total);
    let low = current.saturating_sub(delta).max(2);
    let high = current.saturating_add(delta).min(total - 1);

    let mut pages = vec![1];
    pages.extend(low..=high);
    pages.push(total);

    let mut items = Vec::with_capacity(pages.len() + 2);
    let mut previous: Option<u32> = None;
    for page in pages {
        if let Some(previous) = previous {
            if page <= previous {
                continue;
            }
            if page - previous > 1 {
                items.push(PageItem::Gap);
            }
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}

/// 1-based page cursor over a row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageState {
    page: u32,
    page_size: usize,
    total_rows: usize,
}

impl PageState {
    pub fn new(page_size: usize, total_rows: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_rows,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn total_pages(&self) -> u32 {
        let pages = self.total_rows.div_ceil(self.page_size).max(1);
        u32::try_from(pages).unwrap_or(u32::MAX)
    }

    /// Row index range covered by the current page.
    pub fn page_range(&self) -> Range<usize> {
        let start = (self.page as usize - 1).saturating_mul(self.page_size);
        let start = start.min(self.total_rows);
        let end = start.saturating_add(self.page_size).min(self.total_rows);
        start..end
    }

    /// Moves to `page`, clamped into `[1, total_pages]`. Returns whether the
    /// page changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let clamped = page.clamp(1, self.total_pages());
        let changed = clamped != self.page;
        self.page = clamped;
        changed
    }

    pub fn next(&mut self) -> bool {
        self.set_page(self.page.saturating_add(1))
    }

    pub fn prev(&mut self) -> bool {
        self.set_page(self.page.saturating_sub(1))
    }

    /// Changes the page size and returns to page 1.
    pub fn set_page_size(&mut self, page_size: usize) -> bool {
        let page_size = page_size.max(1);
        let changed = page_size != self.page_size || self.page != 1;
        self.page_size = page_size;
        self.page = 1;
        changed
    }

    /// Row count changed (filtering, refetch); keeps the page in range.
    pub fn set_total_rows(&mut self, total_rows: usize) {
        self.total_rows = total_rows;
        self.page = self.page.clamp(1, self.total_pages());
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 0)
    }
}
