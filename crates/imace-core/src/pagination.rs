use std::fmt;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_PAGE_SIZE, PAGE_SIZES, WINDOW_RADIUS};
use crate::error::ImaceError;

/// Number of images per browse page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    Twelve,
    Eighteen,
    TwentyFour,
    ThirtySix,
    FortyEight,
}

impl PageSize {
    pub const ALL: &[Self] = &[
        Self::Twelve,
        Self::Eighteen,
        Self::TwentyFour,
        Self::ThirtySix,
        Self::FortyEight,
    ];

    pub fn get(self) -> usize {
        match self {
            Self::Twelve => PAGE_SIZES[0],
            Self::Eighteen => PAGE_SIZES[1],
            Self::TwentyFour => PAGE_SIZES[2],
            Self::ThirtySix => PAGE_SIZES[3],
            Self::FortyEight => PAGE_SIZES[4],
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        // DEFAULT_PAGE_SIZE is always one of PAGE_SIZES.
        Self::try_from(DEFAULT_PAGE_SIZE).unwrap_or(Self::Twelve)
    }
}

impl TryFrom<usize> for PageSize {
    type Error = ImaceError;

    fn try_from(n: usize) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.get() == n)
            .ok_or(ImaceError::InvalidPageSize(n))
    }
}

impl From<PageSize> for usize {
    fn from(s: PageSize) -> Self {
        s.get()
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per page", self.get())
    }
}

/// One slot in the pager control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PagerItem {
    Page(usize),
    Ellipsis,
}

/// `ceil(total / page_size)`; zero when there is nothing to show.
pub fn total_pages(total: usize, page_size: PageSize) -> usize {
    total.div_ceil(page_size.get())
}

/// Page numbers and ellipsis markers shown around `page`.
///
/// Always contains page 1 and `total_pages`, plus every page within
/// `WINDOW_RADIUS` of `page`. Each run of omitted pages becomes a single
/// `Ellipsis`.
pub fn compute_window(page: usize, total_pages: usize) -> Vec<PagerItem> {
    if total_pages == 0 {
        return Vec::new();
    }
    let page = page.clamp(1, total_pages);
    let lo = page.saturating_sub(WINDOW_RADIUS).max(1);
    let hi = (page + WINDOW_RADIUS).min(total_pages);

    let mut pages = Vec::with_capacity(hi - lo + 3);
    pages.push(1);
    pages.extend((lo..=hi).filter(|&p| p != 1 && p != total_pages));
    if total_pages != 1 {
        pages.push(total_pages);
    }

    let mut window = Vec::with_capacity(pages.len() + 2);
    let mut prev: Option<usize> = None;
    for p in pages {
        if let Some(prev) = prev {
            if p > prev + 1 {
                window.push(PagerItem::Ellipsis);
            }
        }
        window.push(PagerItem::Page(p));
        prev = Some(p);
    }
    window
}

/// Browse-mode pagination inputs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PaginationState {
    page: usize,
    page_size: PageSize,
    total: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl PaginationState {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page: 1,
            page_size,
            total: 0,
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn total_pages(&self) -> usize {
        total_pages(self.total, self.page_size)
    }

    /// The pager is only worth showing with more than one page.
    pub fn show_pager(&self) -> bool {
        self.total_pages() > 1
    }

    pub fn window(&self) -> Vec<PagerItem> {
        compute_window(self.page, self.total_pages())
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Index of the first image on the current page.
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size.get()
    }

    /// Move to page `n`. Returns `false` (and changes nothing) when `n` is
    /// outside `1..=total_pages`; `true` means the view should scroll to top.
    pub fn change_page(&mut self, n: usize) -> bool {
        if n < 1 || n > self.total_pages() {
            return false;
        }
        self.page = n;
        true
    }

    /// Switch page size. Prior offsets are meaningless, so the page resets.
    pub fn change_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.page = 1;
    }

    /// Record the backend's total and keep `page` inside the valid range.
    pub fn set_total(&mut self, total: usize) {
        self.total = total;
        let max_page = self.total_pages().max(1);
        self.page = self.page.clamp(1, max_page);
    }

    /// Back to the first page without touching size or total.
    pub fn reset(&mut self) {
        self.page = 1;
    }
}
