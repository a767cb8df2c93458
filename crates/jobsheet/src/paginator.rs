//! Page bookkeeping for in-memory result sets.
//!
//! # Example
//!
//! ```rust
//! use jobsheet::paginator::Paginator;
//!
//! let items: Vec<u32> = (1..=12).collect();
//! let mut paginator = Paginator::new().per_page(5);
//! paginator.set_total_pages_from_items(items.len());
//!
//! paginator.next_page();
//! let (start, end) = paginator.slice_bounds(items.len());
//! assert_eq!(&items[start..end], &[6, 7, 8, 9, 10]);
//! assert_eq!(paginator.view(), "2/3");
//! ```

/// How the page indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    /// "2/5"
    #[default]
    Arabic,
    /// "○●○○○"
    Dots,
}

/// Current page, page size and page count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    pub style: Style,
    /// 0-indexed.
    page: usize,
    per_page: usize,
    total_pages: usize,
    pub active_dot: String,
    pub inactive_dot: String,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new()
    }
}

impl Paginator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            style: Style::Arabic,
            page: 0,
            per_page: 1,
            total_pages: 1,
            active_dot: "●".to_string(),
            inactive_dot: "○".to_string(),
        }
    }

    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the page size; zero is treated as one.
    #[must_use]
    pub fn per_page(mut self, n: usize) -> Self {
        self.per_page = n.max(1);
        self
    }

    /// Changes the page size in place and returns to the first page.
    pub fn set_per_page(&mut self, n: usize) {
        self.per_page = n.max(1);
        self.page = 0;
    }

    /// Current page, 0-indexed.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    /// Moves to `page`, clamped to the last page.
    pub fn set_page(&mut self, page: usize) {
        self.page = page.min(self.total_pages.saturating_sub(1));
    }

    #[must_use]
    pub fn get_per_page(&self) -> usize {
        self.per_page
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.total_pages
    }

    /// Recomputes the page count for `items` entries.
    ///
    /// An empty set still has one (empty) page. The current page is clamped
    /// so it stays valid after the set shrinks.
    pub fn set_total_pages_from_items(&mut self, items: usize) -> usize {
        self.total_pages = items.div_ceil(self.per_page).max(1);
        self.set_page(self.page);
        self.total_pages
    }

    /// Number of entries on the current page.
    #[must_use]
    pub fn items_on_page(&self, total_items: usize) -> usize {
        let (start, end) = self.slice_bounds(total_items);
        end - start
    }

    /// `start..end` indices of the current page within `length` items.
    #[must_use]
    pub fn slice_bounds(&self, length: usize) -> (usize, usize) {
        let start = (self.page * self.per_page).min(length);
        let end = (start + self.per_page).min(length);
        (start, end)
    }

    pub fn prev_page(&mut self) {
        if self.page > 0 {
            self.page -= 1;
        }
    }

    pub fn next_page(&mut self) {
        if !self.on_last_page() {
            self.page += 1;
        }
    }

    #[must_use]
    pub fn on_last_page(&self) -> bool {
        self.page == self.total_pages.saturating_sub(1)
    }

    #[must_use]
    pub fn on_first_page(&self) -> bool {
        self.page == 0
    }

    /// Renders the page indicator.
    #[must_use]
    pub fn view(&self) -> String {
        match self.style {
            Style::Dots => (0..self.total_pages)
                .map(|i| {
                    if i == self.page {
                        self.active_dot.as_str()
                    } else {
                        self.inactive_dot.as_str()
                    }
                })
                .collect(),
            Style::Arabic => format!("{}/{}", self.page + 1, self.total_pages),
        }
    }
}
