//! The job list: free-text search and paging over the fetched records.
//!
//! Filtering and paging happen entirely in memory. A new fetch replaces the
//! records through [`JobTable::set_records`]; the search text and page size
//! survive it.

use std::fmt::Write as _;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::error::{Error, Result};
use crate::job::JobRecord;
use crate::paginator::Paginator;
use crate::session::Role;

/// Column titles of the job list, without the trailing ACTION column.
pub const HEADERS: [&str; 10] = [
    "ID",
    "JOB ID",
    "NAME",
    "MOBILE",
    "IN",
    "OUT",
    "ASSETS",
    "JOB STATUS",
    "SOLUTION",
    "AMOUNT",
];

/// Text shown in place of rows when nothing matches.
pub const EMPTY_MESSAGE: &str = "No data available";

/// Widest a rendered cell may get before it is truncated.
const MAX_CELL_WIDTH: usize = 28;

/// Gap between rendered columns.
const COLUMN_GAP: &str = "  ";

/// Rows-per-page choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PageSize {
    Five,
    Ten,
    #[default]
    Fifteen,
    TwentyFive,
    Fifty,
}

impl PageSize {
    pub const ALL: [Self; 5] = [
        Self::Five,
        Self::Ten,
        Self::Fifteen,
        Self::TwentyFive,
        Self::Fifty,
    ];

    #[must_use]
    pub const fn get(self) -> usize {
        match self {
            Self::Five => 5,
            Self::Ten => 10,
            Self::Fifteen => 15,
            Self::TwentyFive => 25,
            Self::Fifty => 50,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = Error;

    fn try_from(value: usize) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|size| size.get() == value)
            .ok_or(Error::InvalidPageSize(value))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.get()
    }
}

/// Per-row buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableAction {
    View,
    Edit,
    Delete,
}

impl TableAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::View => "View",
            Self::Edit => "Edit",
            Self::Delete => "Delete",
        }
    }
}

/// Actions offered on each row for `role`. Delete is admin-only.
#[must_use]
pub fn actions_for(role: Role) -> &'static [TableAction] {
    if role.is_admin() {
        &[TableAction::View, TableAction::Edit, TableAction::Delete]
    } else {
        &[TableAction::View, TableAction::Edit]
    }
}

/// Returns true if `record` matches the search text.
///
/// Job id and name match case-insensitively; the mobile number is matched as
/// typed. The query is used as given, surrounding spaces included; an empty
/// query matches everything.
#[must_use]
pub fn matches_query(record: &JobRecord, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    record.job_id.to_lowercase().contains(&needle)
        || record.name.to_lowercase().contains(&needle)
        || record.mobile.contains(query)
}

/// Records matching `query`, in their original order.
#[must_use]
pub fn filter_jobs<'a>(records: &'a [JobRecord], query: &str) -> Vec<&'a JobRecord> {
    records.iter().filter(|r| matches_query(r, query)).collect()
}

/// A record on the current page with its 1-based position in the fetched set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableRow<'a> {
    pub serial: usize,
    pub record: &'a JobRecord,
}

impl TableRow<'_> {
    /// Cell text in [`HEADERS`] order.
    #[must_use]
    pub fn cells(&self) -> [String; 10] {
        let r = self.record;
        [
            self.serial.to_string(),
            r.job_id.clone(),
            r.name.clone(),
            r.mobile.clone(),
            r.in_date.clone(),
            r.out_date.clone(),
            r.assets.clone(),
            r.job_status.clone(),
            r.solution_provided.clone(),
            r.amount_display(),
        ]
    }
}

/// Fetched records plus the search text and paginator applied to them.
#[derive(Debug, Clone)]
pub struct JobTable {
    records: Vec<JobRecord>,
    query: String,
    page_size: PageSize,
    /// Indices into `records` that match `query`.
    matching: Vec<usize>,
    paginator: Paginator,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl JobTable {
    #[must_use]
    pub fn new(records: Vec<JobRecord>) -> Self {
        let page_size = PageSize::default();
        let mut table = Self {
            records,
            query: String::new(),
            page_size,
            matching: Vec::new(),
            paginator: Paginator::new().per_page(page_size.get()),
        };
        table.refilter();
        table
    }

    #[must_use]
    pub fn with_page_size(mut self, size: PageSize) -> Self {
        self.set_page_size(size);
        self
    }

    /// Replaces the records after a fetch, keeping query and page size.
    pub fn set_records(&mut self, records: Vec<JobRecord>) {
        self.records = records;
        self.paginator.set_page(0);
        self.refilter();
    }

    /// Changes the search text and returns to the first page.
    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.paginator.set_page(0);
        self.refilter();
    }

    /// Changes the page size and returns to the first page.
    pub fn set_page_size(&mut self, size: PageSize) {
        self.page_size = size;
        self.paginator.set_per_page(size.get());
        self.paginator.set_total_pages_from_items(self.matching.len());
    }

    /// Jumps to `page`, counted from 1.
    pub fn goto_page(&mut self, page: usize) -> Result<()> {
        let total = self.total_pages();
        if page == 0 || page > total {
            return Err(Error::PageOutOfRange { page, total });
        }
        self.paginator.set_page(page - 1);
        Ok(())
    }

    pub fn next_page(&mut self) {
        self.paginator.next_page();
    }

    pub fn prev_page(&mut self) {
        self.paginator.prev_page();
    }

    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    #[must_use]
    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    /// Current page, counted from 1.
    #[must_use]
    pub fn page(&self) -> usize {
        self.paginator.page() + 1
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        self.paginator.total_pages()
    }

    #[must_use]
    pub fn records(&self) -> &[JobRecord] {
        &self.records
    }

    /// Number of records matching the search text.
    #[must_use]
    pub fn matching_len(&self) -> usize {
        self.matching.len()
    }

    /// Rows on the current page.
    #[must_use]
    pub fn visible_rows(&self) -> Vec<TableRow<'_>> {
        let (start, end) = self.paginator.slice_bounds(self.matching.len());
        self.matching[start..end]
            .iter()
            .map(|&i| TableRow {
                serial: i + 1,
                record: &self.records[i],
            })
            .collect()
    }

    /// `"Page 2 of 3 (32 jobs)"`
    #[must_use]
    pub fn footer(&self) -> String {
        let noun = if self.matching.len() == 1 { "job" } else { "jobs" };
        format!(
            "Page {} of {} ({} {noun})",
            self.page(),
            self.total_pages(),
            self.matching.len()
        )
    }

    /// Renders the current page as a fixed-width text table.
    #[must_use]
    pub fn render(&self) -> String {
        let rows: Vec<[String; 10]> = self.visible_rows().iter().map(TableRow::cells).collect();

        let widths: Vec<usize> = HEADERS
            .iter()
            .enumerate()
            .map(|(col, title)| {
                rows.iter()
                    .map(|cells| cells[col].width())
                    .chain(std::iter::once(title.width()))
                    .max()
                    .unwrap_or(0)
                    .min(MAX_CELL_WIDTH)
            })
            .collect();

        let mut out = String::new();
        push_line(&mut out, HEADERS.iter().copied(), &widths);
        let rule: usize = widths.iter().sum::<usize>() + COLUMN_GAP.len() * (widths.len() - 1);
        let _ = writeln!(out, "{}", "-".repeat(rule));

        if rows.is_empty() {
            let _ = writeln!(out, "{EMPTY_MESSAGE}");
        }
        for cells in &rows {
            push_line(&mut out, cells.iter().map(String::as_str), &widths);
        }
        out
    }

    fn refilter(&mut self) {
        self.matching = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| matches_query(r, &self.query))
            .map(|(i, _)| i)
            .collect();
        self.paginator
            .set_total_pages_from_items(self.matching.len());
        tracing::debug!(
            query = %self.query,
            matching = self.matching.len(),
            total = self.records.len(),
            "job table filtered"
        );
    }
}

fn push_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, &width)| pad(&truncate(cell, width), width))
        .collect();
    let _ = writeln!(out, "{}", line.join(COLUMN_GAP).trim_end());
}

fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(fill))
}

/// Cuts `s` to `width` display columns, ending in `…` when shortened.
fn truncate(s: &str, width: usize) -> String {
    if s.width() <= width {
        return s.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
