//! Filter form state for the job list and the insights screen.
//!
//! Picking a named range rewrites both dates. Editing a date by hand changes
//! only that date and leaves the selected range label alone, so the label can
//! end up describing dates the form no longer holds. [`DateSelection::is_stale`]
//! reports that situation without correcting it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::picker::PickerList;
use crate::range::{DateRange, DateRangeKeyword, format_date, resolve};

/// Status filter value meaning "no status restriction".
pub const DEFAULT_STATUS: &str = "All";

/// Status filter values the list screen offers ahead of the picker statuses.
pub const BUILTIN_STATUSES: [&str; 3] = [DEFAULT_STATUS, "Un Purchased", "Purchased"];

/// The from/to/range triple shared by every date-filtered screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateSelection {
    from_date: NaiveDate,
    to_date: NaiveDate,
    range_keyword: DateRangeKeyword,
}

impl DateSelection {
    /// Starts from `keyword` resolved against `now`.
    #[must_use]
    pub fn new(keyword: DateRangeKeyword, now: NaiveDate) -> Self {
        let range = resolve(keyword, now);
        Self {
            from_date: range.from(),
            to_date: range.to(),
            range_keyword: keyword,
        }
    }

    /// Selects a named range and overwrites both dates.
    pub fn select_range(&mut self, keyword: DateRangeKeyword, now: NaiveDate) {
        let range = resolve(keyword, now);
        self.from_date = range.from();
        self.to_date = range.to();
        self.range_keyword = keyword;
        tracing::debug!(range = %keyword, from = %range.from_formatted(), to = %range.to_formatted(), "range selected");
    }

    /// Sets the start date. The range label is not touched.
    pub fn set_from_date(&mut self, date: NaiveDate) {
        self.from_date = date;
    }

    /// Sets the end date. The range label is not touched.
    pub fn set_to_date(&mut self, date: NaiveDate) {
        self.to_date = date;
    }

    #[must_use]
    pub fn from_date(&self) -> NaiveDate {
        self.from_date
    }

    #[must_use]
    pub fn to_date(&self) -> NaiveDate {
        self.to_date
    }

    /// The label last picked, which may be stale after manual edits.
    #[must_use]
    pub fn range_keyword(&self) -> DateRangeKeyword {
        self.range_keyword
    }

    /// Returns true when the dates no longer match the selected label.
    #[must_use]
    pub fn is_stale(&self, now: NaiveDate) -> bool {
        let expected = resolve(self.range_keyword, now);
        expected.from() != self.from_date || expected.to() != self.to_date
    }

    /// Validates the pair into a [`DateRange`].
    pub fn range(&self) -> Result<DateRange> {
        DateRange::new(self.from_date, self.to_date)
    }
}

/// Parameters for one job-list fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobQuery {
    #[serde(flatten)]
    pub range: DateRange,
    pub status: String,
}

impl JobQuery {
    /// Query-string pairs in the order the backend documents them.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("inDateFrom", self.range.from_formatted()),
            ("inDateTo", self.range.to_formatted()),
            ("status", self.status.clone()),
        ]
    }
}

/// The job-list filter form.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use jobsheet::filter::FilterForm;
/// use jobsheet::range::DateRangeKeyword;
///
/// let now = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// let mut form = FilterForm::new(now);
/// form.select_range(DateRangeKeyword::ThisMonth, now);
///
/// let query = form.query().unwrap();
/// assert_eq!(query.range.from_formatted(), "01/06/2024");
/// assert_eq!(query.status, "All");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterForm {
    dates: DateSelection,
    status: String,
}

impl FilterForm {
    /// Opens the form on the default range with no status restriction.
    #[must_use]
    pub fn new(now: NaiveDate) -> Self {
        Self {
            dates: DateSelection::new(DateRangeKeyword::default(), now),
            status: DEFAULT_STATUS.to_string(),
        }
    }

    pub fn select_range(&mut self, keyword: DateRangeKeyword, now: NaiveDate) {
        self.dates.select_range(keyword, now);
    }

    pub fn set_from_date(&mut self, date: NaiveDate) {
        self.dates.set_from_date(date);
    }

    pub fn set_to_date(&mut self, date: NaiveDate) {
        self.dates.set_to_date(date);
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    #[must_use]
    pub fn dates(&self) -> &DateSelection {
        &self.dates
    }

    #[must_use]
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Builds the fetch parameters, failing if the dates are inverted.
    pub fn query(&self) -> Result<JobQuery> {
        Ok(JobQuery {
            range: self.dates.range()?,
            status: self.status.clone(),
        })
    }

    /// One-line summary for status bars and logs.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} ({} - {}), status {}",
            self.dates.range_keyword(),
            format_date(self.dates.from_date()),
            format_date(self.dates.to_date()),
            self.status
        )
    }
}

/// Status choices for the list filter: the built-in values, then the
/// statuses the backend currently allows.
#[must_use]
pub fn status_options(pickers: &PickerList) -> Vec<String> {
    BUILTIN_STATUSES
        .iter()
        .map(|s| (*s).to_string())
        .chain(pickers.job_status.iter().cloned())
        .collect()
}
