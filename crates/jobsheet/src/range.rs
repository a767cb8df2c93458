//! Named date ranges and their resolution to concrete calendar dates.
//!
//! The filter screens never ask the operator for raw dates first. They offer
//! a fixed list of ranges ("This Month", "Last Week", ...) and derive the
//! `[from, to]` pair from the current day. This module owns that derivation.
//!
//! # Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use jobsheet::range::{resolve, DateRangeKeyword};
//!
//! let saturday = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//! let week = resolve(DateRangeKeyword::ThisWeek, saturday);
//! assert_eq!(week.from_formatted(), "10/06/2024");
//! assert_eq!(week.to_formatted(), "16/06/2024");
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Display and transport format for every date the panel exchanges.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Month the business's financial year starts in (April).
pub const FINANCIAL_YEAR_START_MONTH: u32 = 4;

/// One of the ten range labels offered by the filter forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DateRangeKeyword {
    #[default]
    #[serde(rename = "This Financial Year")]
    ThisFinancialYear,
    #[serde(rename = "Last Financial Year")]
    LastFinancialYear,
    #[serde(rename = "This Year")]
    ThisYear,
    #[serde(rename = "Last Year")]
    LastYear,
    #[serde(rename = "This Month")]
    ThisMonth,
    #[serde(rename = "Last Month")]
    LastMonth,
    #[serde(rename = "Today")]
    Today,
    #[serde(rename = "Yesterday")]
    Yesterday,
    #[serde(rename = "This Week")]
    ThisWeek,
    #[serde(rename = "Last Week")]
    LastWeek,
}

impl DateRangeKeyword {
    /// All keywords in the order the range selector lists them.
    pub const ALL: [Self; 10] = [
        Self::ThisFinancialYear,
        Self::LastFinancialYear,
        Self::ThisYear,
        Self::LastYear,
        Self::ThisMonth,
        Self::LastMonth,
        Self::Today,
        Self::Yesterday,
        Self::ThisWeek,
        Self::LastWeek,
    ];

    /// Returns the label shown to operators.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ThisFinancialYear => "This Financial Year",
            Self::LastFinancialYear => "Last Financial Year",
            Self::ThisYear => "This Year",
            Self::LastYear => "Last Year",
            Self::ThisMonth => "This Month",
            Self::LastMonth => "Last Month",
            Self::Today => "Today",
            Self::Yesterday => "Yesterday",
            Self::ThisWeek => "This Week",
            Self::LastWeek => "Last Week",
        }
    }

    /// Returns true for the two April-to-March ranges.
    #[must_use]
    pub const fn is_financial_year(self) -> bool {
        matches!(self, Self::ThisFinancialYear | Self::LastFinancialYear)
    }
}

impl fmt::Display for DateRangeKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for DateRangeKeyword {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownRangeKeyword(s.to_string()))
    }
}

/// An inclusive pair of calendar dates with `from <= to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    #[serde(rename = "inDateFrom", with = "dmy")]
    from: NaiveDate,
    #[serde(rename = "inDateTo", with = "dmy")]
    to: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    #[serde(rename = "inDateFrom", with = "dmy")]
    from: NaiveDate,
    #[serde(rename = "inDateTo", with = "dmy")]
    to: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = Error;

    fn try_from(raw: RawDateRange) -> Result<Self> {
        Self::new(raw.from, raw.to)
    }
}

impl DateRange {
    /// Creates a range, rejecting one whose end precedes its start.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        if to < from {
            return Err(Error::InvertedRange {
                from: format_date(from),
                to: format_date(to),
            });
        }
        Ok(Self { from, to })
    }

    /// Creates a range covering a single day.
    #[must_use]
    pub const fn day(date: NaiveDate) -> Self {
        Self {
            from: date,
            to: date,
        }
    }

    /// Parses both ends from `dd/MM/yyyy` strings.
    pub fn parse(from: &str, to: &str) -> Result<Self> {
        Self::new(parse_date(from)?, parse_date(to)?)
    }

    /// First day of the range.
    #[must_use]
    pub const fn from(&self) -> NaiveDate {
        self.from
    }

    /// Last day of the range (inclusive).
    #[must_use]
    pub const fn to(&self) -> NaiveDate {
        self.to
    }

    /// First day formatted `dd/MM/yyyy`.
    #[must_use]
    pub fn from_formatted(&self) -> String {
        format_date(self.from)
    }

    /// Last day formatted `dd/MM/yyyy`.
    #[must_use]
    pub fn to_formatted(&self) -> String {
        format_date(self.to)
    }

    /// Returns true if `date` falls inside the range.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// Number of days covered, both ends included.
    #[must_use]
    pub fn len_days(&self) -> i64 {
        (self.to - self.from).num_days() + 1
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.from_formatted(), self.to_formatted())
    }
}

/// Formats a date as `dd/MM/yyyy`.
#[must_use]
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parses a `dd/MM/yyyy` date.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT).map_err(|_| Error::InvalidDate {
        input: input.to_string(),
    })
}

/// Resolves a keyword against the reference day `now`.
///
/// The two financial-year ranges anchor on the calendar year of `now`, not
/// on the financial year that contains it: in January 2025 "This Financial
/// Year" is April 2025 to March 2026. Screens rely on that behaviour, so it
/// is kept as is.
#[must_use]
pub fn resolve(keyword: DateRangeKeyword, now: NaiveDate) -> DateRange {
    let year = now.year();
    let (from, to) = match keyword {
        DateRangeKeyword::ThisFinancialYear => (
            ymd(year, FINANCIAL_YEAR_START_MONTH, 1),
            ymd(year + 1, FINANCIAL_YEAR_START_MONTH - 1, 31),
        ),
        DateRangeKeyword::LastFinancialYear => (
            ymd(year - 1, FINANCIAL_YEAR_START_MONTH, 1),
            ymd(year, FINANCIAL_YEAR_START_MONTH - 1, 31),
        ),
        DateRangeKeyword::ThisYear => (ymd(year, 1, 1), ymd(year, 12, 31)),
        DateRangeKeyword::LastYear => (ymd(year - 1, 1, 1), ymd(year - 1, 12, 31)),
        DateRangeKeyword::ThisMonth => month_bounds(year, now.month()),
        DateRangeKeyword::LastMonth => {
            let (y, m) = previous_month(year, now.month());
            month_bounds(y, m)
        }
        DateRangeKeyword::Today => (now, now),
        DateRangeKeyword::Yesterday => {
            let day = days_before(now, 1);
            (day, day)
        }
        DateRangeKeyword::ThisWeek => week_bounds(now),
        DateRangeKeyword::LastWeek => week_bounds(days_before(now, 7)),
    };
    DateRange { from, to }
}

/// Resolves a keyword given by its label.
///
/// Unlike the selector it replaces, an unrecognised label is an error
/// rather than an empty range.
pub fn resolve_label(label: &str, now: NaiveDate) -> Result<DateRange> {
    let keyword: DateRangeKeyword = label.parse()?;
    Ok(resolve(keyword, now))
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    })
}

fn month_bounds(year: i32, month: u32) -> (NaiveDate, NaiveDate) {
    let last = (28..=31)
        .rev()
        .find_map(|day| NaiveDate::from_ymd_opt(year, month, day))
        .unwrap_or_else(|| ymd(year, month, 28));
    (ymd(year, month, 1), last)
}

fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

fn days_before(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_sub_days(Days::new(days))
        .unwrap_or(NaiveDate::MIN)
}

// Weeks run Monday to Sunday.
fn week_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = days_before(date, u64::from(date.weekday().num_days_from_monday()));
    let sunday = monday.checked_add_days(Days::new(6)).unwrap_or(NaiveDate::MAX);
    (monday, sunday)
}

/// Serde adapter for `dd/MM/yyyy` dates.
pub mod dmy {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::DATE_FORMAT;

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&date.format(DATE_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).map_err(serde::de::Error::custom)
    }
}
