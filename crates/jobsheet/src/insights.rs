//! Job counts grouped by a job-sheet field over a date range.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::filter::DateSelection;
use crate::range::{DateRange, DateRangeKeyword};

/// Field the counts are grouped by. Only mode of contact is offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InsightDimension {
    #[default]
    #[serde(rename = "MOC")]
    Moc,
}

impl InsightDimension {
    pub const ALL: [Self; 1] = [Self::Moc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Moc => "MOC",
        }
    }
}

impl fmt::Display for InsightDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InsightDimension {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::validation(format!("unknown insight grouping: {s}")))
    }
}

/// The insights filter form: dates and range label plus the grouping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightFilter {
    pub dates: DateSelection,
    pub dimension: InsightDimension,
}

impl InsightFilter {
    /// Opens on the default range grouped by MOC.
    #[must_use]
    pub fn new(now: NaiveDate) -> Self {
        Self {
            dates: DateSelection::new(DateRangeKeyword::default(), now),
            dimension: InsightDimension::default(),
        }
    }

    /// Validated fetch parameters.
    pub fn query(&self) -> Result<InsightQuery> {
        Ok(InsightQuery {
            range: self.dates.range()?,
            dimension: self.dimension,
        })
    }
}

/// Parameters for one insights fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightQuery {
    pub range: DateRange,
    pub dimension: InsightDimension,
}

impl InsightQuery {
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("inDateFrom", self.range.from_formatted()),
            ("inDateTo", self.range.to_formatted()),
            ("filter", self.dimension.as_str().to_string()),
        ]
    }
}

/// One group and its job count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightRow {
    #[serde(rename = "MODE", default, deserialize_with = "crate::de::text")]
    pub mode: String,
    #[serde(rename = "COUNT", default, deserialize_with = "crate::de::count")]
    pub count: u64,
}

/// Sum of all group counts.
#[must_use]
pub fn total_jobs(rows: &[InsightRow]) -> u64 {
    rows.iter().map(|row| row.count).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn total_sums_counts() {
        let rows: Vec<InsightRow> = serde_json::from_value(json!([
            {"MODE": "Walk-in", "COUNT": 12},
            {"MODE": "Phone", "COUNT": "5"},
            {"MODE": null, "COUNT": 0},
        ]))
        .unwrap();
        assert_eq!(rows[1].count, 5);
        assert_eq!(rows[2].mode, "");
        assert_eq!(total_jobs(&rows), 17);
        assert_eq!(total_jobs(&[]), 0);
    }

    #[test]
    fn negative_count_is_rejected() {
        let result: std::result::Result<InsightRow, _> =
            serde_json::from_value(json!({"MODE": "x", "COUNT": -1}));
        assert!(result.is_err());
    }

    #[test]
    fn filter_query_pairs() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let mut filter = InsightFilter::new(now);
        filter.dates.select_range(DateRangeKeyword::LastMonth, now);
        assert_eq!(
            filter.query().unwrap().to_query_pairs(),
            vec![
                ("inDateFrom", "01/05/2024".to_string()),
                ("inDateTo", "31/05/2024".to_string()),
                ("filter", "MOC".to_string()),
            ]
        );
    }

    #[test]
    fn dimension_parses() {
        assert_eq!("moc".parse::<InsightDimension>(), Ok(InsightDimension::Moc));
        assert!("engineer".parse::<InsightDimension>().unwrap_err().is_validation());
    }
}
