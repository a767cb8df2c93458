//! Error types for the job-sheet domain.

use thiserror::Error;

/// Errors produced by the domain layer.
///
/// Every variant is recoverable from the caller's point of view: the
/// operator fixes the input and tries again. Nothing here is fatal to an
/// application session.
///
/// # Example
///
/// ```rust
/// use jobsheet::{Error, range::resolve_label};
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// match resolve_label("Next Decade", today) {
///     Err(Error::UnknownRangeKeyword(label)) => assert_eq!(label, "Next Decade"),
///     other => panic!("unexpected: {other:?}"),
/// }
/// ```
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The text does not name one of the ten supported date ranges.
    #[error("unknown date range: {0}")]
    UnknownRangeKeyword(String),

    /// A date string did not match `dd/MM/yyyy`.
    #[error("invalid date '{input}', expected dd/MM/yyyy")]
    InvalidDate {
        /// The rejected input.
        input: String,
    },

    /// A range whose end precedes its start.
    #[error("date range ends ({to}) before it starts ({from})")]
    InvertedRange {
        /// Formatted start date.
        from: String,
        /// Formatted end date.
        to: String,
    },

    /// Page size outside the supported set.
    #[error("unsupported page size {0}, expected one of 5, 10, 15, 25, 50")]
    InvalidPageSize(usize),

    /// Page number outside `1..=total_pages`.
    #[error("page {page} is out of range (1-{total})")]
    PageOutOfRange {
        /// Requested page, 1-based.
        page: usize,
        /// Total pages available.
        total: usize,
    },

    /// Picker category label not recognised.
    #[error("unknown picker category: {0}")]
    UnknownPickerCategory(String),

    /// Form validation failed. Messages are in field order.
    #[error("{}", .0.join("; "))]
    Validation(Vec<String>),

    /// The signed-in user lacks the role required for an action.
    #[error("Unauthorized access")]
    Unauthorized,
}

impl Error {
    /// Creates a validation error from a single message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(vec![message.into()])
    }

    /// Returns true for client-side form validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// A specialized [`Result`] type for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_joins_messages() {
        let err = Error::Validation(vec!["Enter Customer Name".into(), "Enter MOC".into()]);
        assert_eq!(err.to_string(), "Enter Customer Name; Enter MOC");
        assert!(err.is_validation());
    }

    #[test]
    fn unauthorized_matches_panel_wording() {
        assert_eq!(Error::Unauthorized.to_string(), "Unauthorized access");
        assert!(!Error::Unauthorized.is_validation());
    }

    #[test]
    fn inverted_range_mentions_both_ends() {
        let err = Error::InvertedRange {
            from: "10/06/2024".into(),
            to: "01/06/2024".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("10/06/2024"));
        assert!(msg.contains("01/06/2024"));
    }
}
