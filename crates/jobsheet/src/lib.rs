#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Jobsheet
//!
//! Domain model and client-side logic for a repair-service job-sheet admin
//! panel. Nothing in this crate performs I/O; the HTTP client, session
//! storage and terminal front end live in `jobdesk`.
//!
//! - Named date ranges ("This Financial Year", "Last Week", ...) resolved
//!   against the current day
//! - The list and insights filter forms
//! - Typed job records with lenient decoding of backend rows
//! - In-memory search and pagination of the job list
//! - The signed-in application context and role gate
//! - Last-write-wins sequencing of overlapping fetches
//! - Form validation, next job id and the printable sheet
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use jobsheet::prelude::*;
//!
//! let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
//!
//! let mut form = FilterForm::new(today);
//! form.select_range(DateRangeKeyword::LastMonth, today);
//! let query = form.query().unwrap();
//! assert_eq!(query.range.to_string(), "01/05/2024 - 31/05/2024");
//!
//! let mut table = JobTable::new(Vec::new());
//! table.set_page_size(PageSize::Ten);
//! assert_eq!(table.total_pages(), 1);
//! ```

mod de;
pub mod error;
pub mod filter;
pub mod insights;
pub mod job;
pub mod notice;
pub mod paginator;
pub mod picker;
pub mod print;
pub mod range;
pub mod sequence;
pub mod session;
pub mod table;
pub mod users;
pub mod validate;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::filter::{DateSelection, FilterForm, JobQuery, status_options};
    pub use crate::insights::{InsightDimension, InsightFilter, InsightQuery, InsightRow, total_jobs};
    pub use crate::job::{JobDraft, JobRecord, LastJobId, Profit, next_job_id};
    pub use crate::notice::{MessageResponse, Notice};
    pub use crate::paginator::Paginator;
    pub use crate::picker::{PickerCategory, PickerList};
    pub use crate::print::{amount_in_words, render_print_sheet};
    pub use crate::range::{DateRange, DateRangeKeyword, format_date, parse_date, resolve, resolve_label};
    pub use crate::sequence::{Latest, RequestSequencer, Ticket};
    pub use crate::session::{AppContext, Role, Session};
    pub use crate::table::{JobTable, PageSize, TableAction, actions_for, filter_jobs};
    pub use crate::users::{NewUser, PasswordChange, PasswordKind, UserSummary};
}
