//! Command-line interface for `jobdesk`.
//!
//! # Examples
//!
//! ```bash
//! # Sign in (the password may also come from JOBDESK_PASSWORD)
//! jobdesk login -u asha
//!
//! # Jobs taken in this month, still pending
//! jobdesk jobs list --range "This Month" --status Pending
//!
//! # Resolve a named range without contacting the backend
//! jobdesk range "Last Week"
//! ```

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use jobsheet::insights::InsightDimension;
use jobsheet::picker::PickerCategory;
use jobsheet::range::{DateRangeKeyword, parse_date};

/// Admin client for the repair-service job-sheet backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "jobdesk", author, version, about, long_about = None)]
pub struct Cli {
    /// Backend base URL
    #[arg(long, env = "JOBDESK_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, env = "JOBDESK_TIMEOUT_SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Rows per page in job lists (5, 10, 15, 25 or 50)
    #[arg(long, env = "JOBDESK_PAGE_SIZE", global = true)]
    pub page_size: Option<usize>,

    /// Where the login session is stored
    #[arg(long, env = "JOBDESK_SESSION_FILE", global = true)]
    pub session_file: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, env = "JOBDESK_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Day that named ranges and new job sheets are computed from (dd/MM/yyyy)
    #[arg(long, env = "JOBDESK_TODAY", value_parser = parse_day, global = true, hide = true)]
    pub today: Option<NaiveDate>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR", global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sign in and store the session
    Login(LoginArgs),

    /// Sign out and remove the stored session
    Logout,

    /// Show the dates a named range resolves to
    Range(RangeArgs),

    /// Job sheets
    #[command(subcommand)]
    Jobs(JobsCommand),

    /// Values offered by the job-sheet select fields
    #[command(subcommand)]
    Pickers(PickersCommand),

    /// Operator accounts (admin only)
    #[command(subcommand)]
    Users(UsersCommand),

    /// Change your login or transaction password
    Password(PasswordArgs),

    /// Job counts grouped by mode of contact (admin only)
    Insights(InsightsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long, short = 'u')]
    pub username: String,

    #[arg(long, env = "JOBDESK_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Args, Debug, Clone)]
pub struct RangeArgs {
    /// Range label, e.g. "This Month"; all ranges when omitted
    #[arg(value_parser = parse_keyword)]
    pub range: Option<DateRangeKeyword>,
}

/// Date filter shared by the job list and insights.
#[derive(Args, Debug, Clone, Default)]
pub struct DateFilterArgs {
    /// Named range [default: "This Financial Year"]
    #[arg(long, value_parser = parse_keyword)]
    pub range: Option<DateRangeKeyword>,

    /// Start date (dd/MM/yyyy), overrides the range start
    #[arg(long, value_parser = parse_day)]
    pub from: Option<NaiveDate>,

    /// End date (dd/MM/yyyy), overrides the range end
    #[arg(long, value_parser = parse_day)]
    pub to: Option<NaiveDate>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum JobsCommand {
    /// List job sheets in a date range
    List(ListArgs),

    /// Show one job sheet with its profit
    Show { job_id: String },

    /// Print a job sheet for the customer
    Print { job_id: String },

    /// Show the id the next job sheet will get
    NextId,

    /// Create a job sheet
    Create(JobFields),

    /// Edit a job sheet; only the given fields change
    Edit {
        job_id: String,
        #[command(flatten)]
        fields: JobFields,
    },

    /// Delete a job sheet (admin only)
    Delete {
        job_id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub dates: DateFilterArgs,

    /// Status filter: All, Un Purchased, Purchased or a job status
    #[arg(long, default_value = jobsheet::filter::DEFAULT_STATUS)]
    pub status: String,

    /// Search job id, customer name or mobile
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Page to show, counted from 1
    #[arg(long, short = 'p', default_value_t = 1)]
    pub page: usize,
}

/// Job-sheet fields. Unset fields keep their current (or default) value.
#[derive(Args, Debug, Clone, Default)]
pub struct JobFields {
    #[arg(long)]
    pub customer: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub engineer: Option<String>,
    /// Mode of contact
    #[arg(long)]
    pub moc: Option<String>,
    /// Intake date (dd/MM/yyyy)
    #[arg(long, value_parser = parse_day)]
    pub in_date: Option<NaiveDate>,
    /// Promised delivery date (dd/MM/yyyy)
    #[arg(long, value_parser = parse_day)]
    pub out_date: Option<NaiveDate>,
    #[arg(long)]
    pub assets: Option<String>,
    #[arg(long)]
    pub product: Option<String>,
    #[arg(long)]
    pub serial: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub fault_type: Option<String>,
    #[arg(long)]
    pub fault_desc: Option<String>,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long)]
    pub solution: Option<String>,
    #[arg(long)]
    pub amount: Option<String>,
    #[arg(long)]
    pub purchase_amount: Option<String>,
    #[arg(long)]
    pub purchased: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum PickersCommand {
    /// Show every picker list
    List,

    /// Show one category (ENGINEER, MOC, ASSET, PRODUCT, FAULT, STATUS)
    Category {
        #[arg(value_parser = parse_category)]
        category: PickerCategory,
    },

    /// Add a value (admin only)
    Add {
        #[arg(value_parser = parse_category)]
        category: PickerCategory,
        name: String,
    },

    /// Rename a value (admin only)
    Rename {
        #[arg(value_parser = parse_category)]
        category: PickerCategory,
        old_name: String,
        new_name: String,
    },

    /// Remove a value (admin only)
    Remove {
        #[arg(value_parser = parse_category)]
        category: PickerCategory,
        name: String,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum UsersCommand {
    /// List operator accounts
    List,

    /// Create an operator account
    Create {
        #[arg(long)]
        username: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        /// Your transaction password
        #[arg(long, env = "JOBDESK_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: String,
    },

    /// Reset an account's password
    ResetPassword { username: String },

    /// Delete an account
    Delete {
        username: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PasswordArgs {
    #[arg(long)]
    pub old: String,

    #[arg(long)]
    pub new: String,

    #[arg(long)]
    pub confirm: String,

    /// Change the transaction password instead of the login password
    #[arg(long)]
    pub transaction: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InsightsArgs {
    #[command(flatten)]
    pub dates: DateFilterArgs,

    /// Field to group by
    #[arg(long, default_value = "MOC", value_parser = parse_dimension)]
    pub by: InsightDimension,
}

impl Cli {
    /// Parse command line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create CLI from iterator (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if argument parsing fails.
    pub fn try_parse_from<I, T>(iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(iter)
    }

    /// Log filter directive for the verbosity count.
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}

fn parse_keyword(s: &str) -> Result<DateRangeKeyword, String> {
    s.parse().map_err(|e: jobsheet::Error| e.to_string())
}

fn parse_day(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_category(s: &str) -> Result<PickerCategory, String> {
    s.parse().map_err(|e: jobsheet::Error| e.to_string())
}

fn parse_dimension(s: &str) -> Result<InsightDimension, String> {
    s.parse().map_err(|e: jobsheet::Error| e.to_string())
}
