//! Job-sheet records as the backend returns them, and the payload used to
//! create or edit one.
//!
//! The backend omits fields freely and sends `null`, numbers or strings for
//! the same column depending on how the row was written. All of that is
//! absorbed here, at deserialization, so the rest of the crate works with
//! plain `String`s and `Option<f64>` amounts.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::picker::{PickerCategory, PickerList};
use crate::range::{format_date, parse_date};
use crate::validate::{self, ValidationErrors};

/// Prefix of every generated job id.
pub const JOB_ID_PREFIX: &str = "iTek";

/// Days between intake and the promised delivery on a fresh job sheet.
pub const DEFAULT_TURNAROUND_DAYS: u64 = 2;

/// One job sheet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct JobRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(deserialize_with = "crate::de::text")]
    pub job_id: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub name: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub mobile: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub email: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub address: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub engineer: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub moc: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub in_date: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub out_date: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub assets: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub product_make: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub serial_no: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub description: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub fault_type: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub fault_desc: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub job_status: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub solution_provided: String,
    #[serde(default, deserialize_with = "crate::de::numeric")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::numeric")]
    pub purchase_amount: Option<f64>,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub purchased: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub created: String,
    #[serde(default, deserialize_with = "crate::de::text")]
    pub last_modified: String,
}

impl JobRecord {
    /// Amount charged minus purchase cost, when both are numbers.
    #[must_use]
    pub fn profit(&self) -> Profit {
        match (self.amount, self.purchase_amount) {
            (Some(amount), Some(purchase)) => Profit::Amount(amount - purchase),
            _ => Profit::NotAvailable,
        }
    }

    /// Intake date, if the stored text parses as `dd/MM/yyyy`.
    #[must_use]
    pub fn in_date(&self) -> Option<NaiveDate> {
        parse_date(&self.in_date).ok()
    }

    /// Promised delivery date, if the stored text parses as `dd/MM/yyyy`.
    #[must_use]
    pub fn out_date(&self) -> Option<NaiveDate> {
        parse_date(&self.out_date).ok()
    }

    /// Amount as shown in the list, blank when missing.
    #[must_use]
    pub fn amount_display(&self) -> String {
        self.amount.map(format_amount).unwrap_or_default()
    }
}

/// Outcome of the profit calculation shown on the detail view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Profit {
    Amount(f64),
    /// One of the money fields is missing or not a number.
    NotAvailable,
}

impl fmt::Display for Profit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Amount(value) => f.write_str(&format_amount(*value)),
            Self::NotAvailable => f.write_str("N/A"),
        }
    }
}

/// Formats an amount without a trailing `.0` for whole values.
#[must_use]
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value}")
    }
}

/// Response of the "last job id" endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LastJobId {
    #[serde(rename = "JOB_ID", default, deserialize_with = "crate::de::text")]
    pub job_id: String,
}

/// Derives the id for the next job sheet from the last one issued.
///
/// Ids look like `iTek` + two-digit year + two-digit month + a three-digit
/// sequence. Only the last three characters of `last` are read; an empty or
/// unparsable tail restarts the sequence at `001`.
///
/// ```rust
/// use chrono::NaiveDate;
/// use jobsheet::job::next_job_id;
///
/// let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// assert_eq!(next_job_id("iTek2405041", today), "iTek2406042");
/// assert_eq!(next_job_id("", today), "iTek2406001");
/// ```
#[must_use]
pub fn next_job_id(last: &str, today: NaiveDate) -> String {
    let tail: String = {
        let chars: Vec<char> = last.trim().chars().collect();
        chars[chars.len().saturating_sub(3)..].iter().collect()
    };
    let previous = tail.parse::<u32>().unwrap_or(0);
    format!(
        "{JOB_ID_PREFIX}{:02}{:02}{:03}",
        today.year().rem_euclid(100),
        today.month(),
        previous + 1
    )
}

/// The insert/edit payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDraft {
    #[serde(rename = "jobID")]
    pub job_id: String,
    pub customer_name: String,
    pub mobile_no: String,
    pub email: String,
    pub address: String,
    pub engineer: String,
    pub moc: String,
    pub in_date: String,
    pub out_date: String,
    pub assets: String,
    pub product_make: String,
    pub serial_no: String,
    pub description: String,
    pub fault_type: String,
    pub fault_desc: String,
    pub job_status: String,
    pub solution_provided: String,
    pub amount: String,
    pub purchase_amount: String,
    pub purchased_status: String,
    /// Display name of the operator submitting the sheet.
    pub name: String,
}

impl JobDraft {
    /// A fresh job sheet with the first value of each picker pre-selected.
    #[must_use]
    pub fn blank(job_id: impl Into<String>, pickers: &PickerList, today: NaiveDate) -> Self {
        let pick = |category| pickers.first(category).unwrap_or_default().to_string();
        let out = today
            .checked_add_days(Days::new(DEFAULT_TURNAROUND_DAYS))
            .unwrap_or(today);
        Self {
            job_id: job_id.into(),
            engineer: pick(PickerCategory::Engineer),
            moc: pick(PickerCategory::Moc),
            assets: pick(PickerCategory::Asset),
            product_make: pick(PickerCategory::Product),
            fault_type: pick(PickerCategory::Fault),
            job_status: pick(PickerCategory::Status),
            in_date: format_date(today),
            out_date: format_date(out),
            ..Self::default()
        }
    }

    /// Pre-fills an edit form from an existing record.
    #[must_use]
    pub fn from_record(record: &JobRecord) -> Self {
        Self {
            job_id: record.job_id.trim().to_string(),
            customer_name: record.name.clone(),
            mobile_no: record.mobile.clone(),
            email: record.email.clone(),
            address: record.address.clone(),
            engineer: record.engineer.clone(),
            moc: record.moc.clone(),
            in_date: record.in_date.clone(),
            out_date: record.out_date.clone(),
            assets: record.assets.clone(),
            product_make: record.product_make.clone(),
            serial_no: record.serial_no.clone(),
            description: record.description.clone(),
            fault_type: record.fault_type.clone(),
            fault_desc: record.fault_desc.clone(),
            job_status: record.job_status.clone(),
            solution_provided: record.solution_provided.clone(),
            amount: record.amount.map(format_amount).unwrap_or_default(),
            purchase_amount: record.purchase_amount.map(format_amount).unwrap_or_default(),
            purchased_status: record.purchased.clone(),
            name: String::new(),
        }
    }

    /// Field-by-field validation errors, empty when the draft can be sent.
    #[must_use]
    pub fn errors(&self) -> ValidationErrors {
        validate::job_sheet(self)
    }

    /// Validates the draft, collecting every failing field.
    pub fn validate(&self) -> Result<()> {
        self.errors().into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn record(amount: Value, purchase: Value) -> JobRecord {
        serde_json::from_value(json!({
            "JOB_ID": "iTek2406001",
            "AMOUNT": amount,
            "PURCHASE_AMOUNT": purchase,
        }))
        .unwrap()
    }

    // =========================================================================
    // Decoding
    // =========================================================================

    #[test]
    fn decodes_full_row() {
        let job: JobRecord = serde_json::from_value(json!({
            "ID": 7,
            "JOB_ID": "iTek2406007",
            "NAME": "Asha",
            "MOBILE": 9876543210_u64,
            "EMAIL": null,
            "IN_DATE": "15/06/2024",
            "OUT_DATE": "17/06/2024",
            "JOB_STATUS": "Pending",
            "AMOUNT": 1500,
            "PURCHASE_AMOUNT": 400.5,
        }))
        .unwrap();

        assert_eq!(job.id, Some(7));
        assert_eq!(job.mobile, "9876543210");
        assert_eq!(job.email, "");
        assert_eq!(job.in_date(), Some(d(2024, 6, 15)));
        assert_eq!(job.out_date(), Some(d(2024, 6, 17)));
        assert_eq!(job.amount, Some(1500.0));
        assert_eq!(job.address, "");
    }

    #[test]
    fn missing_job_id_is_rejected() {
        let result: std::result::Result<JobRecord, _> =
            serde_json::from_value(json!({"NAME": "Asha"}));
        assert!(result.is_err());
    }

    // =========================================================================
    // Profit
    // =========================================================================

    #[test]
    fn profit_subtracts_purchase() {
        let job = record(json!(500), json!(200));
        assert_eq!(job.profit(), Profit::Amount(300.0));
        assert_eq!(job.profit().to_string(), "300");
    }

    #[test]
    fn profit_is_na_when_either_side_is_not_numeric() {
        assert_eq!(record(json!("500"), json!(200)).profit().to_string(), "N/A");
        assert_eq!(record(json!(500), json!(null)).profit().to_string(), "N/A");
        assert_eq!(record(json!(500), json!("")).profit(), Profit::NotAvailable);
    }

    #[test]
    fn format_amount_keeps_fractions() {
        assert_eq!(format_amount(300.0), "300");
        assert_eq!(format_amount(99.5), "99.5");
        assert_eq!(format_amount(-20.0), "-20");
    }

    // =========================================================================
    // Job ids
    // =========================================================================

    #[test]
    fn next_job_id_increments_tail() {
        let today = d(2024, 6, 15);
        assert_eq!(next_job_id("iTek2406009", today), "iTek2406010");
        assert_eq!(next_job_id("  iTek2406099 ", today), "iTek2406100");
    }

    #[test]
    fn next_job_id_restarts_on_garbage() {
        let today = d(2025, 1, 2);
        assert_eq!(next_job_id("abc", today), "iTek2501001");
        assert_eq!(next_job_id("", today), "iTek2501001");
    }

    #[test]
    fn next_job_id_grows_past_three_digits() {
        assert_eq!(next_job_id("iTek2406999", d(2024, 6, 1)), "iTek24061000");
    }

    // =========================================================================
    // Drafts
    // =========================================================================

    #[test]
    fn blank_draft_preselects_first_pickers() {
        let pickers = PickerList {
            engineers: vec!["Ravi".into(), "Anil".into()],
            moc: vec!["Walk-in".into()],
            job_status: vec!["Pending".into()],
            ..PickerList::default()
        };
        let draft = JobDraft::blank("iTek2406001", &pickers, d(2024, 6, 15));
        assert_eq!(draft.engineer, "Ravi");
        assert_eq!(draft.moc, "Walk-in");
        assert_eq!(draft.assets, "");
        assert_eq!(draft.job_status, "Pending");
        assert_eq!(draft.in_date, "15/06/2024");
        assert_eq!(draft.out_date, "17/06/2024");
    }

    #[test]
    fn draft_from_record_copies_fields() {
        let mut job = record(json!(1200), json!(300));
        job.job_id = " iTek2406001 ".into();
        job.name = "Asha".into();
        job.purchased = "Purchased".into();
        let draft = JobDraft::from_record(&job);
        assert_eq!(draft.job_id, "iTek2406001");
        assert_eq!(draft.customer_name, "Asha");
        assert_eq!(draft.amount, "1200");
        assert_eq!(draft.purchase_amount, "300");
        assert_eq!(draft.purchased_status, "Purchased");
    }

    #[test]
    fn draft_serializes_camel_case_keys() {
        let draft = JobDraft {
            job_id: "iTek2406001".into(),
            customer_name: "Asha".into(),
            ..JobDraft::default()
        };
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(value["jobID"], "iTek2406001");
        assert_eq!(value["customerName"], "Asha");
        assert!(value.get("mobileNo").is_some());
        assert!(value.get("solutionProvided").is_some());
    }

    #[test]
    fn last_job_id_tolerates_null() {
        let last: LastJobId = serde_json::from_value(json!({"JOB_ID": null})).unwrap();
        assert_eq!(last.job_id, "");
    }
}
