//! Client-side form validation.
//!
//! These checks only spare the operator a round trip. The backend remains
//! the authority on what it accepts.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};
use crate::job::JobDraft;

static MOBILE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid regex"));
static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid regex"));

/// Minimum password length for new accounts.
pub const PASSWORD_MIN_LENGTH: usize = 6;

/// Characters that satisfy the special-character rule.
pub const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Password rules in the order they are reported.
pub const PASSWORD_REQUIREMENTS: [&str; 5] = [
    "Minimum 6 characters long",
    "At least one uppercase letter (A-Z)",
    "At least one lowercase letter (a-z)",
    "At least one number (0-9)",
    "At least one special character (!@#$%^&*(),.?\":{}|<>)",
];

/// Ordered `field -> message` failures for one form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    entries: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `field`.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.entries.push((field, message.into()));
    }

    /// Records `message` unless `ok` holds.
    pub fn check(&mut self, ok: bool, field: &'static str, message: &str) {
        if !ok {
            self.add(field, message);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Message for `field`, if it failed.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, msg)| msg.as_str())
    }

    /// Names of the failing fields, in order.
    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// `Ok(())` when nothing failed, otherwise [`Error::Validation`].
    pub fn into_result(self) -> Result<()> {
        if self.entries.is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(
                self.entries.into_iter().map(|(_, msg)| msg).collect(),
            ))
        }
    }
}

fn filled(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Returns true for exactly ten ASCII digits.
#[must_use]
pub fn is_mobile_number(value: &str) -> bool {
    MOBILE.is_match(value)
}

/// Returns true for a plausible `local@domain.tld` address.
#[must_use]
pub fn is_email(value: &str) -> bool {
    EMAIL.is_match(value)
}

/// Checks a job sheet before it is submitted.
#[must_use]
pub fn job_sheet(draft: &JobDraft) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.check(filled(&draft.customer_name), "customerName", "Enter Customer Name");
    errors.check(is_mobile_number(&draft.mobile_no), "mobileNo", "Enter Valid Mobile Number");
    errors.check(
        draft.email.is_empty() || is_email(&draft.email),
        "email",
        "Enter Valid Email Address",
    );
    errors.check(!draft.engineer.is_empty(), "engineer", "Enter Engineer Name");
    errors.check(!draft.moc.is_empty(), "moc", "Enter MOC");
    errors.check(!draft.assets.is_empty(), "assets", "Enter Assets");
    errors.check(!draft.product_make.is_empty(), "productMake", "Enter Product Make");
    errors.check(filled(&draft.serial_no), "serialNo", "Enter Serial No");
    errors.check(!draft.fault_type.is_empty(), "faultType", "Enter Fault Type");
    errors.check(!draft.job_status.is_empty(), "jobStatus", "Enter Job Status");
    errors
}

/// Returns the first password rule `password` breaks.
#[must_use]
pub fn password_policy(password: &str) -> Option<&'static str> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Some("Password must be at least 6 characters long");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Some("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Some("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Some("Password must contain at least one number");
    }
    if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        return Some(
            "Password must contain at least one special character (!@#$%^&*(),.?\":{}|<>)",
        );
    }
    None
}

/// Requires a non-blank value, naming the field in the message.
pub fn required(field: &'static str, label: &str, value: &str, errors: &mut ValidationErrors) {
    if !filled(value) {
        errors.add(field, format!("{label} is required"));
    }
}
