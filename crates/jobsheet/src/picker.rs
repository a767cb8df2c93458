//! Backend-managed value lists for the job-sheet select fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Allowed values for every classification field of a job sheet.
///
/// Fetched fresh for each screen; never cached.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerList {
    pub engineers: Vec<String>,
    pub moc: Vec<String>,
    pub assets_type: Vec<String>,
    pub products: Vec<String>,
    pub faults: Vec<String>,
    pub job_status: Vec<String>,
}

impl PickerList {
    /// Values for one category.
    #[must_use]
    pub fn values(&self, category: PickerCategory) -> &[String] {
        match category {
            PickerCategory::Engineer => &self.engineers,
            PickerCategory::Moc => &self.moc,
            PickerCategory::Asset => &self.assets_type,
            PickerCategory::Product => &self.products,
            PickerCategory::Fault => &self.faults,
            PickerCategory::Status => &self.job_status,
        }
    }

    /// First value of a category, used to pre-select a blank form.
    #[must_use]
    pub fn first(&self, category: PickerCategory) -> Option<&str> {
        self.values(category).first().map(String::as_str)
    }

    /// Returns true if `value` is currently allowed for `category`.
    #[must_use]
    pub fn allows(&self, category: PickerCategory, value: &str) -> bool {
        self.values(category).iter().any(|v| v == value)
    }
}

/// The six picker menus the options screen manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PickerCategory {
    Engineer,
    Moc,
    Asset,
    Product,
    Fault,
    Status,
}

impl PickerCategory {
    /// Menu order on the options screen.
    pub const ALL: [Self; 6] = [
        Self::Engineer,
        Self::Moc,
        Self::Asset,
        Self::Product,
        Self::Fault,
        Self::Status,
    ];

    /// Wire name sent as `menuSelected`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Engineer => "ENGINEER",
            Self::Moc => "MOC",
            Self::Asset => "ASSET",
            Self::Product => "PRODUCT",
            Self::Fault => "FAULT",
            Self::Status => "STATUS",
        }
    }
}

impl fmt::Display for PickerCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PickerCategory {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownPickerCategory(s.to_string()))
    }
}
