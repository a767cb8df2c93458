//! One-line outcome messages shown after a mutation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Body the backend returns for every mutation, successful or not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default, deserialize_with = "crate::de::text")]
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Success or error banner. At most one is shown at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    /// Success text from a backend response, or `fallback` if it is blank.
    #[must_use]
    pub fn from_response(response: &MessageResponse, fallback: &str) -> Self {
        let text = response.message.trim();
        if text.is_empty() {
            Self::Success(fallback.to_string())
        } else {
            Self::Success(text.to_string())
        }
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(text) => f.write_str(text),
            Self::Error(text) => write!(f, "Error: {text}"),
        }
    }
}
