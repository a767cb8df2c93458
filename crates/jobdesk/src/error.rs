//! Top-level error for command execution.

use std::io;

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::session::SessionError;

/// Anything a command can fail with.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] jobsheet::Error),

    /// A destructive command was run without confirmation.
    #[error("refusing to {0} without --yes")]
    NotConfirmed(String),

    #[error("cannot write output: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    /// Returns true if signing in again would fix this.
    #[must_use]
    pub fn needs_login(&self) -> bool {
        match self {
            Self::Session(SessionError::NotLoggedIn | SessionError::Expired(_)) => true,
            Self::Api(api) => api.is_unauthorized(),
            _ => false,
        }
    }
}

/// A specialized [`Result`] type for commands.
pub type Result<T> = std::result::Result<T, Error>;
