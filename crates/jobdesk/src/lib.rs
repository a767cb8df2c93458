#![forbid(unsafe_code)]
// Allow pedantic lints for early-stage API ergonomics.
#![allow(clippy::nursery)]
#![allow(clippy::pedantic)]

//! # Jobdesk
//!
//! Terminal admin client for a repair-service job-sheet backend.
//!
//! The library half exists so the binary and the integration tests share the
//! same code paths.
//!
//! ## Public Modules
//!
//! - [`api`] - Blocking JSON-over-HTTP client and the [`api::JobsApi`] trait
//! - [`cli`] - Command-line arguments
//! - [`commands`] - Command dispatch
//! - [`config`] - Runtime configuration
//! - [`screens`] - Filter forms wired to the fetch layer
//! - [`session`] - The persisted login

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod output;
pub mod screens;
pub mod session;

pub use error::{Error, Result};
