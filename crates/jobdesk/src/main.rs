#![forbid(unsafe_code)]

//! # Jobdesk CLI
//!
//! ```bash
//! jobdesk login -u asha            # sign in (password from JOBDESK_PASSWORD)
//! jobdesk jobs list --range "This Month"
//! jobdesk jobs print iTek2406001
//! ```

use std::io;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use jobdesk::cli::Cli;
use jobdesk::commands;
use jobdesk::config::Config;
use jobdesk::output::{Output, error_line};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse_args();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    let config = Config::from_cli(&cli).context("loading configuration")?;
    if !config.color {
        colored::control::set_override(false);
    }
    tracing::debug!(base_url = %config.base_url, page_size = %usize::from(config.page_size), "configuration resolved");

    let mut out = Output::new(io::stdout().lock(), config.color);
    match commands::run(&cli, &config, &mut out) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("{}", error_line(&e.to_string(), config.color));
            if matches!(&e, jobdesk::Error::Api(api) if api.is_unauthorized()) {
                eprintln!("Run `jobdesk login` to sign in.");
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
