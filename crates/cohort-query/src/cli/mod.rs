//! CLI functionality for the cohortq tool
//!
//! This module contains all CLI-related functionality including:
//! - Parsing and printing trees
//! - Compiling queries and lowering JSON trees
//! - Validating query files
//! - Listing mapping tables
//! - Output formatting and logging setup

pub mod compile;
pub mod domains;
pub mod mappings;
pub mod output;
pub mod parse;
pub mod validate;

use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber
///
/// `RUST_LOG` selects the filter; `verbose` forces `debug`. Records from
/// the `log` facade used by the library crates are forwarded.
pub fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
