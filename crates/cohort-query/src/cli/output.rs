//! Output formatting utilities

use anyhow::{Context, Result};
use colored::Colorize;
use cohort_query_diagnostics::QueryError;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;

/// When to color output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorMode {
    #[default]
    Auto,
    Always,
    Never,
}

/// Set up color output based on user preference
pub fn setup_colors(mode: ColorMode) {
    let enabled = match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => std::io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    };
    colored::control::set_override(enabled);
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Format a location prefix (`file:line`)
pub fn format_location(file: &str, line: usize) -> String {
    format!("{}:{}", file.cyan(), line)
}

/// Render a query error against the text it was raised for
pub fn render_query_error(error: &QueryError, query: &str) -> String {
    error.to_diagnostic().render(query)
}

/// Turn a query error into an `anyhow` error carrying the rendered diagnostic
pub fn query_failure(error: QueryError, query: &str) -> anyhow::Error {
    anyhow::anyhow!("{}", render_query_error(&error, query))
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        writeln!(file, "{}", content)
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!(
            "{}",
            format_success(&format!("Output written to {}", path.display()))
        );
    } else {
        println!("{}", content);
    }
    Ok(())
}
