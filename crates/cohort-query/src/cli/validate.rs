//! Validate command implementation
//!
//! Query files hold one query per line. Blank lines and lines starting
//! with `#` are skipped.

use super::{mappings, output};
use anyhow::{Context, Result};
use colored::Colorize;
use cohort_query_diagnostics::QueryError;
use cohort_query_filter::FilterCompiler;
use cohort_query_parser::{ParseOptions, Parser};
use std::fs;
use std::path::PathBuf;

/// Configuration for validate command
pub struct ValidateConfig {
    pub files: Vec<PathBuf>,
    pub mappings: Option<PathBuf>,
    pub max_depth: usize,
    pub verbose: bool,
}

/// A query that failed to parse or lower
#[derive(Debug)]
pub struct QueryFailure {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub query: String,
    pub error: QueryError,
}

/// Outcome of validating a set of query files
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub files: usize,
    pub checked: usize,
    pub failures: Vec<QueryFailure>,
}

impl ValidationReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Human-readable report, one diagnostic per failure plus a summary
    pub fn render(&self) -> String {
        let mut out = String::new();
        for failure in &self.failures {
            out.push_str(&format!(
                "{} {}\n{}\n\n",
                "✗".red().bold(),
                output::format_location(&failure.file.display().to_string(), failure.line),
                output::render_query_error(&failure.error, &failure.query)
            ));
        }

        if self.is_success() {
            out.push_str(&output::format_success(&format!(
                "All {} queries in {} file(s) compiled",
                self.checked, self.files
            )));
        } else {
            out.push_str(&format!(
                "{} {} of {} queries failed",
                "Validation failed:".red().bold(),
                self.failures.len(),
                self.checked
            ));
        }
        out
    }
}

/// Queries of a file with their 1-based line numbers
pub fn queries_in(content: &str) -> impl Iterator<Item = (usize, &str)> {
    content
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Parse and lower every query in the given files
pub fn validate(config: &ValidateConfig) -> Result<ValidationReport> {
    if config.files.is_empty() {
        anyhow::bail!("No files specified for validation");
    }

    let table = mappings::load_table(config.mappings.as_deref())?;
    let parser = Parser::with_options(ParseOptions {
        max_depth: config.max_depth,
    });
    let compiler = FilterCompiler::new(&table);

    let mut report = ValidationReport::default();
    for file in &config.files {
        if config.verbose {
            eprintln!("Validating: {}", file.display());
        }
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read file: {}", file.display()))?;
        report.files += 1;

        for (line, query) in queries_in(&content) {
            report.checked += 1;
            let result = parser.parse(query).and_then(|expr| compiler.compile(&expr));
            if let Err(error) = result {
                log::debug!("{}:{}: {}", file.display(), line, error);
                report.failures.push(QueryFailure {
                    file: file.clone(),
                    line,
                    query: query.to_string(),
                    error,
                });
            }
        }
    }

    Ok(report)
}
