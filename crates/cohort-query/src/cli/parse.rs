//! Parse command implementation

use super::output;
use anyhow::{Context, Result};
use cohort_query_parser::{ParseOptions, Parser};

/// How the parsed tree is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TreeFormat {
    /// Canonical query text
    #[default]
    Text,
    /// Rust debug representation
    Debug,
    /// JSON tree, readable by `lower`
    Json,
}

/// Configuration for parse command
pub struct ParseConfig {
    pub query: String,
    pub format: TreeFormat,
    pub max_depth: usize,
}

/// Parse a query and print its tree
pub fn parse(config: &ParseConfig) -> Result<String> {
    let parser = Parser::with_options(ParseOptions {
        max_depth: config.max_depth,
    });
    let expr = parser
        .parse(&config.query)
        .map_err(|e| output::query_failure(e, &config.query))?;

    let rendered = match config.format {
        TreeFormat::Text => expr.to_string(),
        TreeFormat::Debug => format!("{:#?}", expr),
        TreeFormat::Json => {
            serde_json::to_string_pretty(&expr).context("Failed to serialize expression tree")?
        }
    };
    Ok(rendered)
}
