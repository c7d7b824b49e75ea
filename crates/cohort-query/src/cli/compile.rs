//! Compile and lower command implementations

use super::{mappings, output};
use anyhow::{Context, Result};
use cohort_query_ast::Expression;
use cohort_query_filter::{DocumentSerializer, FilterCompiler, FilterDocument, JsonSerializer};
use cohort_query_parser::{ParseOptions, Parser};
use std::fs;
use std::path::PathBuf;

/// Configuration for compile command
pub struct CompileConfig {
    pub query: String,
    pub pretty: bool,
    pub mappings: Option<PathBuf>,
    pub max_depth: usize,
}

/// Configuration for lower command
pub struct LowerConfig {
    /// JSON file holding an expression tree
    pub tree: PathBuf,
    pub pretty: bool,
    pub mappings: Option<PathBuf>,
}

/// Compile query text to a filter document
pub fn compile(config: &CompileConfig) -> Result<String> {
    let table = mappings::load_table(config.mappings.as_deref())?;
    let parser = Parser::with_options(ParseOptions {
        max_depth: config.max_depth,
    });

    let expr = parser
        .parse(&config.query)
        .map_err(|e| output::query_failure(e, &config.query))?;
    let document = FilterCompiler::new(&table)
        .compile(&expr)
        .map_err(|e| output::query_failure(e, &config.query))?;

    render(&document, config.pretty)
}

/// Lower a JSON expression tree to a filter document
pub fn lower(config: &LowerConfig) -> Result<String> {
    let table = mappings::load_table(config.mappings.as_deref())?;

    let content = fs::read_to_string(&config.tree)
        .with_context(|| format!("Failed to read tree file: {}", config.tree.display()))?;
    let expr: Expression = serde_json::from_str(&content)
        .with_context(|| format!("Invalid expression tree: {}", config.tree.display()))?;
    log::debug!("Lowering tree from {}: {}", config.tree.display(), expr);

    let document = FilterCompiler::new(&table).compile(&expr)?;
    render(&document, config.pretty)
}

fn render(document: &FilterDocument, pretty: bool) -> Result<String> {
    let serializer = JsonSerializer { pretty };
    serializer
        .serialize(document)
        .context("Failed to serialize filter document")
}
