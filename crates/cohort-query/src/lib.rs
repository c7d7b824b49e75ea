//! Cohort filter query language
//!
//! Turns a human-typed cohort filter such as
//! `has d1125315 and not has c134438` into a search-engine filter document:
//! - Parsing query text into an expression tree
//! - Resolving domain codes through the mapping tables
//! - Lowering the tree into `bool`/`term`/`range`/`nested` clauses
//!
//! # Example
//!
//! ```
//! use cohort_query::compile_to_filter_document;
//!
//! let doc = compile_to_filter_document("has d1125315").unwrap();
//! assert_eq!(
//!     doc.to_value().unwrap(),
//!     serde_json::json!({"bool": {"filter": {"term": {"drug_ids": 1125315}}}})
//! );
//! ```

// Re-export all public APIs from internal crates
pub use cohort_query_ast as ast;
pub use cohort_query_diagnostics as diagnostics;
pub use cohort_query_domain as domain;
pub use cohort_query_filter as filter;
pub use cohort_query_parser as parser;

// Convenience re-exports
pub use cohort_query_ast::{CompareOp, DomainCode, Expression};
pub use cohort_query_diagnostics::{ErrorKind, QueryError, Result};
pub use cohort_query_domain::{DomainTable, default_table};
pub use cohort_query_filter::{FilterCompiler, FilterDocument};

/// Parse query text into an expression tree
///
/// Input lacking one enclosing pair of parentheses is wrapped before
/// parsing, so `has d1 and has d2` and `(has d1 and has d2)` are the same
/// query.
pub fn parse_query(text: &str) -> Result<Expression> {
    cohort_query_parser::parse_query(text)
}

/// Parse and lower query text with the built-in mapping table
pub fn compile_to_filter_document(text: &str) -> Result<FilterDocument> {
    compile_with_table(text, default_table())
}

/// Parse and lower query text with a caller-supplied mapping table
pub fn compile_with_table(text: &str, table: &DomainTable) -> Result<FilterDocument> {
    log::debug!("Compiling query ({} bytes)", text.len());
    let expr = parse_query(text)?;
    FilterCompiler::new(table).compile(&expr)
}

/// Lower an already built tree with the built-in mapping table
pub fn lower_expression(expr: &Expression) -> Result<FilterDocument> {
    FilterCompiler::default().compile(expr)
}

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
