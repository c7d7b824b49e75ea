//! Cohort query parser
//!
//! Recursive descent over a small grammar:
//!
//! ```text
//! expr      := '(' expr ( ('and'|'or') expr )* ')'
//!            | 'has ' domainLetter digits
//!            | 'val(' domainLetter digits ')' ws compareOp ws date
//!            | 'not' ws expr
//! compareOp := '<' | '>' | '='
//! ```
//!
//! Chains inside one pair of parentheses associate left to right in the
//! order written; `and` does not bind tighter than `or`. Input that is not
//! already enclosed in one pair of parentheses is wrapped before parsing.

mod date;
mod grammar;
mod normalize;

pub use date::parse_date_bound;
pub use normalize::{ensure_outer_parens, has_outer_parens};

use cohort_query_ast::Expression;
use cohort_query_diagnostics::{ErrorKind, Result};
use grammar::State;

/// Default bound on nested parentheses and `not`
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Parser settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Deepest nesting of groups and negations accepted
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Query parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    /// Create a parser with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with the given options
    pub fn with_options(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse a complete query, wrapping it in parentheses first if needed
    pub fn parse(&self, text: &str) -> Result<Expression> {
        let normalized = ensure_outer_parens(text);
        log::debug!("parsing query ({} bytes)", normalized.len());

        let mut state = State::for_query(text, &normalized, self.options.max_depth);
        let mut input: &str = &normalized;
        let expr = state.expr(&mut input)?;

        let rest = input.trim_start();
        if !rest.is_empty() {
            return Err(state.error(
                ErrorKind::TrailingInput,
                "Unexpected input after complete expression",
                rest,
            ));
        }

        Ok(expr)
    }

    /// Parse one expression from the start of `text` without normalizing it,
    /// returning the unconsumed remainder alongside the tree
    pub fn parse_prefix<'s>(&self, text: &'s str) -> Result<(&'s str, Expression)> {
        let mut state = State::for_prefix(text, self.options.max_depth);
        let mut input = text;
        let expr = state.expr(&mut input)?;
        Ok((input, expr))
    }
}

/// Parse a complete query with default options
pub fn parse_query(text: &str) -> Result<Expression> {
    Parser::new().parse(text)
}

/// Parse one expression from the start of `text`; see [`Parser::parse_prefix`]
pub fn parse_prefix(text: &str) -> Result<(&str, Expression)> {
    Parser::new().parse_prefix(text)
}

