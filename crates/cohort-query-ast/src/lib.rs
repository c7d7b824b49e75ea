//! Cohort query expression tree definitions
//!
//! The tree produced by the parser and consumed by the filter compiler:
//! boolean connectives over two kinds of leaves, concept membership (`has`)
//! and attributed date comparison (`val`).

mod domain;
mod expression;
mod operator;

pub use domain::*;
pub use expression::*;
pub use operator::*;

/// Concept identifier inside a domain
pub type ConceptId = u64;

/// Instant a `val(...)` clause compares against
pub type DateBound = chrono::DateTime<chrono::Utc>;
