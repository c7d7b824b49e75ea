//! Cohort query diagnostics and error handling
//!
//! This crate provides the error handling infrastructure shared by the parser,
//! the domain tables and the filter compiler: error codes, source locations,
//! and diagnostic reporting.

mod error;
mod error_code;
mod span;

pub use error::*;
pub use error_code::*;
pub use span::*;

/// Result type for cohort query operations
pub type Result<T> = std::result::Result<T, QueryError>;
