//! Error codes following a structured numbering system
//!
//! Error code ranges:
//! - CQ0001-CQ0099: Parse errors (syntax)
//! - CQ0100-CQ0199: Lowering errors (domain resolution, unsupported constructs)
//! - CQ0200-CQ0299: Configuration errors (mapping tables)

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Error code identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ErrorCode(u16);

impl ErrorCode {
    /// Create a new error code
    pub const fn new(code: u16) -> Self {
        Self(code)
    }

    /// Get the numeric code
    pub const fn code(&self) -> u16 {
        self.0
    }

    /// Get error information for this code
    pub fn info(&self) -> &'static ErrorInfo {
        ERROR_INFO.get(&self.0).unwrap_or(&UNKNOWN_ERROR)
    }

    /// The error kind this code stands for, if it is a known code
    pub const fn kind(&self) -> Option<ErrorKind> {
        let kind = match self.0 {
            1 => ErrorKind::UnrecognizedInitialToken,
            2 => ErrorKind::UnrecognizedToken,
            3 => ErrorKind::MalformedHasClause,
            4 => ErrorKind::MalformedValClause,
            5 => ErrorKind::InvalidNumber,
            6 => ErrorKind::InvalidDate,
            7 => ErrorKind::TrailingInput,
            8 => ErrorKind::NestingTooDeep,
            100 => ErrorKind::UnknownDomain,
            101 => ErrorKind::UnsupportedComparison,
            102 => ErrorKind::InvariantViolation,
            200 => ErrorKind::Config,
            _ => return None,
        };
        Some(kind)
    }

    /// Check if this is a parse error (0001-0099)
    pub const fn is_parse_error(&self) -> bool {
        self.0 >= 1 && self.0 < 100
    }

    /// Check if this is a lowering error (0100-0199)
    pub const fn is_lowering_error(&self) -> bool {
        self.0 >= 100 && self.0 < 200
    }

    /// Check if this is a configuration error (0200-0299)
    pub const fn is_config_error(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CQ{:04}", self.0)
    }
}

/// Machine-readable error kind, one per error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The cursor matches none of `(`, `has`, `val(`, `not `
    UnrecognizedInitialToken,
    /// Expected `and`, `or` or `)` and found something else
    UnrecognizedToken,
    /// `has` not followed by a domain letter and digits
    MalformedHasClause,
    /// `val(...)` clause does not have the required shape
    MalformedValClause,
    /// A digit group does not fit a concept id
    InvalidNumber,
    /// The value of a `val(...)` clause is not a date
    InvalidDate,
    /// Input left over after a complete expression
    TrailingInput,
    /// Parentheses, `not` or `and`/`or` chains nested deeper than allowed
    NestingTooDeep,
    /// Domain code or name absent from the mapping table
    UnknownDomain,
    /// Comparison operator with no lowering rule
    UnsupportedComparison,
    /// Tree shape precondition violated
    InvariantViolation,
    /// Mapping table could not be loaded
    Config,
}

impl ErrorKind {
    /// The error code assigned to this kind
    pub const fn code(self) -> ErrorCode {
        match self {
            Self::UnrecognizedInitialToken => CQ0001,
            Self::UnrecognizedToken => CQ0002,
            Self::MalformedHasClause => CQ0003,
            Self::MalformedValClause => CQ0004,
            Self::InvalidNumber => CQ0005,
            Self::InvalidDate => CQ0006,
            Self::TrailingInput => CQ0007,
            Self::NestingTooDeep => CQ0008,
            Self::UnknownDomain => CQ0100,
            Self::UnsupportedComparison => CQ0101,
            Self::InvariantViolation => CQ0102,
            Self::Config => CQ0200,
        }
    }
}

/// Information about an error code
#[derive(Debug, Clone)]
pub struct ErrorInfo {
    /// Short description of the error
    pub description: &'static str,
    /// Detailed help text
    pub help: Option<&'static str>,
}

impl ErrorInfo {
    const fn new(description: &'static str) -> Self {
        Self {
            description,
            help: None,
        }
    }

    const fn with_help(mut self, help: &'static str) -> Self {
        self.help = Some(help);
        self
    }
}

static UNKNOWN_ERROR: ErrorInfo = ErrorInfo::new("Unknown error");

static ERROR_INFO: LazyLock<HashMap<u16, ErrorInfo>> = LazyLock::new(|| {
    let mut map = HashMap::new();

    // Parse errors (0001-0099)
    map.insert(
        1,
        ErrorInfo::new("Unrecognized initial token")
            .with_help("An expression starts with '(', 'has ', 'val(' or 'not '"),
    );
    map.insert(
        2,
        ErrorInfo::new("Unrecognized token").with_help("Expected 'and', 'or' or ')'"),
    );
    map.insert(
        3,
        ErrorInfo::new("Malformed has clause")
            .with_help("Write 'has' followed by a domain letter and a concept id, e.g. 'has d1125315'"),
    );
    map.insert(
        4,
        ErrorInfo::new("Malformed val clause")
            .with_help("Write 'val(<domain><concept>) <op> <date>', e.g. 'val(c123) > 2020-01-01'"),
    );
    map.insert(5, ErrorInfo::new("Invalid number"));
    map.insert(
        6,
        ErrorInfo::new("Invalid date")
            .with_help("Use YYYY, YYYY-MM, YYYY-MM-DD, an RFC 3339 date-time or epoch milliseconds, within years 0000 to 9999"),
    );
    map.insert(7, ErrorInfo::new("Unexpected trailing input"));
    map.insert(8, ErrorInfo::new("Expression nested too deeply"));

    // Lowering errors (0100-0199)
    map.insert(
        100,
        ErrorInfo::new("Unknown domain").with_help("Known domains are listed by 'cohortq domains'"),
    );
    map.insert(
        101,
        ErrorInfo::new("Unsupported comparison")
            .with_help("Only '<' and '>' can be compiled for val(...) clauses"),
    );
    map.insert(102, ErrorInfo::new("Invariant violation"));

    // Configuration errors (0200-0299)
    map.insert(200, ErrorInfo::new("Invalid mapping table"));

    map
});

/// Unrecognized initial token
pub const CQ0001: ErrorCode = ErrorCode::new(1);
/// Unrecognized token
pub const CQ0002: ErrorCode = ErrorCode::new(2);
/// Malformed has clause
pub const CQ0003: ErrorCode = ErrorCode::new(3);
/// Malformed val clause
pub const CQ0004: ErrorCode = ErrorCode::new(4);
/// Invalid number
pub const CQ0005: ErrorCode = ErrorCode::new(5);
/// Invalid date
pub const CQ0006: ErrorCode = ErrorCode::new(6);
/// Trailing input
pub const CQ0007: ErrorCode = ErrorCode::new(7);
/// Nesting too deep
pub const CQ0008: ErrorCode = ErrorCode::new(8);
/// Unknown domain
pub const CQ0100: ErrorCode = ErrorCode::new(100);
/// Unsupported comparison
pub const CQ0101: ErrorCode = ErrorCode::new(101);
/// Invariant violation
pub const CQ0102: ErrorCode = ErrorCode::new(102);
/// Invalid mapping table
pub const CQ0200: ErrorCode = ErrorCode::new(200);
