//! Cohort query error types

use crate::{ErrorCode, ErrorKind, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A diagnostic message with location and context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Source location
    pub location: Option<SourceLocation>,
    /// Additional context or help
    pub help: Option<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            location: None,
            help: code.info().help.map(str::to_string),
        }
    }

    /// Set the location
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Render the diagnostic against the query text it was produced for,
    /// underlining the offending fragment.
    pub fn render(&self, source: &str) -> String {
        let mut out = format!(
            "{}: {}",
            paint_header(&format!("error[{}]", self.code)),
            self.message
        );

        if let Some(loc) = &self.location {
            let line_text = source.lines().nth(loc.line.saturating_sub(1)).unwrap_or("");
            let line_chars = line_text.chars().count();
            let marked = source
                .get(loc.offset..loc.offset + loc.length)
                .map_or(loc.length, |text| text.chars().count());
            let width = marked.clamp(1, line_chars.saturating_sub(loc.column - 1).max(1));
            out.push_str(&format!("\n --> {}\n  | {}\n  | ", loc, line_text));
            out.push_str(&" ".repeat(loc.column.saturating_sub(1)));
            out.push_str(&paint_marker(&"^".repeat(width)));
        }

        if let Some(help) = &self.help {
            out.push_str(&format!("\n  = help: {}", help));
        }

        out
    }
}

#[cfg(feature = "colored")]
fn paint_header(text: &str) -> String {
    use colored::Colorize;
    text.red().bold().to_string()
}

#[cfg(not(feature = "colored"))]
fn paint_header(text: &str) -> String {
    text.to_string()
}

#[cfg(feature = "colored")]
fn paint_marker(text: &str) -> String {
    use colored::Colorize;
    text.red().to_string()
}

#[cfg(not(feature = "colored"))]
fn paint_marker(text: &str) -> String {
    text.to_string()
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {} - {}", self.code, self.message)?;
        if let Some(loc) = &self.location {
            write!(f, " at {}", loc)?;
        }
        Ok(())
    }
}

/// Main cohort query error type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// The query text does not follow the grammar
    #[error("{}: {message}", .kind.code())]
    Parse {
        kind: ErrorKind,
        message: String,
        /// Remainder of the input at the point of failure
        fragment: String,
        location: Option<SourceLocation>,
    },

    /// The expression tree cannot be lowered to a filter document
    #[error("{}: {message}", .kind.code())]
    Lowering {
        kind: ErrorKind,
        message: String,
        /// Domain code or name that failed to resolve
        domain: Option<String>,
    },

    /// A mapping table could not be loaded or validated
    #[error("{}: {message}", .kind.code())]
    Config {
        kind: ErrorKind,
        message: String,
        context: Option<String>,
    },
}

impl QueryError {
    /// Create a parse error
    pub fn parse(kind: ErrorKind, message: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self::Parse {
            kind,
            message: message.into(),
            fragment: fragment.into(),
            location: None,
        }
    }

    /// Create a parse error with location
    pub fn parse_at(
        kind: ErrorKind,
        message: impl Into<String>,
        fragment: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self::Parse {
            kind,
            message: message.into(),
            fragment: fragment.into(),
            location: Some(location),
        }
    }

    /// Create an unknown domain error for a code or name
    pub fn unknown_domain(domain: impl fmt::Display) -> Self {
        let domain = domain.to_string();
        Self::Lowering {
            kind: ErrorKind::UnknownDomain,
            message: format!("Unknown domain '{}'", domain),
            domain: Some(domain),
        }
    }

    /// Create a lowering error that is not tied to a domain
    pub fn lowering(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Lowering {
            kind,
            message: message.into(),
            domain: None,
        }
    }

    /// Create an invariant violation error
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::lowering(ErrorKind::InvariantViolation, message)
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            kind: ErrorKind::Config,
            message: message.into(),
            context: None,
        }
    }

    /// Attach context to a configuration error; other variants are returned unchanged
    pub fn with_context(self, ctx: impl Into<String>) -> Self {
        match self {
            Self::Config { kind, message, .. } => Self::Config {
                kind,
                message,
                context: Some(ctx.into()),
            },
            other => other,
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Parse { kind, .. } | Self::Lowering { kind, .. } | Self::Config { kind, .. } => {
                *kind
            }
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        self.kind().code()
    }

    /// Human-readable message without the code prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Parse { message, .. }
            | Self::Lowering { message, .. }
            | Self::Config { message, .. } => message,
        }
    }

    /// The offending input fragment, for parse errors
    pub fn fragment(&self) -> Option<&str> {
        match self {
            Self::Parse { fragment, .. } => Some(fragment),
            _ => None,
        }
    }

    /// The unresolved domain, for lowering errors
    pub fn domain(&self) -> Option<&str> {
        match self {
            Self::Lowering { domain, .. } => domain.as_deref(),
            _ => None,
        }
    }

    /// Get the location if available
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            Self::Parse { location, .. } => location.as_ref(),
            _ => None,
        }
    }

    /// Convert to a diagnostic
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Self::Parse { message, location, .. } => {
                let mut diag = Diagnostic::error(self.code(), message.clone());
                if let Some(loc) = location {
                    diag = diag.with_location(loc.clone());
                }
                diag
            }
            Self::Lowering { message, .. } => Diagnostic::error(self.code(), message.clone()),
            Self::Config { message, context, .. } => {
                let mut diag = Diagnostic::error(self.code(), message.clone());
                if let Some(ctx) = context {
                    diag = diag.with_help(ctx.clone());
                }
                diag
            }
        }
    }
}
