//! Recursive-descent rules
//!
//! Each rule takes the remaining input by `&mut` and advances it past what
//! it consumed, so after a successful call the caller holds the unconsumed
//! remainder. Token-level matching uses winnow; the rules themselves map
//! token failures to the query error kinds.

use crate::date::parse_date_bound;
use crate::normalize::has_outer_parens;
use cohort_query_ast::{CompareOp, ConceptId, DomainCode, Expression};
use cohort_query_diagnostics::{ErrorKind, QueryError, Result, SourceLocation, Span};
use winnow::ascii::{digit1, multispace0, multispace1};
use winnow::combinator::alt;
use winnow::error::ContextError;
use winnow::prelude::*;
use winnow::token::{literal, one_of, take_till};

pub(crate) type Input<'a> = &'a str;

type TokenResult<O> = std::result::Result<O, ContextError>;

fn ws(input: &mut Input<'_>) {
    let _: TokenResult<&str> = multispace0.parse_next(input);
}

fn tag<'s>(input: &mut Input<'s>, text: &'static str) -> TokenResult<&'s str> {
    literal(text).parse_next(input)
}

fn domain_letter(input: &mut Input<'_>) -> TokenResult<char> {
    one_of(|c: char| c.is_ascii_lowercase()).parse_next(input)
}

fn digits<'s>(input: &mut Input<'s>) -> TokenResult<&'s str> {
    digit1.parse_next(input)
}

fn compare_op(input: &mut Input<'_>) -> TokenResult<CompareOp> {
    alt((
        '<'.value(CompareOp::Less),
        '>'.value(CompareOp::Greater),
        '='.value(CompareOp::Equal),
    ))
    .parse_next(input)
}

fn date_token<'s>(input: &mut Input<'s>) -> TokenResult<&'s str> {
    take_till(1.., |c: char| c.is_whitespace() || c == ')').parse_next(input)
}

/// Consume `word` when it is not the prefix of a longer word
fn keyword(input: &mut Input<'_>, word: &'static str) -> bool {
    let checkpoint = *input;
    if tag(input, word).is_ok() && !input.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return true;
    }
    *input = checkpoint;
    false
}

fn starts_not(input: &str) -> bool {
    input
        .strip_prefix("not")
        .is_some_and(|rest| rest.starts_with(char::is_whitespace))
}

/// The word at the start of `rest`, for messages and error spans
fn token_at(rest: &str) -> &str {
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .unwrap_or(rest.len());
    if end == 0 {
        rest.chars().next().map_or("", |c| &rest[..c.len_utf8()])
    } else {
        &rest[..end]
    }
}

/// Largest char boundary of `text` at or below `index`
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Parse state for one call
pub(crate) struct State<'s> {
    /// Text as the caller supplied it; error locations point into it
    original: &'s str,
    /// Text being parsed (the original, possibly trimmed and wrapped)
    source: &'s str,
    leading: usize,
    synthetic_paren: bool,
    depth: usize,
    max_depth: usize,
}

impl<'s> State<'s> {
    pub(crate) fn for_query(original: &'s str, normalized: &'s str, max_depth: usize) -> Self {
        let trimmed = original.trim_start();
        Self {
            original,
            source: normalized,
            leading: original.len() - trimmed.len(),
            synthetic_paren: !has_outer_parens(original.trim()),
            depth: 0,
            max_depth,
        }
    }

    pub(crate) fn for_prefix(source: &'s str, max_depth: usize) -> Self {
        Self {
            original: source,
            source,
            leading: 0,
            synthetic_paren: false,
            depth: 0,
            max_depth,
        }
    }

    /// Build a parse error whose fragment is `rest`, a suffix of the source
    pub(crate) fn error(&self, kind: ErrorKind, message: impl Into<String>, rest: &str) -> QueryError {
        let offset = self.source.len() - rest.len();
        let shifted = if self.synthetic_paren {
            offset.saturating_sub(1)
        } else {
            offset
        };
        let start = floor_char_boundary(self.original, shifted + self.leading);
        let end = floor_char_boundary(self.original, start + token_at(rest).len());
        let location = SourceLocation::from_span(Span::new(start, end), self.original);

        QueryError::parse_at(kind, message, rest, location)
    }

    /// `expr` rule
    pub(crate) fn expr(&mut self, input: &mut Input<'s>) -> Result<Expression> {
        ws(input);
        if self.depth >= self.max_depth {
            return Err(self.error(
                ErrorKind::NestingTooDeep,
                format!("Expression nested deeper than {} levels", self.max_depth),
                *input,
            ));
        }

        self.depth += 1;
        let result = self.alternative(input);
        self.depth -= 1;
        result
    }

    fn alternative(&mut self, input: &mut Input<'s>) -> Result<Expression> {
        if input.starts_with('(') {
            self.group(input)
        } else if input.starts_with("has") {
            self.has_clause(input)
        } else if input.starts_with("val(") {
            self.val_clause(input)
        } else if starts_not(input) {
            self.not_clause(input)
        } else {
            let message = if input.is_empty() {
                "Unexpected end of input, expected an expression".to_string()
            } else {
                format!(
                    "Expected '(', 'has', 'val(' or 'not' but found '{}'",
                    token_at(input)
                )
            };
            Err(self.error(ErrorKind::UnrecognizedInitialToken, message, *input))
        }
    }

    /// `'(' expr (('and'|'or') expr)* ')'`, folded left to right
    ///
    /// Every fold deepens the tree by one level, so it counts against the
    /// depth limit for the rest of the group.
    fn group(&mut self, input: &mut Input<'s>) -> Result<Expression> {
        *input = &input[1..];
        let base = self.depth;
        let result = self.chain(input);
        self.depth = base;
        result
    }

    fn chain(&mut self, input: &mut Input<'s>) -> Result<Expression> {
        let mut left = self.expr(input)?;

        loop {
            ws(input);
            if tag(input, ")").is_ok() {
                return Ok(left);
            }

            let connective = *input;
            let is_and = if keyword(input, "and") {
                true
            } else if keyword(input, "or") {
                false
            } else {
                let message = if input.is_empty() {
                    "Unexpected end of input, expected 'and', 'or' or ')'".to_string()
                } else {
                    format!("Expected 'and', 'or' or ')' but found '{}'", token_at(input))
                };
                return Err(self.error(ErrorKind::UnrecognizedToken, message, *input));
            };

            if self.depth >= self.max_depth {
                return Err(self.error(
                    ErrorKind::NestingTooDeep,
                    format!("Chain of 'and'/'or' nested deeper than {} levels", self.max_depth),
                    connective,
                ));
            }
            self.depth += 1;

            let right = self.expr(input)?;
            left = if is_and {
                Expression::and(left, right)
            } else {
                Expression::or(left, right)
            };
        }
    }

    /// `has <letter><digits>`
    fn has_clause(&self, input: &mut Input<'s>) -> Result<Expression> {
        let start = *input;
        let malformed = || {
            self.error(
                ErrorKind::MalformedHasClause,
                "Malformed has clause, expected 'has <domain letter><concept id>'",
                start,
            )
        };

        tag(input, "has ").map_err(|_| malformed())?;
        let letter = domain_letter(input).map_err(|_| malformed())?;
        let digits_at = *input;
        let value = digits(input).map_err(|_| malformed())?;

        Ok(Expression::has(
            self.domain(letter, start)?,
            self.concept_id(value, digits_at)?,
        ))
    }

    /// `val(<letter><digits>) <op> <date>`
    fn val_clause(&self, input: &mut Input<'s>) -> Result<Expression> {
        let start = *input;
        let malformed = || {
            self.error(
                ErrorKind::MalformedValClause,
                "Malformed val clause, expected 'val(<domain letter><concept id>) <op> <date>'",
                start,
            )
        };

        tag(input, "val(").map_err(|_| malformed())?;
        let letter = domain_letter(input).map_err(|_| malformed())?;
        let digits_at = *input;
        let concept = digits(input).map_err(|_| malformed())?;
        tag(input, ")").map_err(|_| malformed())?;
        ws(input);
        let op = compare_op(input).map_err(|_| malformed())?;
        ws(input);
        let date_at = *input;
        let token = date_token(input).map_err(|_| malformed())?;

        let right = parse_date_bound(token).ok_or_else(|| {
            self.error(
                ErrorKind::InvalidDate,
                format!("'{}' is not a valid date", token),
                date_at,
            )
        })?;

        Ok(Expression::compare(
            self.domain(letter, start)?,
            self.concept_id(concept, digits_at)?,
            op,
            right,
        ))
    }

    /// `not <expr>`
    fn not_clause(&mut self, input: &mut Input<'s>) -> Result<Expression> {
        let start = *input;
        tag(input, "not").map_err(|_| {
            self.error(ErrorKind::UnrecognizedInitialToken, "Expected 'not'", start)
        })?;
        let _: TokenResult<&str> = multispace1.parse_next(input);

        let expr = self.expr(input)?;
        Ok(Expression::not(expr))
    }

    fn domain(&self, letter: char, at: &str) -> Result<DomainCode> {
        DomainCode::new(letter).map_err(|e| self.error(ErrorKind::InvariantViolation, e.message(), at))
    }

    fn concept_id(&self, digits: &str, at: &str) -> Result<ConceptId> {
        digits.parse::<ConceptId>().map_err(|_| {
            self.error(
                ErrorKind::InvalidNumber,
                format!("Concept id '{}' does not fit in 64 bits", digits),
                at,
            )
        })
    }
}
