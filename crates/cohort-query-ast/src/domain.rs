//! Domain codes

use cohort_query_diagnostics::QueryError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Single lowercase letter naming a clinical domain (`c`, `d`, `m`, ...)
///
/// Any lowercase ASCII letter is a valid code as far as the grammar is
/// concerned; whether the code is known is up to the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct DomainCode(char);

impl DomainCode {
    /// Condition domain
    pub const CONDITION: Self = Self('c');
    /// Drug domain
    pub const DRUG: Self = Self('d');
    /// Measurement domain
    pub const MEASUREMENT: Self = Self('m');

    /// Create a domain code, rejecting anything but a lowercase ASCII letter
    pub fn new(letter: char) -> Result<Self, QueryError> {
        if letter.is_ascii_lowercase() {
            Ok(Self(letter))
        } else {
            Err(QueryError::invariant(format!(
                "Domain code must be a lowercase ASCII letter, got {:?}",
                letter
            )))
        }
    }

    /// The code letter
    pub const fn as_char(self) -> char {
        self.0
    }
}

impl TryFrom<char> for DomainCode {
    type Error = QueryError;

    fn try_from(letter: char) -> Result<Self, Self::Error> {
        Self::new(letter)
    }
}

impl From<DomainCode> for char {
    fn from(code: DomainCode) -> Self {
        code.0
    }
}

impl fmt::Display for DomainCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
