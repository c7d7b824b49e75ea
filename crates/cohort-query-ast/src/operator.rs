//! Comparison operators of `val(...)` clauses

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operator between an attributed value and a date bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    /// `<`
    #[serde(rename = "<")]
    Less,
    /// `>`
    #[serde(rename = ">")]
    Greater,
    /// `=`
    #[serde(rename = "=")]
    Equal,
}

impl CompareOp {
    /// Source symbol of the operator
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Less => "<",
            Self::Greater => ">",
            Self::Equal => "=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
