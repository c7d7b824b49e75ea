//! Expression tree nodes

use crate::{CompareOp, ConceptId, DateBound, DomainCode};
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A parsed cohort query
///
/// Trees are built once per parse and only read afterwards. Binary nodes
/// mirror the source order exactly: a chain `(a and b or c)` is
/// `Or(And(a, b), c)`, there is no and-before-or precedence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Expression {
    /// Both operands hold
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// At least one operand holds
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// The operand does not hold
    Not { expr: Box<Expression> },
    /// The record includes concept `value` in `domain`
    Has { domain: DomainCode, value: ConceptId },
    /// The record has a date attributed to concept `left` in `domain`
    /// that compares with `op` against `right`
    Compare {
        domain: DomainCode,
        left: ConceptId,
        op: CompareOp,
        right: DateBound,
    },
}

impl Expression {
    pub fn and(left: Expression, right: Expression) -> Self {
        Self::And {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn or(left: Expression, right: Expression) -> Self {
        Self::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(expr: Expression) -> Self {
        Self::Not {
            expr: Box::new(expr),
        }
    }

    pub fn has(domain: DomainCode, value: ConceptId) -> Self {
        Self::Has { domain, value }
    }

    pub fn compare(domain: DomainCode, left: ConceptId, op: CompareOp, right: DateBound) -> Self {
        Self::Compare {
            domain,
            left,
            op,
            right,
        }
    }

    /// Whether this node is a `has` or `val` leaf
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Has { .. } | Self::Compare { .. })
    }

    /// Number of nodes on the longest root-to-leaf path
    pub fn depth(&self) -> usize {
        match self {
            Self::And { left, right } | Self::Or { left, right } => {
                1 + left.depth().max(right.depth())
            }
            Self::Not { expr } => 1 + expr.depth(),
            Self::Has { .. } | Self::Compare { .. } => 1,
        }
    }

    /// Domain codes referenced anywhere in the tree
    pub fn domains(&self) -> BTreeSet<DomainCode> {
        let mut out = BTreeSet::new();
        self.collect_domains(&mut out);
        out
    }

    fn collect_domains(&self, out: &mut BTreeSet<DomainCode>) {
        match self {
            Self::And { left, right } | Self::Or { left, right } => {
                left.collect_domains(out);
                right.collect_domains(out);
            }
            Self::Not { expr } => expr.collect_domains(out),
            Self::Has { domain, .. } | Self::Compare { domain, .. } => {
                out.insert(*domain);
            }
        }
    }
}

/// Canonical query text. Every binary node is parenthesized, so the output
/// parses back to the same tree.
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And { left, right } => write!(f, "({} and {})", left, right),
            Self::Or { left, right } => write!(f, "({} or {})", left, right),
            Self::Not { expr } => write!(f, "not {}", expr),
            Self::Has { domain, value } => write!(f, "has {}{}", domain, value),
            Self::Compare {
                domain,
                left,
                op,
                right,
            } => write!(
                f,
                "val({}{}) {} {}",
                domain,
                left,
                op,
                right.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn sample() -> Expression {
        Expression::or(
            Expression::and(
                Expression::has(DomainCode::DRUG, 1),
                Expression::not(Expression::has(DomainCode::CONDITION, 2)),
            ),
            Expression::compare(
                DomainCode::MEASUREMENT,
                3,
                CompareOp::Greater,
                Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap(),
            ),
        )
    }

    #[test]
    fn test_display() {
        assert_eq!(
            sample().to_string(),
            "((has d1 and not has c2) or val(m3) > 2020-01-01T00:00:00.000Z)"
        );
    }

    #[test]
    fn test_depth_and_domains() {
        let expr = sample();
        assert_eq!(expr.depth(), 4);
        assert_eq!(
            expr.domains().into_iter().collect::<Vec<_>>(),
            vec![DomainCode::CONDITION, DomainCode::DRUG, DomainCode::MEASUREMENT]
        );
        assert!(!expr.is_leaf());
        assert!(Expression::has(DomainCode::DRUG, 1).is_leaf());
    }

    #[test]
    fn test_serde_shape() {
        let json = serde_json::to_value(Expression::has(DomainCode::DRUG, 1125315)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"type": "has", "domain": "d", "value": 1125315})
        );

        let back: Expression = serde_json::from_value(serde_json::to_value(sample()).unwrap()).unwrap();
        assert_eq!(back, sample());
    }

    #[test]
    fn test_deserialize_rejects_bad_domain() {
        let bad = serde_json::json!({"type": "has", "domain": "D", "value": 1});
        assert!(serde_json::from_value::<Expression>(bad).is_err());
    }
}
