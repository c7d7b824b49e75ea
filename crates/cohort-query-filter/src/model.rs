//! Filter document model
//!
//! Mirrors the clause vocabulary of the search engine's query DSL closely
//! enough that `serde_json` output is the request body as-is:
//!
//! ```json
//! {"bool": {"filter": {"term": {"drug_ids": 1125315}}}}
//! ```

use chrono::SecondsFormat;
use cohort_query_ast::{ConceptId, DateBound};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Format annotation attached to every date range bound
pub const DATE_TIME_FORMAT: &str = "date_time";

/// One clause of a filter document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Query {
    Bool(BoolQuery),
    Term(TermQuery),
    Range(RangeQuery),
    Nested(NestedQuery),
}

impl Query {
    /// `{"bool": {"filter": [left, right]}}`
    pub fn all_of(left: Query, right: Query) -> Self {
        Query::Bool(BoolQuery {
            filter: Some(Clauses::Many(vec![left, right])),
            ..Default::default()
        })
    }

    /// `{"bool": {"should": [left, right]}}`
    pub fn any_of(left: Query, right: Query) -> Self {
        Query::Bool(BoolQuery {
            should: Some(Clauses::Many(vec![left, right])),
            ..Default::default()
        })
    }

    /// `{"bool": {"must_not": query}}`
    pub fn none_of(query: Query) -> Self {
        Query::Bool(BoolQuery {
            must_not: Some(Box::new(query)),
            ..Default::default()
        })
    }

    /// `{"bool": {"filter": query}}`
    pub fn filtered(query: Query) -> Self {
        Query::Bool(BoolQuery {
            filter: Some(Clauses::One(Box::new(query))),
            ..Default::default()
        })
    }

    pub fn term(field: impl Into<String>, value: ConceptId) -> Self {
        Query::Term(TermQuery {
            field: field.into(),
            value,
        })
    }

    pub fn range(field: impl Into<String>, bound: RangeBound) -> Self {
        Query::Range(RangeQuery {
            field: field.into(),
            bound,
        })
    }

    pub fn nested(path: impl Into<String>, query: Query) -> Self {
        Query::Nested(NestedQuery {
            path: path.into(),
            query: Box::new(query),
        })
    }

    /// Number of clauses in this subtree, this one included
    pub fn clause_count(&self) -> usize {
        match self {
            Query::Bool(b) => {
                let clauses = |c: &Option<Clauses>| c.as_ref().map_or(0, Clauses::clause_count);
                1 + clauses(&b.filter)
                    + clauses(&b.should)
                    + b.must_not.as_ref().map_or(0, |q| q.clause_count())
            }
            Query::Nested(n) => 1 + n.query.clause_count(),
            Query::Term(_) | Query::Range(_) => 1,
        }
    }
}

/// Boolean combination in filter context (no scoring)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<Clauses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub should: Option<Clauses>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub must_not: Option<Box<Query>>,
}

/// A single clause or a list of clauses
///
/// The engine accepts both shapes; a lone clause is written without the
/// surrounding array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Clauses {
    One(Box<Query>),
    Many(Vec<Query>),
}

impl Clauses {
    pub fn iter(&self) -> impl Iterator<Item = &Query> {
        match self {
            Clauses::One(q) => std::slice::from_ref(&**q).iter(),
            Clauses::Many(qs) => qs.iter(),
        }
    }

    fn clause_count(&self) -> usize {
        self.iter().map(Query::clause_count).sum()
    }
}

/// Exact match, serialized as `{"<field>": <value>}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, ConceptId>",
    into = "BTreeMap<String, ConceptId>"
)]
pub struct TermQuery {
    pub field: String,
    pub value: ConceptId,
}

impl From<TermQuery> for BTreeMap<String, ConceptId> {
    fn from(term: TermQuery) -> Self {
        BTreeMap::from([(term.field, term.value)])
    }
}

impl TryFrom<BTreeMap<String, ConceptId>> for TermQuery {
    type Error = String;

    fn try_from(map: BTreeMap<String, ConceptId>) -> Result<Self, Self::Error> {
        let (field, value) = single_field("term", map)?;
        Ok(Self { field, value })
    }
}

/// Range match, serialized as `{"<field>": {"lt": ..., "format": ...}}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, RangeBound>",
    into = "BTreeMap<String, RangeBound>"
)]
pub struct RangeQuery {
    pub field: String,
    pub bound: RangeBound,
}

impl From<RangeQuery> for BTreeMap<String, RangeBound> {
    fn from(range: RangeQuery) -> Self {
        BTreeMap::from([(range.field, range.bound)])
    }
}

impl TryFrom<BTreeMap<String, RangeBound>> for RangeQuery {
    type Error = String;

    fn try_from(map: BTreeMap<String, RangeBound>) -> Result<Self, Self::Error> {
        let (field, bound) = single_field("range", map)?;
        Ok(Self { field, bound })
    }
}

fn single_field<V>(clause: &str, map: BTreeMap<String, V>) -> Result<(String, V), String> {
    if map.len() != 1 {
        return Err(format!(
            "'{}' clause must name exactly one field, found {}",
            clause,
            map.len()
        ));
    }
    map.into_iter()
        .next()
        .ok_or_else(|| format!("'{}' clause is empty", clause))
}

/// Bounds of a range clause
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeBound {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<String>,
    pub format: String,
}

impl RangeBound {
    /// Strictly before `date`
    pub fn before(date: &DateBound) -> Self {
        Self {
            lt: Some(format_date(date)),
            gt: None,
            format: DATE_TIME_FORMAT.to_string(),
        }
    }

    /// Strictly after `date`
    pub fn after(date: &DateBound) -> Self {
        Self {
            lt: None,
            gt: Some(format_date(date)),
            format: DATE_TIME_FORMAT.to_string(),
        }
    }
}

/// ISO 8601 with milliseconds and `Z`, e.g. `2020-01-01T00:00:00.000Z`
pub fn format_date(date: &DateBound) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Query scoped to nested objects under `path`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedQuery {
    pub path: String,
    pub query: Box<Query>,
}

/// A compiled filter document
///
/// Always a `bool` query whose `filter` holds the lowered root, so the
/// engine evaluates it in filter context whatever the root clause is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterDocument {
    root: Query,
}

impl FilterDocument {
    /// Wrap a lowered root in the outer `{"bool": {"filter": ...}}`
    pub fn wrap(root: Query) -> Self {
        Self {
            root: Query::filtered(root),
        }
    }

    /// The outer `bool` clause
    pub fn query(&self) -> &Query {
        &self.root
    }

    /// The lowered root inside the outer wrapper
    pub fn inner(&self) -> Option<&Query> {
        match &self.root {
            Query::Bool(BoolQuery {
                filter: Some(Clauses::One(inner)),
                ..
            }) => Some(inner),
            _ => None,
        }
    }

    pub fn into_query(self) -> Query {
        self.root
    }

    /// As a generic JSON value, ready to embed in a request body
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_term_shape() {
        let value = serde_json::to_value(Query::term("drug_ids", 1125315)).unwrap();
        assert_eq!(value, json!({"term": {"drug_ids": 1125315}}));
    }

    #[test]
    fn test_range_shape() {
        let date = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let value =
            serde_json::to_value(Query::range("conditions.condition_start_date", RangeBound::before(&date)))
                .unwrap();
        assert_eq!(
            value,
            json!({"range": {"conditions.condition_start_date": {
                "lt": "2020-01-01T00:00:00.000Z",
                "format": "date_time"
            }}})
        );
    }

    #[test]
    fn test_bool_omits_absent_occurrences() {
        let value = serde_json::to_value(Query::none_of(Query::term("drug_ids", 1))).unwrap();
        assert_eq!(value, json!({"bool": {"must_not": {"term": {"drug_ids": 1}}}}));
    }

    #[test]
    fn test_document_wraps_root() {
        let doc = FilterDocument::wrap(Query::term("drug_ids", 7));
        assert_eq!(
            doc.to_value().unwrap(),
            json!({"bool": {"filter": {"term": {"drug_ids": 7}}}})
        );
        assert_eq!(doc.inner(), Some(&Query::term("drug_ids", 7)));
    }

    #[test]
    fn test_deserialize_document() {
        let doc: FilterDocument = serde_json::from_value(json!({"bool": {"filter": [
            {"term": {"condition_ids": 1}},
            {"bool": {"should": [{"term": {"drug_ids": 2}}, {"term": {"drug_ids": 3}}]}}
        ]}}))
        .unwrap();
        assert_eq!(
            doc.into_query(),
            Query::all_of(
                Query::term("condition_ids", 1),
                Query::any_of(Query::term("drug_ids", 2), Query::term("drug_ids", 3))
            )
        );
    }

    #[test]
    fn test_term_with_two_fields_is_rejected() {
        let result: Result<Query, _> =
            serde_json::from_value(json!({"term": {"drug_ids": 1, "condition_ids": 2}}));
        assert!(result.is_err());
    }

    #[test]
    fn test_clause_count() {
        let q = Query::all_of(
            Query::term("a", 1),
            Query::none_of(Query::nested("p", Query::term("p.x", 2))),
        );
        assert_eq!(q.clause_count(), 5);
    }
}
