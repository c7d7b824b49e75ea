//! Tests for lowering expression trees into filter documents
//!
//! Covers:
//! - The per-node lowering rules and the outer filter wrapper
//! - Unknown domain and unsupported operator rejection
//! - Lowering against a caller-supplied table

use chrono::{DateTime, TimeZone, Utc};
use cohort_query_ast::*;
use cohort_query_diagnostics::ErrorKind;
use cohort_query_domain::{DomainMapping, DomainTable, NestedDescriptor};
use cohort_query_filter::{FilterCompiler, FilterDocument, compile};
use insta::assert_json_snapshot;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use serde_json::{Value, json};

fn has(letter: char, value: ConceptId) -> Expression {
    Expression::has(DomainCode::new(letter).unwrap(), value)
}

fn jan_1_2020() -> DateBound {
    Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
}

fn compile_value(expr: &Expression) -> Value {
    compile(expr).unwrap().to_value().unwrap()
}

#[test]
fn test_has_is_wrapped_in_filter() {
    assert_eq!(
        compile_value(&has('d', 1125315)),
        json!({"bool": {"filter": {"term": {"drug_ids": 1125315}}}})
    );
}

#[test]
fn test_not() {
    assert_eq!(
        compile_value(&Expression::not(has('d', 1125315))),
        json!({"bool": {"filter": {"bool": {"must_not": {"term": {"drug_ids": 1125315}}}}}})
    );
}

#[test]
fn test_and_with_negation() {
    let expr = Expression::and(has('c', 123), Expression::not(has('d', 345)));
    assert_eq!(
        compile_value(&expr),
        json!({"bool": {"filter": {"bool": {"filter": [
            {"term": {"condition_ids": 123}},
            {"bool": {"must_not": {"term": {"drug_ids": 345}}}}
        ]}}}})
    );
}

#[test]
fn test_or() {
    let expr = Expression::or(has('m', 1), has('c', 2));
    assert_eq!(
        compile_value(&expr),
        json!({"bool": {"filter": {"bool": {"should": [
            {"term": {"measurement_ids": 1}},
            {"term": {"condition_ids": 2}}
        ]}}}})
    );
}

#[test]
fn test_compare_less() {
    let expr = Expression::compare(DomainCode::CONDITION, 123, CompareOp::Less, jan_1_2020());
    assert_json_snapshot!(compile(&expr).unwrap(), @r#"
    {
      "bool": {
        "filter": {
          "nested": {
            "path": "conditions",
            "query": {
              "bool": {
                "filter": [
                  {
                    "term": {
                      "conditions.condition_concept_id": 123
                    }
                  },
                  {
                    "range": {
                      "conditions.condition_start_date": {
                        "lt": "2020-01-01T00:00:00.000Z",
                        "format": "date_time"
                      }
                    }
                  }
                ]
              }
            }
          }
        }
      }
    }
    "#);
}

#[test]
fn test_compare_greater_keeps_milliseconds() {
    let date = DateTime::from_timestamp_millis(1_590_000_000_123).unwrap();
    let expr = Expression::compare(DomainCode::MEASUREMENT, 7, CompareOp::Greater, date);
    assert_json_snapshot!(compile(&expr).unwrap(), @r#"
    {
      "bool": {
        "filter": {
          "nested": {
            "path": "measurements",
            "query": {
              "bool": {
                "filter": [
                  {
                    "term": {
                      "measurements.measurement_concept_id": 7
                    }
                  },
                  {
                    "range": {
                      "measurements.measurement_date": {
                        "gt": "2020-05-20T18:40:00.123Z",
                        "format": "date_time"
                      }
                    }
                  }
                ]
              }
            }
          }
        }
      }
    }
    "#);
}

#[test]
fn test_chain_mirrors_tree_shape() {
    // (has d1 and has d2 or has d3)
    let expr = Expression::or(Expression::and(has('d', 1), has('d', 2)), has('d', 3));
    assert_eq!(
        compile_value(&expr),
        json!({"bool": {"filter": {"bool": {"should": [
            {"bool": {"filter": [{"term": {"drug_ids": 1}}, {"term": {"drug_ids": 2}}]}},
            {"term": {"drug_ids": 3}}
        ]}}}})
    );
}

// === Rejections ===

#[rstest]
#[case::has(has('x', 1))]
#[case::compare(Expression::compare(DomainCode::new('z').unwrap(), 1, CompareOp::Less, jan_1_2020()))]
#[case::deep_inside(Expression::and(has('d', 1), Expression::not(Expression::or(has('c', 2), has('q', 3)))))]
fn test_unknown_domain(#[case] expr: Expression) {
    let err = compile(&expr).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownDomain);
    assert!(err.domain().is_some());
}

#[test]
fn test_unknown_domain_names_the_letter() {
    let err = compile(&has('q', 3)).unwrap_err();
    assert_eq!(err.domain(), Some("q"));
}

#[test]
fn test_equal_aborts_whole_tree() {
    let expr = Expression::and(
        has('d', 1),
        Expression::compare(DomainCode::DRUG, 2, CompareOp::Equal, jan_1_2020()),
    );
    assert_eq!(compile(&expr).unwrap_err().kind(), ErrorKind::UnsupportedComparison);
}

// === Custom tables ===

fn procedure_table() -> DomainTable {
    DomainTable::new([DomainMapping::new(
        DomainCode::new('p').unwrap(),
        "Procedure",
        "procedure_ids",
        NestedDescriptor::new("procedures", "procedure_concept_id", "procedure_date"),
    )])
    .unwrap()
}

#[test]
fn test_custom_table() {
    let table = procedure_table();
    let compiler = FilterCompiler::new(&table);

    let doc = compiler.compile(&has('p', 42)).unwrap();
    assert_eq!(
        doc.to_value().unwrap(),
        json!({"bool": {"filter": {"term": {"procedure_ids": 42}}}})
    );

    // the built-in domains are not implied by a custom table
    assert_eq!(
        compiler.compile(&has('d', 1)).unwrap_err().kind(),
        ErrorKind::UnknownDomain
    );
}

#[test]
fn test_lower_skips_wrapper() {
    let compiler = FilterCompiler::default();
    let expr = has('c', 9);
    let lowered = compiler.lower(&expr).unwrap();
    assert_eq!(compiler.compile(&expr).unwrap(), FilterDocument::wrap(lowered.clone()));
    assert_eq!(compiler.compile(&expr).unwrap().inner(), Some(&lowered));
}

// === Properties ===

fn known_leaf() -> impl Strategy<Value = Expression> {
    let domain = prop::sample::select(vec![
        DomainCode::CONDITION,
        DomainCode::DRUG,
        DomainCode::MEASUREMENT,
    ]);
    prop_oneof![
        (domain.clone(), any::<u64>()).prop_map(|(d, v)| Expression::has(d, v)),
        (
            domain,
            any::<u64>(),
            prop::bool::ANY,
            0i64..4_102_444_800_000
        )
            .prop_map(|(d, concept, less, millis)| {
                let op = if less { CompareOp::Less } else { CompareOp::Greater };
                let date = DateTime::from_timestamp_millis(millis).expect("in range");
                Expression::compare(d, concept, op, date)
            }),
    ]
}

fn known_tree() -> impl Strategy<Value = Expression> {
    known_leaf().prop_recursive(5, 32, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expression::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expression::or(l, r)),
            inner.prop_map(Expression::not),
        ]
    })
}

fn leaf_count(expr: &Expression) -> usize {
    match expr {
        Expression::And { left, right } | Expression::Or { left, right } => {
            leaf_count(left) + leaf_count(right)
        }
        Expression::Not { expr } => leaf_count(expr),
        Expression::Has { .. } | Expression::Compare { .. } => 1,
    }
}

proptest! {
    #[test]
    fn trees_over_known_domains_compile(expr in known_tree()) {
        let doc = compile(&expr);
        prop_assert!(doc.is_ok(), "{:?}", doc);
    }

    #[test]
    fn document_mirrors_tree(expr in known_tree()) {
        // one clause per inner node, one per has, three per compare, plus the wrapper
        let compares = expr.to_string().matches("val(").count();
        let inner_nodes = {
            fn count(e: &Expression) -> usize {
                match e {
                    Expression::And { left, right } | Expression::Or { left, right } => {
                        1 + count(left) + count(right)
                    }
                    Expression::Not { expr } => 1 + count(expr),
                    _ => 0,
                }
            }
            count(&expr)
        };
        let expected = 1 + inner_nodes + leaf_count(&expr) + 3 * compares;
        prop_assert_eq!(compile(&expr).unwrap().query().clause_count(), expected);
    }
}
