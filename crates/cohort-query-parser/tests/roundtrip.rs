//! Property tests: canonical text re-parses to the tree it came from

use chrono::DateTime;
use cohort_query_ast::{CompareOp, DomainCode, Expression};
use cohort_query_parser::{ensure_outer_parens, has_outer_parens, parse_query};
use proptest::prelude::*;

fn domain() -> impl Strategy<Value = DomainCode> {
    prop::sample::select(vec![
        DomainCode::CONDITION,
        DomainCode::DRUG,
        DomainCode::MEASUREMENT,
    ])
}

fn leaf() -> impl Strategy<Value = Expression> {
    prop_oneof![
        (domain(), any::<u64>()).prop_map(|(d, v)| Expression::has(d, v)),
        (
            domain(),
            any::<u64>(),
            prop::sample::select(vec![CompareOp::Less, CompareOp::Greater, CompareOp::Equal]),
            // 1970 through 2099, whole milliseconds
            0i64..4_102_444_800_000,
        )
            .prop_map(|(d, concept, op, millis)| {
                let bound = DateTime::from_timestamp_millis(millis).expect("in range");
                Expression::compare(d, concept, op, bound)
            }),
    ]
}

fn expression() -> impl Strategy<Value = Expression> {
    leaf().prop_recursive(6, 48, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expression::and(l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| Expression::or(l, r)),
            inner.prop_map(Expression::not),
        ]
    })
}

proptest! {
    #[test]
    fn display_reparses_to_same_tree(expr in expression()) {
        let text = expr.to_string();
        let parsed = parse_query(&text);
        prop_assert_eq!(parsed.as_ref().ok(), Some(&expr), "text: {}", text);
    }

    #[test]
    fn explicit_wrap_matches_implicit_wrap(expr in expression()) {
        let text = expr.to_string();
        prop_assume!(!has_outer_parens(&text));
        let wrapped = format!("({})", text);
        prop_assert_eq!(parse_query(&text), parse_query(&wrapped));
    }

    #[test]
    fn normalization_is_idempotent(text in "[ a-z0-9()]{0,40}") {
        let once = ensure_outer_parens(&text).into_owned();
        let twice = ensure_outer_parens(&once).into_owned();
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn arbitrary_input_never_panics(text in "\\PC{0,60}") {
        let _ = parse_query(&text);
    }
}
