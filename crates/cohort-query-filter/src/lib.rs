//! Filter document compilation
//!
//! Lowers a parsed cohort query into the boolean clause vocabulary of the
//! search engine:
//!
//! | expression | clause |
//! |---|---|
//! | `a and b` | `{"bool": {"filter": [a, b]}}` |
//! | `a or b` | `{"bool": {"should": [a, b]}}` |
//! | `not a` | `{"bool": {"must_not": a}}` |
//! | `has d1` | `{"term": {"drug_ids": 1}}` |
//! | `val(d1) < 2020` | `{"nested": {"path": "drugs", "query": ...}}` |
//!
//! The compiled root is always wrapped once more in `{"bool": {"filter": ...}}`.
//!
//! ```
//! use cohort_query_ast::{DomainCode, Expression};
//! use cohort_query_filter::{FilterCompiler, DocumentSerializer, JsonSerializer};
//!
//! let expr = Expression::has(DomainCode::DRUG, 1125315);
//! let doc = FilterCompiler::default().compile(&expr).unwrap();
//! let json = JsonSerializer::new().serialize(&doc).unwrap();
//! assert_eq!(json, r#"{"bool":{"filter":{"term":{"drug_ids":1125315}}}}"#);
//! ```

mod compiler;
mod model;
mod serialize;

pub use compiler::{FilterCompiler, compile};
pub use model::*;
pub use serialize::{DocumentSerializer, JsonSerializer, SerializeError};
