//! Domain mapping tables
//!
//! Static lookup data tying each domain code to the search fields that hold
//! its facts: a flat field for membership (`has`) and a nested descriptor for
//! attributed dates (`val`). The built-in table is created once per process
//! and never mutated; alternative tables can be loaded from JSON as plain
//! values.

mod builtin;
mod table;

pub use builtin::{default_table, domain_code_for, field_name_for, nested_descriptor_for};
pub use table::{DomainMapping, DomainTable, NestedDescriptor};
