//! The built-in, process-wide mapping table

use crate::{DomainMapping, DomainTable, NestedDescriptor};
use cohort_query_ast::DomainCode;
use cohort_query_diagnostics::Result;
use std::sync::LazyLock;

static DEFAULT_TABLE: LazyLock<DomainTable> = LazyLock::new(|| {
    DomainTable::from_trusted([
        DomainMapping::new(
            DomainCode::CONDITION,
            "Condition",
            "condition_ids",
            NestedDescriptor::new("conditions", "condition_concept_id", "condition_start_date"),
        ),
        DomainMapping::new(
            DomainCode::DRUG,
            "Drug",
            "drug_ids",
            NestedDescriptor::new("drugs", "drug_concept_id", "drug_exposure_start_date"),
        ),
        DomainMapping::new(
            DomainCode::MEASUREMENT,
            "Measurement",
            "measurement_ids",
            NestedDescriptor::new("measurements", "measurement_concept_id", "measurement_date"),
        ),
    ])
});

/// The built-in table: Condition (`c`), Drug (`d`), Measurement (`m`)
pub fn default_table() -> &'static DomainTable {
    &DEFAULT_TABLE
}

impl DomainTable {
    /// The built-in table
    pub fn builtin() -> &'static DomainTable {
        default_table()
    }
}

/// Code for a human-facing domain name, e.g. `"Drug"` -> `d`
pub fn domain_code_for(name: &str) -> Result<DomainCode> {
    default_table().code_for(name)
}

/// Flat membership field for a code, e.g. `d` -> `drug_ids`
pub fn field_name_for(code: DomainCode) -> Result<&'static str> {
    default_table().field_name(code)
}

/// Nested descriptor for a code
pub fn nested_descriptor_for(code: DomainCode) -> Result<&'static NestedDescriptor> {
    default_table().nested_descriptor(code)
}
