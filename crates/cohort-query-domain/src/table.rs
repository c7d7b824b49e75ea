//! Mapping table types and loading

use cohort_query_ast::DomainCode;
use cohort_query_diagnostics::{QueryError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Where attributed facts of a domain live inside each record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NestedDescriptor {
    /// Path of the nested objects (e.g. `conditions`)
    pub path: String,
    /// Concept id field, relative to `path`
    pub id_field: String,
    /// Date field, relative to `path`
    pub value_field: String,
}

impl NestedDescriptor {
    pub fn new(
        path: impl Into<String>,
        id_field: impl Into<String>,
        value_field: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            id_field: id_field.into(),
            value_field: value_field.into(),
        }
    }

    /// `path.id_field`, as nested queries address it
    pub fn qualified_id_field(&self) -> String {
        format!("{}.{}", self.path, self.id_field)
    }

    /// `path.value_field`, as nested queries address it
    pub fn qualified_value_field(&self) -> String {
        format!("{}.{}", self.path, self.value_field)
    }
}

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainMapping {
    pub code: DomainCode,
    /// Human-facing name (`Drug`)
    pub name: String,
    /// Flat field used for membership queries (`drug_ids`)
    pub field: String,
    pub nested: NestedDescriptor,
}

impl DomainMapping {
    pub fn new(
        code: DomainCode,
        name: impl Into<String>,
        field: impl Into<String>,
        nested: NestedDescriptor,
    ) -> Self {
        Self {
            code,
            name: name.into(),
            field: field.into(),
            nested,
        }
    }
}

/// Domain code to field mapping
///
/// Read-only once built. Lookups of absent codes fail with `UnknownDomain`;
/// there is no fallback entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainTable {
    entries: IndexMap<DomainCode, DomainMapping>,
}

impl DomainTable {
    /// Build a table, validating that codes and names are unique and that
    /// no field name is empty
    pub fn new(mappings: impl IntoIterator<Item = DomainMapping>) -> Result<Self> {
        let mut entries: IndexMap<DomainCode, DomainMapping> = IndexMap::new();

        for mapping in mappings {
            validate_mapping(&mapping)?;
            if entries.values().any(|m| m.name == mapping.name) {
                return Err(QueryError::config(format!(
                    "Duplicate domain name '{}'",
                    mapping.name
                )));
            }
            if entries.contains_key(&mapping.code) {
                return Err(QueryError::config(format!(
                    "Duplicate domain code '{}'",
                    mapping.code
                )));
            }
            entries.insert(mapping.code, mapping);
        }

        Ok(Self { entries })
    }

    /// Build a table from mappings known to be valid
    pub(crate) fn from_trusted(mappings: impl IntoIterator<Item = DomainMapping>) -> Self {
        Self {
            entries: mappings.into_iter().map(|m| (m.code, m)).collect(),
        }
    }

    /// Load a table from a JSON array of mappings
    pub fn from_json(json: &str) -> Result<Self> {
        let mappings: Vec<DomainMapping> = serde_json::from_str(json)
            .map_err(|e| QueryError::config(format!("Malformed mapping table: {}", e)))?;
        let table = Self::new(mappings)?;
        log::debug!("loaded mapping table with {} domains", table.len());
        Ok(table)
    }

    /// Load a table from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            QueryError::config(format!("Cannot read mapping table: {}", e))
                .with_context(path.display().to_string())
        })?;
        Self::from_json(&json).map_err(|e| e.with_context(path.display().to_string()))
    }

    /// Serialize the table in the format `from_json` reads
    pub fn to_json_pretty(&self) -> Result<String> {
        let mappings: Vec<&DomainMapping> = self.entries.values().collect();
        serde_json::to_string_pretty(&mappings)
            .map_err(|e| QueryError::config(format!("Cannot serialize mapping table: {}", e)))
    }

    /// Mapping for a code, if present
    pub fn get(&self, code: DomainCode) -> Option<&DomainMapping> {
        self.entries.get(&code)
    }

    /// Mapping for a code
    pub fn mapping(&self, code: DomainCode) -> Result<&DomainMapping> {
        self.get(code).ok_or_else(|| QueryError::unknown_domain(code))
    }

    /// Whether the code has a mapping
    pub fn contains(&self, code: DomainCode) -> bool {
        self.entries.contains_key(&code)
    }

    /// Code for a human-facing domain name (exact match)
    pub fn code_for(&self, name: &str) -> Result<DomainCode> {
        self.entries
            .values()
            .find(|m| m.name == name)
            .map(|m| m.code)
            .ok_or_else(|| QueryError::unknown_domain(name))
    }

    /// Flat membership field for a code
    pub fn field_name(&self, code: DomainCode) -> Result<&str> {
        self.mapping(code).map(|m| m.field.as_str())
    }

    /// Nested descriptor for a code
    pub fn nested_descriptor(&self, code: DomainCode) -> Result<&NestedDescriptor> {
        self.mapping(code).map(|m| &m.nested)
    }

    /// Known codes in table order
    pub fn codes(&self) -> impl Iterator<Item = DomainCode> + '_ {
        self.entries.keys().copied()
    }

    /// Mappings in table order
    pub fn iter(&self) -> impl Iterator<Item = &DomainMapping> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_mapping(mapping: &DomainMapping) -> Result<()> {
    let fields = [
        ("name", &mapping.name),
        ("field", &mapping.field),
        ("nested.path", &mapping.nested.path),
        ("nested.id_field", &mapping.nested.id_field),
        ("nested.value_field", &mapping.nested.value_field),
    ];

    for (label, value) in fields {
        if value.trim().is_empty() {
            return Err(QueryError::config(format!(
                "Domain '{}' has an empty {}",
                mapping.code, label
            )));
        }
    }

    Ok(())
}
