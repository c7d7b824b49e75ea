//! Domains command implementation

use super::mappings;
use anyhow::{Context, Result};
use cohort_query_domain::{DomainMapping, DomainTable};
use tabled::{Table, Tabled, settings::Style};

/// How the table is printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum DomainsFormat {
    #[default]
    Table,
    /// The JSON form `--mappings` accepts
    Json,
}

/// Configuration for domains command
pub struct DomainsConfig {
    pub mappings: Option<std::path::PathBuf>,
    pub format: DomainsFormat,
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "Code")]
    code: char,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Nested path")]
    path: String,
    #[tabled(rename = "Id field")]
    id_field: String,
    #[tabled(rename = "Value field")]
    value_field: String,
}

impl From<&DomainMapping> for Row {
    fn from(m: &DomainMapping) -> Self {
        Self {
            code: m.code.as_char(),
            name: m.name.clone(),
            field: m.field.clone(),
            path: m.nested.path.clone(),
            id_field: m.nested.id_field.clone(),
            value_field: m.nested.value_field.clone(),
        }
    }
}

/// Print the mapping table in use
pub fn domains(config: &DomainsConfig) -> Result<String> {
    let table = mappings::load_table(config.mappings.as_deref())?;
    match config.format {
        DomainsFormat::Table => Ok(format_table(&table)),
        DomainsFormat::Json => table
            .to_json_pretty()
            .context("Failed to serialize mapping table"),
    }
}

fn format_table(table: &DomainTable) -> String {
    let rows: Vec<Row> = table.iter().map(Row::from).collect();
    Table::new(rows).with(Style::modern()).to_string()
}
