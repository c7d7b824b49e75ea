//! Mapping table selection for commands taking `--mappings`

use anyhow::{Context, Result};
use cohort_query_domain::{DomainTable, default_table};
use std::borrow::Cow;
use std::path::Path;

/// The table at `path`, or the built-in one when no path is given
pub fn load_table(path: Option<&Path>) -> Result<Cow<'static, DomainTable>> {
    match path {
        Some(path) => {
            let table = DomainTable::from_file(path)
                .with_context(|| format!("Failed to load mapping table: {}", path.display()))?;
            log::debug!("Using mapping table {} ({} domains)", path.display(), table.len());
            Ok(Cow::Owned(table))
        }
        None => Ok(Cow::Borrowed(default_table())),
    }
}
