//! Expression tree to filter document lowering

use crate::model::{FilterDocument, Query, RangeBound};
use cohort_query_ast::{CompareOp, ConceptId, DateBound, DomainCode, Expression};
use cohort_query_diagnostics::{ErrorKind, QueryError, Result};
use cohort_query_domain::{DomainTable, default_table};

/// Lowers expression trees against one mapping table
///
/// Lowering is all-or-nothing: the first unresolvable node aborts the whole
/// tree and no partial document is returned.
#[derive(Debug, Clone, Copy)]
pub struct FilterCompiler<'t> {
    table: &'t DomainTable,
}

impl Default for FilterCompiler<'static> {
    fn default() -> Self {
        Self::new(default_table())
    }
}

impl<'t> FilterCompiler<'t> {
    /// Create a compiler resolving domains through `table`
    pub fn new(table: &'t DomainTable) -> Self {
        Self { table }
    }

    /// The table this compiler resolves domains through
    pub fn table(&self) -> &'t DomainTable {
        self.table
    }

    /// Lower `expr` and wrap it in the outer filter-context clause
    pub fn compile(&self, expr: &Expression) -> Result<FilterDocument> {
        log::debug!(
            "Compiling expression (depth {}, {} domain(s))",
            expr.depth(),
            expr.domains().len()
        );
        let root = self.lower(expr)?;
        Ok(FilterDocument::wrap(root))
    }

    /// Lower `expr` without the outer wrapper
    pub fn lower(&self, expr: &Expression) -> Result<Query> {
        let query = match expr {
            Expression::And { left, right } => Query::all_of(self.lower(left)?, self.lower(right)?),
            Expression::Or { left, right } => Query::any_of(self.lower(left)?, self.lower(right)?),
            Expression::Not { expr } => Query::none_of(self.lower(expr)?),
            Expression::Has { domain, value } => self.lower_has(*domain, *value)?,
            Expression::Compare {
                domain,
                left,
                op,
                right,
            } => self.lower_compare(*domain, *left, *op, right)?,
        };
        log::trace!("Lowered {}", expr);
        Ok(query)
    }

    fn lower_has(&self, domain: DomainCode, value: ConceptId) -> Result<Query> {
        let field = self.table.field_name(domain)?;
        Ok(Query::term(field, value))
    }

    fn lower_compare(
        &self,
        domain: DomainCode,
        concept: ConceptId,
        op: CompareOp,
        date: &DateBound,
    ) -> Result<Query> {
        let nested = self.table.nested_descriptor(domain)?;

        let bound = match op {
            CompareOp::Less => RangeBound::before(date),
            CompareOp::Greater => RangeBound::after(date),
            CompareOp::Equal => {
                return Err(QueryError::lowering(
                    ErrorKind::UnsupportedComparison,
                    format!(
                        "Operator '=' in val({}{}) has no range equivalent; use '<' or '>'",
                        domain, concept
                    ),
                ));
            }
        };

        Ok(Query::nested(
            &nested.path,
            Query::all_of(
                Query::term(nested.qualified_id_field(), concept),
                Query::range(nested.qualified_value_field(), bound),
            ),
        ))
    }
}

/// Lower `expr` with the built-in table
pub fn compile(expr: &Expression) -> Result<FilterDocument> {
    FilterCompiler::default().compile(expr)
}
