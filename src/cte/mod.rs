//! CTE services: collection, decomposition, composition, extraction
//!
//! The layer that exercises the AST end-to-end: the collector and
//! dependency graph read it, the decomposer clones subtrees out of it, and
//! the composer builds a new tree and renders it back to text.

mod collector;
mod compose;
mod decompose;
mod extract;
mod graph;
mod tables;

pub use collector::{CollectedCte, CteCollector};
pub use compose::{CteComposer, CteEdit};
pub use decompose::{CteDecomposer, DecomposedCte};
pub use extract::{extract_cte, ExtractedCte};
pub use tables::TableSourceCollector;

use thiserror::Error;

use crate::ast::{
    BaseTable, DerivedTable, Identifier, NodeComments, QualifiedName, SelectClause, SelectItem,
    SelectQuery, SimpleSelect, StarExpr, TableAlias, TableSource, Value, ValueKind, WithClause,
};
use crate::base::Position;

/// CTE analysis failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CteError {
    #[error("cyclic dependency between CTEs: {}", names.join(", "))]
    CyclicDependency { names: Vec<String> },
    #[error("unknown CTE '{name}'")]
    UnknownCte { name: String },
    #[error("CTE '{name}' references itself but its WITH is not RECURSIVE")]
    RecursiveMarkerMismatch { name: String },
}

/// Compound error for the services that also parse and format
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CteServiceError {
    #[error(transparent)]
    Parse(#[from] crate::parser::ParseError),
    #[error(transparent)]
    Cte(#[from] CteError),
    #[error(transparent)]
    Format(#[from] crate::format::FormatError),
}

impl CteDecomposer {
    /// Extract a single CTE with its transitive dependencies; see
    /// [`extract_cte`].
    pub fn extract_cte(
        query: &SelectQuery,
        name: &str,
    ) -> Result<ExtractedCte, CteServiceError> {
        extract_cte(query, name)
    }
}

/// Attach a WITH clause to a query. Simple selects take it directly (new
/// tables go first when one already exists); other query heads are wrapped
/// in `select * from ( … ) as sub`.
pub(crate) fn attach_with(query: SelectQuery, with: WithClause) -> SelectQuery {
    match query {
        SelectQuery::Simple(mut select) => {
            match &mut select.with_clause {
                Some(existing) => {
                    existing.recursive |= with.recursive;
                    existing.tables.splice(0..0, with.tables);
                }
                None => select.with_clause = Some(with),
            }
            SelectQuery::Simple(select)
        }
        other => {
            let derived = TableSource::Derived(Box::new(DerivedTable {
                query: other,
                alias: TableAlias {
                    name: Identifier::new("sub"),
                    columns: None,
                },
            }));
            let mut select = select_star_source(derived);
            if let SelectQuery::Simple(simple) = &mut select {
                simple.with_clause = Some(with);
            }
            select
        }
    }
}

/// `select * from name`
pub(crate) fn select_star_from(name: &str) -> SelectQuery {
    select_star_source(TableSource::Base(BaseTable {
        qname: QualifiedName::single(Identifier::new(name)),
        alias: None,
    }))
}

fn select_star_source(source: TableSource) -> SelectQuery {
    let star = Value::new(
        ValueKind::Star(StarExpr { qualifier: None }),
        Position::default(),
    );
    let mut select = SimpleSelect::new(
        SelectClause {
            distinct: None,
            hints: Vec::new(),
            items: vec![SelectItem {
                value: star,
                alias: None,
                comments: NodeComments::new(),
            }],
            comments: NodeComments::new(),
        },
        Position::default(),
    );
    select.from_clause = Some(crate::ast::FromClause {
        source,
        comments: NodeComments::new(),
    });
    SelectQuery::Simple(Box::new(select))
}
