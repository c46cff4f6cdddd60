//! CTE decomposition
//!
//! Turns each collected CTE into a self-contained query: the body plus a
//! WITH carrying its transitive dependencies (or, for a recursive CTE, the
//! recursive WITH and a `select * from name` head).

use smol_str::SmolStr;

use super::collector::{CollectedCte, CteCollector};
use super::graph::DependencyGraph;
use super::tables::fold;
use super::{attach_with, select_star_from, CteError};
use crate::ast::{
    AliasExpression, CommonTable, Identifier, NodeComments, SelectQuery, WithClause,
};

/// One decomposed CTE: the same topology as the collector, with a
/// runnable, self-contained query
#[derive(Debug, Clone, PartialEq)]
pub struct DecomposedCte {
    pub name: SmolStr,
    pub query: SelectQuery,
    pub materialized: Option<bool>,
    pub dependencies: Vec<SmolStr>,
    pub is_recursive: bool,
}

/// Detaches CTE bodies into self-contained queries
pub struct CteDecomposer;

impl CteDecomposer {
    /// Decompose every CTE of the query, dependencies first.
    pub fn decompose(query: &SelectQuery) -> Result<Vec<DecomposedCte>, CteError> {
        let collected = CteCollector::collect(query)?;

        let mut graph = DependencyGraph::new();
        for cte in &collected {
            graph.add_node(fold(&cte.name));
            for dep in &cte.dependencies {
                graph.add_dependency(&fold(&cte.name), dep.clone());
            }
        }

        let mut decomposed = Vec::with_capacity(collected.len());
        for cte in &collected {
            let query = Self::self_contained(cte, &collected, &graph);
            decomposed.push(DecomposedCte {
                name: cte.name.clone(),
                query,
                materialized: cte.materialized,
                dependencies: cte.dependencies.clone(),
                is_recursive: cte.is_recursive,
            });
        }
        Ok(decomposed)
    }

    /// The query with its root WITH stripped; pairs with
    /// [`CteDecomposer::decompose`] for the compose round-trip.
    pub fn root_of(query: &SelectQuery) -> SelectQuery {
        let mut root = query.clone();
        if let SelectQuery::Simple(select) = &mut root {
            select.with_clause = None;
        }
        root
    }

    fn self_contained(
        cte: &CollectedCte,
        all: &[CollectedCte],
        graph: &DependencyGraph,
    ) -> SelectQuery {
        if cte.is_recursive {
            // The body only makes sense under its recursive WITH
            let with = WithClause {
                recursive: true,
                tables: vec![common_table(cte)],
                comments: NodeComments::new(),
            };
            return attach_with(select_star_from(&cte.name), with);
        }

        let deps = graph.transitive_dependencies(&fold(&cte.name));
        if deps.is_empty() {
            return cte.query.clone();
        }

        let tables = deps
            .iter()
            .filter_map(|dep| all.iter().find(|c| fold(&c.name) == *dep))
            .map(common_table)
            .collect();
        let with = WithClause {
            recursive: false,
            tables,
            comments: NodeComments::new(),
        };
        attach_with(cte.query.clone(), with)
    }
}

pub(crate) fn common_table(cte: &CollectedCte) -> CommonTable {
    CommonTable {
        alias_expression: AliasExpression {
            table: Identifier::new(cte.name.clone()),
            columns: None,
        },
        materialized: cte.materialized,
        query: cte.query.clone(),
        comments: NodeComments::new(),
        position: cte.query.position(),
    }
}
