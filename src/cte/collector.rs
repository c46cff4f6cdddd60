//! CTE collection
//!
//! Flattens the root WITH plus any nested WITHs into a topologically ordered
//! list, with dependencies computed by scanning each body for base-table
//! references that match a sibling CTE name in the same WITH scope.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use super::graph::DependencyGraph;
use super::tables::{TableSourceCollector, fold};
use super::CteError;
use crate::ast::{SelectQuery, TableSource, WithClause};

/// One collected CTE with its resolved topology
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedCte {
    pub name: SmolStr,
    /// The CTE body, detached from its WITH
    pub query: SelectQuery,
    pub materialized: Option<bool>,
    pub dependencies: Vec<SmolStr>,
    pub dependents: Vec<SmolStr>,
    pub is_recursive: bool,
}

/// Collects CTEs and their dependency topology
pub struct CteCollector;

impl CteCollector {
    /// Collect every CTE reachable from the query, dependencies first.
    ///
    /// Fails with [`CteError::RecursiveMarkerMismatch`] when a CTE reads
    /// itself inside a non-recursive WITH, and with
    /// [`CteError::CyclicDependency`] when distinct CTEs form a cycle.
    pub fn collect(query: &SelectQuery) -> Result<Vec<CollectedCte>, CteError> {
        let mut raw = Vec::new();
        gather_withs(query, &mut |with| raw.push(clone_scope(with)));

        // Resolve dependencies per WITH scope
        let mut entries: Vec<CollectedCte> = Vec::new();
        for scope in &raw {
            let scope_names: Vec<SmolStr> =
                scope.tables.iter().map(|t| fold(t.name())).collect();
            for table in &scope.tables {
                let body_refs = TableSourceCollector::new(true).collect(&table.query);
                let mut dependencies = Vec::new();
                for reference in body_refs {
                    if reference.contains('.') {
                        continue;
                    }
                    let folded = fold(&reference);
                    if scope_names.contains(&folded) && !dependencies.contains(&folded) {
                        dependencies.push(folded);
                    }
                }
                let name = fold(table.name());
                let is_recursive = dependencies.contains(&name);
                if is_recursive && !scope.recursive {
                    return Err(CteError::RecursiveMarkerMismatch {
                        name: table.name().to_string(),
                    });
                }
                if entries.iter().any(|e| fold(&e.name) == name) {
                    continue;
                }
                entries.push(CollectedCte {
                    name: SmolStr::new(table.name()),
                    query: table.query.clone(),
                    materialized: table.materialized,
                    dependencies,
                    dependents: Vec::new(),
                    is_recursive,
                });
            }
        }

        order_entries(entries)
    }
}

/// Topologically order entries and fill in dependents
pub(crate) fn order_entries(
    mut entries: Vec<CollectedCte>,
) -> Result<Vec<CollectedCte>, CteError> {
    let mut graph = DependencyGraph::new();
    for entry in &entries {
        graph.add_node(fold(&entry.name));
        for dep in &entry.dependencies {
            graph.add_dependency(&fold(&entry.name), dep.clone());
        }
    }
    let order = graph.topological_order()?;

    for entry in &mut entries {
        entry.dependents = graph.dependents_of(&fold(&entry.name));
    }

    let mut by_name: FxHashMap<SmolStr, CollectedCte> = entries
        .into_iter()
        .map(|e| (fold(&e.name), e))
        .collect();
    Ok(order
        .into_iter()
        .filter_map(|name| by_name.remove(&name))
        .collect())
}

/// Owned snapshot of one WITH scope
struct ScopeSnapshot {
    recursive: bool,
    tables: Vec<crate::ast::CommonTable>,
}

fn clone_scope(with: &WithClause) -> ScopeSnapshot {
    ScopeSnapshot {
        recursive: with.recursive,
        tables: with.tables.clone(),
    }
}

/// Visit every WITH clause: the query head, CTE bodies, set-operation
/// branches, and derived tables.
fn gather_withs(query: &SelectQuery, f: &mut impl FnMut(&WithClause)) {
    match query {
        SelectQuery::Simple(select) => {
            if let Some(with) = &select.with_clause {
                f(with);
                for table in &with.tables {
                    gather_withs(&table.query, f);
                }
            }
            if let Some(from) = &select.from_clause {
                gather_source_withs(&from.source, f);
            }
        }
        SelectQuery::Binary(binary) => {
            gather_withs(&binary.left, f);
            gather_withs(&binary.right, f);
        }
        SelectQuery::Values(_) => {}
    }
}

fn gather_source_withs(source: &TableSource, f: &mut impl FnMut(&WithClause)) {
    match source {
        TableSource::Derived(derived) => gather_withs(&derived.query, f),
        TableSource::Join(join) => {
            gather_source_withs(&join.left, f);
            gather_source_withs(&join.right, f);
        }
        TableSource::Lateral(lateral) => gather_source_withs(&lateral.source, f),
        TableSource::Base(_) | TableSource::Function(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    #[test]
    fn collects_in_dependency_order() {
        let query =
            parse_select("with a as (select 1), b as (select * from a) select * from b").unwrap();
        let ctes = CteCollector::collect(&query).unwrap();
        assert_eq!(ctes.len(), 2);
        assert_eq!(ctes[0].name, "a");
        assert!(ctes[0].dependencies.is_empty());
        assert_eq!(ctes[1].name, "b");
        assert_eq!(ctes[1].dependencies, vec!["a"]);
        assert_eq!(ctes[0].dependents, vec!["b"]);
    }

    #[test]
    fn nested_withs_are_flattened() {
        let sql = "with outer_cte as (with inner_cte as (select 1) select * from inner_cte) \
                   select * from outer_cte";
        let query = parse_select(sql).unwrap();
        let ctes = CteCollector::collect(&query).unwrap();
        let names: Vec<_> = ctes.iter().map(|c| c.name.as_str()).collect();
        assert!(names.contains(&"outer_cte"));
        assert!(names.contains(&"inner_cte"));
    }

    #[test]
    fn recursive_cte_is_flagged() {
        let sql = "with recursive r as (select 1 union all select n + 1 from r) select * from r";
        let query = parse_select(sql).unwrap();
        let ctes = CteCollector::collect(&query).unwrap();
        assert_eq!(ctes.len(), 1);
        assert!(ctes[0].is_recursive);
        assert_eq!(ctes[0].dependencies, vec!["r"]);
    }

    #[test]
    fn self_reference_without_recursive_marker_errors() {
        let sql = "with r as (select * from r) select * from r";
        let query = parse_select(sql).unwrap();
        let err = CteCollector::collect(&query).unwrap_err();
        assert!(matches!(err, CteError::RecursiveMarkerMismatch { .. }));
    }

    #[test]
    fn materialized_marker_is_carried() {
        let sql = "with m as materialized (select 1) select * from m";
        let query = parse_select(sql).unwrap();
        let ctes = CteCollector::collect(&query).unwrap();
        assert_eq!(ctes[0].materialized, Some(true));
    }
}
