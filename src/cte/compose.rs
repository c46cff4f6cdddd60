//! CTE composition and synchronization
//!
//! Recombines edited CTE texts with a root query into a single
//! `WITH … SELECT`. Edits may themselves carry WITH clauses: inner CTEs
//! shadowed by an explicit edit are dropped (the edit wins), the rest are
//! hoisted as anonymous siblings. Recursive edits keep their WITH intact.

use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use tracing::debug;

use super::collector::{order_entries, CollectedCte};
use super::tables::{fold, TableSourceCollector};
use super::{attach_with, CteServiceError};
use crate::ast::{NodeComments, SelectQuery, WithClause};
use crate::format::{format_query, FormatOptions};
use crate::parser::parse_select;

/// One edited CTE: its name and replacement SQL text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteEdit {
    pub name: SmolStr,
    pub query: String,
}

impl CteEdit {
    pub fn new(name: impl Into<SmolStr>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
        }
    }
}

/// Recomposes edited CTEs into a single statement
pub struct CteComposer;

impl CteComposer {
    /// Compose the edits and root into one `WITH … SELECT`, rendered with
    /// default style.
    pub fn compose(edits: &[CteEdit], root_query: &str) -> Result<String, CteServiceError> {
        let entries = Self::synchronize(edits, root_query)?;
        let root = parse_select(root_query)?;

        let recursive = entries.iter().any(|e| e.is_recursive);
        let tables = entries
            .iter()
            .map(super::decompose::common_table)
            .collect::<Vec<_>>();
        debug!(
            ctes = tables.len(),
            recursive, "composing WITH clause from edits"
        );

        let with = WithClause {
            recursive,
            tables,
            comments: NodeComments::new(),
        };
        let composed = attach_with(root, with);
        Ok(format_query(&composed, &FormatOptions::default())?.formatted_sql)
    }

    /// Expand WITH clauses inside edits into sibling CTEs, recompute
    /// dependencies across the union, and return the normalized list in
    /// topological order.
    pub fn synchronize(
        edits: &[CteEdit],
        root_query: &str,
    ) -> Result<Vec<CollectedCte>, CteServiceError> {
        let edit_names: FxHashSet<SmolStr> = edits.iter().map(|e| fold(&e.name)).collect();

        // Parse edits and hoist their inner CTEs
        let mut entries: Vec<CollectedCte> = Vec::new();
        for edit in edits {
            let parsed = parse_select(&edit.query)?;
            let own_name = fold(&edit.name);

            let retain_whole = references_name(&parsed, &own_name)
                || matches!(&parsed, SelectQuery::Simple(s)
                    if s.with_clause.as_ref().is_some_and(|w| w.recursive));

            if retain_whole {
                // Recursive edits keep their entire WITH as-is
                push_entry(
                    &mut entries,
                    CollectedCte {
                        name: edit.name.clone(),
                        query: parsed,
                        materialized: None,
                        dependencies: Vec::new(),
                        dependents: Vec::new(),
                        is_recursive: true,
                    },
                    true,
                );
                continue;
            }

            let mut body = parsed;
            if let SelectQuery::Simple(select) = &mut body {
                if let Some(with) = select.with_clause.take() {
                    for table in with.tables {
                        let inner_name = fold(table.name());
                        if edit_names.contains(&inner_name) {
                            // The explicit edit wins over the inner copy
                            debug!(name = %table.name(), "dropping shadowed inner CTE");
                            continue;
                        }
                        push_entry(
                            &mut entries,
                            CollectedCte {
                                name: SmolStr::new(table.name()),
                                query: table.query,
                                materialized: table.materialized,
                                dependencies: Vec::new(),
                                dependents: Vec::new(),
                                is_recursive: false,
                            },
                            false,
                        );
                    }
                }
            }
            push_entry(
                &mut entries,
                CollectedCte {
                    name: edit.name.clone(),
                    query: body,
                    materialized: None,
                    dependencies: Vec::new(),
                    dependents: Vec::new(),
                    is_recursive: false,
                },
                true,
            );
        }

        // The root must parse even when only the topology is wanted
        parse_select(root_query)?;

        // Dependencies are recomputed across the whole union
        let names: Vec<SmolStr> = entries.iter().map(|e| fold(&e.name)).collect();
        for entry in &mut entries {
            let own = fold(&entry.name);
            let refs = TableSourceCollector::new(true).collect(&entry.query);
            entry.dependencies = refs
                .into_iter()
                .filter(|r| !r.contains('.'))
                .map(|r| fold(&r))
                .filter(|r| names.contains(r) && (*r != own || entry.is_recursive))
                .collect::<Vec<_>>();
            entry.dependencies.dedup();
        }

        Ok(order_entries(entries).map_err(CteServiceError::Cte)?)
    }
}

/// Replace an entry when an explicit edit collides with a hoisted sibling
fn push_entry(entries: &mut Vec<CollectedCte>, entry: CollectedCte, explicit: bool) {
    let folded = fold(&entry.name);
    match entries.iter().position(|e| fold(&e.name) == folded) {
        Some(i) if explicit => entries[i] = entry,
        Some(_) => {}
        None => entries.push(entry),
    }
}

/// Does the query read `name` as a single-part table reference?
fn references_name(query: &SelectQuery, folded_name: &str) -> bool {
    TableSourceCollector::new(true)
        .collect(query)
        .iter()
        .any(|r| !r.contains('.') && fold(r) == folded_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compose_orders_edits_by_dependency() {
        let edits = vec![
            CteEdit::new("b", "select * from a"),
            CteEdit::new("a", "select 1"),
        ];
        let sql = CteComposer::compose(&edits, "select * from b").unwrap();
        assert_eq!(
            sql,
            "with \"a\" as (select 1), \"b\" as (select * from \"a\") select * from \"b\""
        );
    }

    #[test]
    fn inner_with_hoists_as_sibling() {
        let edits = vec![CteEdit::new(
            "b",
            "with helper as (select 1) select * from helper",
        )];
        let sql = CteComposer::compose(&edits, "select * from b").unwrap();
        assert!(sql.contains("\"helper\" as (select 1)"), "got: {sql}");
        assert!(sql.contains("\"b\" as (select * from \"helper\")"), "got: {sql}");
    }

    #[test]
    fn explicit_edit_wins_over_inner_copy() {
        let edits = vec![
            CteEdit::new("a", "select 2"),
            CteEdit::new("b", "with a as (select 1) select * from a"),
        ];
        let sql = CteComposer::compose(&edits, "select * from b").unwrap();
        assert!(sql.contains("\"a\" as (select 2)"), "got: {sql}");
        assert!(!sql.contains("select 1"), "got: {sql}");
    }

    #[test]
    fn cycles_fail() {
        let edits = vec![
            CteEdit::new("a", "select * from b"),
            CteEdit::new("b", "select * from a"),
        ];
        let err = CteComposer::compose(&edits, "select * from b").unwrap_err();
        assert!(matches!(
            err,
            CteServiceError::Cte(super::super::CteError::CyclicDependency { .. })
        ));
    }

    #[test]
    fn synchronize_reports_topology() {
        let edits = vec![
            CteEdit::new("b", "select * from a"),
            CteEdit::new("a", "select 1"),
        ];
        let entries = CteComposer::synchronize(&edits, "select * from b").unwrap();
        assert_eq!(entries[0].name, "a");
        assert_eq!(entries[1].name, "b");
        assert_eq!(entries[1].dependencies, vec!["a"]);
    }
}
