//! CTE services end-to-end: collect, decompose, compose, extract

use squill::cte::{
    CteCollector, CteComposer, CteDecomposer, CteEdit, CteError, CteServiceError,
    TableSourceCollector,
};
use squill::format::{format_query, FormatOptions};
use squill::parser::parse_select;

fn sql_of(query: &squill::ast::SelectQuery) -> String {
    format_query(query, &FormatOptions::default())
        .unwrap()
        .formatted_sql
}

#[test]
fn collector_reports_names_and_dependencies() {
    let query =
        parse_select("with a as (select 1), b as (select * from a) select * from b").unwrap();
    let ctes = CteCollector::collect(&query).unwrap();
    assert_eq!(ctes.len(), 2);
    assert_eq!(ctes[0].name, "a");
    assert!(ctes[0].dependencies.is_empty());
    assert_eq!(ctes[1].name, "b");
    assert_eq!(ctes[1].dependencies, vec!["a"]);
}

#[test]
fn collector_output_is_topologically_ordered() {
    // Defined out of order on purpose
    let sql = "with c as (select * from b), b as (select * from a), a as (select 1) \
               select * from c";
    let query = parse_select(sql).unwrap();
    let ctes = CteCollector::collect(&query).unwrap();
    let pos = |n: &str| ctes.iter().position(|c| c.name == n).unwrap();
    for cte in &ctes {
        for dep in &cte.dependencies {
            assert!(
                pos(dep) < pos(&cte.name),
                "{dep} should precede {}",
                cte.name
            );
        }
    }
}

#[test]
fn recursive_ctes_self_loop_and_carry_the_flag() {
    let sql = "with recursive r as (select 1 union all select n + 1 from r) select * from r";
    let query = parse_select(sql).unwrap();
    let ctes = CteCollector::collect(&query).unwrap();
    assert!(ctes[0].is_recursive);
    assert_eq!(ctes[0].dependencies, vec!["r"]);
}

#[test]
fn compose_of_decompose_round_trips() {
    let original = "with a as (select 1), b as (select * from a) select * from b";
    let query = parse_select(original).unwrap();

    let parts = CteDecomposer::decompose(&query).unwrap();
    let root = CteDecomposer::root_of(&query);

    // Feed the decomposed parts back through the composer. A part's query
    // carries its dependencies as a WITH; the composer hoists and dedups.
    let edits: Vec<CteEdit> = parts
        .iter()
        .map(|p| CteEdit::new(p.name.clone(), sql_of(&p.query)))
        .collect();
    let recomposed = CteComposer::compose(&edits, &sql_of(&root)).unwrap();

    let reparsed = parse_select(&recomposed).unwrap();
    let round = format_query(&reparsed, &FormatOptions::default())
        .unwrap()
        .formatted_sql;
    assert_eq!(round, sql_of(&query));
}

#[test]
fn compose_fails_on_cycles() {
    let edits = vec![
        CteEdit::new("x", "select * from y"),
        CteEdit::new("y", "select * from x"),
    ];
    let err = CteComposer::compose(&edits, "select * from x").unwrap_err();
    assert!(matches!(
        err,
        CteServiceError::Cte(CteError::CyclicDependency { .. })
    ));
}

#[test]
fn extract_builds_a_runnable_chain() {
    let sql = "with a as (select 1), b as (select * from a), c as (select * from a) \
               select * from b join c on true";
    let query = parse_select(sql).unwrap();

    let b = CteDecomposer::extract_cte(&query, "b").unwrap();
    assert_eq!(
        b.executable_sql,
        "with \"a\" as (select 1) select * from \"a\""
    );
    assert!(b.warnings.is_empty());

    let missing = CteDecomposer::extract_cte(&query, "zzz").unwrap_err();
    assert!(matches!(
        missing,
        CteServiceError::Cte(CteError::UnknownCte { .. })
    ));
}

#[test]
fn synchronize_expands_nested_withs() {
    let edits = vec![CteEdit::new(
        "top",
        "with helper as (select 1) select * from helper",
    )];
    let entries = CteComposer::synchronize(&edits, "select * from top").unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["helper", "top"]);
    assert_eq!(entries[1].dependencies, vec!["helper"]);
    assert_eq!(entries[0].dependents, vec!["top"]);
}

#[test]
fn table_collector_respects_cte_scope() {
    let query = parse_select(
        "with u as (select * from users) select * from u join orders o on u.id = o.uid",
    )
    .unwrap();
    let without = TableSourceCollector::new(false).collect(&query);
    assert_eq!(without, vec!["users", "orders"]);
    let with_ctes = TableSourceCollector::new(true).collect(&query);
    assert!(with_ctes.iter().any(|n| n == "u"));
}

#[test]
fn materialized_markers_survive_decompose_and_compose() {
    let sql = "with m as materialized (select 1) select * from m";
    let query = parse_select(sql).unwrap();
    let ctes = CteCollector::collect(&query).unwrap();
    assert_eq!(ctes[0].materialized, Some(true));

    let parts = CteDecomposer::decompose(&query).unwrap();
    assert_eq!(parts[0].materialized, Some(true));
}
