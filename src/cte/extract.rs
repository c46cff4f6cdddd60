//! Single-CTE extraction
//!
//! Produces a runnable SQL snippet for one CTE: its transitive dependencies
//! as a WITH (topological order), followed by the CTE body — or a
//! `select * from name` head when the CTE is recursive.

use smol_str::SmolStr;

use super::collector::CteCollector;
use super::decompose::common_table;
use super::graph::DependencyGraph;
use super::tables::fold;
use super::{attach_with, select_star_from, CteError, CteServiceError};
use crate::ast::{NodeComments, SelectQuery, WithClause};
use crate::format::{format_query, FormatOptions};

/// A runnable extraction of one CTE
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedCte {
    pub name: SmolStr,
    pub dependencies: Vec<SmolStr>,
    pub executable_sql: String,
    pub warnings: Vec<String>,
}

/// Extract `name` from the query as a standalone statement.
pub fn extract_cte(query: &SelectQuery, name: &str) -> Result<ExtractedCte, CteServiceError> {
    let collected = CteCollector::collect(query).map_err(CteServiceError::Cte)?;
    let folded = fold(name);

    let target = collected
        .iter()
        .find(|c| fold(&c.name) == folded)
        .ok_or_else(|| {
            CteServiceError::Cte(CteError::UnknownCte {
                name: name.to_string(),
            })
        })?;

    let mut graph = DependencyGraph::new();
    for cte in &collected {
        graph.add_node(fold(&cte.name));
        for dep in &cte.dependencies {
            graph.add_dependency(&fold(&cte.name), dep.clone());
        }
    }

    let deps = graph.transitive_dependencies(&folded);
    let mut warnings = Vec::new();
    let mut tables = Vec::new();
    for dep in &deps {
        match collected.iter().find(|c| fold(&c.name) == *dep) {
            Some(cte) => tables.push(common_table(cte)),
            None => warnings.push(format!(
                "dependency '{dep}' of '{name}' could not be resolved"
            )),
        }
    }

    let executable = if target.is_recursive {
        let mut with_tables = tables;
        with_tables.push(common_table(target));
        let with = WithClause {
            recursive: true,
            tables: with_tables,
            comments: NodeComments::new(),
        };
        attach_with(select_star_from(&target.name), with)
    } else if tables.is_empty() {
        target.query.clone()
    } else {
        let with = WithClause {
            recursive: false,
            tables,
            comments: NodeComments::new(),
        };
        attach_with(target.query.clone(), with)
    };

    Ok(ExtractedCte {
        name: target.name.clone(),
        dependencies: target.dependencies.clone(),
        executable_sql: format_query(&executable, &FormatOptions::default())?.formatted_sql,
        warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_select;

    #[test]
    fn leaf_cte_extracts_to_its_body() {
        let query =
            parse_select("with a as (select 1), b as (select * from a) select * from b").unwrap();
        let extracted = extract_cte(&query, "a").unwrap();
        assert_eq!(extracted.executable_sql, "select 1");
        assert!(extracted.dependencies.is_empty());
        assert!(extracted.warnings.is_empty());
    }

    #[test]
    fn dependent_cte_carries_transitive_chain() {
        let sql = "with a as (select 1), b as (select * from a), c as (select * from b) \
                   select * from c";
        let query = parse_select(sql).unwrap();
        let extracted = extract_cte(&query, "c").unwrap();
        assert_eq!(
            extracted.executable_sql,
            "with \"a\" as (select 1), \"b\" as (select * from \"a\") select * from \"b\""
        );
        assert_eq!(extracted.dependencies, vec!["b"]);
    }

    #[test]
    fn unknown_cte_errors() {
        let query = parse_select("with a as (select 1) select * from a").unwrap();
        let err = extract_cte(&query, "missing").unwrap_err();
        assert!(matches!(
            err,
            CteServiceError::Cte(CteError::UnknownCte { .. })
        ));
    }

    #[test]
    fn recursive_cte_selects_from_itself() {
        let sql = "with recursive r as (select 1 union all select n + 1 from r) select * from r";
        let query = parse_select(sql).unwrap();
        let extracted = extract_cte(&query, "r").unwrap();
        assert!(
            extracted.executable_sql.starts_with("with recursive \"r\" as ("),
            "got: {}",
            extracted.executable_sql
        );
        assert!(
            extracted.executable_sql.ends_with("select * from \"r\""),
            "got: {}",
            extracted.executable_sql
        );
    }
}
