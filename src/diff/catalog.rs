//! DDL catalogs
//!
//! A catalog is the normalized shape of a CREATE-TABLE corpus: tables with
//! columns and table-level constraints, plus indexes. Inline UNIQUE and
//! PRIMARY KEY column markers are lifted to table constraints so the differ
//! compares one representation; NOT NULL and DEFAULT stay on the column.

use indexmap::IndexMap;
use smol_str::SmolStr;

use super::DiffError;
use crate::ast::{
    ColumnConstraint, ColumnDef, CreateIndexStmt, CreateTableStmt, Identifier, Statement,
    TableConstraint, Value,
};
use crate::format::{format_value, FormatOptions, IdentifierCase, IdentifierEscape};
use crate::parser::{parse, split_statements};

#[derive(Debug, Clone)]
pub(crate) struct Catalog {
    pub tables: IndexMap<SmolStr, TableEntry>,
    pub indexes: IndexMap<SmolStr, IndexEntry>,
}

#[derive(Debug, Clone)]
pub(crate) struct TableEntry {
    pub name: SmolStr,
    pub columns: IndexMap<SmolStr, ColumnEntry>,
    pub constraints: Vec<ConstraintEntry>,
}

#[derive(Debug, Clone)]
pub(crate) struct ColumnEntry {
    pub name: SmolStr,
    pub data_type: crate::ast::SqlType,
    pub not_null: bool,
    pub default_value: Option<Value>,
}

impl ColumnEntry {
    pub fn type_signature(&self) -> String {
        self.data_type.canonical()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConstraintKind {
    PrimaryKey,
    Unique,
    ForeignKey,
    Check,
}

#[derive(Debug, Clone)]
pub(crate) struct ConstraintEntry {
    pub name: Option<SmolStr>,
    pub kind: ConstraintKind,
    /// Normalized comparison string
    pub signature: String,
    /// AST form used when the differ emits an ADD CONSTRAINT
    pub ast: TableConstraint,
    /// Set when the constraint came from an inline column marker
    pub from_column: Option<SmolStr>,
}

impl ConstraintEntry {
    /// Equality under the differ's rules: kind and signature always, name
    /// only for CHECK constraints when `check_names` is set.
    pub fn matches(&self, other: &ConstraintEntry, check_names: bool) -> bool {
        if self.kind != other.kind || self.signature != other.signature {
            return false;
        }
        if self.kind == ConstraintKind::Check && check_names {
            return fold_opt(&self.name) == fold_opt(&other.name);
        }
        true
    }
}

fn fold_opt(name: &Option<SmolStr>) -> Option<String> {
    name.as_ref().map(|n| n.to_ascii_lowercase())
}

#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub statement: CreateIndexStmt,
}

/// Options used to normalize predicate text for comparison
fn normalize_options() -> FormatOptions {
    FormatOptions {
        identifier_escape: IdentifierEscape::None,
        identifier_case: IdentifierCase::Lower,
        ..FormatOptions::default()
    }
}

pub(crate) fn normalize_value(value: &Value) -> String {
    format_value(value, &normalize_options())
        .map(|f| f.formatted_sql)
        .unwrap_or_default()
}

pub(crate) fn fold(name: &str) -> SmolStr {
    SmolStr::new(name.to_ascii_lowercase())
}

/// Parse a DDL corpus into a catalog.
pub(crate) fn build_catalog(ddl: &str) -> Result<Catalog, DiffError> {
    let mut catalog = Catalog {
        tables: IndexMap::new(),
        indexes: IndexMap::new(),
    };

    for query in split_statements(ddl).queries {
        if query.is_empty {
            continue;
        }
        let statement = parse(&query.sql).map_err(|e| DiffError::CatalogParse {
            message: e.to_string(),
            position: e.position,
        })?;
        match statement {
            Statement::CreateTable(create) => {
                let entry = table_entry(&create);
                catalog.tables.insert(fold(&entry.name), entry);
            }
            Statement::CreateIndex(create) => {
                catalog.indexes.insert(
                    fold(&create.name.name),
                    IndexEntry { statement: *create },
                );
            }
            _ => {
                return Err(DiffError::CatalogParse {
                    message: "catalog corpus may only contain CREATE TABLE and CREATE INDEX"
                        .to_string(),
                    position: statement.position(),
                })
            }
        }
    }
    Ok(catalog)
}

fn table_entry(create: &CreateTableStmt) -> TableEntry {
    let table_name = &create.name.name().name;
    let mut columns = IndexMap::new();
    let mut constraints = Vec::new();

    for column in &create.columns {
        let (entry, lifted) = column_entry(table_name, column);
        columns.insert(fold(&entry.name), entry);
        constraints.extend(lifted);
    }
    for constraint in &create.constraints {
        constraints.push(constraint_entry(constraint, None));
    }

    TableEntry {
        name: table_name.clone(),
        columns,
        constraints,
    }
}

/// A column entry plus any inline markers lifted to table constraints
fn column_entry(table: &str, column: &ColumnDef) -> (ColumnEntry, Vec<ConstraintEntry>) {
    let mut not_null = false;
    let mut default_value = None;
    let mut lifted = Vec::new();

    for constraint in &column.constraints {
        match constraint {
            ColumnConstraint::NotNull => not_null = true,
            ColumnConstraint::Null => {}
            ColumnConstraint::Default(value) => default_value = Some(value.clone()),
            ColumnConstraint::PrimaryKey => {
                let ast = TableConstraint::PrimaryKey {
                    name: Some(Identifier::new(format!("{table}_pkey"))),
                    columns: vec![column.name.clone()],
                };
                lifted.push(constraint_entry(&ast, Some(column.name.name.clone())));
            }
            ColumnConstraint::Unique => {
                let ast = TableConstraint::Unique {
                    name: Some(Identifier::new(format!(
                        "{table}_{}_key",
                        column.name.name
                    ))),
                    columns: vec![column.name.clone()],
                };
                lifted.push(constraint_entry(&ast, Some(column.name.name.clone())));
            }
            ColumnConstraint::Check(predicate) => {
                let ast = TableConstraint::Check {
                    name: Some(Identifier::new(format!(
                        "{table}_{}_check",
                        column.name.name
                    ))),
                    predicate: predicate.clone(),
                };
                lifted.push(constraint_entry(&ast, Some(column.name.name.clone())));
            }
            ColumnConstraint::References { table: ref_table, columns } => {
                let ast = TableConstraint::ForeignKey {
                    name: Some(Identifier::new(format!(
                        "{table}_{}_fkey",
                        column.name.name
                    ))),
                    columns: vec![column.name.clone()],
                    ref_table: ref_table.clone(),
                    ref_columns: columns.clone(),
                };
                lifted.push(constraint_entry(&ast, Some(column.name.name.clone())));
            }
        }
    }

    (
        ColumnEntry {
            name: column.name.name.clone(),
            data_type: column.data_type.clone(),
            not_null,
            default_value,
        },
        lifted,
    )
}

fn constraint_entry(constraint: &TableConstraint, from_column: Option<SmolStr>) -> ConstraintEntry {
    let (kind, signature) = match constraint {
        TableConstraint::PrimaryKey { columns, .. } => (
            ConstraintKind::PrimaryKey,
            format!("PRIMARY KEY({})", signature_columns(columns)),
        ),
        TableConstraint::Unique { columns, .. } => (
            ConstraintKind::Unique,
            format!("UNIQUE({})", signature_columns(columns)),
        ),
        TableConstraint::ForeignKey {
            columns,
            ref_table,
            ref_columns,
            ..
        } => (
            ConstraintKind::ForeignKey,
            format!(
                "FOREIGN KEY({}) REFERENCES {}({})",
                signature_columns(columns),
                ref_table.to_string().to_ascii_lowercase(),
                signature_columns(ref_columns)
            ),
        ),
        TableConstraint::Check { predicate, .. } => (
            ConstraintKind::Check,
            format!("CHECK({})", normalize_value(predicate)),
        ),
    };
    ConstraintEntry {
        name: constraint.name().map(|n| n.name.clone()),
        kind,
        signature,
        ast: constraint.clone(),
        from_column,
    }
}

fn signature_columns(columns: &[Identifier]) -> String {
    columns
        .iter()
        .map(|c| c.name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inline_markers_are_lifted() {
        let catalog =
            build_catalog("create table users (id int primary key, email text unique)").unwrap();
        let users = &catalog.tables[&fold("users")];
        assert_eq!(users.columns.len(), 2);
        assert_eq!(users.constraints.len(), 2);
        assert_eq!(users.constraints[0].kind, ConstraintKind::PrimaryKey);
        assert_eq!(users.constraints[1].kind, ConstraintKind::Unique);
        assert_eq!(users.constraints[1].signature, "UNIQUE(email)");
        assert_eq!(
            users.constraints[1].name.as_deref(),
            Some("users_email_key")
        );
    }

    #[test]
    fn check_signature_normalizes_predicate_text() {
        let a = build_catalog("create table t (x int, check (X > 0))").unwrap();
        let b = build_catalog("create table t (x int, check (x   >   0))").unwrap();
        let sig_a = &a.tables[&fold("t")].constraints[0].signature;
        let sig_b = &b.tables[&fold("t")].constraints[0].signature;
        assert_eq!(sig_a, sig_b);
    }

    #[test]
    fn non_ddl_statement_is_a_catalog_error() {
        let err = build_catalog("select 1").unwrap_err();
        assert!(matches!(err, DiffError::CatalogParse { .. }));
    }
}
