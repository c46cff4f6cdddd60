//! DDL diffing
//!
//! Compares two CREATE-TABLE corpora and emits the DDL that transforms the
//! current catalog into the expected one. Statement order: create missing
//! tables, then per-table column adds/alters (each new column immediately
//! followed by the constraints its inline markers produced), remaining
//! constraint adds, index creates, and finally the optional drops.

mod catalog;

use smol_str::SmolStr;
use thiserror::Error;
use tracing::trace;

use crate::ast::{
    AlterAction, AlterTableStmt, ColumnConstraint, ColumnDef, Identifier, NodeComments,
    QualifiedName, Statement,
};
use crate::base::Position;
use crate::format::{format, FormatOptions, IdentifierEscape, KeywordCase};

use catalog::{build_catalog, Catalog, ColumnEntry, ConstraintEntry, TableEntry};

/// Diff failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiffError {
    #[error("catalog parse failed: {message}")]
    CatalogParse { message: String, position: Position },
    #[error("ambiguous rename in table '{table}': {}", candidates.join(", "))]
    AmbiguousRename {
        table: String,
        candidates: Vec<String>,
    },
}

/// Diff configuration; drops are opt-in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiffOptions {
    pub drop_columns: bool,
    pub drop_tables: bool,
    pub drop_constraints: bool,
    /// Compare CHECK constraints by name as well as predicate
    pub check_constraint_names: bool,
    /// Pair a dropped and an added column of identical type into a RENAME
    pub detect_renames: bool,
}

/// Generates migration DDL between two catalogs
pub struct DdlDiffGenerator;

impl DdlDiffGenerator {
    pub fn generate_diff(
        current_ddl: &str,
        expected_ddl: &str,
        options: &DiffOptions,
    ) -> Result<Vec<String>, DiffError> {
        let current = build_catalog(current_ddl)?;
        let expected = build_catalog(expected_ddl)?;
        let mut differ = Differ {
            options: *options,
            statements: Vec::new(),
        };
        differ.run(&current, &expected)?;
        Ok(differ.statements)
    }
}

/// Output rendering: upper keywords, bare identifiers
fn ddl_options() -> FormatOptions {
    FormatOptions {
        keyword_case: KeywordCase::Upper,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    }
}

struct Differ {
    options: DiffOptions,
    statements: Vec<String>,
}

impl Differ {
    fn run(&mut self, current: &Catalog, expected: &Catalog) -> Result<(), DiffError> {
        // 1. Tables present only in the expected catalog
        for (key, table) in &expected.tables {
            if !current.tables.contains_key(key) {
                self.emit_create_table(table);
            }
        }

        // 2/3. Column and constraint changes per common table
        for (key, expected_table) in &expected.tables {
            if let Some(current_table) = current.tables.get(key) {
                self.diff_table(current_table, expected_table)?;
            }
        }

        // 4. Indexes present only in the expected catalog
        for (key, index) in &expected.indexes {
            if !current.indexes.contains_key(key) {
                self.emit(Statement::CreateIndex(Box::new(index.statement.clone())));
            }
        }

        // 5. Drops, gated by options
        if self.options.drop_constraints {
            for (key, current_table) in &current.tables {
                if let Some(expected_table) = expected.tables.get(key) {
                    self.drop_missing_constraints(current_table, expected_table);
                }
            }
            for (key, index) in &current.indexes {
                if !expected.indexes.contains_key(key) {
                    self.statements
                        .push(format!("DROP INDEX {}", index.statement.name.name));
                }
            }
        }
        if self.options.drop_columns {
            for (key, current_table) in &current.tables {
                if let Some(expected_table) = expected.tables.get(key) {
                    for (column_key, column) in &current_table.columns {
                        if !expected_table.columns.contains_key(column_key) {
                            self.emit_alter(
                                &current_table.name,
                                AlterAction::DropColumn(Identifier::new(column.name.clone())),
                            );
                        }
                    }
                }
            }
        }
        if self.options.drop_tables {
            for (key, table) in &current.tables {
                if !expected.tables.contains_key(key) {
                    self.statements.push(format!("DROP TABLE {}", table.name));
                }
            }
        }
        Ok(())
    }

    fn diff_table(
        &mut self,
        current: &TableEntry,
        expected: &TableEntry,
    ) -> Result<(), DiffError> {
        let renames = self.plan_renames(current, expected)?;

        for (column_key, column) in &expected.columns {
            match current.columns.get(column_key) {
                None => {
                    if let Some(from) = renames.iter().find(|(_, to)| to == column_key) {
                        let from_name = current.columns[&from.0].name.clone();
                        self.emit_alter(
                            &current.name,
                            AlterAction::RenameColumn {
                                from: Identifier::new(from_name),
                                to: Identifier::new(column.name.clone()),
                            },
                        );
                        continue;
                    }
                    self.emit_alter(
                        &expected.name,
                        AlterAction::AddColumn(column_def(column)),
                    );
                    // Constraints born from this column's inline markers ride
                    // directly behind the ADD COLUMN
                    for constraint in expected.constraints.iter().filter(|c| {
                        c.from_column.as_deref() == Some(column.name.as_str())
                    }) {
                        self.emit_add_constraint(&expected.name, constraint);
                    }
                }
                Some(current_column) => {
                    self.diff_column(&expected.name, current_column, column);
                }
            }
        }

        // Remaining missing constraints (not already added with a column)
        for constraint in &expected.constraints {
            let already_added = constraint
                .from_column
                .as_ref()
                .is_some_and(|col| !current.columns.contains_key(&catalog::fold(col)));
            if already_added {
                continue;
            }
            let exists = current
                .constraints
                .iter()
                .any(|c| c.matches(constraint, self.options.check_constraint_names));
            if !exists {
                self.emit_add_constraint(&expected.name, constraint);
            }
        }
        Ok(())
    }

    fn diff_column(&mut self, table: &str, current: &ColumnEntry, expected: &ColumnEntry) {
        if current.type_signature() != expected.type_signature() {
            trace!(table, column = %expected.name, "column type changed");
            self.emit_alter(
                table,
                AlterAction::AlterColumnType {
                    column: Identifier::new(expected.name.clone()),
                    data_type: expected.data_type.clone(),
                },
            );
        }
        if current.not_null != expected.not_null {
            let action = if expected.not_null {
                AlterAction::SetNotNull(Identifier::new(expected.name.clone()))
            } else {
                AlterAction::DropNotNull(Identifier::new(expected.name.clone()))
            };
            self.emit_alter(table, action);
        }
        let current_default = current.default_value.as_ref().map(catalog::normalize_value);
        let expected_default = expected.default_value.as_ref().map(catalog::normalize_value);
        if current_default != expected_default {
            let action = match &expected.default_value {
                Some(value) => AlterAction::SetDefault {
                    column: Identifier::new(expected.name.clone()),
                    value: value.clone(),
                },
                None => AlterAction::DropDefault(Identifier::new(expected.name.clone())),
            };
            self.emit_alter(table, action);
        }
    }

    /// Column renames: a dropped and an added column of identical type pair
    /// up when `detect_renames` is set; two candidates on either side make
    /// the pairing ambiguous.
    fn plan_renames(
        &self,
        current: &TableEntry,
        expected: &TableEntry,
    ) -> Result<Vec<(SmolStr, SmolStr)>, DiffError> {
        if !self.options.detect_renames {
            return Ok(Vec::new());
        }
        let dropped: Vec<&ColumnEntry> = current
            .columns
            .iter()
            .filter(|(k, _)| !expected.columns.contains_key(*k))
            .map(|(_, c)| c)
            .collect();
        let added: Vec<&ColumnEntry> = expected
            .columns
            .iter()
            .filter(|(k, _)| !current.columns.contains_key(*k))
            .map(|(_, c)| c)
            .collect();

        let mut renames = Vec::new();
        for d in &dropped {
            let candidates: Vec<&&ColumnEntry> = added
                .iter()
                .filter(|a| a.type_signature() == d.type_signature())
                .collect();
            match candidates.len() {
                0 => {}
                1 => {
                    let same_side_competitors = dropped
                        .iter()
                        .filter(|other| other.type_signature() == d.type_signature())
                        .count();
                    if same_side_competitors > 1 {
                        return Err(DiffError::AmbiguousRename {
                            table: current.name.to_string(),
                            candidates: candidates.iter().map(|c| c.name.to_string()).collect(),
                        });
                    }
                    renames.push((
                        catalog::fold(&d.name),
                        catalog::fold(&candidates[0].name),
                    ));
                }
                _ => {
                    return Err(DiffError::AmbiguousRename {
                        table: current.name.to_string(),
                        candidates: candidates.iter().map(|c| c.name.to_string()).collect(),
                    })
                }
            }
        }
        Ok(renames)
    }

    fn drop_missing_constraints(&mut self, current: &TableEntry, expected: &TableEntry) {
        for constraint in &current.constraints {
            let still_wanted = expected
                .constraints
                .iter()
                .any(|c| c.matches(constraint, self.options.check_constraint_names));
            if !still_wanted {
                if let Some(name) = &constraint.name {
                    self.emit_alter(
                        &current.name,
                        AlterAction::DropConstraint(Identifier::new(name.clone())),
                    );
                }
            }
        }
    }

    fn emit_create_table(&mut self, table: &TableEntry) {
        // Rebuild a CREATE TABLE from the normalized entry
        let columns = table.columns.values().map(column_def).collect();
        let constraints = table.constraints.iter().map(|c| c.ast.clone()).collect();
        let statement = Statement::CreateTable(Box::new(crate::ast::CreateTableStmt {
            if_not_exists: false,
            name: QualifiedName::single(Identifier::new(table.name.clone())),
            columns,
            constraints,
            comments: NodeComments::new(),
            position: Position::default(),
        }));
        self.emit(statement);
    }

    fn emit_add_constraint(&mut self, table: &str, constraint: &ConstraintEntry) {
        self.emit_alter(table, AlterAction::AddConstraint(constraint.ast.clone()));
    }

    fn emit_alter(&mut self, table: &str, action: AlterAction) {
        let statement = Statement::Alter(Box::new(AlterTableStmt {
            table: QualifiedName::single(Identifier::new(table)),
            action,
            comments: NodeComments::new(),
            position: Position::default(),
        }));
        self.emit(statement);
    }

    fn emit(&mut self, statement: Statement) {
        // The options are static and valid, so rendering cannot fail
        if let Ok(formatted) = format(&statement, &ddl_options()) {
            trace!(sql = %formatted.formatted_sql, "diff statement");
            self.statements.push(formatted.formatted_sql);
        }
    }
}

fn column_def(column: &ColumnEntry) -> ColumnDef {
    let mut constraints = Vec::new();
    if column.not_null {
        constraints.push(ColumnConstraint::NotNull);
    }
    if let Some(default) = &column.default_value {
        constraints.push(ColumnConstraint::Default(default.clone()));
    }
    ColumnDef {
        name: Identifier::new(column.name.clone()),
        data_type: column.data_type.clone(),
        constraints,
        comments: NodeComments::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn added_columns_and_constraints_come_in_column_order() {
        let current = "create table users (id int primary key, name text not null)";
        let expected = "create table users (id int primary key, name text not null, \
                        email text unique, created_at timestamp default now())";
        let diff =
            DdlDiffGenerator::generate_diff(current, expected, &DiffOptions::default()).unwrap();
        assert_eq!(
            diff,
            vec![
                "ALTER TABLE users ADD COLUMN email TEXT",
                "ALTER TABLE users ADD CONSTRAINT users_email_key UNIQUE (email)",
                "ALTER TABLE users ADD COLUMN created_at TIMESTAMP DEFAULT now()",
            ]
        );
    }

    #[test]
    fn missing_table_is_created_first() {
        let diff = DdlDiffGenerator::generate_diff(
            "",
            "create table t (id int not null)",
            &DiffOptions::default(),
        )
        .unwrap();
        assert_eq!(diff, vec!["CREATE TABLE t (id INT NOT NULL)"]);
    }

    #[test]
    fn type_change_alters_the_column() {
        let diff = DdlDiffGenerator::generate_diff(
            "create table t (x int)",
            "create table t (x bigint)",
            &DiffOptions::default(),
        )
        .unwrap();
        assert_eq!(diff, vec!["ALTER TABLE t ALTER COLUMN x TYPE BIGINT"]);
    }

    #[test]
    fn drops_are_opt_in() {
        let current = "create table t (x int, y int)";
        let expected = "create table t (x int)";
        let none =
            DdlDiffGenerator::generate_diff(current, expected, &DiffOptions::default()).unwrap();
        assert!(none.is_empty());

        let opts = DiffOptions {
            drop_columns: true,
            ..DiffOptions::default()
        };
        let drops = DdlDiffGenerator::generate_diff(current, expected, &opts).unwrap();
        assert_eq!(drops, vec!["ALTER TABLE t DROP COLUMN y"]);
    }

    #[test]
    fn check_names_ignored_unless_asked() {
        let current = "create table t (x int, constraint a_check check (x > 0))";
        let expected = "create table t (x int, constraint b_check check (x > 0))";
        let lax =
            DdlDiffGenerator::generate_diff(current, expected, &DiffOptions::default()).unwrap();
        assert!(lax.is_empty());

        let strict = DiffOptions {
            check_constraint_names: true,
            ..DiffOptions::default()
        };
        let diff = DdlDiffGenerator::generate_diff(current, expected, &strict).unwrap();
        assert_eq!(
            diff,
            vec!["ALTER TABLE t ADD CONSTRAINT b_check CHECK (x > 0)"]
        );
    }

    #[test]
    fn rename_detection_pairs_identical_types() {
        let opts = DiffOptions {
            detect_renames: true,
            ..DiffOptions::default()
        };
        let diff = DdlDiffGenerator::generate_diff(
            "create table t (old_name text)",
            "create table t (new_name text)",
            &opts,
        )
        .unwrap();
        assert_eq!(diff, vec!["ALTER TABLE t RENAME COLUMN old_name TO new_name"]);
    }

    #[test]
    fn ambiguous_rename_errors() {
        let opts = DiffOptions {
            detect_renames: true,
            ..DiffOptions::default()
        };
        let err = DdlDiffGenerator::generate_diff(
            "create table t (a text, b text)",
            "create table t (c text, d text)",
            &opts,
        )
        .unwrap_err();
        assert!(matches!(err, DiffError::AmbiguousRename { .. }));
    }
}
