//! CREATE TABLE, CREATE INDEX, and ALTER TABLE statements

use super::comments::{NodeComments, impl_commented};
use super::data_type::SqlType;
use super::ident::{Identifier, QualifiedName};
use super::select::{NullsOrder, SortDirection};
use super::value::Value;
use crate::base::Position;

#[derive(Debug, Clone, PartialEq)]
pub struct CreateTableStmt {
    pub if_not_exists: bool,
    pub name: QualifiedName,
    pub columns: Vec<ColumnDef>,
    pub constraints: Vec<TableConstraint>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(CreateTableStmt => "CreateTableStatement");

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Identifier,
    pub data_type: SqlType,
    pub constraints: Vec<ColumnConstraint>,
    pub comments: NodeComments,
}

impl_commented!(ColumnDef => "ColumnDef");

impl ColumnDef {
    pub fn not_null(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, ColumnConstraint::NotNull))
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.constraints.iter().find_map(|c| match c {
            ColumnConstraint::Default(value) => Some(value),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    NotNull,
    Null,
    PrimaryKey,
    Unique,
    Default(Value),
    Check(Value),
    References {
        table: QualifiedName,
        columns: Vec<Identifier>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    PrimaryKey {
        name: Option<Identifier>,
        columns: Vec<Identifier>,
    },
    Unique {
        name: Option<Identifier>,
        columns: Vec<Identifier>,
    },
    ForeignKey {
        name: Option<Identifier>,
        columns: Vec<Identifier>,
        ref_table: QualifiedName,
        ref_columns: Vec<Identifier>,
    },
    Check {
        name: Option<Identifier>,
        predicate: Value,
    },
}

impl TableConstraint {
    pub fn name(&self) -> Option<&Identifier> {
        match self {
            TableConstraint::PrimaryKey { name, .. }
            | TableConstraint::Unique { name, .. }
            | TableConstraint::ForeignKey { name, .. }
            | TableConstraint::Check { name, .. } => name.as_ref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateIndexStmt {
    pub unique: bool,
    pub if_not_exists: bool,
    pub name: Identifier,
    pub table: QualifiedName,
    pub columns: Vec<IndexColumn>,
    /// `USING btree` and friends
    pub method: Option<Identifier>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(CreateIndexStmt => "CreateIndexStatement");

#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub value: Value,
    pub direction: Option<SortDirection>,
    pub nulls: Option<NullsOrder>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterTableStmt {
    pub table: QualifiedName,
    pub action: AlterAction,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(AlterTableStmt => "AlterTableStatement");

#[derive(Debug, Clone, PartialEq)]
pub enum AlterAction {
    AddColumn(ColumnDef),
    DropColumn(Identifier),
    AddConstraint(TableConstraint),
    DropConstraint(Identifier),
    AlterColumnType {
        column: Identifier,
        data_type: SqlType,
    },
    SetNotNull(Identifier),
    DropNotNull(Identifier),
    SetDefault {
        column: Identifier,
        value: Value,
    },
    DropDefault(Identifier),
    RenameColumn {
        from: Identifier,
        to: Identifier,
    },
}
