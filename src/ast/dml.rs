//! INSERT, UPDATE, DELETE, and MERGE statements

use super::comments::{NodeComments, impl_commented};
use super::ident::{Identifier, QualifiedName};
use super::select::{
    FromClause, SelectItem, SelectQuery, TableAlias, TableSource, ValuesQuery, WhereClause,
    WithClause,
};
use super::value::Value;
use crate::base::Position;

/// `INSERT INTO table [(cols)] VALUES … | select [RETURNING …]`
#[derive(Debug, Clone, PartialEq)]
pub struct InsertStmt {
    pub with_clause: Option<WithClause>,
    pub table: QualifiedName,
    pub columns: Option<InsertColumns>,
    pub source: InsertSource,
    pub returning: Option<ReturningClause>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(InsertStmt => "InsertStatement");

/// The insert column list; its comment slots carry before/after placement
/// around the parenthesized names
#[derive(Debug, Clone, PartialEq)]
pub struct InsertColumns {
    pub columns: Vec<Identifier>,
    pub comments: NodeComments,
}

impl_commented!(InsertColumns => "InsertColumns");

#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    Values(ValuesQuery),
    Query(SelectQuery),
    DefaultValues,
}

/// `RETURNING *` or `RETURNING expr [AS alias], …`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturningClause {
    pub items: ReturningItems,
    pub comments: NodeComments,
}

impl_commented!(ReturningClause => "ReturningClause");

#[derive(Debug, Clone, PartialEq)]
pub enum ReturningItems {
    Star,
    Items(Vec<SelectItem>),
}

/// `UPDATE table SET col = expr, … [FROM …] [WHERE …] [RETURNING …]`
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStmt {
    pub with_clause: Option<WithClause>,
    pub table: QualifiedName,
    pub alias: Option<TableAlias>,
    pub assignments: Vec<SetAssignment>,
    pub from_clause: Option<FromClause>,
    pub where_clause: Option<WhereClause>,
    pub returning: Option<ReturningClause>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(UpdateStmt => "UpdateStatement");

#[derive(Debug, Clone, PartialEq)]
pub struct SetAssignment {
    pub column: QualifiedName,
    pub value: Value,
    pub comments: NodeComments,
}

impl_commented!(SetAssignment => "SetAssignment");

/// `DELETE FROM table [USING …] [WHERE …] [RETURNING …]`
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStmt {
    pub with_clause: Option<WithClause>,
    pub table: QualifiedName,
    pub alias: Option<TableAlias>,
    pub using: Vec<TableSource>,
    pub where_clause: Option<WhereClause>,
    pub returning: Option<ReturningClause>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(DeleteStmt => "DeleteStatement");

/// `MERGE INTO target USING source ON cond WHEN … THEN …`
#[derive(Debug, Clone, PartialEq)]
pub struct MergeStmt {
    pub with_clause: Option<WithClause>,
    pub target: QualifiedName,
    pub target_alias: Option<TableAlias>,
    pub source: TableSource,
    pub on: Value,
    pub clauses: Vec<MergeWhenClause>,
    pub returning: Option<ReturningClause>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(MergeStmt => "MergeStatement");

#[derive(Debug, Clone, PartialEq)]
pub enum MergeWhenClause {
    Matched {
        condition: Option<Value>,
        action: MergeMatchedAction,
    },
    NotMatched {
        condition: Option<Value>,
        action: MergeInsertAction,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MergeMatchedAction {
    Update(Vec<SetAssignment>),
    Delete,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeInsertAction {
    pub columns: Option<Vec<Identifier>>,
    pub values: Vec<Value>,
}
