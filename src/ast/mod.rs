//! Typed AST for SQL statements
//!
//! The tree is owned: nodes form a strict hierarchy with no parent pointers,
//! and `Clone` is the structural clone used by the decompose/compose
//! workflows. Comment slots ([`NodeComments`]) appear on every node a comment
//! can bind to; ownership is unique — the parser moves each comment off its
//! lexeme exactly once.
//!
//! Field names on the select structures (`with_clause`, `tables`,
//! `alias_expression`, `select_clause.items[i].value` / `.alias`) are public
//! contract and must not be renamed.

mod comments;
mod data_type;
mod ddl;
mod dml;
mod ident;
mod select;
mod statement;
mod value;
pub mod walk;

pub use comments::{Commented, NodeComments};
pub use data_type::SqlType;
pub use ddl::{
    AlterAction, AlterTableStmt, ColumnConstraint, ColumnDef, CreateIndexStmt, CreateTableStmt,
    IndexColumn, TableConstraint,
};
pub use dml::{
    DeleteStmt, InsertColumns, InsertSource, InsertStmt, MergeInsertAction, MergeMatchedAction,
    MergeStmt, MergeWhenClause, ReturningClause, ReturningItems, SetAssignment, UpdateStmt,
};
pub use ident::{Identifier, QualifiedName};
pub use select::{
    AliasExpression, BaseTable, BinarySelect, CommonTable, DerivedTable, DistinctClause,
    ForClause, FromClause, FunctionSource, GroupByClause, HavingClause, JoinCondition, JoinKind,
    JoinSource, LateralSource, LimitClause, LockStrength, NullsOrder, OffsetClause, OrderByClause,
    OrderByItem, QualifyClause, SelectClause, SelectItem, SelectQuery, SetOperator, SimpleSelect,
    SortDirection, TableAlias, TableSource, ValuesQuery, ValuesRow, WhereClause, WindowClause,
    WindowDefinition, WithClause,
};
pub use statement::Statement;
pub use value::{
    ArrayAccessExpr, BetweenExpr, BinaryExpr, BinaryOp, CaseBranch, CaseExpr, CastExpr,
    ExistsExpr, FrameBound, FrameUnits, FunctionCall, InExpr, InSet, IsExpr, IsTarget, Literal,
    OverClause, ParamMarker, ParameterValue, PatternMatchExpr, PatternOp, StarExpr, TupleExpr,
    UnaryExpr, UnaryOp, Value, ValueKind, WindowFrame, WindowSpec,
};

use thiserror::Error;

/// Construction failures surfaced by AST constructors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    #[error("invariant violation: {0}")]
    InvariantViolation(String),
    #[error("unsupported node: {0}")]
    UnsupportedNode(String),
}
