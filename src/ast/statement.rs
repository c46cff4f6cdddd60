//! Top-level statement sum type

use super::ddl::{AlterTableStmt, CreateIndexStmt, CreateTableStmt};
use super::dml::{DeleteStmt, InsertStmt, MergeStmt, UpdateStmt};
use super::select::SelectQuery;
use crate::base::Position;

/// Any parseable SQL statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectQuery),
    Insert(Box<InsertStmt>),
    Update(Box<UpdateStmt>),
    Delete(Box<DeleteStmt>),
    Merge(Box<MergeStmt>),
    CreateTable(Box<CreateTableStmt>),
    CreateIndex(Box<CreateIndexStmt>),
    Alter(Box<AlterTableStmt>),
}

impl Statement {
    /// Position of the statement's first lexeme
    pub fn position(&self) -> Position {
        match self {
            Statement::Select(query) => query.position(),
            Statement::Insert(stmt) => stmt.position,
            Statement::Update(stmt) => stmt.position,
            Statement::Delete(stmt) => stmt.position,
            Statement::Merge(stmt) => stmt.position,
            Statement::CreateTable(stmt) => stmt.position,
            Statement::CreateIndex(stmt) => stmt.position,
            Statement::Alter(stmt) => stmt.position,
        }
    }

    pub fn as_select(&self) -> Option<&SelectQuery> {
        match self {
            Statement::Select(query) => Some(query),
            _ => None,
        }
    }

    pub fn as_select_mut(&mut self) -> Option<&mut SelectQuery> {
        match self {
            Statement::Select(query) => Some(query),
            _ => None,
        }
    }
}
