//! Grammar modules
//!
//! Statement dispatch lives here; the per-family rules live in the
//! submodules:
//!
//! ```text
//! common  → names, aliases, data types, comma-separated lists
//! expr    → value expressions (precedence climbing)
//! select  → SELECT / VALUES / set operations / WITH
//! dml     → INSERT / UPDATE / DELETE / MERGE
//! ddl     → CREATE TABLE / CREATE INDEX / ALTER TABLE
//! ```

pub(crate) mod common;
pub(crate) mod ddl;
pub(crate) mod dml;
pub(crate) mod expr;
pub(crate) mod select;

use tracing::trace;

use super::{ParseError, ParseErrorKind, Parser};
use crate::ast::Statement;

/// Dispatch on the first significant keyword. A leading WITH routes to the
/// statement kind that follows the clause.
pub(crate) fn parse_statement(p: &mut Parser) -> Result<Statement, ParseError> {
    let Some(first) = p.current() else {
        return Err(p.error(
            ParseErrorKind::UnknownStatement,
            "empty input is not a statement",
        ));
    };
    trace!(first = %first.text, "statement dispatch");

    if p.at_keyword("select") || p.at_keyword("values") || p.at_keyword("with") {
        // WITH may also prefix DML; look past the clause body for those
        if p.at_keyword("with") {
            if let Some(kind) = peek_after_with(p) {
                return match kind {
                    DmlKind::Insert => dml::parse_insert_entry(p),
                    DmlKind::Update => dml::parse_update_entry(p),
                    DmlKind::Delete => dml::parse_delete_entry(p),
                    DmlKind::Merge => dml::parse_merge_entry(p),
                };
            }
        }
        return Ok(Statement::Select(select::parse_query(p)?));
    }
    if p.at_keyword("insert") {
        return dml::parse_insert_entry(p);
    }
    if p.at_keyword("update") {
        return dml::parse_update_entry(p);
    }
    if p.at_keyword("delete") {
        return dml::parse_delete_entry(p);
    }
    if p.at_keyword("merge") {
        return dml::parse_merge_entry(p);
    }
    if p.at_keyword("create") {
        return ddl::parse_create_entry(p);
    }
    if p.at_keyword("alter") {
        return ddl::parse_alter_entry(p);
    }
    Err(p.expected(
        ParseErrorKind::UnknownStatement,
        &[
            "SELECT", "VALUES", "WITH", "INSERT", "UPDATE", "DELETE", "MERGE", "CREATE", "ALTER",
        ],
    ))
}

enum DmlKind {
    Insert,
    Update,
    Delete,
    Merge,
}

/// Scan past a WITH clause (tracking parenthesis depth) to find the keyword
/// introducing the main statement.
fn peek_after_with(p: &Parser) -> Option<DmlKind> {
    let mut depth = 0usize;
    let mut n = 0usize;
    while let Some(lexeme) = p.peek(n) {
        if lexeme.is_punct("(") {
            depth += 1;
        } else if lexeme.is_punct(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 {
            if lexeme.is_keyword("insert") {
                return Some(DmlKind::Insert);
            }
            if lexeme.is_keyword("update") {
                return Some(DmlKind::Update);
            }
            if lexeme.is_keyword("delete") {
                return Some(DmlKind::Delete);
            }
            if lexeme.is_keyword("merge") {
                return Some(DmlKind::Merge);
            }
            if lexeme.is_keyword("select") || lexeme.is_keyword("values") {
                return None;
            }
        }
        n += 1;
    }
    None
}
