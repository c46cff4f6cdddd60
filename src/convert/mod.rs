//! Result-set converters
//!
//! Each converter derives a SELECT from a DML statement with RETURNING: the
//! post-statement rows are simulated over caller-supplied fixture tables,
//! and the RETURNING projection reads from that simulation. No execution
//! happens; the output is an ordinary query AST.

mod delete;
mod fixtures;
mod insert;
mod merge;
mod support;
mod update;

pub use delete::DeleteResultSelectConverter;
pub use fixtures::{FixtureColumn, FixtureTable, FixtureValue};
pub use insert::InsertResultSelectConverter;
pub use merge::MergeResultSelectConverter;
pub use update::UpdateResultSelectConverter;

use thiserror::Error;

use crate::ast::{QualifiedName, Statement};
use crate::editor::CommentEditor;
use crate::lexer::CommentPlacement;

/// Conversion failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConvertError {
    #[error("no fixture table named '{table}'")]
    FixtureMissing { table: String },
    #[error("unsupported conversion: {reason}")]
    UnsupportedReturning { reason: String },
}

/// What to do when a statement has no RETURNING clause or no fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingFixtureStrategy {
    #[default]
    Error,
    Passthrough,
}

/// Converter configuration
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConvertOptions {
    pub fixture_tables: Vec<FixtureTable>,
    pub missing_fixture_strategy: MissingFixtureStrategy,
}

impl ConvertOptions {
    pub fn new(fixture_tables: Vec<FixtureTable>) -> Self {
        Self {
            fixture_tables,
            missing_fixture_strategy: MissingFixtureStrategy::Error,
        }
    }

    pub(crate) fn fixture_for(&self, qname: &QualifiedName) -> Option<&FixtureTable> {
        let name = &qname.name().name;
        self.fixture_tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

/// Convert a batch of statements, dispatching on statement kind.
///
/// With `isolate_errors`, a statement that fails conversion is passed
/// through unchanged with a leading error comment instead of aborting the
/// whole batch.
pub fn convert_statements(
    statements: Vec<Statement>,
    options: &ConvertOptions,
    isolate_errors: bool,
) -> Result<Vec<Statement>, ConvertError> {
    let mut converted = Vec::with_capacity(statements.len());
    for statement in statements {
        let result = convert_one(&statement, options);
        match result {
            Ok(statement) => converted.push(statement),
            Err(err) if isolate_errors => {
                let mut statement = statement;
                annotate_error(&mut statement, &err);
                converted.push(statement);
            }
            Err(err) => return Err(err),
        }
    }
    Ok(converted)
}

fn convert_one(statement: &Statement, options: &ConvertOptions) -> Result<Statement, ConvertError> {
    match statement {
        Statement::Insert(_) => InsertResultSelectConverter::to_select_query(statement, options),
        Statement::Update(_) => UpdateResultSelectConverter::to_select_query(statement, options),
        Statement::Delete(_) => DeleteResultSelectConverter::to_select_query(statement, options),
        Statement::Merge(_) => MergeResultSelectConverter::to_select_query(statement, options),
        other => Ok(other.clone()),
    }
}

fn annotate_error(statement: &mut Statement, err: &ConvertError) {
    match statement {
        Statement::Insert(stmt) => CommentEditor::add_comment(
            stmt.as_mut(),
            &format!(" convert error: {err} "),
            CommentPlacement::Leading,
        ),
        Statement::Update(stmt) => CommentEditor::add_comment(
            stmt.as_mut(),
            &format!(" convert error: {err} "),
            CommentPlacement::Leading,
        ),
        Statement::Delete(stmt) => CommentEditor::add_comment(
            stmt.as_mut(),
            &format!(" convert error: {err} "),
            CommentPlacement::Leading,
        ),
        Statement::Merge(stmt) => CommentEditor::add_comment(
            stmt.as_mut(),
            &format!(" convert error: {err} "),
            CommentPlacement::Leading,
        ),
        _ => {}
    }
}
