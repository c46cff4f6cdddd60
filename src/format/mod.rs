//! Style-driven SQL formatting
//!
//! Two passes: the [`emit`] visitor lowers the AST into the closed
//! print-token set, then the [`writer`] renders those tokens under
//! [`FormatOptions`]. Output is a deterministic function of tree + options;
//! two equal inputs produce byte-identical text.

mod emit;
mod options;
mod tokens;
mod writer;

pub use options::{
    AndBreak, CommaBreak, CommentStyleOption, FormatOptions, IdentifierCase, IdentifierEscape,
    KeywordCase, ParameterStyle,
};
pub use tokens::{ContainerKind, PrintToken};
pub use writer::ParamBinding;

use thiserror::Error;

use crate::ast::{SelectQuery, Statement, Value};

use emit::Emitter;
use writer::Writer;

/// Formatting failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("unbalanced indentation in print-token stream")]
    IndentMismatch,
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

/// Formatted SQL text plus the parameters collected in emit order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedSql {
    pub formatted_sql: String,
    pub params: Vec<ParamBinding>,
}

/// Render a statement under the given options.
pub fn format(statement: &Statement, options: &FormatOptions) -> Result<FormattedSql, FormatError> {
    let mut emitter = Emitter::new();
    emitter.emit_statement(statement);
    render(emitter, options)
}

/// Render a query expression under the given options.
pub fn format_query(
    query: &SelectQuery,
    options: &FormatOptions,
) -> Result<FormattedSql, FormatError> {
    let mut emitter = Emitter::new();
    emitter.emit_query(query);
    render(emitter, options)
}

/// Render a single value expression; used for constraint normalization.
pub fn format_value(value: &Value, options: &FormatOptions) -> Result<FormattedSql, FormatError> {
    let mut emitter = Emitter::new();
    emitter.emit_value(value);
    render(emitter, options)
}

fn render(emitter: Emitter, options: &FormatOptions) -> Result<FormattedSql, FormatError> {
    let tokens = emitter.into_tokens();
    let writer = Writer::new(options)?;
    let (formatted_sql, params) = writer.render(&tokens)?;
    Ok(FormattedSql {
        formatted_sql,
        params,
    })
}
