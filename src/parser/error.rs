//! Parse errors
//!
//! The parser aborts on the first error; there is no recovery. Every error
//! carries the source position, what was expected, and what was found.

use thiserror::Error;

use crate::base::Position;
use crate::lexer::{LexError, Lexeme};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    UnexpectedToken,
    MissingToken,
    UnknownStatement,
    InvalidExpression,
}

/// A parse failure with position and expectation context
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at line {}, column {}", position.line, position.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
    /// Human-readable descriptions of what would have been accepted
    pub expected: Vec<String>,
    /// Description of the lexeme actually found
    pub found: String,
    pub message: String,
}

impl ParseError {
    pub fn new(
        kind: ParseErrorKind,
        position: Position,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        let found = found.into();
        let message = if expected.is_empty() {
            format!("unexpected {found}")
        } else {
            format!("expected {}, found {found}", expected.join(" or "))
        };
        Self {
            kind,
            position,
            expected,
            found,
            message,
        }
    }

    pub fn with_message(
        kind: ParseErrorKind,
        position: Position,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            position,
            expected: Vec::new(),
            found: String::new(),
            message: message.into(),
        }
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            kind: ParseErrorKind::UnexpectedToken,
            position: err.position,
            expected: Vec::new(),
            found: String::new(),
            message: err.to_string(),
        }
    }
}

/// Describe a lexeme for error messages
pub fn describe(lexeme: Option<&Lexeme>) -> String {
    match lexeme {
        None => "end of input".to_string(),
        Some(lexeme) => format!("'{}'", lexeme.text),
    }
}
