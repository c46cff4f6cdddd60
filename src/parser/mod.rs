//! Recursive-descent parser for SQL
//!
//! Entry points lex the input, then drive the grammar modules over the
//! lexeme stream. Statement dispatch peeks the first significant keyword
//! (after an optional leading WITH); expressions use precedence climbing.
//!
//! Comment ownership moves from lexemes onto AST nodes as nodes are built:
//! the innermost node built over a lexeme takes its comments, and a final
//! sweep hands any stragglers (operator and punctuation comments that no
//! construct claimed) to the statement root. No comment is dropped and none
//! is owned twice.

mod error;
pub(crate) mod grammar;
mod splitter;

pub use error::{ParseError, ParseErrorKind};
pub use splitter::{SplitQuery, SplitResult, split_statements};

use tracing::trace;

use crate::ast::{NodeComments, SelectQuery, Statement};
use crate::lexer::{Comment, Lexeme, LexemeKind, tokenize};
use crate::base::Position;

use error::describe;

/// Parse a single SQL statement.
pub fn parse(src: &str) -> Result<Statement, ParseError> {
    let lexemes = tokenize(src)?;
    let mut parser = Parser::new(lexemes);
    let mut statement = grammar::parse_statement(&mut parser)?;
    parser.expect_end()?;
    parser.sweep_all(root_comments_mut(&mut statement));
    Ok(statement)
}

/// Parse a SELECT (or VALUES, or WITH … SELECT) query.
pub fn parse_select(src: &str) -> Result<SelectQuery, ParseError> {
    let lexemes = tokenize(src)?;
    let mut parser = Parser::new(lexemes);
    let mut query = grammar::select::parse_query(&mut parser)?;
    parser.expect_end()?;
    parser.sweep_all(query_root_comments_mut(&mut query));
    Ok(query)
}

/// The comment slot a statement-level sweep targets
fn root_comments_mut(statement: &mut Statement) -> &mut NodeComments {
    match statement {
        Statement::Select(query) => query_root_comments_mut(query),
        Statement::Insert(stmt) => &mut stmt.comments,
        Statement::Update(stmt) => &mut stmt.comments,
        Statement::Delete(stmt) => &mut stmt.comments,
        Statement::Merge(stmt) => &mut stmt.comments,
        Statement::CreateTable(stmt) => &mut stmt.comments,
        Statement::CreateIndex(stmt) => &mut stmt.comments,
        Statement::Alter(stmt) => &mut stmt.comments,
    }
}

fn query_root_comments_mut(query: &mut SelectQuery) -> &mut NodeComments {
    match query {
        SelectQuery::Simple(select) => &mut select.comments,
        SelectQuery::Binary(binary) => &mut binary.comments,
        SelectQuery::Values(values) => &mut values.comments,
    }
}

macro_rules! statement_entry {
    ($(#[$doc:meta] $name:ident => $rule:path),+ $(,)?) => {
        $(
            #[$doc]
            pub fn $name(src: &str) -> Result<Statement, ParseError> {
                let lexemes = tokenize(src)?;
                let mut parser = Parser::new(lexemes);
                let mut statement = $rule(&mut parser)?;
                parser.expect_end()?;
                parser.sweep_all(root_comments_mut(&mut statement));
                Ok(statement)
            }
        )+
    };
}

statement_entry! {
    /// Parse an INSERT statement.
    parse_insert => grammar::dml::parse_insert_entry,
    /// Parse an UPDATE statement.
    parse_update => grammar::dml::parse_update_entry,
    /// Parse a DELETE statement.
    parse_delete => grammar::dml::parse_delete_entry,
    /// Parse a MERGE statement.
    parse_merge => grammar::dml::parse_merge_entry,
    /// Parse a CREATE TABLE statement.
    parse_create_table => grammar::ddl::parse_create_table_entry,
    /// Parse a CREATE INDEX statement.
    parse_create_index => grammar::ddl::parse_create_index_entry,
}

/// The parser state over a lexeme stream
pub(crate) struct Parser {
    lexemes: Vec<Lexeme>,
    pos: usize,
}

impl Parser {
    pub(crate) fn new(lexemes: Vec<Lexeme>) -> Self {
        Self { lexemes, pos: 0 }
    }

    // =========================================================================
    // Lexeme inspection
    // =========================================================================

    pub(crate) fn current(&self) -> Option<&Lexeme> {
        self.lexemes.get(self.pos)
    }

    pub(crate) fn peek(&self, n: usize) -> Option<&Lexeme> {
        self.lexemes.get(self.pos + n)
    }

    pub(crate) fn at_eof(&self) -> bool {
        self.pos >= self.lexemes.len()
    }

    pub(crate) fn index(&self) -> usize {
        self.pos
    }

    /// Position of the current lexeme, or of the end of input
    pub(crate) fn position(&self) -> Position {
        match self.current() {
            Some(lexeme) => lexeme.span.start,
            None => self
                .lexemes
                .last()
                .map(|l| l.span.start)
                .unwrap_or_default(),
        }
    }

    pub(crate) fn at_keyword(&self, word: &str) -> bool {
        self.current().is_some_and(|l| l.is_keyword(word))
    }

    pub(crate) fn peek_keyword(&self, n: usize, word: &str) -> bool {
        self.peek(n).is_some_and(|l| l.is_keyword(word))
    }

    pub(crate) fn at_punct(&self, punct: &str) -> bool {
        self.current().is_some_and(|l| l.is_punct(punct))
    }

    pub(crate) fn at_operator(&self, op: &str) -> bool {
        self.current().is_some_and(|l| l.is_operator(op))
    }

    pub(crate) fn at_name(&self) -> bool {
        self.current().is_some_and(|l| l.is_name_like())
    }

    // =========================================================================
    // Lexeme consumption
    // =========================================================================

    pub(crate) fn bump(&mut self) -> usize {
        let idx = self.pos;
        self.pos += 1;
        idx
    }

    pub(crate) fn eat_keyword(&mut self, word: &str) -> bool {
        if self.at_keyword(word) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_punct(&mut self, punct: &str) -> bool {
        if self.at_punct(punct) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_operator(&mut self, op: &str) -> bool {
        if self.at_operator(op) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<usize, ParseError> {
        if self.at_keyword(word) {
            Ok(self.bump())
        } else {
            Err(self.expected(ParseErrorKind::MissingToken, &[word]))
        }
    }

    pub(crate) fn expect_punct(&mut self, punct: &str) -> Result<usize, ParseError> {
        if self.at_punct(punct) {
            Ok(self.bump())
        } else {
            Err(self.expected(ParseErrorKind::MissingToken, &[punct]))
        }
    }

    /// Consume an identifier or a non-reserved keyword used as a name
    pub(crate) fn expect_name(&mut self) -> Result<usize, ParseError> {
        if self.at_name() {
            Ok(self.bump())
        } else {
            Err(self.expected(ParseErrorKind::UnexpectedToken, &["identifier"]))
        }
    }

    pub(crate) fn expect_end(&mut self) -> Result<(), ParseError> {
        // A single trailing semicolon is tolerated
        self.eat_punct(";");
        if self.at_eof() {
            Ok(())
        } else {
            Err(self.expected(ParseErrorKind::UnexpectedToken, &["end of statement"]))
        }
    }

    // =========================================================================
    // Errors
    // =========================================================================

    pub(crate) fn expected(&self, kind: ParseErrorKind, expected: &[&str]) -> ParseError {
        trace!(
            position = ?self.position(),
            expected = ?expected,
            "parse error"
        );
        ParseError::new(
            kind,
            self.position(),
            expected.iter().map(|s| s.to_string()).collect(),
            describe(self.current()),
        )
    }

    pub(crate) fn error(&self, kind: ParseErrorKind, message: impl Into<String>) -> ParseError {
        ParseError::with_message(kind, self.position(), message)
    }

    // =========================================================================
    // Comment ownership
    // =========================================================================

    pub(crate) fn lexeme(&self, idx: usize) -> &Lexeme {
        &self.lexemes[idx]
    }

    /// Take the leading comments still owned by the lexeme at `idx`
    pub(crate) fn take_leading(&mut self, idx: usize) -> Vec<Comment> {
        match self.lexemes.get_mut(idx) {
            Some(lexeme) => std::mem::take(&mut lexeme.leading_comments),
            None => Vec::new(),
        }
    }

    /// Take the trailing comments still owned by the lexeme at `idx`
    pub(crate) fn take_trailing(&mut self, idx: usize) -> Vec<Comment> {
        match self.lexemes.get_mut(idx) {
            Some(lexeme) => std::mem::take(&mut lexeme.trailing_comments),
            None => Vec::new(),
        }
    }

    /// Move the boundary comments of the node built over `first..=last` onto
    /// the node: leading of the first lexeme, trailing of the last.
    pub(crate) fn attach_comments(
        &mut self,
        first: usize,
        last: usize,
        comments: &mut NodeComments,
    ) {
        let mut leading = self.take_leading(first);
        comments.leading.append(&mut leading);
        let mut trailing = self.take_trailing(last);
        comments.trailing.append(&mut trailing);
    }

    /// Attach boundary comments for a node that ends at the previous lexeme
    pub(crate) fn attach_span(&mut self, start: usize, comments: &mut NodeComments) {
        let last = self.pos.saturating_sub(1);
        self.attach_comments(start, last, comments);
    }

    /// Collect every comment still owned by a lexeme into the given slot,
    /// preserving source order. Runs once per statement so no comment
    /// survives parse unowned.
    pub(crate) fn sweep_all(&mut self, comments: &mut NodeComments) {
        for lexeme in &mut self.lexemes {
            comments.leading.append(&mut lexeme.leading_comments);
            comments.leading.append(&mut lexeme.trailing_comments);
        }
    }

    /// Current lexeme is a hint?
    pub(crate) fn at_hint(&self) -> bool {
        self.current().is_some_and(|l| l.kind == LexemeKind::Hint)
    }

    /// The word `null` lexes as a literal, so keyword helpers miss it
    pub(crate) fn at_null(&self) -> bool {
        self.peek_null(0)
    }

    pub(crate) fn peek_null(&self, n: usize) -> bool {
        self.peek(n).is_some_and(|l| {
            matches!(
                l.kind,
                LexemeKind::Literal(crate::lexer::LiteralKind::Null)
            )
        })
    }

    pub(crate) fn expect_null(&mut self) -> Result<usize, ParseError> {
        if self.at_null() {
            Ok(self.bump())
        } else {
            Err(self.expected(ParseErrorKind::MissingToken, &["NULL"]))
        }
    }
}
