//! Comment-preserving lexer for SQL
//!
//! Two stages:
//! - **raw pass** ([`raw`]): a logos scan over the full input, trivia
//!   included
//! - **attachment pass** ([`tokenize`]): folds comments into the neighboring
//!   [`Lexeme`]s and drops whitespace
//!
//! Attachment rule: a comment on the same line after a lexeme and before the
//! next newline trails that lexeme; every other comment leads the next
//! lexeme. Ties resolve in source order, and no comment is ever owned twice.

mod lexeme;
pub mod keywords;
mod raw;

pub use lexeme::{Comment, CommentPlacement, CommentStyle, Lexeme, LexemeKind, LiteralKind};
pub use raw::RawToken;

use logos::Logos;
use text_size::TextSize;
use thiserror::Error;

use crate::base::{LineIndex, Position, Span};

/// Lexing failure kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("unexpected character '{0}'")]
    UnexpectedChar(char),
}

/// A lexing failure with the position of the offending input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    pub position: Position,
}

/// Tokenize SQL source into a lexeme stream with attached comments.
pub fn tokenize(src: &str) -> Result<Vec<Lexeme>, LexError> {
    Tokenizer::new(src).run()
}

/// A comment waiting for an owner, with the line facts needed to decide
struct QueuedComment {
    comment: Comment,
    start_line: u32,
    end_line: u32,
}

struct Tokenizer<'a> {
    src: &'a str,
    index: LineIndex,
    lexemes: Vec<Lexeme>,
    queue: Vec<QueuedComment>,
    /// Line on which the last significant lexeme ends
    prev_end_line: Option<u32>,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            index: LineIndex::new(src),
            lexemes: Vec::new(),
            queue: Vec::new(),
            prev_end_line: None,
        }
    }

    fn position(&self, offset: usize) -> Position {
        let offset = TextSize::new(offset as u32);
        let lc = self.index.line_col(offset);
        Position::new(offset, lc.line, lc.col)
    }

    fn line_of_last_char(&self, range: &std::ops::Range<usize>) -> u32 {
        let last = range.end.saturating_sub(1).max(range.start);
        self.index.line(TextSize::new(last as u32))
    }

    fn run(mut self) -> Result<Vec<Lexeme>, LexError> {
        let mut lex = RawToken::lexer(self.src);
        while let Some(result) = lex.next() {
            let range = lex.span();
            let slice = lex.slice();
            match result {
                Err(()) => return Err(self.classify_error(range.start)),
                Ok(RawToken::Whitespace) => {}
                Ok(RawToken::LineComment) => {
                    let text = slice.strip_prefix("--").unwrap_or(slice);
                    self.queue_comment(text, CommentStyle::Line, &range);
                }
                Ok(RawToken::BlockComment) if !slice.starts_with("/*+") => {
                    let text = &slice[2..slice.len() - 2];
                    self.queue_comment(text, CommentStyle::Block, &range);
                }
                Ok(token) => {
                    let lexeme = self.build_lexeme(token, slice, &range);
                    self.push_lexeme(lexeme, &range);
                }
            }
        }
        self.flush_at_eof();
        Ok(self.lexemes)
    }

    fn queue_comment(&mut self, text: &str, style: CommentStyle, range: &std::ops::Range<usize>) {
        self.queue.push(QueuedComment {
            comment: Comment::new(text, style, CommentPlacement::Leading),
            start_line: self.index.line(TextSize::new(range.start as u32)),
            end_line: self.line_of_last_char(range),
        });
    }

    /// Settle queued comments now that the next significant lexeme is known
    /// to start on `next_line`; `None` means end of input.
    fn settle_queue(&mut self, next_line: Option<u32>) -> Vec<Comment> {
        let mut leading = Vec::new();
        for queued in self.queue.drain(..) {
            let trails_prev = match (self.prev_end_line, next_line) {
                (Some(prev), Some(next)) => queued.start_line == prev && next > queued.end_line,
                (Some(prev), None) => queued.start_line == prev,
                (None, _) => false,
            };
            if trails_prev || next_line.is_none() {
                let mut comment = queued.comment;
                comment.placement = CommentPlacement::Trailing;
                if let Some(last) = self.lexemes.last_mut() {
                    last.trailing_comments.push(comment);
                }
            } else {
                leading.push(queued.comment);
            }
        }
        leading
    }

    fn push_lexeme(&mut self, mut lexeme: Lexeme, range: &std::ops::Range<usize>) {
        let line = self.index.line(TextSize::new(range.start as u32));
        lexeme.leading_comments = self.settle_queue(Some(line));
        self.prev_end_line = Some(self.line_of_last_char(range));
        self.lexemes.push(lexeme);
    }

    fn flush_at_eof(&mut self) {
        self.settle_queue(None);
    }

    fn build_lexeme(&self, token: RawToken, slice: &str, range: &std::ops::Range<usize>) -> Lexeme {
        let span = Span::new(
            self.position(range.start),
            TextSize::new((range.end - range.start) as u32),
        );
        match token {
            RawToken::Word => Lexeme::new(keywords::classify(slice), slice, span),
            RawToken::QuotedIdent => {
                let inner = slice[1..slice.len() - 1].replace("\"\"", "\"");
                let mut lexeme = Lexeme::new(LexemeKind::Identifier, inner, span);
                lexeme.quoted = true;
                lexeme
            }
            RawToken::SingleQuoted => {
                let inner = slice[1..slice.len() - 1].replace("''", "'");
                Lexeme::new(LexemeKind::Literal(LiteralKind::String), inner, span)
            }
            RawToken::DollarQuoted => {
                // slice is $tag$body$tag$; the tag ends at the second '$'
                let tag_len = slice[1..].find('$').map(|i| i + 2).unwrap_or(2);
                let inner = &slice[tag_len..slice.len() - tag_len];
                Lexeme::new(LexemeKind::Literal(LiteralKind::String), inner, span)
            }
            RawToken::Number | RawToken::DotNumber => {
                Lexeme::new(LexemeKind::Literal(LiteralKind::Numeric), slice, span)
            }
            RawToken::ColonParam
            | RawToken::AtParam
            | RawToken::DollarParam
            | RawToken::BracedParam
            | RawToken::QuestionParam => Lexeme::new(LexemeKind::Parameter, slice, span),
            RawToken::BlockComment => {
                // Only hints reach this arm; plain comments are queued earlier
                let inner = &slice[3..slice.len() - 2];
                Lexeme::new(LexemeKind::Hint, inner, span)
            }
            RawToken::LParen
            | RawToken::RParen
            | RawToken::Comma
            | RawToken::Dot
            | RawToken::Semicolon
            | RawToken::LBracket
            | RawToken::RBracket => Lexeme::new(LexemeKind::Punct, slice, span),
            _ => Lexeme::new(LexemeKind::Operator, slice, span),
        }
    }

    fn classify_error(&self, offset: usize) -> LexError {
        let rest = &self.src[offset..];
        let kind = if rest.starts_with('\'') || rest.starts_with('"') {
            LexErrorKind::UnterminatedString
        } else if rest.starts_with("/*") {
            LexErrorKind::UnterminatedBlockComment
        } else if rest.starts_with("${") {
            LexErrorKind::InvalidEscape
        } else if rest.starts_with('$') && rest.len() > 1 {
            // An opening dollar-quote tag whose closer never appears
            LexErrorKind::UnterminatedString
        } else {
            LexErrorKind::UnexpectedChar(rest.chars().next().unwrap_or('\0'))
        };
        LexError {
            kind,
            position: self.position(offset),
        }
    }
}
