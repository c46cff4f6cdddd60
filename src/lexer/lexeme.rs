//! Lexemes: significant tokens plus their owned comments
//!
//! A [`Lexeme`] is what the parser consumes. Comments never appear as
//! standalone entries in the lexeme stream; each one is owned by exactly one
//! lexeme (leading or trailing) until the parser moves it onto an AST node.

use smol_str::SmolStr;

use crate::base::Span;

/// Literal sub-kind. String-ness is part of the kind so `'null'` can never
/// collapse into bare `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Numeric,
    String,
    Boolean,
    Null,
}

/// Lexeme classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LexemeKind {
    Identifier,
    Keyword,
    Literal(LiteralKind),
    Parameter,
    Operator,
    Punct,
    Hint,
}

/// Where a comment sits relative to its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentPlacement {
    Leading,
    Trailing,
    Inline,
}

/// Line (`-- …`) or block (`/* … */`) comment form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommentStyle {
    Line,
    Block,
}

/// A comment with its delimiters stripped. Owned by one lexeme pre-parse and
/// by one AST node post-parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub text: SmolStr,
    pub style: CommentStyle,
    pub placement: CommentPlacement,
}

impl Comment {
    pub fn new(text: impl Into<SmolStr>, style: CommentStyle, placement: CommentPlacement) -> Self {
        Self {
            text: text.into(),
            style,
            placement,
        }
    }
}

/// A single token plus its owned comments and source position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub kind: LexemeKind,
    /// Decoded text: escape doubling resolved for strings and quoted
    /// identifiers, original casing preserved for words
    pub text: SmolStr,
    /// True for identifiers written with double quotes
    pub quoted: bool,
    pub span: Span,
    pub leading_comments: Vec<Comment>,
    pub trailing_comments: Vec<Comment>,
}

impl Lexeme {
    pub fn new(kind: LexemeKind, text: impl Into<SmolStr>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            quoted: false,
            span,
            leading_comments: Vec::new(),
            trailing_comments: Vec::new(),
        }
    }

    /// Case-insensitive keyword test
    pub fn is_keyword(&self, word: &str) -> bool {
        self.kind == LexemeKind::Keyword && self.text.eq_ignore_ascii_case(word)
    }

    /// Exact operator test
    pub fn is_operator(&self, op: &str) -> bool {
        self.kind == LexemeKind::Operator && self.text == op
    }

    /// Exact punctuation test
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == LexemeKind::Punct && self.text == punct
    }

    /// Identifier or non-reserved keyword usable as a name
    pub fn is_name_like(&self) -> bool {
        match self.kind {
            LexemeKind::Identifier => true,
            LexemeKind::Keyword => !super::keywords::is_reserved(&self.text),
            _ => false,
        }
    }

    pub fn comment_count(&self) -> usize {
        self.leading_comments.len() + self.trailing_comments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::Position;
    use text_size::TextSize;

    fn span() -> Span {
        Span::new(Position::new(TextSize::new(0), 1, 1), TextSize::new(6))
    }

    #[test]
    fn keyword_test_ignores_case() {
        let lexeme = Lexeme::new(LexemeKind::Keyword, "SeLeCt", span());
        assert!(lexeme.is_keyword("select"));
        assert!(lexeme.is_keyword("SELECT"));
        assert!(!lexeme.is_keyword("from"));
    }

    #[test]
    fn operator_test_is_exact() {
        let lexeme = Lexeme::new(LexemeKind::Operator, "<=", span());
        assert!(lexeme.is_operator("<="));
        assert!(!lexeme.is_operator("<"));
    }

    #[test]
    fn non_reserved_keyword_is_name_like() {
        let lexeme = Lexeme::new(LexemeKind::Keyword, "key", span());
        assert!(lexeme.is_name_like());
        let reserved = Lexeme::new(LexemeKind::Keyword, "select", span());
        assert!(!reserved.is_name_like());
    }
}
