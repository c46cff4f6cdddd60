//! Logos-based raw token pass
//!
//! First of the two lexing stages: raw tokens cover the full input including
//! trivia (whitespace, comments). The attachment pass in `mod.rs` folds
//! trivia into [`Lexeme`](super::Lexeme)s.

use logos::{Lexer, Logos};

/// Consume a dollar-quoted body after its opening tag (`$tag$` or `$$`).
///
/// The slice at entry is the opening tag; the body runs until the identical
/// closing tag. Returns false when the closing tag never appears, which
/// logos surfaces as an error token over the opening tag.
fn lex_dollar_quoted(lex: &mut Lexer<RawToken>) -> bool {
    let tag = lex.slice().to_owned();
    match lex.remainder().find(&tag) {
        Some(idx) => {
            lex.bump(idx + tag.len());
            true
        }
        None => false,
    }
}

/// Raw token enum - maps to LexemeKind in the attachment pass
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawToken {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    #[regex(r"[ \t\r\n\f]+")]
    Whitespace,

    #[regex(r"--[^\n]*")]
    LineComment,

    // Also matches hints /*+ ... */; the attachment pass tells them apart
    #[regex(r"/\*[^*]*\*+([^/*][^*]*\*+)*/")]
    BlockComment,

    // =========================================================================
    // WORDS AND LITERALS
    // =========================================================================
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r#""([^"]|"")*""#)]
    QuotedIdent,

    #[regex(r"'([^']|'')*'")]
    SingleQuoted,

    #[regex(r"\$([A-Za-z_][A-Za-z0-9_]*)?\$", lex_dollar_quoted)]
    DollarQuoted,

    #[regex(r"[0-9]+(\.[0-9]+)?([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?")]
    DotNumber,

    // =========================================================================
    // PARAMETERS
    // =========================================================================
    #[regex(r":[A-Za-z_][A-Za-z0-9_]*")]
    ColonParam,

    #[regex(r"@[A-Za-z_][A-Za-z0-9_]*")]
    AtParam,

    #[regex(r"\$[0-9]+")]
    DollarParam,

    #[regex(r"\$\{[A-Za-z_][A-Za-z0-9_]*\}")]
    BracedParam,

    #[token("?")]
    QuestionParam,

    // =========================================================================
    // MULTI-CHARACTER OPERATORS (must come before single-char)
    // =========================================================================
    #[token("::")]
    ColonColon,

    #[token("||")]
    PipePipe,

    #[token("<=")]
    LtEq,

    #[token(">=")]
    GtEq,

    #[token("<>")]
    LtGt,

    #[token("!=")]
    BangEq,

    #[token("<<")]
    LtLt,

    #[token(">>")]
    GtGt,

    // =========================================================================
    // SINGLE-CHARACTER OPERATORS
    // =========================================================================
    #[token("=")]
    Eq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("|")]
    Pipe,
    #[token("&")]
    Amp,
    #[token("#")]
    Hash,
    #[token("~")]
    Tilde,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
}

impl RawToken {
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            RawToken::Whitespace | RawToken::LineComment | RawToken::BlockComment
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<RawToken> {
        RawToken::lexer(input).map(|t| t.unwrap()).collect()
    }

    #[test]
    fn lex_simple_select() {
        let tokens = kinds("select a from t");
        assert_eq!(
            tokens,
            vec![
                RawToken::Word,
                RawToken::Whitespace,
                RawToken::Word,
                RawToken::Whitespace,
                RawToken::Word,
                RawToken::Whitespace,
                RawToken::Word,
            ]
        );
    }

    #[test]
    fn lex_string_with_doubled_quote() {
        let mut lex = RawToken::lexer("'it''s'");
        assert_eq!(lex.next(), Some(Ok(RawToken::SingleQuoted)));
        assert_eq!(lex.slice(), "'it''s'");
        assert_eq!(lex.next(), None);
    }

    #[test]
    fn lex_dollar_quoted_body() {
        let mut lex = RawToken::lexer("$tag$some 'text'$tag$");
        assert_eq!(lex.next(), Some(Ok(RawToken::DollarQuoted)));
        assert_eq!(lex.slice(), "$tag$some 'text'$tag$");
    }

    #[test]
    fn lex_unterminated_dollar_quoted_is_error() {
        let mut lex = RawToken::lexer("$$oops");
        assert_eq!(lex.next(), Some(Err(())));
    }

    #[test]
    fn lex_cast_operator_beats_named_param() {
        let tokens = kinds("a::text");
        assert_eq!(
            tokens,
            vec![RawToken::Word, RawToken::ColonColon, RawToken::Word]
        );
    }

    #[test]
    fn lex_named_param_beats_cast() {
        let tokens = kinds(":name");
        assert_eq!(tokens, vec![RawToken::ColonParam]);
    }

    #[test]
    fn lex_block_comment_with_inner_stars() {
        let mut lex = RawToken::lexer("/* a ** b **/");
        assert_eq!(lex.next(), Some(Ok(RawToken::BlockComment)));
        assert_eq!(lex.slice(), "/* a ** b **/");
    }

    #[test]
    fn lex_line_comment_stops_at_newline() {
        let tokens = kinds("-- note\n1");
        assert_eq!(
            tokens,
            vec![RawToken::LineComment, RawToken::Whitespace, RawToken::Number]
        );
    }
}
