//! Keyword classification
//!
//! Classification is case-insensitive; the lexeme keeps the original text so
//! `preserve` keyword casing can round-trip. The reserved subset drives the
//! formatter's quoting decision: a reserved word used as an identifier must
//! be escaped even under `identifier_escape = none`.

use super::lexeme::{LexemeKind, LiteralKind};

/// Every word the lexer classifies as a keyword, uppercase.
///
/// Sorted so membership checks can binary-search.
pub const KEYWORDS: &[&str] = &[
    "ADD",
    "ALL",
    "ALTER",
    "AND",
    "AS",
    "ASC",
    "BETWEEN",
    "BY",
    "CASCADE",
    "CASE",
    "CAST",
    "CHECK",
    "COLUMN",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "CURRENT",
    "DEFAULT",
    "DELETE",
    "DESC",
    "DISTINCT",
    "DROP",
    "ELSE",
    "END",
    "ESCAPE",
    "EXCEPT",
    "EXISTS",
    "FILTER",
    "FIRST",
    "FOLLOWING",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "GROUP",
    "GROUPS",
    "HAVING",
    "IF",
    "ILIKE",
    "IN",
    "INDEX",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "KEY",
    "LAST",
    "LATERAL",
    "LEFT",
    "LIKE",
    "LIMIT",
    "MATCHED",
    "MATERIALIZED",
    "MERGE",
    "NATURAL",
    "NO",
    "NOT",
    "NULLS",
    "OFFSET",
    "ON",
    "ONLY",
    "OR",
    "ORDER",
    "OUTER",
    "OVER",
    "PARTITION",
    "PRECEDING",
    "PRIMARY",
    "QUALIFY",
    "RANGE",
    "RECURSIVE",
    "REFERENCES",
    "RENAME",
    "RESTRICT",
    "RETURNING",
    "RIGHT",
    "ROW",
    "ROWS",
    "SELECT",
    "SET",
    "SHARE",
    "SIMILAR",
    "TABLE",
    "THEN",
    "TO",
    "TYPE",
    "UNBOUNDED",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WINDOW",
    "WITH",
    "WITHIN",
];

/// Reserved words: cannot appear as a bare identifier in output.
///
/// Deliberately smaller than [`KEYWORDS`] — contextual words like `KEY`,
/// `FIRST`, or `TYPE` are fine as plain column names.
pub const RESERVED: &[&str] = &[
    "ALL",
    "AND",
    "AS",
    "BETWEEN",
    "CASE",
    "CAST",
    "CHECK",
    "CONSTRAINT",
    "CREATE",
    "CROSS",
    "DEFAULT",
    "DELETE",
    "DISTINCT",
    "ELSE",
    "END",
    "EXCEPT",
    "EXISTS",
    "FOR",
    "FOREIGN",
    "FROM",
    "FULL",
    "GROUP",
    "HAVING",
    "ILIKE",
    "IN",
    "INNER",
    "INSERT",
    "INTERSECT",
    "INTO",
    "IS",
    "JOIN",
    "LATERAL",
    "LEFT",
    "LIKE",
    "LIMIT",
    "MERGE",
    "NATURAL",
    "NOT",
    "OFFSET",
    "ON",
    "OR",
    "ORDER",
    "OUTER",
    "PRIMARY",
    "QUALIFY",
    "REFERENCES",
    "RETURNING",
    "RIGHT",
    "SELECT",
    "SET",
    "SIMILAR",
    "TABLE",
    "THEN",
    "UNION",
    "UNIQUE",
    "UPDATE",
    "USING",
    "VALUES",
    "WHEN",
    "WHERE",
    "WINDOW",
    "WITH",
];

fn contains_ignore_case(table: &[&str], word: &str) -> bool {
    let upper = word.to_ascii_uppercase();
    table.binary_search(&upper.as_str()).is_ok()
}

/// Is `word` a keyword (any casing)?
pub fn is_keyword(word: &str) -> bool {
    contains_ignore_case(KEYWORDS, word)
}

/// Is `word` reserved, i.e. must be escaped when used as an identifier?
pub fn is_reserved(word: &str) -> bool {
    contains_ignore_case(RESERVED, word)
}

/// Classify a word token. `true`/`false`/`null` become literals so the
/// string/non-string distinction is fixed at the lexeme level.
pub fn classify(word: &str) -> LexemeKind {
    if word.eq_ignore_ascii_case("true") || word.eq_ignore_ascii_case("false") {
        LexemeKind::Literal(LiteralKind::Boolean)
    } else if word.eq_ignore_ascii_case("null") {
        LexemeKind::Literal(LiteralKind::Null)
    } else if is_keyword(word) {
        LexemeKind::Keyword
    } else {
        LexemeKind::Identifier
    }
}
