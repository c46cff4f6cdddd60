//! Shared grammar pieces: names, aliases, data types

use smol_str::SmolStr;

use super::super::{ParseError, ParseErrorKind, Parser};
use crate::ast::{Identifier, QualifiedName, SqlType, TableAlias};
use crate::lexer::{LexemeKind, LiteralKind};

pub(crate) fn parse_identifier(p: &mut Parser) -> Result<Identifier, ParseError> {
    let idx = p.expect_name()?;
    Ok(Identifier::from_lexeme(p.lexeme(idx)))
}

/// `part[.part]*`
pub(crate) fn parse_qualified_name(p: &mut Parser) -> Result<QualifiedName, ParseError> {
    let mut parts = vec![parse_identifier(p)?];
    while p.at_punct(".") && p.peek(1).is_some_and(|l| l.is_name_like()) {
        p.bump();
        parts.push(parse_identifier(p)?);
    }
    QualifiedName::new(parts).map_err(|e| {
        ParseError::with_message(ParseErrorKind::InvalidExpression, p.position(), e.to_string())
    })
}

/// `( name [, name]* )`
pub(crate) fn parse_paren_identifier_list(p: &mut Parser) -> Result<Vec<Identifier>, ParseError> {
    p.expect_punct("(")?;
    let mut columns = vec![parse_identifier(p)?];
    while p.eat_punct(",") {
        columns.push(parse_identifier(p)?);
    }
    p.expect_punct(")")?;
    Ok(columns)
}

/// Optional `[AS] name [(cols)]` alias. Stops at clause keywords because
/// reserved words are not name-like.
pub(crate) fn parse_opt_table_alias(p: &mut Parser) -> Result<Option<TableAlias>, ParseError> {
    let explicit = p.eat_keyword("as");
    if !p.at_name() {
        if explicit {
            return Err(p.expected(ParseErrorKind::MissingToken, &["alias name"]));
        }
        return Ok(None);
    }
    let name = parse_identifier(p)?;
    let columns = if p.at_punct("(") {
        Some(parse_paren_identifier_list(p)?)
    } else {
        None
    };
    Ok(Some(TableAlias { name, columns }))
}

/// Multi-word type names joined into one spelling, e.g. `double precision`
const TWO_WORD_TYPES: &[(&str, &str)] = &[
    ("double", "precision"),
    ("character", "varying"),
    ("bit", "varying"),
];

/// Parse a data type: `name [( args )] [\[\]] [with|without time zone]`
pub(crate) fn parse_sql_type(p: &mut Parser) -> Result<SqlType, ParseError> {
    let idx = p.expect_name()?;
    let mut name = p.lexeme(idx).text.to_string();

    let lowered = name.to_ascii_lowercase();
    for (first, second) in TWO_WORD_TYPES {
        if lowered == *first
            && p.current()
                .is_some_and(|l| l.text.eq_ignore_ascii_case(second))
        {
            let idx = p.bump();
            name.push(' ');
            name.push_str(&p.lexeme(idx).text);
        }
    }

    let mut args = Vec::new();
    if p.eat_punct("(") {
        loop {
            let Some(lexeme) = p.current() else {
                return Err(p.expected(ParseErrorKind::MissingToken, &["type argument"]));
            };
            match lexeme.kind {
                LexemeKind::Literal(LiteralKind::Numeric) | LexemeKind::Identifier => {
                    args.push(SmolStr::new(&lexeme.text));
                    p.bump();
                }
                _ => return Err(p.expected(ParseErrorKind::UnexpectedToken, &["type argument"])),
            }
            if !p.eat_punct(",") {
                break;
            }
        }
        p.expect_punct(")")?;
    }

    // timestamp/time [with|without] time zone
    if (name.eq_ignore_ascii_case("timestamp") || name.eq_ignore_ascii_case("time"))
        && (p.at_keyword("with") || p.current().is_some_and(|l| l.text.eq_ignore_ascii_case("without")))
        && p.peek(1).is_some_and(|l| l.text.eq_ignore_ascii_case("time"))
        && p.peek(2).is_some_and(|l| l.text.eq_ignore_ascii_case("zone"))
    {
        for _ in 0..3 {
            let idx = p.bump();
            name.push(' ');
            name.push_str(&p.lexeme(idx).text);
        }
    }

    let array = if p.at_punct("[") && p.peek(1).is_some_and(|l| l.is_punct("]")) {
        p.bump();
        p.bump();
        true
    } else {
        false
    };

    Ok(SqlType {
        name: SmolStr::new(name),
        args,
        array,
    })
}
