//! Identifiers and qualified names

use std::fmt;

use smol_str::SmolStr;

use super::AstError;
use crate::base::Position;
use crate::lexer::Lexeme;

/// A single identifier with its original quoting
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    pub name: SmolStr,
    pub quoted: bool,
    pub position: Position,
}

impl Identifier {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            quoted: false,
            position: Position::default(),
        }
    }

    pub fn quoted(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            quoted: true,
            position: Position::default(),
        }
    }

    pub fn from_lexeme(lexeme: &Lexeme) -> Self {
        Self {
            name: lexeme.text.clone(),
            quoted: lexeme.quoted,
            position: lexeme.span.start,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A dotted identifier path such as `schema.table.column`. Never empty; the
/// last part is the unqualified name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub parts: Vec<Identifier>,
}

impl QualifiedName {
    pub fn new(parts: Vec<Identifier>) -> Result<Self, AstError> {
        if parts.is_empty() {
            return Err(AstError::InvariantViolation(
                "qualified name must have at least one part".into(),
            ));
        }
        Ok(Self { parts })
    }

    pub fn single(part: Identifier) -> Self {
        Self { parts: vec![part] }
    }

    /// The unqualified (last) part
    pub fn name(&self) -> &Identifier {
        self.parts.last().expect("qualified name is non-empty")
    }

    pub fn position(&self) -> Position {
        self.parts[0].position
    }

    /// Case-insensitive match against an unqualified name
    pub fn matches_unqualified(&self, name: &str) -> bool {
        self.parts.len() == 1 && self.name().name.eq_ignore_ascii_case(name)
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&part.name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_qualified_name_is_rejected() {
        assert!(QualifiedName::new(vec![]).is_err());
    }

    #[test]
    fn last_part_is_the_name() {
        let qname = QualifiedName::new(vec![
            Identifier::new("public"),
            Identifier::new("users"),
        ])
        .unwrap();
        assert_eq!(qname.name().name, "users");
        assert_eq!(qname.to_string(), "public.users");
    }

    #[test]
    fn unqualified_match_ignores_case() {
        let qname = QualifiedName::single(Identifier::new("Orders"));
        assert!(qname.matches_unqualified("orders"));
        let qualified = QualifiedName::new(vec![
            Identifier::new("s"),
            Identifier::new("orders"),
        ])
        .unwrap();
        assert!(!qualified.matches_unqualified("orders"));
    }
}
