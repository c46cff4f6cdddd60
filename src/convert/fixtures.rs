//! In-memory fixture tables
//!
//! Converters simulate post-statement rows from these descriptions; nothing
//! is ever read from a database or disk.

use smol_str::SmolStr;

use crate::ast::{Literal, Value, ValueKind};
use crate::base::Position;
use crate::lexer::LiteralKind;

/// A typed cell in a fixture row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureValue {
    Null,
    Boolean(bool),
    Numeric(SmolStr),
    Text(SmolStr),
}

impl FixtureValue {
    pub(crate) fn to_value(&self) -> Value {
        let literal = match self {
            FixtureValue::Null => Literal::null(),
            FixtureValue::Boolean(b) => Literal::boolean(*b),
            FixtureValue::Numeric(n) => Literal {
                kind: LiteralKind::Numeric,
                text: n.clone(),
            },
            FixtureValue::Text(t) => Literal::string(t.clone()),
        };
        Value::new(ValueKind::Literal(literal), Position::default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureColumn {
    pub name: SmolStr,
    pub sql_type: SmolStr,
}

impl FixtureColumn {
    pub fn new(name: impl Into<SmolStr>, sql_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
        }
    }
}

/// One table description: name, typed columns, rows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureTable {
    pub name: SmolStr,
    pub columns: Vec<FixtureColumn>,
    pub rows: Vec<Vec<FixtureValue>>,
}

impl FixtureTable {
    pub fn new(name: impl Into<SmolStr>, columns: Vec<FixtureColumn>) -> Self {
        Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(mut self, rows: Vec<Vec<FixtureValue>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn column_names(&self) -> Vec<SmolStr> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}
