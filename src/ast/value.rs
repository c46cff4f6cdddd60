//! Value expressions
//!
//! A [`Value`] is a shared header (`position`, `comments`) plus a
//! [`ValueKind`] payload. The header keeps comment handling uniform across
//! all expression forms; transform sites match on the kind exhaustively.

use smol_str::SmolStr;

use super::comments::{NodeComments, impl_commented};
use super::data_type::SqlType;
use super::ident::{Identifier, QualifiedName};
use super::select::{OrderByClause, SelectQuery};
use super::AstError;
use crate::base::Position;
use crate::lexer::LiteralKind;

/// A value expression node
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    pub kind: ValueKind,
    pub position: Position,
    pub comments: NodeComments,
}

impl_commented!(Value => "Value");

impl Value {
    pub fn new(kind: ValueKind, position: Position) -> Self {
        Self {
            kind,
            position,
            comments: NodeComments::new(),
        }
    }

    /// Is this a quoted string literal? `'null'` answers true, `null` false.
    pub fn is_string(&self) -> bool {
        matches!(
            &self.kind,
            ValueKind::Literal(lit) if lit.kind == LiteralKind::String
        )
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match &self.kind {
            ValueKind::Literal(lit) => Some(lit),
            _ => None,
        }
    }
}

/// Payload of a value expression
#[derive(Debug, Clone, PartialEq)]
pub enum ValueKind {
    Literal(Literal),
    Identifier(Identifier),
    Qualified(QualifiedName),
    Parameter(ParameterValue),
    Binary(Box<BinaryExpr>),
    Unary(Box<UnaryExpr>),
    Function(Box<FunctionCall>),
    Case(Box<CaseExpr>),
    Cast(Box<CastExpr>),
    Between(Box<BetweenExpr>),
    InList(Box<InExpr>),
    PatternMatch(Box<PatternMatchExpr>),
    Is(Box<IsExpr>),
    Exists(Box<ExistsExpr>),
    Subquery(Box<SelectQuery>),
    ArrayAccess(Box<ArrayAccessExpr>),
    Tuple(TupleExpr),
    Paren(Box<Value>),
    Star(StarExpr),
}

/// A literal with its kind fixed at lex time. `text` is the decoded value
/// for strings and the raw spelling otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: SmolStr,
}

impl Literal {
    pub fn string(text: impl Into<SmolStr>) -> Self {
        Self {
            kind: LiteralKind::String,
            text: text.into(),
        }
    }

    pub fn numeric(text: impl Into<SmolStr>) -> Self {
        Self {
            kind: LiteralKind::Numeric,
            text: text.into(),
        }
    }

    pub fn null() -> Self {
        Self {
            kind: LiteralKind::Null,
            text: SmolStr::new("null"),
        }
    }

    pub fn boolean(value: bool) -> Self {
        Self {
            kind: LiteralKind::Boolean,
            text: SmolStr::new(if value { "true" } else { "false" }),
        }
    }

    pub fn is_string(&self) -> bool {
        self.kind == LiteralKind::String
    }
}

/// Marker form a parameter was written with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamMarker {
    /// `:name`
    Colon,
    /// `@name`
    At,
    /// `$1`
    Dollar,
    /// `${name}`
    Braced,
    /// `?`
    Question,
}

/// A bind parameter with its original marker preserved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterValue {
    pub marker: ParamMarker,
    pub name: Option<SmolStr>,
    pub index: Option<u32>,
    /// The exact source spelling, e.g. `:user_id`
    pub raw: SmolStr,
}

impl ParameterValue {
    /// Parse a parameter lexeme's text back into its parts
    pub fn from_raw(raw: &str) -> Self {
        let (marker, name, index) = match raw.as_bytes() {
            [b':', ..] => (ParamMarker::Colon, Some(SmolStr::new(&raw[1..])), None),
            [b'@', ..] => (ParamMarker::At, Some(SmolStr::new(&raw[1..])), None),
            [b'$', b'{', ..] => (
                ParamMarker::Braced,
                Some(SmolStr::new(&raw[2..raw.len() - 1])),
                None,
            ),
            [b'$', ..] => (ParamMarker::Dollar, None, raw[1..].parse().ok()),
            _ => (ParamMarker::Question, None, None),
        };
        Self {
            marker,
            name,
            index,
            raw: SmolStr::new(raw),
        }
    }
}

/// Binary operators, lowest tiers first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Concat,
    BitOr,
    BitAnd,
    Hash,
    ShiftLeft,
    ShiftRight,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Exp,
}

impl BinaryOp {
    /// SQL spelling; keyword operators render through keyword casing
    pub fn sql(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Concat => "||",
            BinaryOp::BitOr => "|",
            BinaryOp::BitAnd => "&",
            BinaryOp::Hash => "#",
            BinaryOp::ShiftLeft => "<<",
            BinaryOp::ShiftRight => ">>",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Exp => "^",
        }
    }

    pub fn is_keyword(self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Eq
                | BinaryOp::NotEq
                | BinaryOp::Lt
                | BinaryOp::LtEq
                | BinaryOp::Gt
                | BinaryOp::GtEq
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub lhs: Value,
    pub rhs: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    Plus,
    Minus,
    BitNot,
}

impl UnaryOp {
    pub fn sql(self) -> &'static str {
        match self {
            UnaryOp::Not => "not",
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: Value,
}

/// A function call with its optional aggregate/window tails
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub qname: QualifiedName,
    pub args: Vec<Value>,
    pub distinct: bool,
    /// ORDER BY inside the argument list (aggregate ordering)
    pub order_by: Option<OrderByClause>,
    pub within_group: Option<OrderByClause>,
    pub filter: Option<Value>,
    pub over: Option<OverClause>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(FunctionCall => "FunctionCall");

impl FunctionCall {
    /// Build a call, rejecting the combination of `DISTINCT` with
    /// `WITHIN GROUP` — ordered-set aggregates take their ordering from the
    /// group clause, never from a distinct argument list.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        qname: QualifiedName,
        args: Vec<Value>,
        distinct: bool,
        order_by: Option<OrderByClause>,
        within_group: Option<OrderByClause>,
        filter: Option<Value>,
        over: Option<OverClause>,
        position: Position,
    ) -> Result<Self, AstError> {
        if distinct && within_group.is_some() {
            return Err(AstError::InvariantViolation(
                "a function call cannot combine DISTINCT with WITHIN GROUP".into(),
            ));
        }
        Ok(Self {
            qname,
            args,
            distinct,
            order_by,
            within_group,
            filter,
            over,
            comments: NodeComments::new(),
            position,
        })
    }

    /// Bare call with just a name and arguments
    pub fn simple(qname: QualifiedName, args: Vec<Value>, position: Position) -> Self {
        Self {
            qname,
            args,
            distinct: false,
            order_by: None,
            within_group: None,
            filter: None,
            over: None,
            comments: NodeComments::new(),
            position,
        }
    }
}

/// `OVER name` or `OVER ( … )`
#[derive(Debug, Clone, PartialEq)]
pub enum OverClause {
    Named(Identifier),
    Spec(WindowSpec),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WindowSpec {
    pub partition_by: Vec<Value>,
    pub order_by: Option<OrderByClause>,
    pub frame: Option<WindowFrame>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WindowFrame {
    pub units: FrameUnits,
    pub start: FrameBound,
    /// Present for `BETWEEN start AND end` frames
    pub end: Option<FrameBound>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameUnits {
    Rows,
    Range,
    Groups,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameBound {
    UnboundedPreceding,
    Preceding(Value),
    CurrentRow,
    Following(Value),
    UnboundedFollowing,
}

/// `CASE [operand] WHEN … THEN … [ELSE …] END`
#[derive(Debug, Clone, PartialEq)]
pub struct CaseExpr {
    pub operand: Option<Value>,
    pub branches: Vec<CaseBranch>,
    pub else_value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseBranch {
    pub condition: Value,
    pub result: Value,
    pub comments: NodeComments,
}

impl_commented!(CaseBranch => "CaseBranch");

/// `CAST(value AS type)` or postfix `value::type`
#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub value: Value,
    pub data_type: SqlType,
    /// True when written with the `::` operator
    pub postfix: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BetweenExpr {
    pub value: Value,
    pub negated: bool,
    pub low: Value,
    pub high: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InExpr {
    pub value: Value,
    pub negated: bool,
    pub set: InSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InSet {
    List(Vec<Value>),
    Subquery(SelectQuery),
}

/// `LIKE` / `ILIKE` / `SIMILAR TO`, optionally negated, optional ESCAPE
#[derive(Debug, Clone, PartialEq)]
pub struct PatternMatchExpr {
    pub value: Value,
    pub op: PatternOp,
    pub negated: bool,
    pub pattern: Value,
    pub escape: Option<Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatternOp {
    Like,
    ILike,
    SimilarTo,
}

impl PatternOp {
    pub fn sql(self) -> &'static str {
        match self {
            PatternOp::Like => "like",
            PatternOp::ILike => "ilike",
            PatternOp::SimilarTo => "similar to",
        }
    }
}

/// `IS [NOT] NULL | TRUE | FALSE | DISTINCT FROM expr`
#[derive(Debug, Clone, PartialEq)]
pub struct IsExpr {
    pub value: Value,
    pub negated: bool,
    pub target: IsTarget,
}

#[derive(Debug, Clone, PartialEq)]
pub enum IsTarget {
    Null,
    True,
    False,
    DistinctFrom(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExistsExpr {
    pub negated: bool,
    pub query: SelectQuery,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccessExpr {
    pub base: Value,
    pub index: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpr {
    pub items: Vec<Value>,
}

/// `*` or `qualifier.*`
#[derive(Debug, Clone, PartialEq)]
pub struct StarExpr {
    pub qualifier: Option<QualifiedName>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::default()
    }

    #[test]
    fn distinct_with_within_group_is_rejected() {
        let qname = QualifiedName::single(Identifier::new("percentile_cont"));
        let order = OrderByClause::default();
        let err = FunctionCall::new(
            qname,
            vec![],
            true,
            None,
            Some(order),
            None,
            None,
            pos(),
        )
        .unwrap_err();
        assert!(matches!(err, AstError::InvariantViolation(_)));
    }

    #[test]
    fn string_literal_answers_is_string() {
        let value = Value::new(ValueKind::Literal(Literal::string("null")), pos());
        assert!(value.is_string());
        let bare = Value::new(ValueKind::Literal(Literal::null()), pos());
        assert!(!bare.is_string());
    }

    #[test]
    fn parameter_raw_round_trips() {
        let p = ParameterValue::from_raw(":user_id");
        assert_eq!(p.marker, ParamMarker::Colon);
        assert_eq!(p.name.as_deref(), Some("user_id"));
        let p = ParameterValue::from_raw("$3");
        assert_eq!(p.marker, ParamMarker::Dollar);
        assert_eq!(p.index, Some(3));
        let p = ParameterValue::from_raw("${env}");
        assert_eq!(p.marker, ParamMarker::Braced);
        assert_eq!(p.name.as_deref(), Some("env"));
        let p = ParameterValue::from_raw("?");
        assert_eq!(p.marker, ParamMarker::Question);
    }
}
