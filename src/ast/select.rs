//! SELECT queries, clauses, and table sources

use smol_str::SmolStr;

use super::comments::{NodeComments, impl_commented};
use super::ident::{Identifier, QualifiedName};
use super::value::{FunctionCall, Value, WindowSpec};
use crate::base::Position;

/// A query expression: a plain SELECT, a set operation, or a VALUES list
#[derive(Debug, Clone, PartialEq)]
pub enum SelectQuery {
    Simple(Box<SimpleSelect>),
    Binary(Box<BinarySelect>),
    Values(ValuesQuery),
}

impl SelectQuery {
    pub fn position(&self) -> Position {
        match self {
            SelectQuery::Simple(select) => select.position,
            SelectQuery::Binary(binary) => binary.position,
            SelectQuery::Values(values) => values.position,
        }
    }

    pub fn as_simple(&self) -> Option<&SimpleSelect> {
        match self {
            SelectQuery::Simple(select) => Some(select),
            _ => None,
        }
    }

    pub fn as_simple_mut(&mut self) -> Option<&mut SimpleSelect> {
        match self {
            SelectQuery::Simple(select) => Some(select),
            _ => None,
        }
    }

    /// The WITH clause of the query head, when present
    pub fn with_clause(&self) -> Option<&WithClause> {
        match self {
            SelectQuery::Simple(select) => select.with_clause.as_ref(),
            SelectQuery::Binary(binary) => binary.left.with_clause(),
            SelectQuery::Values(_) => None,
        }
    }
}

/// `left UNION [ALL] right` and friends
#[derive(Debug, Clone, PartialEq)]
pub struct BinarySelect {
    pub op: SetOperator,
    pub left: SelectQuery,
    pub right: SelectQuery,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(BinarySelect => "BinarySelect");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

impl SetOperator {
    pub fn sql(self) -> &'static str {
        match self {
            SetOperator::Union => "union",
            SetOperator::UnionAll => "union all",
            SetOperator::Intersect => "intersect",
            SetOperator::IntersectAll => "intersect all",
            SetOperator::Except => "except",
            SetOperator::ExceptAll => "except all",
        }
    }
}

/// `VALUES (…), (…)`
#[derive(Debug, Clone, PartialEq)]
pub struct ValuesQuery {
    pub rows: Vec<ValuesRow>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(ValuesQuery => "ValuesQuery");

#[derive(Debug, Clone, PartialEq)]
pub struct ValuesRow {
    pub values: Vec<Value>,
    pub comments: NodeComments,
}

impl_commented!(ValuesRow => "ValuesRow");

/// A single SELECT with all optional clauses
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleSelect {
    pub with_clause: Option<WithClause>,
    pub select_clause: SelectClause,
    pub from_clause: Option<FromClause>,
    pub where_clause: Option<WhereClause>,
    pub group_by_clause: Option<GroupByClause>,
    pub having_clause: Option<HavingClause>,
    pub window_clause: Option<WindowClause>,
    pub qualify_clause: Option<QualifyClause>,
    pub order_by_clause: Option<OrderByClause>,
    pub limit_clause: Option<LimitClause>,
    pub offset_clause: Option<OffsetClause>,
    pub for_clause: Option<ForClause>,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(SimpleSelect => "SimpleSelect");

impl SimpleSelect {
    pub fn new(select_clause: SelectClause, position: Position) -> Self {
        Self {
            with_clause: None,
            select_clause,
            from_clause: None,
            where_clause: None,
            group_by_clause: None,
            having_clause: None,
            window_clause: None,
            qualify_clause: None,
            order_by_clause: None,
            limit_clause: None,
            offset_clause: None,
            for_clause: None,
            comments: NodeComments::new(),
            position,
        }
    }
}

/// The projection: hints, optional DISTINCT, and the item list
#[derive(Debug, Clone, PartialEq)]
pub struct SelectClause {
    pub distinct: Option<DistinctClause>,
    /// Hint bodies collected from `/*+ … */` lexemes after SELECT
    pub hints: Vec<SmolStr>,
    pub items: Vec<SelectItem>,
    pub comments: NodeComments,
}

impl_commented!(SelectClause => "SelectClause");

#[derive(Debug, Clone, PartialEq)]
pub enum DistinctClause {
    Distinct,
    DistinctOn(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub value: Value,
    pub alias: Option<Identifier>,
    pub comments: NodeComments,
}

impl_commented!(SelectItem => "SelectItem");

/// `WITH [RECURSIVE] name AS (…), …`
#[derive(Debug, Clone, PartialEq)]
pub struct WithClause {
    pub recursive: bool,
    pub tables: Vec<CommonTable>,
    pub comments: NodeComments,
}

impl_commented!(WithClause => "WithClause");

/// One common table expression
#[derive(Debug, Clone, PartialEq)]
pub struct CommonTable {
    pub alias_expression: AliasExpression,
    /// `Some(true)` for MATERIALIZED, `Some(false)` for NOT MATERIALIZED
    pub materialized: Option<bool>,
    pub query: SelectQuery,
    pub comments: NodeComments,
    pub position: Position,
}

impl_commented!(CommonTable => "CommonTable");

impl CommonTable {
    /// The CTE's defined name
    pub fn name(&self) -> &str {
        &self.alias_expression.table.name
    }
}

/// The name (and optional column list) a CTE or derived table is bound to
#[derive(Debug, Clone, PartialEq)]
pub struct AliasExpression {
    pub table: Identifier,
    pub columns: Option<Vec<Identifier>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FromClause {
    pub source: TableSource,
    pub comments: NodeComments,
}

impl_commented!(FromClause => "FromClause");

/// A relation in FROM: base table, subquery, function, join tree, or LATERAL
#[derive(Debug, Clone, PartialEq)]
pub enum TableSource {
    Base(BaseTable),
    Derived(Box<DerivedTable>),
    Function(Box<FunctionSource>),
    Join(Box<JoinSource>),
    Lateral(Box<LateralSource>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BaseTable {
    pub qname: QualifiedName,
    pub alias: Option<TableAlias>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DerivedTable {
    pub query: SelectQuery,
    pub alias: TableAlias,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSource {
    pub call: FunctionCall,
    pub alias: Option<TableAlias>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JoinSource {
    pub kind: JoinKind,
    pub left: TableSource,
    pub right: TableSource,
    pub condition: Option<JoinCondition>,
    pub comments: NodeComments,
}

impl_commented!(JoinSource => "JoinSource");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

#[derive(Debug, Clone, PartialEq)]
pub enum JoinCondition {
    On(Value),
    Using(Vec<Identifier>),
    Natural,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LateralSource {
    pub source: TableSource,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableAlias {
    pub name: Identifier,
    pub columns: Option<Vec<Identifier>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub condition: Value,
    pub comments: NodeComments,
}

impl_commented!(WhereClause => "WhereClause");

#[derive(Debug, Clone, PartialEq)]
pub struct GroupByClause {
    pub items: Vec<Value>,
    pub comments: NodeComments,
}

impl_commented!(GroupByClause => "GroupByClause");

#[derive(Debug, Clone, PartialEq)]
pub struct HavingClause {
    pub condition: Value,
    pub comments: NodeComments,
}

impl_commented!(HavingClause => "HavingClause");

/// `WINDOW name AS ( … ), …`
#[derive(Debug, Clone, PartialEq)]
pub struct WindowClause {
    pub definitions: Vec<WindowDefinition>,
    pub comments: NodeComments,
}

impl_commented!(WindowClause => "WindowClause");

#[derive(Debug, Clone, PartialEq)]
pub struct WindowDefinition {
    pub name: Identifier,
    pub spec: WindowSpec,
    pub comments: NodeComments,
}

impl_commented!(WindowDefinition => "WindowDefinition");

#[derive(Debug, Clone, PartialEq)]
pub struct QualifyClause {
    pub condition: Value,
    pub comments: NodeComments,
}

impl_commented!(QualifyClause => "QualifyClause");

#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrderByClause {
    pub items: Vec<OrderByItem>,
    pub comments: NodeComments,
}

impl_commented!(OrderByClause => "OrderByClause");

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub value: Value,
    pub direction: Option<SortDirection>,
    pub nulls: Option<NullsOrder>,
    pub comments: NodeComments,
}

impl_commented!(OrderByItem => "OrderByItem");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NullsOrder {
    First,
    Last,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LimitClause {
    pub value: Value,
    pub comments: NodeComments,
}

impl_commented!(LimitClause => "LimitClause");

#[derive(Debug, Clone, PartialEq)]
pub struct OffsetClause {
    pub value: Value,
    pub comments: NodeComments,
}

impl_commented!(OffsetClause => "OffsetClause");

/// `FOR UPDATE | NO KEY UPDATE | SHARE | KEY SHARE`
#[derive(Debug, Clone, PartialEq)]
pub struct ForClause {
    pub lock: LockStrength,
    pub comments: NodeComments,
}

impl_commented!(ForClause => "ForClause");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockStrength {
    Update,
    NoKeyUpdate,
    Share,
    KeyShare,
}
