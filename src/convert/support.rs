//! Shared AST builders for the converters

use smol_str::SmolStr;

use super::fixtures::FixtureTable;
use super::{ConvertError, ConvertOptions};
use crate::ast::{
    AliasExpression, BaseTable, BinaryExpr, BinaryOp, CommonTable, ExistsExpr, FromClause,
    Identifier, Literal, NodeComments, QualifiedName, ReturningClause, ReturningItems,
    SelectClause, SelectItem, SelectQuery, SimpleSelect, StarExpr, TableAlias, TableSource,
    UnaryExpr, UnaryOp, Value, ValueKind, ValuesQuery, ValuesRow, WhereClause, WithClause,
};
use crate::base::Position;

pub(crate) fn ident_value(name: &str) -> Value {
    Value::new(
        ValueKind::Identifier(Identifier::new(name)),
        Position::default(),
    )
}

pub(crate) fn null_value() -> Value {
    Value::new(ValueKind::Literal(Literal::null()), Position::default())
}

pub(crate) fn false_value() -> Value {
    Value::new(
        ValueKind::Literal(Literal::boolean(false)),
        Position::default(),
    )
}

pub(crate) fn star_item() -> SelectItem {
    SelectItem {
        value: Value::new(
            ValueKind::Star(StarExpr { qualifier: None }),
            Position::default(),
        ),
        alias: None,
        comments: NodeComments::new(),
    }
}

pub(crate) fn item(value: Value, alias: Option<&str>) -> SelectItem {
    SelectItem {
        value,
        alias: alias.map(Identifier::new),
        comments: NodeComments::new(),
    }
}

pub(crate) fn and(lhs: Value, rhs: Value) -> Value {
    Value::new(
        ValueKind::Binary(Box::new(BinaryExpr {
            op: BinaryOp::And,
            lhs,
            rhs,
        })),
        Position::default(),
    )
}

pub(crate) fn not(value: Value) -> Value {
    Value::new(
        ValueKind::Unary(Box::new(UnaryExpr {
            op: UnaryOp::Not,
            operand: value,
        })),
        Position::default(),
    )
}

pub(crate) fn exists(query: SelectQuery, negated: bool) -> Value {
    Value::new(
        ValueKind::Exists(Box::new(ExistsExpr { negated, query })),
        Position::default(),
    )
}

pub(crate) fn base_source(name: &str, alias: Option<&str>) -> TableSource {
    TableSource::Base(BaseTable {
        qname: QualifiedName::single(Identifier::new(name)),
        alias: alias.map(|a| TableAlias {
            name: Identifier::new(a),
            columns: None,
        }),
    })
}

/// `select <items> from <source> [where <condition>]`
pub(crate) fn select_from(
    items: Vec<SelectItem>,
    source: TableSource,
    condition: Option<Value>,
) -> SelectQuery {
    let mut select = SimpleSelect::new(
        SelectClause {
            distinct: None,
            hints: Vec::new(),
            items,
            comments: NodeComments::new(),
        },
        Position::default(),
    );
    select.from_clause = Some(FromClause {
        source,
        comments: NodeComments::new(),
    });
    select.where_clause = condition.map(|condition| WhereClause {
        condition,
        comments: NodeComments::new(),
    });
    SelectQuery::Simple(Box::new(select))
}

/// The fixture's rows as a VALUES query. Empty fixtures produce one NULL
/// row filtered by `where false`, so the column shape survives.
pub(crate) fn fixture_rows_query(fixture: &FixtureTable) -> SelectQuery {
    if fixture.rows.is_empty() {
        let nulls = fixture.columns.iter().map(|_| null_value()).collect();
        let values = SelectQuery::Values(ValuesQuery {
            rows: vec![ValuesRow {
                values: nulls,
                comments: NodeComments::new(),
            }],
            comments: NodeComments::new(),
            position: Position::default(),
        });
        let source = TableSource::Derived(Box::new(crate::ast::DerivedTable {
            query: values,
            alias: TableAlias {
                name: Identifier::new("empty_rows"),
                columns: Some(
                    fixture
                        .column_names()
                        .iter()
                        .map(|n| Identifier::new(n.clone()))
                        .collect(),
                ),
            },
        }));
        return select_from(vec![star_item()], source, Some(false_value()));
    }

    SelectQuery::Values(ValuesQuery {
        rows: fixture
            .rows
            .iter()
            .map(|row| ValuesRow {
                values: row.iter().map(|cell| cell.to_value()).collect(),
                comments: NodeComments::new(),
            })
            .collect(),
        comments: NodeComments::new(),
        position: Position::default(),
    })
}

/// A CTE `name (columns) as ( body )`
pub(crate) fn cte(name: &str, columns: Option<Vec<SmolStr>>, body: SelectQuery) -> CommonTable {
    CommonTable {
        alias_expression: AliasExpression {
            table: Identifier::new(name),
            columns: columns
                .map(|cols| cols.into_iter().map(Identifier::new).collect()),
        },
        materialized: None,
        query: body,
        comments: NodeComments::new(),
        position: Position::default(),
    }
}

/// Combine the statement's own WITH clause with the simulation CTEs: caller
/// tables first (their bodies are what the statement's queries reference),
/// then the synthesized ones. A caller CTE whose name collides with a
/// synthesized CTE is dropped — the simulation definition wins, mirroring
/// the composer's explicit-edit rule.
pub(crate) fn compose_with(
    input: Option<&WithClause>,
    synthesized: Vec<CommonTable>,
) -> WithClause {
    let mut tables = Vec::new();
    if let Some(input) = input {
        for table in &input.tables {
            let shadowed = synthesized
                .iter()
                .any(|s| s.name().eq_ignore_ascii_case(table.name()));
            if !shadowed {
                tables.push(table.clone());
            }
        }
    }
    tables.extend(synthesized);
    WithClause {
        recursive: input.is_some_and(|w| w.recursive),
        tables,
        comments: NodeComments::new(),
    }
}

/// A helper-CTE name that cannot shadow one of the caller's own CTEs
pub(crate) fn unique_cte_name(base: &str, input: Option<&WithClause>) -> String {
    let mut name = base.to_string();
    while input.is_some_and(|w| {
        w.tables
            .iter()
            .any(|t| t.name().eq_ignore_ascii_case(&name))
    }) {
        name.push('_');
    }
    name
}

/// Resolve a secondary relation (UPDATE's FROM, DELETE's USING, MERGE's
/// USING) into an optional CTE definition plus the name and alias the
/// derived expressions reference it by.
///
/// A base table backed by one of the caller's own CTEs needs no fixture;
/// any other base table must have one. Subqueries become a CTE under their
/// alias; join trees are out of scope.
pub(crate) fn secondary_source(
    source: &TableSource,
    input_with: Option<&WithClause>,
    options: &ConvertOptions,
) -> Result<(Option<CommonTable>, String, String), ConvertError> {
    match source {
        TableSource::Base(base) => {
            let name = base.qname.name().name.to_string();
            let alias = base
                .alias
                .as_ref()
                .map(|a| a.name.name.to_string())
                .unwrap_or_else(|| name.clone());
            let caller_defined = input_with.is_some_and(|w| {
                w.tables
                    .iter()
                    .any(|t| t.name().eq_ignore_ascii_case(&name))
            });
            if caller_defined {
                return Ok((None, name, alias));
            }
            let fixture = options.fixture_for(&base.qname).ok_or_else(|| {
                ConvertError::FixtureMissing {
                    table: base.qname.to_string(),
                }
            })?;
            Ok((
                Some(cte(
                    &name,
                    Some(fixture.column_names()),
                    fixture_rows_query(fixture),
                )),
                name,
                alias,
            ))
        }
        TableSource::Derived(derived) => {
            let name = derived.alias.name.name.to_string();
            Ok((
                Some(cte(&name, None, derived.query.clone())),
                name.clone(),
                name,
            ))
        }
        _ => Err(ConvertError::UnsupportedReturning {
            reason: "secondary table source must be a table or a subquery".to_string(),
        }),
    }
}

/// The RETURNING projection as select items; `*` expands to the fixture's
/// column order.
pub(crate) fn returning_items(
    returning: &ReturningClause,
    fixture: &FixtureTable,
) -> Vec<SelectItem> {
    match &returning.items {
        ReturningItems::Star => fixture
            .column_names()
            .iter()
            .map(|name| item(ident_value(name), None))
            .collect(),
        ReturningItems::Items(items) => items.clone(),
    }
}
