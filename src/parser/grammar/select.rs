//! SELECT queries: set operations, WITH clauses, clause list, table sources

use smol_str::SmolStr;

use super::super::{ParseError, ParseErrorKind, Parser};
use super::{common, expr};
use crate::ast::{
    AliasExpression, BaseTable, BinarySelect, CommonTable, DerivedTable, DistinctClause,
    ForClause, FromClause, FunctionSource, GroupByClause, HavingClause, JoinCondition, JoinKind,
    JoinSource, LateralSource, LimitClause, LockStrength, NodeComments, OffsetClause,
    QualifyClause, SelectClause, SelectItem, SelectQuery, SetOperator, SimpleSelect, TableSource,
    ValuesQuery, ValuesRow, WhereClause, WindowClause, WindowDefinition, WithClause,
};

/// Parse a query expression: terms joined by UNION/INTERSECT/EXCEPT,
/// left-associative.
pub(crate) fn parse_query(p: &mut Parser) -> Result<SelectQuery, ParseError> {
    let mut left = parse_query_term(p)?;

    loop {
        let op = if p.at_keyword("union") {
            Some(if p.peek_keyword(1, "all") {
                SetOperator::UnionAll
            } else {
                SetOperator::Union
            })
        } else if p.at_keyword("intersect") {
            Some(if p.peek_keyword(1, "all") {
                SetOperator::IntersectAll
            } else {
                SetOperator::Intersect
            })
        } else if p.at_keyword("except") {
            Some(if p.peek_keyword(1, "all") {
                SetOperator::ExceptAll
            } else {
                SetOperator::Except
            })
        } else {
            None
        };
        let Some(op) = op else { break };

        let op_idx = p.bump();
        if matches!(
            op,
            SetOperator::UnionAll | SetOperator::IntersectAll | SetOperator::ExceptAll
        ) {
            p.bump();
        }
        let right = parse_query_term(p)?;
        let position = left.position();
        let mut binary = BinarySelect {
            op,
            left,
            right,
            comments: NodeComments::new(),
            position,
        };
        p.attach_comments(op_idx, op_idx, &mut binary.comments);
        left = SelectQuery::Binary(Box::new(binary));
    }

    Ok(left)
}

fn parse_query_term(p: &mut Parser) -> Result<SelectQuery, ParseError> {
    if p.at_punct("(") {
        p.bump();
        let inner = parse_query(p)?;
        p.expect_punct(")")?;
        return Ok(inner);
    }
    if p.at_keyword("values") {
        return Ok(SelectQuery::Values(parse_values_query(p)?));
    }
    let with_clause = if p.at_keyword("with") {
        Some(parse_with_clause(p)?)
    } else {
        None
    };
    let select = parse_simple_select(p, with_clause)?;
    Ok(SelectQuery::Simple(Box::new(select)))
}

/// `WITH [RECURSIVE] name [(cols)] AS [MATERIALIZED|NOT MATERIALIZED] (query), …`
pub(crate) fn parse_with_clause(p: &mut Parser) -> Result<WithClause, ParseError> {
    let start = p.expect_keyword("with")?;
    let recursive = p.eat_keyword("recursive");

    let mut with = WithClause {
        recursive,
        tables: Vec::new(),
        comments: NodeComments::new(),
    };
    p.attach_comments(start, start, &mut with.comments);

    loop {
        with.tables.push(parse_common_table(p)?);
        if !p.eat_punct(",") {
            break;
        }
    }
    Ok(with)
}

fn parse_common_table(p: &mut Parser) -> Result<CommonTable, ParseError> {
    let start = p.index();
    let leading = p.take_leading(start);

    let table = common::parse_identifier(p)?;
    let position = table.position;
    let columns = if p.at_punct("(") {
        Some(common::parse_paren_identifier_list(p)?)
    } else {
        None
    };
    p.expect_keyword("as")?;

    let materialized = if p.eat_keyword("materialized") {
        Some(true)
    } else if p.at_keyword("not") && p.peek_keyword(1, "materialized") {
        p.bump();
        p.bump();
        Some(false)
    } else {
        None
    };

    p.expect_punct("(")?;
    let query = parse_query(p)?;
    let close = p.expect_punct(")")?;

    let mut cte = CommonTable {
        alias_expression: AliasExpression { table, columns },
        materialized,
        query,
        comments: NodeComments::new(),
        position,
    };
    cte.comments.leading = leading;
    let mut trailing = p.take_trailing(close);
    cte.comments.trailing.append(&mut trailing);
    Ok(cte)
}

/// `VALUES (row), (row), …`
pub(crate) fn parse_values_query(p: &mut Parser) -> Result<ValuesQuery, ParseError> {
    let start = p.expect_keyword("values")?;
    let position = p.lexeme(start).span.start;
    let mut values = ValuesQuery {
        rows: Vec::new(),
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(start, start, &mut values.comments);

    loop {
        values.rows.push(parse_values_row(p)?);
        if !p.eat_punct(",") {
            break;
        }
    }
    Ok(values)
}

fn parse_values_row(p: &mut Parser) -> Result<ValuesRow, ParseError> {
    let open = p.expect_punct("(")?;
    let mut row = ValuesRow {
        values: Vec::new(),
        comments: NodeComments::new(),
    };
    row.comments.leading = p.take_leading(open);

    if !p.at_punct(")") {
        row.values.push(expr::parse_value(p)?);
        while p.eat_punct(",") {
            row.values.push(expr::parse_value(p)?);
        }
    }
    let close = p.expect_punct(")")?;
    let mut trailing = p.take_trailing(close);
    row.comments.trailing.append(&mut trailing);
    Ok(row)
}

fn parse_simple_select(
    p: &mut Parser,
    with_clause: Option<WithClause>,
) -> Result<SimpleSelect, ParseError> {
    let start = p.expect_keyword("select")?;
    let position = p.lexeme(start).span.start;

    let mut select_clause = SelectClause {
        distinct: None,
        hints: Vec::new(),
        items: Vec::new(),
        comments: NodeComments::new(),
    };
    p.attach_comments(start, start, &mut select_clause.comments);

    // Hints ride directly after the SELECT keyword
    while p.at_hint() {
        let idx = p.bump();
        select_clause.hints.push(SmolStr::new(&p.lexeme(idx).text));
    }

    if p.eat_keyword("distinct") {
        select_clause.distinct = if p.at_keyword("on") {
            p.bump();
            p.expect_punct("(")?;
            let mut on = vec![expr::parse_value(p)?];
            while p.eat_punct(",") {
                on.push(expr::parse_value(p)?);
            }
            p.expect_punct(")")?;
            Some(DistinctClause::DistinctOn(on))
        } else {
            Some(DistinctClause::Distinct)
        };
    }

    loop {
        select_clause.items.push(parse_select_item(p)?);
        if !p.eat_punct(",") {
            break;
        }
    }

    let mut select = SimpleSelect::new(select_clause, position);
    select.with_clause = with_clause;

    if p.at_keyword("from") {
        let from_idx = p.bump();
        let mut from = FromClause {
            source: parse_table_source(p)?,
            comments: NodeComments::new(),
        };
        p.attach_comments(from_idx, from_idx, &mut from.comments);
        select.from_clause = Some(from);
    }
    if p.at_keyword("where") {
        let idx = p.bump();
        let mut clause = WhereClause {
            condition: expr::parse_value(p)?,
            comments: NodeComments::new(),
        };
        p.attach_comments(idx, idx, &mut clause.comments);
        select.where_clause = Some(clause);
    }
    if p.at_keyword("group") {
        let idx = p.bump();
        p.expect_keyword("by")?;
        let mut clause = GroupByClause {
            items: vec![expr::parse_value(p)?],
            comments: NodeComments::new(),
        };
        while p.eat_punct(",") {
            clause.items.push(expr::parse_value(p)?);
        }
        p.attach_comments(idx, idx, &mut clause.comments);
        select.group_by_clause = Some(clause);
    }
    if p.at_keyword("having") {
        let idx = p.bump();
        let mut clause = HavingClause {
            condition: expr::parse_value(p)?,
            comments: NodeComments::new(),
        };
        p.attach_comments(idx, idx, &mut clause.comments);
        select.having_clause = Some(clause);
    }
    if p.at_keyword("window") {
        let idx = p.bump();
        let mut clause = WindowClause {
            definitions: Vec::new(),
            comments: NodeComments::new(),
        };
        loop {
            let name = common::parse_identifier(p)?;
            p.expect_keyword("as")?;
            p.expect_punct("(")?;
            let spec = expr::parse_window_spec(p)?;
            p.expect_punct(")")?;
            clause.definitions.push(WindowDefinition {
                name,
                spec,
                comments: NodeComments::new(),
            });
            if !p.eat_punct(",") {
                break;
            }
        }
        p.attach_comments(idx, idx, &mut clause.comments);
        select.window_clause = Some(clause);
    }
    if p.at_keyword("qualify") {
        let idx = p.bump();
        let mut clause = QualifyClause {
            condition: expr::parse_value(p)?,
            comments: NodeComments::new(),
        };
        p.attach_comments(idx, idx, &mut clause.comments);
        select.qualify_clause = Some(clause);
    }
    if p.at_keyword("order") {
        select.order_by_clause = Some(expr::parse_order_by_clause(p)?);
    }
    if p.at_keyword("limit") {
        let idx = p.bump();
        let mut clause = LimitClause {
            value: expr::parse_value(p)?,
            comments: NodeComments::new(),
        };
        p.attach_comments(idx, idx, &mut clause.comments);
        select.limit_clause = Some(clause);
    }
    if p.at_keyword("offset") {
        let idx = p.bump();
        let mut clause = OffsetClause {
            value: expr::parse_value(p)?,
            comments: NodeComments::new(),
        };
        // OFFSET n [ROW | ROWS]
        if p.at_keyword("rows") || p.at_keyword("row") {
            p.bump();
        }
        p.attach_comments(idx, idx, &mut clause.comments);
        select.offset_clause = Some(clause);
    }
    if p.at_keyword("for") {
        let idx = p.bump();
        let lock = if p.eat_keyword("update") {
            LockStrength::Update
        } else if p.eat_keyword("share") {
            LockStrength::Share
        } else if p.eat_keyword("no") {
            p.expect_keyword("key")?;
            p.expect_keyword("update")?;
            LockStrength::NoKeyUpdate
        } else if p.eat_keyword("key") {
            p.expect_keyword("share")?;
            LockStrength::KeyShare
        } else {
            return Err(p.expected(
                ParseErrorKind::UnexpectedToken,
                &["UPDATE", "NO KEY UPDATE", "SHARE", "KEY SHARE"],
            ));
        };
        let mut clause = ForClause {
            lock,
            comments: NodeComments::new(),
        };
        p.attach_comments(idx, idx, &mut clause.comments);
        select.for_clause = Some(clause);
    }

    Ok(select)
}

fn parse_select_item(p: &mut Parser) -> Result<SelectItem, ParseError> {
    let start = p.index();
    let leading = p.take_leading(start);

    let value = expr::parse_value(p)?;
    let alias = if p.eat_keyword("as") {
        Some(common::parse_identifier(p)?)
    } else if p.at_name() {
        Some(common::parse_identifier(p)?)
    } else {
        None
    };

    let mut item = SelectItem {
        value,
        alias,
        comments: NodeComments::new(),
    };
    item.comments.leading = leading;
    let last = p.index().saturating_sub(1);
    let mut trailing = p.take_trailing(last);
    item.comments.trailing.append(&mut trailing);
    Ok(item)
}

// =============================================================================
// Table sources
// =============================================================================

/// Parse a FROM body: comma-separated sources fold into CROSS joins, explicit
/// joins chain left-associatively.
pub(crate) fn parse_table_source(p: &mut Parser) -> Result<TableSource, ParseError> {
    let mut left = parse_joined_source(p)?;
    while p.eat_punct(",") {
        let right = parse_joined_source(p)?;
        left = TableSource::Join(Box::new(JoinSource {
            kind: JoinKind::Cross,
            left,
            right,
            condition: None,
            comments: NodeComments::new(),
        }));
    }
    Ok(left)
}

fn parse_joined_source(p: &mut Parser) -> Result<TableSource, ParseError> {
    let mut left = parse_source_primary(p)?;

    loop {
        let natural = p.at_keyword("natural");
        let lookahead = if natural { 1 } else { 0 };

        let kind = if p.peek_keyword(lookahead, "join") || p.peek_keyword(lookahead, "inner") {
            Some(JoinKind::Inner)
        } else if p.peek_keyword(lookahead, "left") {
            Some(JoinKind::Left)
        } else if p.peek_keyword(lookahead, "right") {
            Some(JoinKind::Right)
        } else if p.peek_keyword(lookahead, "full") {
            Some(JoinKind::Full)
        } else if p.peek_keyword(lookahead, "cross") {
            Some(JoinKind::Cross)
        } else {
            None
        };
        let Some(kind) = kind else { break };

        if natural {
            p.bump();
        }
        let join_idx = p.index();
        // Consume the join keywords: [INNER|LEFT|RIGHT|FULL|CROSS] [OUTER] JOIN
        if !p.at_keyword("join") {
            p.bump();
            p.eat_keyword("outer");
        }
        p.expect_keyword("join")?;

        let right = parse_source_primary(p)?;

        let condition = if natural {
            Some(JoinCondition::Natural)
        } else if kind == JoinKind::Cross {
            None
        } else if p.eat_keyword("on") {
            Some(JoinCondition::On(expr::parse_value(p)?))
        } else if p.at_keyword("using") {
            p.bump();
            Some(JoinCondition::Using(common::parse_paren_identifier_list(
                p,
            )?))
        } else {
            return Err(p.expected(ParseErrorKind::MissingToken, &["ON", "USING"]));
        };

        let mut join = JoinSource {
            kind,
            left,
            right,
            condition,
            comments: NodeComments::new(),
        };
        p.attach_comments(join_idx, join_idx, &mut join.comments);
        left = TableSource::Join(Box::new(join));
    }

    Ok(left)
}

fn parse_source_primary(p: &mut Parser) -> Result<TableSource, ParseError> {
    if p.at_keyword("lateral") {
        p.bump();
        let source = parse_source_primary(p)?;
        return Ok(TableSource::Lateral(Box::new(LateralSource { source })));
    }

    if p.at_punct("(") {
        if p.peek(1).is_some_and(|l| {
            l.is_keyword("select") || l.is_keyword("with") || l.is_keyword("values")
        }) {
            p.bump();
            let query = parse_query(p)?;
            p.expect_punct(")")?;
            let alias = common::parse_opt_table_alias(p)?.ok_or_else(|| {
                p.expected(ParseErrorKind::MissingToken, &["subquery alias"])
            })?;
            return Ok(TableSource::Derived(Box::new(DerivedTable { query, alias })));
        }
        // Parenthesized join tree
        p.bump();
        let inner = parse_table_source(p)?;
        p.expect_punct(")")?;
        return Ok(inner);
    }

    let start = p.index();
    let qname = common::parse_qualified_name(p)?;

    if p.at_punct("(") {
        let position = p.lexeme(start).span.start;
        let call = expr::parse_function_call(p, qname, position)?;
        let alias = common::parse_opt_table_alias(p)?;
        return Ok(TableSource::Function(Box::new(FunctionSource {
            call,
            alias,
        })));
    }

    let alias = common::parse_opt_table_alias(p)?;
    Ok(TableSource::Base(BaseTable { qname, alias }))
}
