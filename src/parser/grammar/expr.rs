//! Value expression parsing
//!
//! Precedence climbing over the operator tiers, lowest first:
//!
//! ```text
//! OR < AND < NOT < comparison < BETWEEN/IN/LIKE/ILIKE/SIMILAR TO/IS
//!    < ||,|,&,#,<<,>> < +,- < *,/,% < unary +,- < ^ < ::,[]
//! ```
//!
//! Comparison is non-associative: `a = b = c` is rejected. `NOT` binds
//! looser than comparison, so `NOT a = b` parses as `NOT (a = b)`; a `NOT`
//! directly before `LIKE`, `ILIKE`, `SIMILAR TO`, `IN`, `BETWEEN`, or
//! `EXISTS` negates that construct instead.

use super::super::{ParseError, ParseErrorKind, Parser};
use super::{common, select};
use crate::ast::{
    ArrayAccessExpr, BetweenExpr, BinaryExpr, BinaryOp, CaseBranch, CaseExpr, CastExpr,
    ExistsExpr, FrameBound, FrameUnits, FunctionCall, InExpr, InSet, IsExpr, IsTarget, Literal,
    NullsOrder, OrderByClause, OrderByItem, OverClause, ParameterValue, PatternMatchExpr,
    PatternOp, QualifiedName, SortDirection, StarExpr, TupleExpr, UnaryExpr, UnaryOp, Value,
    ValueKind, WindowFrame, WindowSpec,
};
use crate::lexer::{LexemeKind, LiteralKind};

// Binding powers, one tier apart so constructs can exclude neighbors
const BP_OR: u8 = 10;
const BP_AND: u8 = 20;
const BP_NOT: u8 = 25;
const BP_CMP: u8 = 40;
const BP_TEST: u8 = 50;
const BP_OTHER: u8 = 60;
const BP_ADD: u8 = 70;
const BP_MUL: u8 = 80;
const BP_UNARY: u8 = 85;
const BP_EXP: u8 = 90;
const BP_POSTFIX: u8 = 100;

/// Parse a full value expression
pub(crate) fn parse_value(p: &mut Parser) -> Result<Value, ParseError> {
    parse_value_bp(p, 0)
}

fn symbol_op(text: &str) -> Option<(BinaryOp, u8, u8)> {
    let op = match text {
        "=" => (BinaryOp::Eq, BP_CMP, BP_CMP + 1),
        "<>" | "!=" => (BinaryOp::NotEq, BP_CMP, BP_CMP + 1),
        "<" => (BinaryOp::Lt, BP_CMP, BP_CMP + 1),
        "<=" => (BinaryOp::LtEq, BP_CMP, BP_CMP + 1),
        ">" => (BinaryOp::Gt, BP_CMP, BP_CMP + 1),
        ">=" => (BinaryOp::GtEq, BP_CMP, BP_CMP + 1),
        "||" => (BinaryOp::Concat, BP_OTHER, BP_OTHER + 1),
        "|" => (BinaryOp::BitOr, BP_OTHER, BP_OTHER + 1),
        "&" => (BinaryOp::BitAnd, BP_OTHER, BP_OTHER + 1),
        "#" => (BinaryOp::Hash, BP_OTHER, BP_OTHER + 1),
        "<<" => (BinaryOp::ShiftLeft, BP_OTHER, BP_OTHER + 1),
        ">>" => (BinaryOp::ShiftRight, BP_OTHER, BP_OTHER + 1),
        "+" => (BinaryOp::Add, BP_ADD, BP_ADD + 1),
        "-" => (BinaryOp::Sub, BP_ADD, BP_ADD + 1),
        "*" => (BinaryOp::Mul, BP_MUL, BP_MUL + 1),
        "/" => (BinaryOp::Div, BP_MUL, BP_MUL + 1),
        "%" => (BinaryOp::Mod, BP_MUL, BP_MUL + 1),
        // Right-associative
        "^" => (BinaryOp::Exp, BP_EXP, BP_EXP),
        _ => return None,
    };
    Some(op)
}

fn parse_value_bp(p: &mut Parser, min_bp: u8) -> Result<Value, ParseError> {
    let mut lhs = parse_prefix(p)?;

    loop {
        // Keyword connectives
        let keyword_op = if p.at_keyword("or") {
            Some((BinaryOp::Or, BP_OR, BP_OR + 1))
        } else if p.at_keyword("and") {
            Some((BinaryOp::And, BP_AND, BP_AND + 1))
        } else {
            None
        };

        if let Some((op, lbp, rbp)) = keyword_op {
            if lbp < min_bp {
                break;
            }
            lhs = finish_binary(p, lhs, op, rbp)?;
            continue;
        }

        // Symbolic operators
        let op_text = p
            .current()
            .filter(|l| l.kind == LexemeKind::Operator)
            .map(|l| l.text.clone());
        if let Some(op_text) = op_text {
            if op_text == "::" {
                if BP_POSTFIX < min_bp {
                    break;
                }
                let op_idx = p.bump();
                let data_type = common::parse_sql_type(p)?;
                let position = lhs.position;
                let mut value = Value::new(
                    ValueKind::Cast(Box::new(CastExpr {
                        value: lhs,
                        data_type,
                        postfix: true,
                    })),
                    position,
                );
                drain_operator(p, op_idx, &mut value);
                lhs = value;
                continue;
            }
            if let Some((op, lbp, rbp)) = symbol_op(&op_text) {
                if lbp < min_bp {
                    break;
                }
                if op.is_comparison() && is_comparison(&lhs) {
                    return Err(p.error(
                        ParseErrorKind::InvalidExpression,
                        "comparison operators are non-associative",
                    ));
                }
                lhs = finish_binary(p, lhs, op, rbp)?;
                continue;
            }
        }

        // Array subscript
        if p.at_punct("[") {
            if BP_POSTFIX < min_bp {
                break;
            }
            let open = p.bump();
            let index = parse_value_bp(p, 0)?;
            p.expect_punct("]")?;
            let position = lhs.position;
            let mut value = Value::new(
                ValueKind::ArrayAccess(Box::new(ArrayAccessExpr { base: lhs, index })),
                position,
            );
            drain_operator(p, open, &mut value);
            lhs = value;
            continue;
        }

        // Test-tier constructs: IS / IN / BETWEEN / LIKE / ILIKE / SIMILAR TO
        if at_test_construct(p) {
            if BP_TEST < min_bp {
                break;
            }
            lhs = parse_test_construct(p, lhs)?;
            continue;
        }

        break;
    }

    Ok(lhs)
}

fn finish_binary(p: &mut Parser, lhs: Value, op: BinaryOp, rbp: u8) -> Result<Value, ParseError> {
    let op_idx = p.bump();
    let rhs = parse_value_bp(p, rbp)?;
    let position = lhs.position;
    let mut value = Value::new(
        ValueKind::Binary(Box::new(BinaryExpr { op, lhs, rhs })),
        position,
    );
    drain_operator(p, op_idx, &mut value);
    Ok(value)
}

/// Comments sitting on an operator or bracket lexeme move to the node built
/// around it, so none are stranded.
fn drain_operator(p: &mut Parser, idx: usize, value: &mut Value) {
    let mut leading = p.take_leading(idx);
    value.comments.leading.append(&mut leading);
    let mut trailing = p.take_trailing(idx);
    value.comments.leading.append(&mut trailing);
}

fn is_comparison(value: &Value) -> bool {
    matches!(&value.kind, ValueKind::Binary(b) if b.op.is_comparison())
}

fn at_test_construct(p: &Parser) -> bool {
    p.at_keyword("is")
        || p.at_keyword("in")
        || p.at_keyword("between")
        || p.at_keyword("like")
        || p.at_keyword("ilike")
        || p.at_keyword("similar")
        || (p.at_keyword("not")
            && (p.peek_keyword(1, "in")
                || p.peek_keyword(1, "between")
                || p.peek_keyword(1, "like")
                || p.peek_keyword(1, "ilike")
                || p.peek_keyword(1, "similar")))
}

fn parse_test_construct(p: &mut Parser, lhs: Value) -> Result<Value, ParseError> {
    let position = lhs.position;

    if p.at_keyword("is") {
        p.bump();
        let negated = p.eat_keyword("not");
        let target = parse_is_target(p)?;
        return Ok(Value::new(
            ValueKind::Is(Box::new(IsExpr {
                value: lhs,
                negated,
                target,
            })),
            position,
        ));
    }

    let negated = p.eat_keyword("not");

    if p.eat_keyword("between") {
        let low = parse_value_bp(p, BP_TEST + 1)?;
        p.expect_keyword("and")?;
        let high = parse_value_bp(p, BP_TEST + 1)?;
        return Ok(Value::new(
            ValueKind::Between(Box::new(BetweenExpr {
                value: lhs,
                negated,
                low,
                high,
            })),
            position,
        ));
    }

    if p.eat_keyword("in") {
        p.expect_punct("(")?;
        let set = if at_query_start(p) {
            InSet::Subquery(select::parse_query(p)?)
        } else {
            let mut items = vec![parse_value_bp(p, 0)?];
            while p.eat_punct(",") {
                items.push(parse_value_bp(p, 0)?);
            }
            InSet::List(items)
        };
        p.expect_punct(")")?;
        return Ok(Value::new(
            ValueKind::InList(Box::new(InExpr {
                value: lhs,
                negated,
                set,
            })),
            position,
        ));
    }

    let op = if p.eat_keyword("like") {
        PatternOp::Like
    } else if p.eat_keyword("ilike") {
        PatternOp::ILike
    } else if p.eat_keyword("similar") {
        p.expect_keyword("to")?;
        PatternOp::SimilarTo
    } else {
        return Err(p.expected(
            ParseErrorKind::UnexpectedToken,
            &["IS", "IN", "BETWEEN", "LIKE", "ILIKE", "SIMILAR TO"],
        ));
    };
    let pattern = parse_value_bp(p, BP_TEST + 1)?;
    let escape = if p.eat_keyword("escape") {
        Some(parse_value_bp(p, BP_TEST + 1)?)
    } else {
        None
    };
    Ok(Value::new(
        ValueKind::PatternMatch(Box::new(PatternMatchExpr {
            value: lhs,
            op,
            negated,
            pattern,
            escape,
        })),
        position,
    ))
}

fn parse_is_target(p: &mut Parser) -> Result<IsTarget, ParseError> {
    if let Some(lexeme) = p.current() {
        match lexeme.kind {
            LexemeKind::Literal(LiteralKind::Null) => {
                p.bump();
                return Ok(IsTarget::Null);
            }
            LexemeKind::Literal(LiteralKind::Boolean) => {
                let truthy = lexeme.text.eq_ignore_ascii_case("true");
                p.bump();
                return Ok(if truthy { IsTarget::True } else { IsTarget::False });
            }
            _ => {}
        }
    }
    if p.eat_keyword("distinct") {
        p.expect_keyword("from")?;
        let target = parse_value_bp(p, BP_TEST + 1)?;
        return Ok(IsTarget::DistinctFrom(target));
    }
    Err(p.expected(
        ParseErrorKind::UnexpectedToken,
        &["NULL", "TRUE", "FALSE", "DISTINCT FROM"],
    ))
}

fn parse_prefix(p: &mut Parser) -> Result<Value, ParseError> {
    if p.at_keyword("not") {
        let not_idx = p.bump();
        // NOT EXISTS negates the construct, not the value
        if p.at_keyword("exists") {
            let mut value = parse_exists(p, true)?;
            drain_operator(p, not_idx, &mut value);
            return Ok(value);
        }
        let operand = parse_value_bp(p, BP_NOT + 1)?;
        let position = p.lexeme(not_idx).span.start;
        let mut value = Value::new(
            ValueKind::Unary(Box::new(UnaryExpr {
                op: UnaryOp::Not,
                operand,
            })),
            position,
        );
        drain_operator(p, not_idx, &mut value);
        return Ok(value);
    }

    for (text, op) in [("-", UnaryOp::Minus), ("+", UnaryOp::Plus), ("~", UnaryOp::BitNot)] {
        if p.at_operator(text) {
            let op_idx = p.bump();
            let operand = parse_value_bp(p, BP_UNARY + 1)?;
            let position = p.lexeme(op_idx).span.start;
            let mut value = Value::new(
                ValueKind::Unary(Box::new(UnaryExpr { op, operand })),
                position,
            );
            drain_operator(p, op_idx, &mut value);
            return Ok(value);
        }
    }

    parse_primary(p)
}

pub(crate) fn at_query_start(p: &Parser) -> bool {
    p.at_keyword("select") || p.at_keyword("with") || p.at_keyword("values")
}

fn parse_primary(p: &mut Parser) -> Result<Value, ParseError> {
    // Cloned so the borrow does not pin the parser across the arm bodies
    let Some(lexeme) = p.current().cloned() else {
        return Err(p.expected(ParseErrorKind::MissingToken, &["expression"]));
    };
    let position = lexeme.span.start;

    match lexeme.kind {
        LexemeKind::Literal(kind) => {
            let text = lexeme.text.clone();
            let idx = p.bump();
            let mut value = Value::new(ValueKind::Literal(Literal { kind, text }), position);
            p.attach_comments(idx, idx, &mut value.comments);
            Ok(value)
        }
        LexemeKind::Parameter => {
            let raw = lexeme.text.clone();
            let idx = p.bump();
            let mut value = Value::new(
                ValueKind::Parameter(ParameterValue::from_raw(&raw)),
                position,
            );
            p.attach_comments(idx, idx, &mut value.comments);
            Ok(value)
        }
        LexemeKind::Punct if lexeme.is_punct("(") => parse_paren(p),
        LexemeKind::Operator if lexeme.is_operator("*") => {
            let idx = p.bump();
            let mut value = Value::new(ValueKind::Star(StarExpr { qualifier: None }), position);
            p.attach_comments(idx, idx, &mut value.comments);
            Ok(value)
        }
        _ if lexeme.is_keyword("case") => parse_case(p),
        _ if lexeme.is_keyword("cast") => parse_cast(p),
        _ if lexeme.is_keyword("exists") => parse_exists(p, false),
        _ if lexeme.is_name_like() => parse_name_expression(p),
        _ => Err(p.expected(ParseErrorKind::InvalidExpression, &["expression"])),
    }
}

fn parse_paren(p: &mut Parser) -> Result<Value, ParseError> {
    let open = p.bump();
    let position = p.lexeme(open).span.start;

    if at_query_start(p) {
        let query = select::parse_query(p)?;
        p.expect_punct(")")?;
        let mut value = Value::new(ValueKind::Subquery(Box::new(query)), position);
        drain_operator(p, open, &mut value);
        return Ok(value);
    }

    let first = parse_value_bp(p, 0)?;
    if p.at_punct(",") {
        let mut items = vec![first];
        while p.eat_punct(",") {
            items.push(parse_value_bp(p, 0)?);
        }
        p.expect_punct(")")?;
        let mut value = Value::new(ValueKind::Tuple(TupleExpr { items }), position);
        drain_operator(p, open, &mut value);
        return Ok(value);
    }
    let close = p.expect_punct(")")?;
    let mut value = Value::new(ValueKind::Paren(Box::new(first)), position);
    drain_operator(p, open, &mut value);
    drain_operator(p, close, &mut value);
    Ok(value)
}

fn parse_case(p: &mut Parser) -> Result<Value, ParseError> {
    let start = p.expect_keyword("case")?;
    let position = p.lexeme(start).span.start;

    let operand = if p.at_keyword("when") {
        None
    } else {
        Some(parse_value(p)?)
    };

    let mut branches = Vec::new();
    while p.at_keyword("when") {
        let branch_start = p.index();
        let mut comments = crate::ast::NodeComments::new();
        let lead = p.take_leading(branch_start);
        comments.leading = lead;
        p.bump();
        let condition = parse_value(p)?;
        p.expect_keyword("then")?;
        let result = parse_value(p)?;
        branches.push(CaseBranch {
            condition,
            result,
            comments,
        });
    }
    if branches.is_empty() {
        // Covers CASE with only an ELSE branch, which stays an error
        return Err(p.expected(ParseErrorKind::MissingToken, &["WHEN"]));
    }

    let else_value = if p.eat_keyword("else") {
        Some(parse_value(p)?)
    } else {
        None
    };
    let end = p.expect_keyword("end")?;

    let mut value = Value::new(
        ValueKind::Case(Box::new(CaseExpr {
            operand,
            branches,
            else_value,
        })),
        position,
    );
    p.attach_comments(start, end, &mut value.comments);
    Ok(value)
}

fn parse_cast(p: &mut Parser) -> Result<Value, ParseError> {
    let start = p.expect_keyword("cast")?;
    let position = p.lexeme(start).span.start;
    p.expect_punct("(")?;
    let inner = parse_value(p)?;
    p.expect_keyword("as")?;
    let data_type = common::parse_sql_type(p)?;
    let close = p.expect_punct(")")?;
    let mut value = Value::new(
        ValueKind::Cast(Box::new(CastExpr {
            value: inner,
            data_type,
            postfix: false,
        })),
        position,
    );
    p.attach_comments(start, close, &mut value.comments);
    Ok(value)
}

fn parse_exists(p: &mut Parser, negated: bool) -> Result<Value, ParseError> {
    let start = p.expect_keyword("exists")?;
    let position = p.lexeme(start).span.start;
    p.expect_punct("(")?;
    let query = select::parse_query(p)?;
    let close = p.expect_punct(")")?;
    let mut value = Value::new(
        ValueKind::Exists(Box::new(ExistsExpr { negated, query })),
        position,
    );
    p.attach_comments(start, close, &mut value.comments);
    Ok(value)
}

/// Identifier, qualified name, qualified star, or function call
fn parse_name_expression(p: &mut Parser) -> Result<Value, ParseError> {
    let start = p.index();
    let qname = common::parse_qualified_name(p)?;
    let position = qname.position();

    // t.* — qualified star
    if p.at_punct(".") && p.peek(1).is_some_and(|l| l.is_operator("*")) {
        p.bump();
        let star = p.bump();
        let mut value = Value::new(
            ValueKind::Star(StarExpr {
                qualifier: Some(qname),
            }),
            position,
        );
        p.attach_comments(start, star, &mut value.comments);
        return Ok(value);
    }

    if p.at_punct("(") {
        let call = parse_function_call(p, qname, position)?;
        let mut value = Value::new(ValueKind::Function(Box::new(call)), position);
        p.attach_comments(start, start, &mut value.comments);
        return Ok(value);
    }

    let mut value = if qname.parts.len() == 1 {
        Value::new(
            ValueKind::Identifier(qname.parts.into_iter().next().expect("one part")),
            position,
        )
    } else {
        Value::new(ValueKind::Qualified(qname), position)
    };
    p.attach_span(start, &mut value.comments);
    Ok(value)
}

/// Arguments plus the ordered tails: WITHIN GROUP, FILTER, OVER
pub(crate) fn parse_function_call(
    p: &mut Parser,
    qname: QualifiedName,
    position: crate::base::Position,
) -> Result<FunctionCall, ParseError> {
    p.expect_punct("(")?;

    let distinct = p.eat_keyword("distinct");
    let mut args = Vec::new();
    let mut order_by = None;

    if !p.at_punct(")") {
        args.push(parse_value(p)?);
        while p.eat_punct(",") {
            args.push(parse_value(p)?);
        }
        if p.at_keyword("order") {
            order_by = Some(parse_order_by_clause(p)?);
        }
    }
    p.expect_punct(")")?;

    let within_group = if p.at_keyword("within") {
        p.bump();
        p.expect_keyword("group")?;
        p.expect_punct("(")?;
        let clause = parse_order_by_clause(p)?;
        p.expect_punct(")")?;
        Some(clause)
    } else {
        None
    };

    let filter = if p.at_keyword("filter") {
        p.bump();
        p.expect_punct("(")?;
        p.expect_keyword("where")?;
        let condition = parse_value(p)?;
        p.expect_punct(")")?;
        Some(condition)
    } else {
        None
    };

    let over = if p.at_keyword("over") {
        p.bump();
        if p.at_punct("(") {
            p.bump();
            let spec = parse_window_spec(p)?;
            p.expect_punct(")")?;
            Some(OverClause::Spec(spec))
        } else {
            Some(OverClause::Named(common::parse_identifier(p)?))
        }
    } else {
        None
    };

    FunctionCall::new(
        qname,
        args,
        distinct,
        order_by,
        within_group,
        filter,
        over,
        position,
    )
    .map_err(|e| {
        ParseError::with_message(ParseErrorKind::InvalidExpression, position, e.to_string())
    })
}

/// `ORDER BY item [, item]*` with direction and NULLS placement
pub(crate) fn parse_order_by_clause(p: &mut Parser) -> Result<OrderByClause, ParseError> {
    let start = p.expect_keyword("order")?;
    p.expect_keyword("by")?;
    let mut clause = OrderByClause::default();
    p.attach_comments(start, start, &mut clause.comments);

    loop {
        let item_start = p.index();
        let leading = p.take_leading(item_start);
        let value = parse_value(p)?;
        let direction = if p.eat_keyword("asc") {
            Some(SortDirection::Asc)
        } else if p.eat_keyword("desc") {
            Some(SortDirection::Desc)
        } else {
            None
        };
        let nulls = if p.eat_keyword("nulls") {
            if p.eat_keyword("first") {
                Some(NullsOrder::First)
            } else {
                p.expect_keyword("last")?;
                Some(NullsOrder::Last)
            }
        } else {
            None
        };
        let mut item = OrderByItem {
            value,
            direction,
            nulls,
            comments: crate::ast::NodeComments::new(),
        };
        item.comments.leading = leading;
        clause.items.push(item);
        if !p.eat_punct(",") {
            break;
        }
    }
    Ok(clause)
}

/// `[PARTITION BY …] [ORDER BY …] [frame]` inside OVER parentheses
pub(crate) fn parse_window_spec(p: &mut Parser) -> Result<WindowSpec, ParseError> {
    let mut spec = WindowSpec::default();

    if p.at_keyword("partition") {
        p.bump();
        p.expect_keyword("by")?;
        spec.partition_by.push(parse_value(p)?);
        while p.eat_punct(",") {
            spec.partition_by.push(parse_value(p)?);
        }
    }
    if p.at_keyword("order") {
        spec.order_by = Some(parse_order_by_clause(p)?);
    }

    let units = if p.at_keyword("rows") {
        Some(FrameUnits::Rows)
    } else if p.at_keyword("range") {
        Some(FrameUnits::Range)
    } else if p.at_keyword("groups") {
        Some(FrameUnits::Groups)
    } else {
        None
    };
    if let Some(units) = units {
        p.bump();
        let (start, end) = if p.eat_keyword("between") {
            let start = parse_frame_bound(p)?;
            p.expect_keyword("and")?;
            let end = parse_frame_bound(p)?;
            (start, Some(end))
        } else {
            (parse_frame_bound(p)?, None)
        };
        spec.frame = Some(WindowFrame { units, start, end });
    }

    Ok(spec)
}

fn parse_frame_bound(p: &mut Parser) -> Result<FrameBound, ParseError> {
    if p.eat_keyword("unbounded") {
        return if p.eat_keyword("preceding") {
            Ok(FrameBound::UnboundedPreceding)
        } else {
            p.expect_keyword("following")?;
            Ok(FrameBound::UnboundedFollowing)
        };
    }
    if p.eat_keyword("current") {
        p.expect_keyword("row")?;
        return Ok(FrameBound::CurrentRow);
    }
    let value = parse_value(p)?;
    if p.eat_keyword("preceding") {
        Ok(FrameBound::Preceding(value))
    } else {
        p.expect_keyword("following")?;
        Ok(FrameBound::Following(value))
    }
}
