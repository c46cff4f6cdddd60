//! INSERT / UPDATE / DELETE / MERGE grammar

use super::super::{ParseError, ParseErrorKind, Parser};
use super::{common, expr, select};
use crate::ast::{
    DeleteStmt, InsertColumns, InsertSource, InsertStmt, MergeInsertAction, MergeMatchedAction,
    MergeStmt, MergeWhenClause, NodeComments, ReturningClause, ReturningItems, SelectItem,
    SetAssignment, Statement, WithClause,
};

fn parse_opt_with(p: &mut Parser) -> Result<Option<WithClause>, ParseError> {
    if p.at_keyword("with") {
        Ok(Some(select::parse_with_clause(p)?))
    } else {
        Ok(None)
    }
}

pub(crate) fn parse_insert_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let with_clause = parse_opt_with(p)?;

    let kw = p.expect_keyword("insert")?;
    let position = p.lexeme(kw).span.start;
    p.expect_keyword("into")?;
    let table = common::parse_qualified_name(p)?;

    // A parenthesis here is the column list unless it opens a subquery
    let columns = if p.at_punct("(")
        && !p
            .peek(1)
            .is_some_and(|l| l.is_keyword("select") || l.is_keyword("with"))
    {
        let open = p.bump();
        let mut cols = InsertColumns {
            columns: vec![common::parse_identifier(p)?],
            comments: NodeComments::new(),
        };
        while p.eat_punct(",") {
            cols.columns.push(common::parse_identifier(p)?);
        }
        let close = p.expect_punct(")")?;
        cols.comments.leading = p.take_leading(open);
        let mut trailing = p.take_trailing(close);
        cols.comments.trailing.append(&mut trailing);
        Some(cols)
    } else {
        None
    };

    let source = if p.at_keyword("values") {
        InsertSource::Values(select::parse_values_query(p)?)
    } else if p.at_keyword("default") {
        p.bump();
        p.expect_keyword("values")?;
        InsertSource::DefaultValues
    } else {
        InsertSource::Query(select::parse_query(p)?)
    };

    let returning = parse_opt_returning(p)?;

    let mut stmt = InsertStmt {
        with_clause,
        table,
        columns,
        source,
        returning,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::Insert(Box::new(stmt)))
}

pub(crate) fn parse_update_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let with_clause = parse_opt_with(p)?;

    let kw = p.expect_keyword("update")?;
    let position = p.lexeme(kw).span.start;
    let table = common::parse_qualified_name(p)?;
    let alias = common::parse_opt_table_alias(p)?;
    p.expect_keyword("set")?;

    let mut assignments = vec![parse_set_assignment(p)?];
    while p.eat_punct(",") {
        assignments.push(parse_set_assignment(p)?);
    }

    let from_clause = if p.at_keyword("from") {
        let idx = p.bump();
        let mut from = crate::ast::FromClause {
            source: select::parse_table_source(p)?,
            comments: NodeComments::new(),
        };
        p.attach_comments(idx, idx, &mut from.comments);
        Some(from)
    } else {
        None
    };

    let where_clause = parse_opt_where(p)?;
    let returning = parse_opt_returning(p)?;

    let mut stmt = crate::ast::UpdateStmt {
        with_clause,
        table,
        alias,
        assignments,
        from_clause,
        where_clause,
        returning,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::Update(Box::new(stmt)))
}

fn parse_set_assignment(p: &mut Parser) -> Result<SetAssignment, ParseError> {
    let start = p.index();
    let leading = p.take_leading(start);
    let column = common::parse_qualified_name(p)?;
    if !p.eat_operator("=") {
        return Err(p.expected(ParseErrorKind::MissingToken, &["="]));
    }
    let value = expr::parse_value(p)?;
    let mut assignment = SetAssignment {
        column,
        value,
        comments: NodeComments::new(),
    };
    assignment.comments.leading = leading;
    Ok(assignment)
}

pub(crate) fn parse_delete_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let with_clause = parse_opt_with(p)?;

    let kw = p.expect_keyword("delete")?;
    let position = p.lexeme(kw).span.start;
    p.expect_keyword("from")?;
    let table = common::parse_qualified_name(p)?;
    let alias = common::parse_opt_table_alias(p)?;

    let mut using = Vec::new();
    if p.eat_keyword("using") {
        using.push(select::parse_table_source(p)?);
    }

    let where_clause = parse_opt_where(p)?;
    let returning = parse_opt_returning(p)?;

    let mut stmt = DeleteStmt {
        with_clause,
        table,
        alias,
        using,
        where_clause,
        returning,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::Delete(Box::new(stmt)))
}

pub(crate) fn parse_merge_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let with_clause = parse_opt_with(p)?;

    let kw = p.expect_keyword("merge")?;
    let position = p.lexeme(kw).span.start;
    p.expect_keyword("into")?;
    let target = common::parse_qualified_name(p)?;
    let target_alias = common::parse_opt_table_alias(p)?;

    p.expect_keyword("using")?;
    let source = select::parse_table_source(p)?;
    p.expect_keyword("on")?;
    let on = expr::parse_value(p)?;

    let mut clauses = Vec::new();
    while p.at_keyword("when") {
        clauses.push(parse_merge_when(p)?);
    }
    if clauses.is_empty() {
        return Err(p.expected(ParseErrorKind::MissingToken, &["WHEN MATCHED", "WHEN NOT MATCHED"]));
    }

    let returning = parse_opt_returning(p)?;

    let mut stmt = MergeStmt {
        with_clause,
        target,
        target_alias,
        source,
        on,
        clauses,
        returning,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::Merge(Box::new(stmt)))
}

fn parse_merge_when(p: &mut Parser) -> Result<MergeWhenClause, ParseError> {
    p.expect_keyword("when")?;
    let matched = if p.eat_keyword("matched") {
        true
    } else {
        p.expect_keyword("not")?;
        p.expect_keyword("matched")?;
        false
    };

    let condition = if p.eat_keyword("and") {
        Some(expr::parse_value(p)?)
    } else {
        None
    };
    p.expect_keyword("then")?;

    if matched {
        let action = if p.eat_keyword("update") {
            p.expect_keyword("set")?;
            let mut assignments = vec![parse_set_assignment(p)?];
            while p.eat_punct(",") {
                assignments.push(parse_set_assignment(p)?);
            }
            MergeMatchedAction::Update(assignments)
        } else {
            p.expect_keyword("delete")?;
            MergeMatchedAction::Delete
        };
        Ok(MergeWhenClause::Matched { condition, action })
    } else {
        p.expect_keyword("insert")?;
        let columns = if p.at_punct("(") {
            Some(common::parse_paren_identifier_list(p)?)
        } else {
            None
        };
        p.expect_keyword("values")?;
        p.expect_punct("(")?;
        let mut values = vec![expr::parse_value(p)?];
        while p.eat_punct(",") {
            values.push(expr::parse_value(p)?);
        }
        p.expect_punct(")")?;
        Ok(MergeWhenClause::NotMatched {
            condition,
            action: MergeInsertAction { columns, values },
        })
    }
}

fn parse_opt_where(p: &mut Parser) -> Result<Option<crate::ast::WhereClause>, ParseError> {
    if !p.at_keyword("where") {
        return Ok(None);
    }
    let idx = p.bump();
    let mut clause = crate::ast::WhereClause {
        condition: expr::parse_value(p)?,
        comments: NodeComments::new(),
    };
    p.attach_comments(idx, idx, &mut clause.comments);
    Ok(Some(clause))
}

fn parse_opt_returning(p: &mut Parser) -> Result<Option<ReturningClause>, ParseError> {
    if !p.at_keyword("returning") {
        return Ok(None);
    }
    let idx = p.bump();
    let mut clause = ReturningClause {
        items: ReturningItems::Star,
        comments: NodeComments::new(),
    };
    p.attach_comments(idx, idx, &mut clause.comments);

    if p.at_operator("*") {
        p.bump();
        return Ok(Some(clause));
    }

    let mut items = Vec::new();
    loop {
        let value = expr::parse_value(p)?;
        let alias = if p.eat_keyword("as") {
            Some(common::parse_identifier(p)?)
        } else if p.at_name() {
            Some(common::parse_identifier(p)?)
        } else {
            None
        };
        items.push(SelectItem {
            value,
            alias,
            comments: NodeComments::new(),
        });
        if !p.eat_punct(",") {
            break;
        }
    }
    clause.items = ReturningItems::Items(items);
    Ok(Some(clause))
}
