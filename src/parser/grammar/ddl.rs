//! CREATE TABLE / CREATE INDEX / ALTER TABLE grammar

use super::super::{ParseError, ParseErrorKind, Parser};
use super::{common, expr};
use crate::ast::{
    AlterAction, AlterTableStmt, ColumnConstraint, ColumnDef, CreateIndexStmt, CreateTableStmt,
    IndexColumn, NodeComments, NullsOrder, SortDirection, Statement, TableConstraint,
};

pub(crate) fn parse_create_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    if p.peek_keyword(1, "table") {
        return parse_create_table_entry(p);
    }
    if p.peek_keyword(1, "index") || (p.peek_keyword(1, "unique") && p.peek_keyword(2, "index")) {
        return parse_create_index_entry(p);
    }
    Err(p.expected(
        ParseErrorKind::UnknownStatement,
        &["CREATE TABLE", "CREATE INDEX", "CREATE UNIQUE INDEX"],
    ))
}

pub(crate) fn parse_create_table_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let kw = p.expect_keyword("create")?;
    let position = p.lexeme(kw).span.start;
    p.expect_keyword("table")?;

    let if_not_exists = if p.at_keyword("if") {
        p.bump();
        p.expect_keyword("not")?;
        p.expect_keyword("exists")?;
        true
    } else {
        false
    };

    let name = common::parse_qualified_name(p)?;
    p.expect_punct("(")?;

    let mut columns = Vec::new();
    let mut constraints = Vec::new();
    loop {
        if at_table_constraint(p) {
            constraints.push(parse_table_constraint(p)?);
        } else {
            columns.push(parse_column_def(p)?);
        }
        if !p.eat_punct(",") {
            break;
        }
    }
    p.expect_punct(")")?;

    let mut stmt = CreateTableStmt {
        if_not_exists,
        name,
        columns,
        constraints,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::CreateTable(Box::new(stmt)))
}

fn at_table_constraint(p: &Parser) -> bool {
    p.at_keyword("constraint")
        || p.at_keyword("primary")
        || p.at_keyword("foreign")
        || p.at_keyword("check")
        || (p.at_keyword("unique") && p.peek(1).is_some_and(|l| l.is_punct("(")))
}

fn parse_column_def(p: &mut Parser) -> Result<ColumnDef, ParseError> {
    let start = p.index();
    let leading = p.take_leading(start);
    let name = common::parse_identifier(p)?;
    let data_type = common::parse_sql_type(p)?;

    let mut constraints = Vec::new();
    loop {
        if p.at_keyword("not") && p.peek_null(1) {
            p.bump();
            p.bump();
            constraints.push(ColumnConstraint::NotNull);
        } else if p.at_null() {
            p.bump();
            constraints.push(ColumnConstraint::Null);
        } else if p.at_keyword("primary") {
            p.bump();
            p.expect_keyword("key")?;
            constraints.push(ColumnConstraint::PrimaryKey);
        } else if p.eat_keyword("unique") {
            constraints.push(ColumnConstraint::Unique);
        } else if p.eat_keyword("default") {
            constraints.push(ColumnConstraint::Default(expr::parse_value(p)?));
        } else if p.eat_keyword("check") {
            p.expect_punct("(")?;
            let predicate = expr::parse_value(p)?;
            p.expect_punct(")")?;
            constraints.push(ColumnConstraint::Check(predicate));
        } else if p.eat_keyword("references") {
            let table = common::parse_qualified_name(p)?;
            let columns = if p.at_punct("(") {
                common::parse_paren_identifier_list(p)?
            } else {
                Vec::new()
            };
            constraints.push(ColumnConstraint::References { table, columns });
        } else {
            break;
        }
    }

    let mut column = ColumnDef {
        name,
        data_type,
        constraints,
        comments: NodeComments::new(),
    };
    column.comments.leading = leading;
    Ok(column)
}

fn parse_table_constraint(p: &mut Parser) -> Result<TableConstraint, ParseError> {
    let name = if p.eat_keyword("constraint") {
        Some(common::parse_identifier(p)?)
    } else {
        None
    };

    if p.at_keyword("primary") {
        p.bump();
        p.expect_keyword("key")?;
        let columns = common::parse_paren_identifier_list(p)?;
        return Ok(TableConstraint::PrimaryKey { name, columns });
    }
    if p.eat_keyword("unique") {
        let columns = common::parse_paren_identifier_list(p)?;
        return Ok(TableConstraint::Unique { name, columns });
    }
    if p.at_keyword("foreign") {
        p.bump();
        p.expect_keyword("key")?;
        let columns = common::parse_paren_identifier_list(p)?;
        p.expect_keyword("references")?;
        let ref_table = common::parse_qualified_name(p)?;
        let ref_columns = if p.at_punct("(") {
            common::parse_paren_identifier_list(p)?
        } else {
            Vec::new()
        };
        return Ok(TableConstraint::ForeignKey {
            name,
            columns,
            ref_table,
            ref_columns,
        });
    }
    if p.eat_keyword("check") {
        p.expect_punct("(")?;
        let predicate = expr::parse_value(p)?;
        p.expect_punct(")")?;
        return Ok(TableConstraint::Check { name, predicate });
    }
    Err(p.expected(
        ParseErrorKind::UnexpectedToken,
        &["PRIMARY KEY", "UNIQUE", "FOREIGN KEY", "CHECK"],
    ))
}

pub(crate) fn parse_create_index_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let kw = p.expect_keyword("create")?;
    let position = p.lexeme(kw).span.start;
    let unique = p.eat_keyword("unique");
    p.expect_keyword("index")?;

    let if_not_exists = if p.at_keyword("if") {
        p.bump();
        p.expect_keyword("not")?;
        p.expect_keyword("exists")?;
        true
    } else {
        false
    };

    let name = common::parse_identifier(p)?;
    p.expect_keyword("on")?;
    let table = common::parse_qualified_name(p)?;

    let method = if p.eat_keyword("using") {
        Some(common::parse_identifier(p)?)
    } else {
        None
    };

    p.expect_punct("(")?;
    let mut columns = vec![parse_index_column(p)?];
    while p.eat_punct(",") {
        columns.push(parse_index_column(p)?);
    }
    p.expect_punct(")")?;

    let mut stmt = CreateIndexStmt {
        unique,
        if_not_exists,
        name,
        table,
        columns,
        method,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::CreateIndex(Box::new(stmt)))
}

fn parse_index_column(p: &mut Parser) -> Result<IndexColumn, ParseError> {
    let value = expr::parse_value(p)?;
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
    Ok(IndexColumn {
        value,
        direction,
        nulls,
    })
}

pub(crate) fn parse_alter_entry(p: &mut Parser) -> Result<Statement, ParseError> {
    let kw = p.expect_keyword("alter")?;
    let position = p.lexeme(kw).span.start;
    p.expect_keyword("table")?;
    let table = common::parse_qualified_name(p)?;

    let action = if p.eat_keyword("add") {
        if p.at_keyword("constraint")
            || p.at_keyword("primary")
            || p.at_keyword("foreign")
            || p.at_keyword("check")
            || p.at_keyword("unique")
        {
            AlterAction::AddConstraint(parse_table_constraint(p)?)
        } else {
            p.eat_keyword("column");
            AlterAction::AddColumn(parse_column_def(p)?)
        }
    } else if p.eat_keyword("drop") {
        if p.eat_keyword("constraint") {
            AlterAction::DropConstraint(common::parse_identifier(p)?)
        } else {
            p.eat_keyword("column");
            AlterAction::DropColumn(common::parse_identifier(p)?)
        }
    } else if p.eat_keyword("rename") {
        p.eat_keyword("column");
        let from = common::parse_identifier(p)?;
        p.expect_keyword("to")?;
        let to = common::parse_identifier(p)?;
        AlterAction::RenameColumn { from, to }
    } else if p.eat_keyword("alter") {
        p.eat_keyword("column");
        let column = common::parse_identifier(p)?;
        if p.eat_keyword("type") {
            AlterAction::AlterColumnType {
                column,
                data_type: common::parse_sql_type(p)?,
            }
        } else if p.eat_keyword("set") {
            if p.at_keyword("not") {
                p.bump();
                p.expect_null()?;
                AlterAction::SetNotNull(column)
            } else {
                p.expect_keyword("default")?;
                AlterAction::SetDefault {
                    column,
                    value: expr::parse_value(p)?,
                }
            }
        } else if p.eat_keyword("drop") {
            if p.at_keyword("not") {
                p.bump();
                p.expect_null()?;
                AlterAction::DropNotNull(column)
            } else {
                p.expect_keyword("default")?;
                AlterAction::DropDefault(column)
            }
        } else {
            return Err(p.expected(
                ParseErrorKind::UnexpectedToken,
                &["TYPE", "SET", "DROP"],
            ));
        }
    } else {
        return Err(p.expected(
            ParseErrorKind::UnexpectedToken,
            &["ADD", "DROP", "RENAME", "ALTER"],
        ));
    };

    let mut stmt = AlterTableStmt {
        table,
        action,
        comments: NodeComments::new(),
        position,
    };
    p.attach_comments(kw, kw, &mut stmt.comments);
    Ok(Statement::Alter(Box::new(stmt)))
}
