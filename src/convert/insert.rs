//! INSERT → SELECT conversion

use super::support::*;
use super::{ConvertError, ConvertOptions, MissingFixtureStrategy};
use crate::ast::{
    BinarySelect, InsertSource, InsertStmt, NodeComments, SelectQuery, SetOperator, Statement,
    ValuesQuery, ValuesRow,
};
use crate::base::Position;

/// Derives the post-insert result set over fixtures
pub struct InsertResultSelectConverter;

impl InsertResultSelectConverter {
    /// Build `WITH table AS (fixture rows ∪ inserted rows) SELECT returning`.
    pub fn to_select_query(
        statement: &Statement,
        options: &ConvertOptions,
    ) -> Result<Statement, ConvertError> {
        let Statement::Insert(insert) = statement else {
            return Err(ConvertError::UnsupportedReturning {
                reason: "statement is not an INSERT".to_string(),
            });
        };

        let Some(returning) = &insert.returning else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::UnsupportedReturning {
                    reason: "statement has no RETURNING clause".to_string(),
                }),
            };
        };

        let Some(fixture) = options.fixture_for(&insert.table) else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::FixtureMissing {
                    table: insert.table.to_string(),
                }),
            };
        };

        let table = insert.table.name().name.clone();
        let inserted = inserted_rows(insert, fixture)?;

        let body = match inserted {
            Some(inserted) => SelectQuery::Binary(Box::new(BinarySelect {
                op: SetOperator::UnionAll,
                left: fixture_rows_query(fixture),
                right: inserted,
                comments: NodeComments::new(),
                position: Position::default(),
            })),
            None => fixture_rows_query(fixture),
        };

        // The statement's own WITH rides along: the insert source may read
        // the caller's CTEs
        let with = compose_with(
            insert.with_clause.as_ref(),
            vec![cte(&table, Some(fixture.column_names()), body)],
        );

        let projection = returning_items(returning, fixture);
        let mut result = select_from(projection, base_source(&table, None), None);
        if let SelectQuery::Simple(select) = &mut result {
            select.with_clause = Some(with);
        }
        Ok(Statement::Select(result))
    }
}

/// The inserted rows reshaped to the fixture's column order
fn inserted_rows(
    insert: &InsertStmt,
    fixture: &super::FixtureTable,
) -> Result<Option<SelectQuery>, ConvertError> {
    let column_names: Option<Vec<&str>> = insert
        .columns
        .as_ref()
        .map(|c| c.columns.iter().map(|i| i.name.as_str()).collect());

    match &insert.source {
        InsertSource::DefaultValues => Ok(None),
        InsertSource::Query(query) => {
            if let Some(names) = &column_names {
                if names.len() != fixture.columns.len() {
                    return Err(ConvertError::UnsupportedReturning {
                        reason: "INSERT from query with a partial column list".to_string(),
                    });
                }
            }
            Ok(Some(query.clone()))
        }
        InsertSource::Values(values) => {
            let reshaped = match &column_names {
                None => values.clone(),
                Some(names) => reshape_rows(values, names, fixture)?,
            };
            Ok(Some(SelectQuery::Values(reshaped)))
        }
    }
}

/// Rows with a partial column list padded to full width with NULLs
fn reshape_rows(
    values: &ValuesQuery,
    names: &[&str],
    fixture: &super::FixtureTable,
) -> Result<ValuesQuery, ConvertError> {
    let mut rows = Vec::with_capacity(values.rows.len());
    for row in &values.rows {
        if row.values.len() != names.len() {
            return Err(ConvertError::UnsupportedReturning {
                reason: format!(
                    "VALUES row has {} entries for {} columns",
                    row.values.len(),
                    names.len()
                ),
            });
        }
        let mut reshaped = Vec::with_capacity(fixture.columns.len());
        for column in &fixture.columns {
            let value = names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(&column.name))
                .map(|i| row.values[i].clone())
                .unwrap_or_else(null_value);
            reshaped.push(value);
        }
        rows.push(ValuesRow {
            values: reshaped,
            comments: NodeComments::new(),
        });
    }
    Ok(ValuesQuery {
        rows,
        comments: NodeComments::new(),
        position: Position::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{FixtureColumn, FixtureTable, FixtureValue};
    use crate::format::{format, FormatOptions};
    use crate::parser::parse;

    fn users_fixture() -> FixtureTable {
        FixtureTable::new(
            "users",
            vec![
                FixtureColumn::new("id", "int"),
                FixtureColumn::new("name", "text"),
            ],
        )
        .with_rows(vec![vec![
            FixtureValue::Numeric("1".into()),
            FixtureValue::Text("ada".into()),
        ]])
    }

    #[test]
    fn insert_with_returning_becomes_a_select() {
        let statement =
            parse("insert into users (id, name) values (2, 'bo') returning id, name").unwrap();
        let options = ConvertOptions::new(vec![users_fixture()]);
        let converted =
            InsertResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(sql.starts_with("with \"users\" (\"id\", \"name\") as ("), "got: {sql}");
        assert!(sql.contains("union all"), "got: {sql}");
        assert!(sql.contains("values (2, 'bo')"), "got: {sql}");
        assert!(sql.ends_with("from \"users\""), "got: {sql}");
    }

    #[test]
    fn returning_star_expands_fixture_columns() {
        let statement = parse("insert into users values (2, 'bo') returning *").unwrap();
        let options = ConvertOptions::new(vec![users_fixture()]);
        let converted =
            InsertResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(sql.contains("select \"id\", \"name\""), "got: {sql}");
    }

    #[test]
    fn partial_column_list_pads_with_null() {
        let statement = parse("insert into users (name) values ('cy') returning *").unwrap();
        let options = ConvertOptions::new(vec![users_fixture()]);
        let converted =
            InsertResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(sql.contains("values (null, 'cy')"), "got: {sql}");
    }

    #[test]
    fn caller_with_clause_survives_conversion() {
        let statement =
            parse("with src as (select 2, 'bo') insert into users select * from src returning *")
                .unwrap();
        let options = ConvertOptions::new(vec![users_fixture()]);
        let converted =
            InsertResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(
            sql.starts_with("with \"src\" as (select 2, 'bo'), \"users\" (\"id\", \"name\") as ("),
            "got: {sql}"
        );
        assert!(sql.contains("union all select * from \"src\""), "got: {sql}");
        parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
    }

    #[test]
    fn missing_fixture_errors_by_default() {
        let statement = parse("insert into ghosts values (1) returning *").unwrap();
        let options = ConvertOptions::new(vec![users_fixture()]);
        let err = InsertResultSelectConverter::to_select_query(&statement, &options).unwrap_err();
        assert_eq!(
            err,
            ConvertError::FixtureMissing {
                table: "ghosts".to_string()
            }
        );
    }

    #[test]
    fn no_returning_passes_through_when_asked() {
        let statement = parse("insert into users values (2, 'bo')").unwrap();
        let options = ConvertOptions {
            fixture_tables: vec![users_fixture()],
            missing_fixture_strategy: crate::convert::MissingFixtureStrategy::Passthrough,
        };
        let converted =
            InsertResultSelectConverter::to_select_query(&statement, &options).unwrap();
        assert_eq!(converted, statement);
    }
}
