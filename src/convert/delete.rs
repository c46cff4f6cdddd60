//! DELETE → SELECT conversion
//!
//! RETURNING on DELETE yields the deleted rows, so the simulation selects
//! the fixture rows matching the WHERE condition. A USING relation is
//! defined as its own CTE and folded into the condition as an EXISTS probe,
//! the same shape the MERGE converter uses for its USING source.

use super::support::*;
use super::{ConvertError, ConvertOptions, MissingFixtureStrategy};
use crate::ast::{SelectQuery, Statement};

/// Derives the deleted-rows result set over fixtures
pub struct DeleteResultSelectConverter;

impl DeleteResultSelectConverter {
    pub fn to_select_query(
        statement: &Statement,
        options: &ConvertOptions,
    ) -> Result<Statement, ConvertError> {
        let Statement::Delete(delete) = statement else {
            return Err(ConvertError::UnsupportedReturning {
                reason: "statement is not a DELETE".to_string(),
            });
        };

        let Some(returning) = &delete.returning else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::UnsupportedReturning {
                    reason: "statement has no RETURNING clause".to_string(),
                }),
            };
        };

        let Some(fixture) = options.fixture_for(&delete.table) else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::FixtureMissing {
                    table: delete.table.to_string(),
                }),
            };
        };

        let table = delete.table.name().name.clone();
        let input_with = delete.with_clause.as_ref();
        let rows_name = unique_cte_name(&format!("{table}_rows"), input_with);
        let alias = delete
            .alias
            .as_ref()
            .map(|a| a.name.name.to_string())
            .unwrap_or_else(|| table.to_string());

        let secondary = match delete.using.first() {
            Some(source) => Some(secondary_source(source, input_with, options)?),
            None => None,
        };

        let where_condition = delete.where_clause.as_ref().map(|w| w.condition.clone());
        let condition = match &secondary {
            Some((_, name, source_alias)) => Some(exists(
                select_from(
                    vec![star_item()],
                    base_source(name, Some(source_alias)),
                    where_condition,
                ),
                false,
            )),
            None => where_condition,
        };

        let deleted = select_from(
            vec![star_item()],
            base_source(&rows_name, Some(&alias)),
            condition,
        );

        let mut synthesized = vec![cte(
            &rows_name,
            Some(fixture.column_names()),
            fixture_rows_query(fixture),
        )];
        if let Some((Some(source_cte), _, _)) = &secondary {
            synthesized.push(source_cte.clone());
        }
        synthesized.push(cte(&table, None, deleted));
        let with = compose_with(input_with, synthesized);

        let projection = returning_items(returning, fixture);
        let mut result = select_from(projection, base_source(&table, None), None);
        if let SelectQuery::Simple(select) = &mut result {
            select.with_clause = Some(with);
        }
        Ok(Statement::Select(result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{FixtureColumn, FixtureTable, FixtureValue};
    use crate::format::{format, FormatOptions};
    use crate::parser::parse;

    fn logs_fixture() -> FixtureTable {
        FixtureTable::new(
            "logs",
            vec![
                FixtureColumn::new("id", "int"),
                FixtureColumn::new("level", "text"),
            ],
        )
        .with_rows(vec![
            vec![
                FixtureValue::Numeric("1".into()),
                FixtureValue::Text("info".into()),
            ],
            vec![
                FixtureValue::Numeric("2".into()),
                FixtureValue::Text("error".into()),
            ],
        ])
    }

    fn audit_fixture() -> FixtureTable {
        FixtureTable::new(
            "audit",
            vec![FixtureColumn::new("log_id", "int")],
        )
        .with_rows(vec![vec![FixtureValue::Numeric("2".into())]])
    }

    #[test]
    fn delete_returns_matching_rows() {
        let statement = parse("delete from logs where level = 'error' returning id").unwrap();
        let options = ConvertOptions::new(vec![logs_fixture()]);
        let converted =
            DeleteResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(sql.contains("where \"level\" = 'error'"), "got: {sql}");
        assert!(sql.contains("\"logs_rows\""), "got: {sql}");
        assert!(sql.ends_with("select \"id\" from \"logs\""), "got: {sql}");
    }

    #[test]
    fn delete_without_where_returns_all_rows() {
        let statement = parse("delete from logs returning *").unwrap();
        let options = ConvertOptions::new(vec![logs_fixture()]);
        let converted =
            DeleteResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(sql.contains("select * from \"logs_rows\""), "got: {sql}");
    }

    #[test]
    fn delete_using_defines_the_second_relation() {
        let statement = parse(
            "delete from logs using audit a where logs.id = a.log_id returning *",
        )
        .unwrap();
        let options = ConvertOptions::new(vec![logs_fixture(), audit_fixture()]);
        let converted =
            DeleteResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let sql = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(
            sql.contains("\"audit\" (\"log_id\") as (values (2))"),
            "got: {sql}"
        );
        assert!(
            sql.contains(
                "where exists (select * from \"audit\" as \"a\" where \"logs\".\"id\" = \"a\".\"log_id\")"
            ),
            "got: {sql}"
        );
        parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
    }

    #[test]
    fn delete_using_missing_fixture_errors() {
        let statement =
            parse("delete from logs using ghosts g where logs.id = g.id returning *").unwrap();
        let options = ConvertOptions::new(vec![logs_fixture()]);
        let err = DeleteResultSelectConverter::to_select_query(&statement, &options).unwrap_err();
        assert!(matches!(err, ConvertError::FixtureMissing { .. }));
    }
}
