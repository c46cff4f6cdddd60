//! UPDATE → SELECT conversion
//!
//! The post-update rows are simulated with per-column CASE expressions over
//! the fixture rows: `CASE WHEN <guard> THEN <new value> ELSE col END`.
//! Without a FROM clause the guard is the WHERE condition itself; with one,
//! the FROM relation is defined as its own CTE (fixture-backed for base
//! tables, body for subqueries) and the guard becomes an EXISTS probe over
//! it, the same shape the MERGE converter uses for its USING source.

use super::support::*;
use super::{ConvertError, ConvertOptions, MissingFixtureStrategy};
use crate::ast::{
    CaseBranch, CaseExpr, NodeComments, SelectQuery, SetAssignment, Statement, Value, ValueKind,
};
use crate::base::Position;

/// Derives the post-update result set over fixtures
pub struct UpdateResultSelectConverter;

impl UpdateResultSelectConverter {
    pub fn to_select_query(
        statement: &Statement,
        options: &ConvertOptions,
    ) -> Result<Statement, ConvertError> {
        let Statement::Update(update) = statement else {
            return Err(ConvertError::UnsupportedReturning {
                reason: "statement is not an UPDATE".to_string(),
            });
        };

        let Some(returning) = &update.returning else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::UnsupportedReturning {
                    reason: "statement has no RETURNING clause".to_string(),
                }),
            };
        };

        let Some(fixture) = options.fixture_for(&update.table) else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::FixtureMissing {
                    table: update.table.to_string(),
                }),
            };
        };

        let table = update.table.name().name.clone();
        let input_with = update.with_clause.as_ref();
        let rows_name = unique_cte_name(&format!("{table}_rows"), input_with);
        let alias = update
            .alias
            .as_ref()
            .map(|a| a.name.name.to_string())
            .unwrap_or_else(|| table.to_string());

        // UPDATE ... FROM brings a second relation into scope
        let secondary = match &update.from_clause {
            Some(from) => Some(secondary_source(&from.source, input_with, options)?),
            None => None,
        };

        let where_condition = update.where_clause.as_ref().map(|w| w.condition.clone());
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

        // One item per fixture column, SET columns wrapped in CASE
        let items = fixture
            .columns
            .iter()
            .map(|column| {
                let projected = match find_assignment(&update.assignments, &column.name) {
                    Some(assignment) => applied(assignment, &column.name, condition.clone()),
                    None => ident_value(&column.name),
                };
                item(projected, Some(&column.name))
            })
            .collect();

        let updated = select_from(items, base_source(&rows_name, Some(&alias)), None);

        let mut synthesized = vec![cte(
            &rows_name,
            Some(fixture.column_names()),
            fixture_rows_query(fixture),
        )];
        if let Some((Some(source_cte), _, _)) = &secondary {
            synthesized.push(source_cte.clone());
        }
        synthesized.push(cte(&table, None, updated));
        let with = compose_with(input_with, synthesized);

        let projection = returning_items(returning, fixture);
        let mut result = select_from(projection, base_source(&table, None), None);
        if let SelectQuery::Simple(select) = &mut result {
            select.with_clause = Some(with);
        }
        Ok(Statement::Select(result))
    }
}

fn find_assignment<'a>(
    assignments: &'a [SetAssignment],
    column: &str,
) -> Option<&'a SetAssignment> {
    assignments
        .iter()
        .find(|a| a.column.name().name.eq_ignore_ascii_case(column))
}

/// The new column value, gated on the guard condition when one exists
fn applied(assignment: &SetAssignment, column: &str, condition: Option<Value>) -> Value {
    match condition {
        None => assignment.value.clone(),
        Some(condition) => Value::new(
            ValueKind::Case(Box::new(CaseExpr {
                operand: None,
                branches: vec![CaseBranch {
                    condition,
                    result: assignment.value.clone(),
                    comments: NodeComments::new(),
                }],
                else_value: Some(ident_value(column)),
            })),
            Position::default(),
        ),
    }
}
