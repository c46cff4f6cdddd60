//! MERGE → SELECT conversion
//!
//! The simulation splits the target rows by match state against the source:
//! matched rows get per-column CASE projections (or are filtered out for a
//! DELETE action), and not-matched inserts append via UNION ALL.

use super::support::*;
use super::{ConvertError, ConvertOptions, FixtureTable, MissingFixtureStrategy};
use crate::ast::{
    CaseBranch, CaseExpr, MergeInsertAction, MergeMatchedAction, MergeStmt, MergeWhenClause,
    NodeComments, SelectItem, SelectQuery, SetAssignment, SetOperator, Statement, Value,
    ValueKind,
};
use crate::base::Position;

/// Derives the post-merge result set over fixtures
pub struct MergeResultSelectConverter;

impl MergeResultSelectConverter {
    pub fn to_select_query(
        statement: &Statement,
        options: &ConvertOptions,
    ) -> Result<Statement, ConvertError> {
        let Statement::Merge(merge) = statement else {
            return Err(ConvertError::UnsupportedReturning {
                reason: "statement is not a MERGE".to_string(),
            });
        };

        let Some(returning) = &merge.returning else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::UnsupportedReturning {
                    reason: "statement has no RETURNING clause".to_string(),
                }),
            };
        };

        let Some(fixture) = options.fixture_for(&merge.target) else {
            return match options.missing_fixture_strategy {
                MissingFixtureStrategy::Passthrough => Ok(statement.clone()),
                MissingFixtureStrategy::Error => Err(ConvertError::FixtureMissing {
                    table: merge.target.to_string(),
                }),
            };
        };

        let target = merge.target.name().name.clone();
        let input_with = merge.with_clause.as_ref();
        let rows_name = unique_cte_name(&format!("{target}_rows"), input_with);
        let target_alias = merge
            .target_alias
            .as_ref()
            .map(|a| a.name.name.to_string())
            .unwrap_or_else(|| target.to_string());

        let (source_cte, source_name, source_alias) =
            secondary_source(&merge.source, input_with, options)?;
        let (matched, not_matched) = split_clauses(merge)?;

        // matched(row) ⇔ a source row satisfies the ON condition
        let matched_probe = select_from(
            vec![star_item()],
            base_source(&source_name, Some(&source_alias)),
            Some(merge.on.clone()),
        );

        let mut post = match matched {
            Some((condition, MergeMatchedAction::Update(assignments))) => {
                let guard = guard_condition(matched_probe.clone(), condition);
                let items = fixture
                    .columns
                    .iter()
                    .map(|column| {
                        let projected =
                            match find_assignment(assignments, &column.name) {
                                Some(assignment) => case_when(
                                    guard.clone(),
                                    assignment.value.clone(),
                                    ident_value(&column.name),
                                ),
                                None => ident_value(&column.name),
                            };
                        item(projected, Some(&column.name))
                    })
                    .collect();
                select_from(items, base_source(&rows_name, Some(&target_alias)), None)
            }
            Some((condition, MergeMatchedAction::Delete)) => {
                let guard = guard_condition(matched_probe.clone(), condition);
                select_from(
                    vec![star_item()],
                    base_source(&rows_name, Some(&target_alias)),
                    Some(not(guard)),
                )
            }
            None => select_from(
                vec![star_item()],
                base_source(&rows_name, Some(&target_alias)),
                None,
            ),
        };

        if let Some((condition, action)) = not_matched {
            let inserted = inserted_select(
                merge,
                action,
                condition,
                fixture,
                &rows_name,
                &target_alias,
                &source_name,
                &source_alias,
            )?;
            post = SelectQuery::Binary(Box::new(crate::ast::BinarySelect {
                op: SetOperator::UnionAll,
                left: post,
                right: inserted,
                comments: NodeComments::new(),
                position: Position::default(),
            }));
        }

        let mut synthesized = vec![cte(
            &rows_name,
            Some(fixture.column_names()),
            fixture_rows_query(fixture),
        )];
        if let Some(source_cte) = source_cte {
            synthesized.push(source_cte);
        }
        synthesized.push(cte(&target, None, post));
        let with = compose_with(input_with, synthesized);

        let projection = returning_items(returning, fixture);
        let mut result = select_from(projection, base_source(&target, None), None);
        if let SelectQuery::Simple(select) = &mut result {
            select.with_clause = Some(with);
        }
        Ok(Statement::Select(result))
    }
}

type MatchedClause<'a> = (Option<&'a Value>, &'a MergeMatchedAction);
type NotMatchedClause<'a> = (Option<&'a Value>, &'a MergeInsertAction);

/// At most one matched and one not-matched clause are supported
fn split_clauses(
    merge: &MergeStmt,
) -> Result<(Option<MatchedClause<'_>>, Option<NotMatchedClause<'_>>), ConvertError> {
    let mut matched = None;
    let mut not_matched = None;
    for clause in &merge.clauses {
        match clause {
            MergeWhenClause::Matched { condition, action } => {
                if matched.replace((condition.as_ref(), action)).is_some() {
                    return Err(ConvertError::UnsupportedReturning {
                        reason: "multiple WHEN MATCHED clauses".to_string(),
                    });
                }
            }
            MergeWhenClause::NotMatched { condition, action } => {
                if not_matched.replace((condition.as_ref(), action)).is_some() {
                    return Err(ConvertError::UnsupportedReturning {
                        reason: "multiple WHEN NOT MATCHED clauses".to_string(),
                    });
                }
            }
        }
    }
    Ok((matched, not_matched))
}

fn guard_condition(matched_probe: SelectQuery, condition: Option<&Value>) -> Value {
    let matched = exists(matched_probe, false);
    match condition {
        Some(condition) => and(matched, condition.clone()),
        None => matched,
    }
}

fn case_when(guard: Value, then: Value, otherwise: Value) -> Value {
    Value::new(
        ValueKind::Case(Box::new(CaseExpr {
            operand: None,
            branches: vec![CaseBranch {
                condition: guard,
                result: then,
                comments: NodeComments::new(),
            }],
            else_value: Some(otherwise),
        })),
        Position::default(),
    )
}

fn find_assignment<'a>(
    assignments: &'a [SetAssignment],
    column: &str,
) -> Option<&'a SetAssignment> {
    assignments
        .iter()
        .find(|a| a.column.name().name.eq_ignore_ascii_case(column))
}

/// Not-matched source rows projected into the target column order
#[allow(clippy::too_many_arguments)]
fn inserted_select(
    merge: &MergeStmt,
    action: &MergeInsertAction,
    condition: Option<&Value>,
    fixture: &FixtureTable,
    rows_name: &str,
    target_alias: &str,
    source_name: &str,
    source_alias: &str,
) -> Result<SelectQuery, ConvertError> {
    let insert_names: Vec<&str> = match &action.columns {
        Some(columns) => columns.iter().map(|c| c.name.as_str()).collect(),
        None => fixture.columns.iter().map(|c| c.name.as_str()).collect(),
    };
    if insert_names.len() != action.values.len() {
        return Err(ConvertError::UnsupportedReturning {
            reason: format!(
                "MERGE insert has {} values for {} columns",
                action.values.len(),
                insert_names.len()
            ),
        });
    }

    let items: Vec<SelectItem> = fixture
        .columns
        .iter()
        .map(|column| {
            let projected = insert_names
                .iter()
                .position(|n| n.eq_ignore_ascii_case(&column.name))
                .map(|i| action.values[i].clone())
                .unwrap_or_else(null_value);
            item(projected, Some(&column.name))
        })
        .collect();

    // NOT EXISTS over the target: this source row matched nothing
    let probe = select_from(
        vec![star_item()],
        base_source(rows_name, Some(target_alias)),
        Some(merge.on.clone()),
    );
    let mut filter = exists(probe, true);
    if let Some(condition) = condition {
        filter = and(filter, condition.clone());
    }

    Ok(select_from(
        items,
        base_source(source_name, Some(source_alias)),
        Some(filter),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::{FixtureColumn, FixtureValue};
    use crate::format::{format, FormatOptions};
    use crate::parser::parse;

    fn fixtures() -> Vec<FixtureTable> {
        vec![
            FixtureTable::new(
                "inventory",
                vec![
                    FixtureColumn::new("sku", "text"),
                    FixtureColumn::new("qty", "int"),
                ],
            )
            .with_rows(vec![vec![
                FixtureValue::Text("a1".into()),
                FixtureValue::Numeric("5".into()),
            ]]),
            FixtureTable::new(
                "shipments",
                vec![
                    FixtureColumn::new("sku", "text"),
                    FixtureColumn::new("qty", "int"),
                ],
            )
            .with_rows(vec![vec![
                FixtureValue::Text("a1".into()),
                FixtureValue::Numeric("3".into()),
            ]]),
        ]
    }

    #[test]
    fn merge_update_and_insert_simulates_both_paths() {
        let sql = "merge into inventory i using shipments s on i.sku = s.sku \
                   when matched then update set qty = i.qty + s.qty \
                   when not matched then insert (sku, qty) values (s.sku, s.qty) \
                   returning sku, qty";
        let statement = parse(sql).unwrap();
        let options = ConvertOptions::new(fixtures());
        let converted =
            MergeResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let out = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(out.contains("\"inventory_rows\""), "got: {out}");
        assert!(out.contains("case when exists ("), "got: {out}");
        assert!(out.contains("union all"), "got: {out}");
        assert!(out.contains("not exists ("), "got: {out}");
        assert!(out.ends_with("from \"inventory\""), "got: {out}");
    }

    #[test]
    fn merge_delete_filters_matched_rows() {
        let sql = "merge into inventory using shipments s on inventory.sku = s.sku \
                   when matched then delete returning sku";
        let statement = parse(sql).unwrap();
        let options = ConvertOptions::new(fixtures());
        let converted =
            MergeResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let out = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(out.contains("where not exists ("), "got: {out}");
    }

    #[test]
    fn merge_using_a_caller_cte_needs_no_fixture() {
        let sql = "with incoming as (select 'a1' as sku, 3 as qty) \
                   merge into inventory i using incoming s on i.sku = s.sku \
                   when matched then update set qty = i.qty + s.qty \
                   returning sku, qty";
        let statement = parse(sql).unwrap();
        let options = ConvertOptions::new(fixtures());
        let converted =
            MergeResultSelectConverter::to_select_query(&statement, &options).unwrap();
        let out = format(&converted, &FormatOptions::default())
            .unwrap()
            .formatted_sql;
        assert!(
            out.starts_with("with \"incoming\" as (select 'a1' as \"sku\", 3 as \"qty\")"),
            "got: {out}"
        );
        assert!(
            out.contains("exists (select * from \"incoming\" as \"s\""),
            "got: {out}"
        );
        parse(&out).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{out}"));
    }

    #[test]
    fn merge_source_fixture_is_required() {
        let sql = "merge into inventory using ghosts g on inventory.sku = g.sku \
                   when matched then delete returning sku";
        let statement = parse(sql).unwrap();
        let options = ConvertOptions::new(fixtures());
        let err = MergeResultSelectConverter::to_select_query(&statement, &options).unwrap_err();
        assert!(matches!(err, ConvertError::FixtureMissing { .. }));
    }
}
