//! Result-set converter scenarios over shared fixtures

use once_cell::sync::Lazy;

use squill::convert::{
    convert_statements, ConvertError, ConvertOptions, DeleteResultSelectConverter, FixtureColumn,
    FixtureTable, FixtureValue, InsertResultSelectConverter, MissingFixtureStrategy,
    UpdateResultSelectConverter,
};
use squill::format::{format, FormatOptions};
use squill::parser::parse;

static FIXTURES: Lazy<Vec<FixtureTable>> = Lazy::new(|| {
    vec![FixtureTable::new(
        "users",
        vec![
            FixtureColumn::new("id", "int"),
            FixtureColumn::new("name", "text"),
        ],
    )
    .with_rows(vec![vec![
        FixtureValue::Numeric("1".into()),
        FixtureValue::Text("ada".into()),
    ]])]
});

fn options() -> ConvertOptions {
    ConvertOptions::new(FIXTURES.clone())
}

fn rendered(statement: &squill::ast::Statement) -> String {
    format(statement, &FormatOptions::default())
        .unwrap()
        .formatted_sql
}

#[test]
fn converted_insert_parses_and_reads_the_simulated_table() {
    let statement = parse("insert into users (id, name) values (2, 'bo') returning *").unwrap();
    let converted = InsertResultSelectConverter::to_select_query(&statement, &options()).unwrap();
    let sql = rendered(&converted);

    // The derived query is itself valid SQL
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
    assert!(sql.contains("union all"), "got: {sql}");
    assert!(sql.ends_with("from \"users\""), "got: {sql}");
}

#[test]
fn converted_update_reparses() {
    let statement =
        parse("update users set name = 'grace' where id = 1 returning id, name").unwrap();
    let converted = UpdateResultSelectConverter::to_select_query(&statement, &options()).unwrap();
    let sql = rendered(&converted);
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
    assert!(sql.contains("case when \"id\" = 1 then 'grace' else \"name\" end"), "got: {sql}");
}

#[test]
fn converted_delete_reparses() {
    let statement = parse("delete from users where id = 1 returning name").unwrap();
    let converted = DeleteResultSelectConverter::to_select_query(&statement, &options()).unwrap();
    let sql = rendered(&converted);
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
}

#[test]
fn caller_with_clauses_survive_every_converter() {
    // The statement's own CTEs must land in the derived WITH, ahead of the
    // simulation CTEs, so the cloned source queries still resolve
    let statement =
        parse("with src as (select 2, 'bo') insert into users select * from src returning *")
            .unwrap();
    let converted = InsertResultSelectConverter::to_select_query(&statement, &options()).unwrap();
    let sql = rendered(&converted);
    assert!(sql.starts_with("with \"src\" as (select 2, 'bo'),"), "got: {sql}");
    assert!(sql.contains("select * from \"src\""), "got: {sql}");
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));

    let statement = parse(
        "with adj as (select 1 as id) update users set name = 'x' \
         where id in (select id from adj) returning *",
    )
    .unwrap();
    let converted = UpdateResultSelectConverter::to_select_query(&statement, &options()).unwrap();
    let sql = rendered(&converted);
    assert!(sql.starts_with("with \"adj\" as (select 1 as \"id\"),"), "got: {sql}");
    assert!(sql.contains("in (select \"id\" from \"adj\")"), "got: {sql}");
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));

    let statement = parse(
        "with doomed as (select 1 as id) delete from users using doomed d \
         where users.id = d.id returning *",
    )
    .unwrap();
    let converted = DeleteResultSelectConverter::to_select_query(&statement, &options()).unwrap();
    let sql = rendered(&converted);
    assert!(sql.starts_with("with \"doomed\" as (select 1 as \"id\"),"), "got: {sql}");
    assert!(
        sql.contains("exists (select * from \"doomed\" as \"d\""),
        "got: {sql}"
    );
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
}

#[test]
fn update_from_and_delete_using_relations_are_defined() {
    let mut fixtures = FIXTURES.clone();
    fixtures.push(
        FixtureTable::new(
            "renames",
            vec![
                FixtureColumn::new("id", "int"),
                FixtureColumn::new("name", "text"),
            ],
        )
        .with_rows(vec![vec![
            FixtureValue::Numeric("1".into()),
            FixtureValue::Text("grace".into()),
        ]]),
    );
    let options = ConvertOptions::new(fixtures);

    let statement = parse(
        "update users set name = r.name from renames r \
         where users.id = r.id returning id, name",
    )
    .unwrap();
    let converted = UpdateResultSelectConverter::to_select_query(&statement, &options).unwrap();
    let sql = rendered(&converted);
    assert!(
        sql.contains("\"renames\" (\"id\", \"name\") as (values (1, 'grace'))"),
        "got: {sql}"
    );
    assert!(
        sql.contains("exists (select * from \"renames\" as \"r\""),
        "got: {sql}"
    );
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));

    let statement = parse(
        "delete from users using renames r where users.id = r.id returning *",
    )
    .unwrap();
    let converted = DeleteResultSelectConverter::to_select_query(&statement, &options).unwrap();
    let sql = rendered(&converted);
    assert!(
        sql.contains("where exists (select * from \"renames\" as \"r\""),
        "got: {sql}"
    );
    parse(&sql).unwrap_or_else(|e| panic!("converted SQL reparses: {e}\n{sql}"));
}

#[test]
fn strategy_gates_missing_fixture_behavior() {
    let statement = parse("insert into ghosts values (1) returning *").unwrap();
    let strict = options();
    assert!(matches!(
        InsertResultSelectConverter::to_select_query(&statement, &strict),
        Err(ConvertError::FixtureMissing { .. })
    ));

    let lenient = ConvertOptions {
        fixture_tables: FIXTURES.clone(),
        missing_fixture_strategy: MissingFixtureStrategy::Passthrough,
    };
    let converted = InsertResultSelectConverter::to_select_query(&statement, &lenient).unwrap();
    assert_eq!(converted, statement);
}

#[test]
fn batch_conversion_can_isolate_failures() {
    let statements = vec![
        parse("insert into users values (2, 'bo') returning id").unwrap(),
        parse("insert into ghosts values (1) returning id").unwrap(),
    ];

    let strict = convert_statements(statements.clone(), &options(), false);
    assert!(strict.is_err());

    let isolated = convert_statements(statements, &options(), true).unwrap();
    assert_eq!(isolated.len(), 2);
    // The failing statement passes through annotated with an error comment
    let annotated = format(
        &isolated[1],
        &FormatOptions {
            export_comment: true,
            ..FormatOptions::default()
        },
    )
    .unwrap();
    assert!(
        annotated.formatted_sql.contains("convert error"),
        "got: {}",
        annotated.formatted_sql
    );
}
