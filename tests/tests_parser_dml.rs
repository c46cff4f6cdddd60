//! DML and DDL grammar coverage, plus the statement splitter

use rstest::rstest;

use squill::ast::{
    AlterAction, ColumnConstraint, InsertSource, MergeMatchedAction, MergeWhenClause,
    ReturningItems, Statement, TableConstraint,
};
use squill::parser::{
    parse, parse_create_index, parse_create_table, parse_delete, parse_insert, parse_merge,
    parse_update, split_statements,
};

#[rstest]
#[case("insert into t values (1, 2)")]
#[case("insert into t (a, b) values (1, 2), (3, 4) returning *")]
#[case("insert into t select * from u")]
#[case("insert into t default values")]
#[case("with src as (select 1) insert into t select * from src")]
#[case("update t set a = 1, b = b + 1 where id = 3 returning a")]
#[case("update t x set a = 1 from u where x.id = u.id")]
#[case("delete from t where id = 1 returning *")]
#[case("delete from t using u where t.id = u.id")]
#[case("merge into t using u on t.id = u.id when matched then delete")]
#[case("create table t (id int primary key, name text not null default 'x')")]
#[case("create table if not exists s.t (id bigint, unique (id))")]
#[case("create unique index idx on t using btree (a desc nulls last)")]
#[case("alter table t add column c text")]
#[case("alter table t alter column c set default 0")]
fn accepted_statements(#[case] sql: &str) {
    parse(sql).unwrap_or_else(|e| panic!("{sql}: {e}"));
}

#[test]
fn insert_records_columns_and_rows() {
    let Statement::Insert(insert) = parse_insert("insert into t (a, b) values (1, 2)").unwrap()
    else {
        panic!("expected insert");
    };
    let columns = insert.columns.as_ref().unwrap();
    assert_eq!(columns.columns.len(), 2);
    let InsertSource::Values(values) = &insert.source else {
        panic!("expected values source");
    };
    assert_eq!(values.rows.len(), 1);
    assert_eq!(values.rows[0].values.len(), 2);
}

#[test]
fn returning_star_and_items_are_distinct() {
    let Statement::Insert(star) = parse_insert("insert into t values (1) returning *").unwrap()
    else {
        panic!("expected insert");
    };
    assert!(matches!(
        star.returning.as_ref().unwrap().items,
        ReturningItems::Star
    ));

    let Statement::Insert(items) =
        parse_insert("insert into t values (1) returning id, id + 1 as next").unwrap()
    else {
        panic!("expected insert");
    };
    let ReturningItems::Items(items) = &items.returning.as_ref().unwrap().items else {
        panic!("expected item list");
    };
    assert_eq!(items.len(), 2);
    assert_eq!(items[1].alias.as_ref().unwrap().name, "next");
}

#[test]
fn update_keeps_assignment_order() {
    let Statement::Update(update) =
        parse_update("update t set b = 2, a = 1 where id = 9").unwrap()
    else {
        panic!("expected update");
    };
    assert_eq!(update.assignments[0].column.name().name, "b");
    assert_eq!(update.assignments[1].column.name().name, "a");
    assert!(update.where_clause.is_some());
}

#[test]
fn delete_using_parses_sources() {
    let Statement::Delete(delete) =
        parse_delete("delete from t using u, v where t.id = u.id").unwrap()
    else {
        panic!("expected delete");
    };
    assert_eq!(delete.using.len(), 1);
}

#[test]
fn merge_collects_both_clause_kinds() {
    let sql = "merge into t using u on t.id = u.id \
               when matched and u.amount > 0 then update set v = u.v \
               when not matched then insert (id, v) values (u.id, u.v)";
    let Statement::Merge(merge) = parse_merge(sql).unwrap() else {
        panic!("expected merge");
    };
    assert_eq!(merge.clauses.len(), 2);
    match &merge.clauses[0] {
        MergeWhenClause::Matched { condition, action } => {
            assert!(condition.is_some());
            assert!(matches!(action, MergeMatchedAction::Update(a) if a.len() == 1));
        }
        other => panic!("expected matched clause, got {other:?}"),
    }
    match &merge.clauses[1] {
        MergeWhenClause::NotMatched { action, .. } => {
            assert_eq!(action.columns.as_ref().unwrap().len(), 2);
            assert_eq!(action.values.len(), 2);
        }
        other => panic!("expected not-matched clause, got {other:?}"),
    }
}

#[test]
fn merge_requires_a_when_clause() {
    assert!(parse_merge("merge into t using u on t.id = u.id").is_err());
}

#[test]
fn with_prefixed_dml_dispatches() {
    let statement = parse("with src as (select 1) insert into t select * from src").unwrap();
    let Statement::Insert(insert) = statement else {
        panic!("expected insert, got another statement");
    };
    assert!(insert.with_clause.is_some());

    let statement = parse("with x as (select 1) update t set a = 1").unwrap();
    assert!(matches!(statement, Statement::Update(_)));

    let statement = parse("with x as (select 1) select * from x").unwrap();
    assert!(matches!(statement, Statement::Select(_)));
}

// =============================================================================
// DDL shapes
// =============================================================================

#[test]
fn create_table_splits_columns_and_constraints() {
    let sql = "create table t (id int primary key, email text unique, \
               constraint t_check check (id > 0), foreign key (id) references u (id))";
    let Statement::CreateTable(create) = parse_create_table(sql).unwrap() else {
        panic!("expected create table");
    };
    assert_eq!(create.columns.len(), 2);
    assert_eq!(create.constraints.len(), 2);
    assert!(create.columns[0]
        .constraints
        .contains(&ColumnConstraint::PrimaryKey));
    assert!(matches!(
        create.constraints[0],
        TableConstraint::Check { .. }
    ));
    assert!(matches!(
        create.constraints[1],
        TableConstraint::ForeignKey { .. }
    ));
}

#[test]
fn column_defaults_are_recorded() {
    let Statement::CreateTable(create) =
        parse_create_table("create table t (ts timestamp default now(), n int not null)").unwrap()
    else {
        panic!("expected create table");
    };
    assert!(create.columns[0].default_value().is_some());
    assert!(create.columns[1].not_null());
}

#[test]
fn create_index_records_method_and_direction() {
    let Statement::CreateIndex(index) =
        parse_create_index("create unique index i on t using btree (a desc)").unwrap()
    else {
        panic!("expected create index");
    };
    assert!(index.unique);
    assert_eq!(index.method.as_ref().unwrap().name, "btree");
    assert_eq!(index.columns.len(), 1);
}

#[test]
fn alter_actions_parse() {
    let Statement::Alter(alter) = parse("alter table t rename column a to b").unwrap() else {
        panic!("expected alter");
    };
    assert!(matches!(alter.action, AlterAction::RenameColumn { .. }));

    let Statement::Alter(alter) =
        parse("alter table t add constraint c unique (a)").unwrap()
    else {
        panic!("expected alter");
    };
    assert!(matches!(alter.action, AlterAction::AddConstraint(_)));
}

// =============================================================================
// Statement splitting
// =============================================================================

#[test]
fn splitter_honors_quoting_state() {
    let result = split_statements(
        "select 'a;b'; select \"c;d\" from t; -- x;y\nselect 1 /* z;w */; select $$p;q$$",
    );
    assert_eq!(result.queries.len(), 4);
    assert!(result.queries.iter().all(|q| !q.is_empty));
}

#[test]
fn splitter_marks_empty_segments() {
    let result = split_statements("select 1; ;select 2");
    assert_eq!(result.queries.len(), 3);
    assert!(result.queries[1].is_empty);
}
