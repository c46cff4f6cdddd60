//! SELECT grammar coverage: clauses, expressions, precedence decisions

use rstest::rstest;

use squill::ast::{
    BinaryOp, DistinctClause, JoinCondition, JoinKind, LockStrength, SelectQuery, SetOperator,
    SimpleSelect, TableSource, UnaryOp, ValueKind,
};
use squill::parser::{parse, parse_select, ParseErrorKind};

fn simple(sql: &str) -> SimpleSelect {
    match parse_select(sql).expect("parses") {
        SelectQuery::Simple(select) => *select,
        other => panic!("expected a simple select, got {other:?}"),
    }
}

#[rstest]
#[case("select 1")]
#[case("select a, b, c from t")]
#[case("select * from a join b on a.id = b.id left join c using (id)")]
#[case("select distinct on (a) a, b from t order by a, b desc nulls last")]
#[case("select x from t where x between 1 and 10 limit 5 offset 2")]
#[case("select count(*) from t group by x having count(*) > 1")]
#[case("select sum(v) over (partition by g order by d rows between 1 preceding and current row) from t")]
#[case("select * from generate_series(1, 10) g")]
#[case("select * from lateral (select 1) x, t")]
#[case("select a from t window w as (partition by b) for update")]
#[case("select 'x' ilike 'y', 'x' similar to 'y%' escape '!'")]
#[case("select case x when 1 then 'a' else 'b' end from t")]
#[case("select arr[1], (a, b), -x, not y from t")]
#[case("select cast(x as varchar(10)), x::numeric(10, 2) from t")]
#[case("select * from t where exists (select 1 from u) and x in (select y from v)")]
#[case("with a as (select 1) select * from a union all select 2")]
#[case("select t.* from t qualify row_number() over (partition by x) = 1")]
fn accepted_selects(#[case] sql: &str) {
    parse_select(sql).unwrap_or_else(|e| panic!("{sql}: {e}"));
}

#[test]
fn select_items_expose_value_and_alias() {
    let select = simple("select id, name as label from users");
    assert_eq!(select.select_clause.items.len(), 2);
    assert!(matches!(
        select.select_clause.items[0].value.kind,
        ValueKind::Identifier(_)
    ));
    assert!(select.select_clause.items[0].alias.is_none());
    assert_eq!(
        select.select_clause.items[1].alias.as_ref().unwrap().name,
        "label"
    );
}

#[test]
fn with_clause_exposes_the_contract_path() {
    let select = simple("with a as (select 1), b as (select 2) select * from b");
    let with = select.with_clause.as_ref().unwrap();
    assert!(!with.recursive);
    assert_eq!(with.tables.len(), 2);
    assert_eq!(with.tables[0].alias_expression.table.name, "a");
    assert_eq!(with.tables[1].alias_expression.table.name, "b");
    assert_eq!(with.tables[0].name(), "a");
}

#[test]
fn recursive_flag_and_column_list_parse() {
    let select = simple("with recursive r (n) as (select 1) select * from r");
    let with = select.with_clause.as_ref().unwrap();
    assert!(with.recursive);
    let columns = with.tables[0].alias_expression.columns.as_ref().unwrap();
    assert_eq!(columns[0].name, "n");
}

#[test]
fn hints_ride_on_the_select_clause() {
    let select = simple("select /*+ index(t pk) */ x from t");
    assert_eq!(select.select_clause.hints.len(), 1);
    assert!(select.select_clause.hints[0].contains("index(t pk)"));
}

#[test]
fn distinct_on_collects_expressions() {
    let select = simple("select distinct on (a, b) a from t");
    match &select.select_clause.distinct {
        Some(DistinctClause::DistinctOn(values)) => assert_eq!(values.len(), 2),
        other => panic!("expected distinct on, got {other:?}"),
    }
}

#[test]
fn within_group_attaches_to_the_call() {
    let select = simple("select percentile_cont(0.5) within group (order by amount) from sales");
    let ValueKind::Function(call) = &select.select_clause.items[0].value.kind else {
        panic!("expected a function call");
    };
    let within = call.within_group.as_ref().expect("within group present");
    assert_eq!(within.items.len(), 1);
    assert!(call.filter.is_none());
    assert!(call.over.is_none());
}

#[test]
fn filter_and_over_coexist_on_one_call() {
    let select = simple("select sum(amount) filter (where year = 2023) over () from sales");
    let ValueKind::Function(call) = &select.select_clause.items[0].value.kind else {
        panic!("expected a function call");
    };
    assert!(call.filter.is_some());
    assert!(call.over.is_some());
}

#[test]
fn union_chain_is_left_associative() {
    let query = parse_select("select 1 union select 2 union all select 3").unwrap();
    let SelectQuery::Binary(outer) = query else {
        panic!("expected a binary query");
    };
    assert_eq!(outer.op, SetOperator::UnionAll);
    let SelectQuery::Binary(inner) = &outer.left else {
        panic!("expected nested binary");
    };
    assert_eq!(inner.op, SetOperator::Union);
}

#[test]
fn comma_sources_fold_into_cross_joins() {
    let select = simple("select * from a, b");
    let TableSource::Join(join) = &select.from_clause.as_ref().unwrap().source else {
        panic!("expected a join");
    };
    assert_eq!(join.kind, JoinKind::Cross);
    assert!(join.condition.is_none());
}

#[test]
fn natural_join_records_the_condition() {
    let select = simple("select * from a natural join b");
    let TableSource::Join(join) = &select.from_clause.as_ref().unwrap().source else {
        panic!("expected a join");
    };
    assert!(matches!(join.condition, Some(JoinCondition::Natural)));
}

#[test]
fn for_no_key_update_parses() {
    let select = simple("select * from t for no key update");
    assert_eq!(
        select.for_clause.as_ref().unwrap().lock,
        LockStrength::NoKeyUpdate
    );
}

// =============================================================================
// Precedence decisions fixed by test
// =============================================================================

#[test]
fn not_binds_looser_than_comparison() {
    let select = simple("select * from t where not a = b");
    let condition = &select.where_clause.as_ref().unwrap().condition;
    let ValueKind::Unary(unary) = &condition.kind else {
        panic!("expected NOT at the top, got {condition:?}");
    };
    assert_eq!(unary.op, UnaryOp::Not);
    assert!(matches!(
        &unary.operand.kind,
        ValueKind::Binary(b) if b.op == BinaryOp::Eq
    ));
}

#[test]
fn between_chain_parses_as_conjunction() {
    let select = simple("select * from t where x between 1 and 2 and y");
    let condition = &select.where_clause.as_ref().unwrap().condition;
    let ValueKind::Binary(and) = &condition.kind else {
        panic!("expected AND at the top, got {condition:?}");
    };
    assert_eq!(and.op, BinaryOp::And);
    assert!(matches!(and.lhs.kind, ValueKind::Between(_)));
}

#[test]
fn comparison_is_non_associative() {
    let err = parse_select("select * from t where a = b = c").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::InvalidExpression);
}

#[test]
fn not_before_like_negates_the_match() {
    let select = simple("select * from t where name not like 'a%'");
    let condition = &select.where_clause.as_ref().unwrap().condition;
    let ValueKind::PatternMatch(pattern) = &condition.kind else {
        panic!("expected a pattern match, got {condition:?}");
    };
    assert!(pattern.negated);
}

#[test]
fn not_exists_negates_the_construct() {
    let select = simple("select * from t where not exists (select 1)");
    let condition = &select.where_clause.as_ref().unwrap().condition;
    assert!(matches!(
        &condition.kind,
        ValueKind::Exists(exists) if exists.negated
    ));
}

// =============================================================================
// Boundary behaviors
// =============================================================================

#[test]
fn empty_input_is_a_parse_error() {
    let err = parse("").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownStatement);
    let err = parse("   \n  ").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnknownStatement);
}

#[test]
fn case_without_when_is_rejected() {
    assert!(parse_select("select case else 1 end").is_err());
    assert!(parse_select("select case when 1 then 2 end").is_ok());
}

#[test]
fn errors_carry_position_and_expectations() {
    let err = parse_select("select a from").unwrap_err();
    assert_eq!(err.position.line, 1);
    assert!(!err.message.is_empty());
}

#[test]
fn trailing_garbage_is_rejected() {
    let err = parse("select 1 select 2").unwrap_err();
    assert_eq!(err.kind, ParseErrorKind::UnexpectedToken);
}

#[test]
fn string_literal_and_bare_null_stay_distinct() {
    let select = simple("select 'null', null from t");
    assert!(select.select_clause.items[0].value.is_string());
    let literal = select.select_clause.items[1].value.as_literal().unwrap();
    assert!(!literal.is_string());
}
