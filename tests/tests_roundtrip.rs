//! Round-trip properties: parse → format stability, comment preservation,
//! literal fidelity, parameter stability

use rstest::rstest;

use squill::editor::CommentEditor;
use squill::format::{format, FormatOptions};
use squill::parser::parse;

fn fmt(sql: &str, options: &FormatOptions) -> String {
    format(&parse(sql).expect("parses"), options)
        .expect("formats")
        .formatted_sql
}

/// Formatting is a fixpoint: rendering the reparsed output changes nothing.
#[rstest]
#[case("select 1")]
#[case("select a, b as c, t.*, count(*) from t")]
#[case("select \"Mixed Case\", plain from t")]
#[case("select -1, +2, ~3, not x from t")]
#[case("select x from t where a <> b and c between 1 and 10 or d not ilike 'x%' escape '!'")]
#[case("select x from t where y is not null and z is distinct from 4")]
#[case("select x::int, cast(y as double precision), arr[1] from t")]
#[case("select (a + b) * c, (1, 2) from t")]
#[case("select sum(v) filter (where ok) over (partition by g order by d desc nulls first) from t")]
#[case("select percentile_cont(0.5) within group (order by v) from t")]
#[case("select rank() over (order by s rows between unbounded preceding and current row) from t")]
#[case("select case when a then 1 when b then 2 else 3 end from t")]
#[case("select * from a join b on a.id = b.id left join c using (id) cross join d")]
#[case("select * from (select 1) s, lateral (select 2) l")]
#[case("with a as (select 1), b as (select * from a) select * from b")]
#[case("with recursive r as (select 1 union all select n + 1 from r) select * from r limit 10")]
#[case("with m as materialized (select 1) select * from m")]
#[case("select 1 union select 2 intersect select 3 except select 4")]
#[case("values (1, 'a'), (2, 'b')")]
#[case("select distinct on (k) k, v from t order by k, v desc for update")]
#[case("select x from t group by x having count(*) > 1 window w as (partition by x) limit 1 offset 2")]
#[case("insert into t (a, b) values (1, 2), (3, 4) returning *")]
#[case("insert into t select * from u returning id, id + 1 as next")]
#[case("update t set a = 1, b = b + 1 from u where t.id = u.id returning a")]
#[case("delete from t using u where t.id = u.id returning *")]
#[case("merge into t using u on t.id = u.id when matched and u.x > 0 then update set v = u.v when not matched then insert (id, v) values (u.id, u.v)")]
#[case("create table t (id int primary key, v text not null default 'x', check (id > 0))")]
#[case("create unique index i on t using btree (a desc nulls last, b)")]
#[case("alter table t add column c timestamp with time zone")]
#[case("select /*+ index(t pk) */ x from t")]
fn format_is_a_fixpoint(#[case] sql: &str) {
    let options = FormatOptions::default();
    let first = fmt(sql, &options);
    let second = fmt(&first, &options);
    assert_eq!(first, second, "input: {sql}");
}

/// The fixpoint holds under non-default styles too.
#[rstest]
#[case("select a, b from t where x = 1 and y = 2")]
#[case("insert into t (a, b) values (1, 2), (3, 4)")]
fn fixpoint_holds_under_break_styles(#[case] sql: &str) {
    let options = FormatOptions {
        comma_break: squill::format::CommaBreak::Before,
        values_comma_break: squill::format::CommaBreak::Before,
        and_break: squill::format::AndBreak::Before,
        keyword_case: squill::format::KeywordCase::Upper,
        identifier_escape: squill::format::IdentifierEscape::None,
        ..FormatOptions::default()
    };
    let first = fmt(sql, &options);
    let second = fmt(&first, &options);
    assert_eq!(first, second, "input: {sql}");
}

/// With comment export on, every comment that survives parse is rendered
/// exactly once: counts match between the input tree and the reparsed
/// output tree.
#[rstest]
#[case("/* head */ select 1", 1)]
#[case("select 1 -- tail", 1)]
#[case("select a, /* mid */ b from t", 1)]
#[case("/* one */ select /* two */ 1 -- three\nfrom t /* four */", 4)]
#[case("with a as (select 1) /* body */ select * from a", 1)]
#[case("insert into t (a) -- cols\nvalues (1)", 1)]
fn comments_survive_round_trip(#[case] sql: &str, #[case] expected: usize) {
    let options = FormatOptions {
        export_comment: true,
        ..FormatOptions::default()
    };
    let statement = parse(sql).unwrap();
    assert_eq!(
        CommentEditor::count_comments(&statement),
        expected,
        "input count for {sql}"
    );

    let rendered = format(&statement, &options).unwrap().formatted_sql;
    let reparsed = parse(&rendered).unwrap_or_else(|e| panic!("{rendered}: {e}"));
    assert_eq!(
        CommentEditor::count_comments(&reparsed),
        expected,
        "output count for {rendered}"
    );
}

/// String literals never collapse into bare keywords, in either direction.
#[rstest]
#[case("'null'", "null")]
#[case("'true'", "true")]
#[case("'false'", "false")]
fn quoted_keyword_literals_stay_strings(#[case] quoted: &str, #[case] bare: &str) {
    let sql = format!("select {quoted}, {bare} from t");
    let out = fmt(&sql, &FormatOptions::default());
    assert_eq!(out.matches(quoted).count(), 1, "got: {out}");
    let bare_count = out.matches(bare).count() - out.matches(quoted).count();
    assert_eq!(bare_count, 1, "got: {out}");
}

/// The parameter set of the output equals the parameter set of the input.
#[test]
fn parameter_sets_are_stable() {
    let statement = parse("select * from t where a = :a and b = @b and c = $1 and d = ?").unwrap();
    let result = format(&statement, &FormatOptions::default()).unwrap();
    let names: Vec<_> = result
        .params
        .iter()
        .map(|p| p.name.as_ref().map(|n| n.to_string()))
        .collect();
    assert_eq!(
        names,
        vec![
            Some("a".to_string()),
            Some("b".to_string()),
            None,
            None,
        ]
    );

    // Reformatting the rendered text reproduces the same parameter list
    let reparsed = parse(&result.formatted_sql).unwrap();
    let again = format(&reparsed, &FormatOptions::default()).unwrap();
    assert_eq!(again.params.len(), result.params.len());
}
