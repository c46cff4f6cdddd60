//! Formatter coverage: style options, breaks, comments, parameters

use squill::format::{
    format, format_query, AndBreak, CommaBreak, CommentStyleOption, FormatOptions, IdentifierCase,
    IdentifierEscape, KeywordCase, ParameterStyle,
};
use squill::parser::{parse, parse_select};

fn fmt(sql: &str, options: &FormatOptions) -> String {
    let statement = parse(sql).expect("parses");
    format(&statement, options).expect("formats").formatted_sql
}

fn fmt_default(sql: &str) -> String {
    fmt(sql, &FormatOptions::default())
}

#[test]
fn default_output_is_one_line() {
    assert_eq!(
        fmt_default("select a, b\nfrom t\nwhere x = 1"),
        "select \"a\", \"b\" from \"t\" where \"x\" = 1"
    );
}

#[test]
fn string_null_stays_quoted_and_bare_null_stays_bare() {
    let out = fmt_default("select 'null', null from t");
    assert_eq!(out, "select 'null', null from \"t\"");
    assert_eq!(out.matches("'null'").count(), 1);
}

#[test]
fn keyword_case_upper_spares_identifiers() {
    let options = FormatOptions {
        keyword_case: KeywordCase::Upper,
        ..FormatOptions::default()
    };
    assert_eq!(
        fmt("select a from t where a is not null", &options),
        "SELECT \"a\" FROM \"t\" WHERE \"a\" IS NOT NULL"
    );
}

#[test]
fn identifier_escape_styles() {
    let bare = FormatOptions {
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    assert_eq!(fmt("select a from t", &bare), "select a from t");
    // Reserved words and non-plain names still get quoted
    assert_eq!(
        fmt("select \"select\", \"two words\" from t", &bare),
        "select \"select\", \"two words\" from t"
    );

    let backtick = FormatOptions {
        identifier_escape: IdentifierEscape::Backtick,
        ..FormatOptions::default()
    };
    assert_eq!(fmt("select a from t", &backtick), "select `a` from `t`");

    let bracket = FormatOptions {
        identifier_escape: IdentifierEscape::Bracket,
        ..FormatOptions::default()
    };
    assert_eq!(fmt("select a from t", &bracket), "select [a] from [t]");
}

#[test]
fn identifier_case_applies_to_unquoted_names_only() {
    let options = FormatOptions {
        identifier_case: IdentifierCase::Upper,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    assert_eq!(
        fmt("select col, \"Mixed\" from t", &options),
        "select COL, \"Mixed\" from T"
    );
}

#[test]
fn function_names_stay_bare_under_double_quote_escape() {
    assert_eq!(
        fmt_default("select sum(amount) from sales"),
        "select sum(\"amount\") from \"sales\""
    );
}

#[test]
fn within_group_round_trips() {
    let out = fmt_default("select percentile_cont(0.5) within group (order by amount) from sales");
    assert_eq!(
        out,
        "select percentile_cont(0.5) within group (order by \"amount\") from \"sales\""
    );
    let upper = fmt(
        "select percentile_cont(0.5) within group (order by amount) from sales",
        &FormatOptions {
            keyword_case: KeywordCase::Upper,
            ..FormatOptions::default()
        },
    );
    assert!(upper.contains("WITHIN GROUP"), "got: {upper}");
}

#[test]
fn filter_and_over_render_in_order() {
    assert_eq!(
        fmt_default("select sum(amount) filter (where year = 2023) over () from sales"),
        "select sum(\"amount\") filter (where \"year\" = 2023) over () from \"sales\""
    );
}

#[test]
fn comma_break_before_lays_out_lists() {
    let options = FormatOptions {
        comma_break: CommaBreak::Before,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    assert_eq!(
        fmt("select a, b from t", &options),
        "select\n    a\n    , b\nfrom\n    t"
    );
}

#[test]
fn comma_break_after_keeps_separator_with_the_item() {
    let options = FormatOptions {
        comma_break: CommaBreak::After,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    assert_eq!(
        fmt("select a, b from t", &options),
        "select\n    a,\n    b\nfrom\n    t"
    );
}

#[test]
fn and_break_splits_condition_chains() {
    let options = FormatOptions {
        and_break: AndBreak::Before,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    assert_eq!(
        fmt("select * from t where a = 1 and b = 2", &options),
        "select *\nfrom\n    t\nwhere\n    a = 1\n    and b = 2"
    );
}

#[test]
fn insert_round_trip_with_break_options() {
    let options = FormatOptions {
        comma_break: CommaBreak::Before,
        values_comma_break: CommaBreak::Before,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    let out = fmt(
        "insert into table_a (\n    id\n    , value\n)\nvalues\n    (1, 10)\n    , (2, 20)",
        &options,
    );
    assert_eq!(
        out,
        "insert into table_a(\n    id\n    , value\n)\nvalues\n    (1, 10)\n    , (2, 20)"
    );
}

#[test]
fn insert_columns_one_line_collapses_the_list() {
    let options = FormatOptions {
        comma_break: CommaBreak::Before,
        insert_columns_one_line: true,
        identifier_escape: IdentifierEscape::None,
        ..FormatOptions::default()
    };
    let out = fmt("insert into t (a, b) values (1, 2)", &options);
    assert!(out.starts_with("insert into t(a, b)"), "got: {out}");
}

#[test]
fn comments_drop_by_default_and_export_on_request() {
    let sql = "select 1 -- one\nfrom t";
    assert_eq!(fmt_default(sql), "select 1 from \"t\"");

    let options = FormatOptions {
        export_comment: true,
        ..FormatOptions::default()
    };
    assert_eq!(fmt(sql, &options), "select 1 /* one */ from \"t\"");
}

#[test]
fn line_comment_style_forces_a_fresh_line() {
    let options = FormatOptions {
        export_comment: true,
        comment_style: CommentStyleOption::Line,
        ..FormatOptions::default()
    };
    let out = fmt("select 1 /* one */ from t", &options);
    assert_eq!(out, "select 1 -- one\nfrom \"t\"");
}

#[test]
fn multi_line_comment_text_cannot_become_line_style() {
    let options = FormatOptions {
        export_comment: true,
        comment_style: CommentStyleOption::Line,
        ..FormatOptions::default()
    };
    let out = fmt("select 1 /* a\nb */ from t", &options);
    assert!(out.contains("/* a\nb */"), "got: {out}");
}

#[test]
fn hint_text_is_preserved_and_uppercased_only_on_request() {
    let sql = "select /*+ index(t pk) */ a from t";
    let out = fmt_default(sql);
    assert!(out.contains("/*+ index(t pk) */"), "got: {out}");

    let upper = fmt(
        sql,
        &FormatOptions {
            keyword_case: KeywordCase::Upper,
            ..FormatOptions::default()
        },
    );
    assert!(upper.contains("/*+ INDEX(t pk) */"), "got: {upper}");
}

// =============================================================================
// Parameters
// =============================================================================

#[test]
fn named_style_rewrites_markers_to_the_symbol() {
    let statement = parse("select * from t where a = :a and b = @b").unwrap();
    let result = format(&statement, &FormatOptions::default()).unwrap();
    assert!(result.formatted_sql.contains(":a"), "got: {}", result.formatted_sql);
    assert!(result.formatted_sql.contains(":b"), "got: {}", result.formatted_sql);
    assert_eq!(result.params.len(), 2);
    assert_eq!(result.params[0].name.as_deref(), Some("a"));
}

#[test]
fn positional_style_renumbers_with_shared_indices() {
    let options = FormatOptions {
        parameter_style: ParameterStyle::Positional,
        ..FormatOptions::default()
    };
    let statement = parse("select * from t where a = :x and b = :y and c = :x").unwrap();
    let result = format(&statement, &options).unwrap();
    assert!(result.formatted_sql.contains("$1"), "got: {}", result.formatted_sql);
    assert!(result.formatted_sql.contains("$2"), "got: {}", result.formatted_sql);
    assert_eq!(result.formatted_sql.matches("$1").count(), 2);
    assert_eq!(result.params.len(), 2);
}

#[test]
fn anonymous_style_flattens_to_question_marks() {
    let options = FormatOptions {
        parameter_style: ParameterStyle::Anonymous,
        ..FormatOptions::default()
    };
    let statement = parse("select * from t where a = :x and b = $2").unwrap();
    let result = format(&statement, &options).unwrap();
    assert_eq!(result.formatted_sql.matches('?').count(), 2);
}

// =============================================================================
// Contract details
// =============================================================================

#[test]
fn output_never_ends_with_a_newline_or_semicolon() {
    let options = FormatOptions {
        comma_break: CommaBreak::Before,
        ..FormatOptions::default()
    };
    let out = fmt("select a, b from t;", &options);
    assert!(!out.ends_with('\n'));
    assert!(!out.ends_with(';'));
}

#[test]
fn formatting_is_deterministic() {
    let statement = parse("select a, sum(b) over (order by c) from t where d like 'x%'").unwrap();
    let options = FormatOptions {
        comma_break: CommaBreak::After,
        keyword_case: KeywordCase::Upper,
        ..FormatOptions::default()
    };
    let first = format(&statement, &options).unwrap();
    let second = format(&statement, &options).unwrap();
    assert_eq!(first, second);
}

#[test]
fn invalid_free_form_options_are_rejected() {
    let statement = parse("select 1").unwrap();
    let bad_newline = FormatOptions {
        newline: "\r".into(),
        ..FormatOptions::default()
    };
    assert!(format(&statement, &bad_newline).is_err());

    let bad_indent = FormatOptions {
        indent_char: 'x',
        ..FormatOptions::default()
    };
    assert!(format(&statement, &bad_indent).is_err());

    let bad_symbol = FormatOptions {
        parameter_symbol: "".into(),
        ..FormatOptions::default()
    };
    assert!(format(&statement, &bad_symbol).is_err());
}

#[test]
fn added_comments_export_next_to_parsed_ones() {
    use squill::ast::{SelectQuery, Statement};
    use squill::editor::CommentEditor;
    use squill::lexer::CommentPlacement;

    let mut statement = parse("/* note */ with a as (select 1) select * from a").unwrap();
    let Statement::Select(SelectQuery::Simple(select)) = &mut statement else {
        panic!("expected a simple select");
    };
    assert_eq!(
        select.with_clause.as_ref().unwrap().comments.leading.len(),
        1
    );
    CommentEditor::add_comment(select.as_mut(), "X", CommentPlacement::Leading);

    let out = format(
        &statement,
        &FormatOptions {
            export_comment: true,
            ..FormatOptions::default()
        },
    )
    .unwrap()
    .formatted_sql;
    let x = out.find("/* X */").expect("added comment rendered");
    let note = out.find("/* note */").expect("parsed comment rendered");
    assert!(x < note, "root comment precedes the WITH comment: {out}");
    assert_eq!(CommentEditor::count_comments(&statement), 2);
}

#[test]
fn format_query_handles_values_lists() {
    let query = parse_select("values (1, 'a'), (2, 'b')").unwrap();
    let out = format_query(&query, &FormatOptions::default())
        .unwrap()
        .formatted_sql;
    assert_eq!(out, "values (1, 'a'), (2, 'b')");
}
