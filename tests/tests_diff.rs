//! DDL diff scenarios

use squill::diff::{DdlDiffGenerator, DiffError, DiffOptions};

#[test]
fn adding_columns_emits_ordered_alters() {
    let current = "create table users (id int primary key, name text not null)";
    let expected = "create table users (id int primary key, name text not null, \
                    email text unique, created_at timestamp default now())";
    let diff = DdlDiffGenerator::generate_diff(current, expected, &DiffOptions::default()).unwrap();
    assert_eq!(
        diff,
        vec![
            "ALTER TABLE users ADD COLUMN email TEXT",
            "ALTER TABLE users ADD CONSTRAINT users_email_key UNIQUE (email)",
            "ALTER TABLE users ADD COLUMN created_at TIMESTAMP DEFAULT now()",
        ]
    );
}

#[test]
fn full_pipeline_orders_tables_columns_constraints_indexes() {
    let current = "create table a (id int)";
    let expected = "create table a (id int, tag text); \
                    create table b (id int not null); \
                    create index a_tag_idx on a (tag)";
    let diff = DdlDiffGenerator::generate_diff(current, expected, &DiffOptions::default()).unwrap();
    assert_eq!(
        diff,
        vec![
            "CREATE TABLE b (id INT NOT NULL)",
            "ALTER TABLE a ADD COLUMN tag TEXT",
            "CREATE INDEX a_tag_idx ON a (tag)",
        ]
    );
}

#[test]
fn not_null_and_default_changes_alter_in_place() {
    let current = "create table t (x int, y int default 1)";
    let expected = "create table t (x int not null, y int)";
    let diff = DdlDiffGenerator::generate_diff(current, expected, &DiffOptions::default()).unwrap();
    assert_eq!(
        diff,
        vec![
            "ALTER TABLE t ALTER COLUMN x SET NOT NULL",
            "ALTER TABLE t ALTER COLUMN y DROP DEFAULT",
        ]
    );
}

#[test]
fn drops_require_opt_in_and_come_last() {
    let current = "create table old_t (id int); create table t (id int, tmp int)";
    let expected = "create table t (id int, fresh text)";
    let options = DiffOptions {
        drop_columns: true,
        drop_tables: true,
        ..DiffOptions::default()
    };
    let diff = DdlDiffGenerator::generate_diff(current, expected, &options).unwrap();
    assert_eq!(
        diff,
        vec![
            "ALTER TABLE t ADD COLUMN fresh TEXT",
            "ALTER TABLE t DROP COLUMN tmp",
            "DROP TABLE old_t",
        ]
    );
}

#[test]
fn equal_catalogs_produce_no_statements() {
    let ddl = "create table t (id int primary key, v text unique, check (id > 0))";
    let diff = DdlDiffGenerator::generate_diff(ddl, ddl, &DiffOptions::default()).unwrap();
    assert!(diff.is_empty(), "got: {diff:?}");
}

#[test]
fn malformed_catalog_reports_position() {
    let err =
        DdlDiffGenerator::generate_diff("create table t (", "", &DiffOptions::default())
            .unwrap_err();
    let DiffError::CatalogParse { message, .. } = err else {
        panic!("expected a catalog parse error");
    };
    assert!(!message.is_empty());
}
