use eavql::report::{ReportCompiler, ReportError, ReportExecutor, ReportRequest};
use eavql::sql::Dialect;
use eavql::store::Database;
use eavql::Error;
use serde_json::{json, Value};

fn seeded() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.create_entity_table("user_data").unwrap();
    db.create_entity_table("loan_data").unwrap();

    db.insert_entity(
        "user_data",
        1,
        &[("user_id", "U-1"), ("first_name", "Alice"), ("status", "active")],
    )
    .unwrap();
    db.insert_entity(
        "user_data",
        2,
        &[("user_id", "U-2"), ("first_name", "Bob"), ("status", "active")],
    )
    .unwrap();
    db.insert_entity(
        "loan_data",
        10,
        &[("user_id", "U-1"), ("loan_amount", "5000"), ("status", "approved")],
    )
    .unwrap();
    db.insert_entity(
        "loan_data",
        11,
        &[("user_id", "U-2"), ("loan_amount", "100"), ("status", "pending")],
    )
    .unwrap();
    db
}

fn approved_loans() -> ReportRequest {
    ReportRequest::new("user_data")
        .with_join("loan_data", "user_id=user_id")
        .with_columns(&["first_name", "loan_data.loan_amount"])
        .with_filter("loan_data.status", "=", Some("approved"))
}

#[test]
fn test_approved_loans_row() {
    let db = seeded();
    let report = ReportCompiler::new(Dialect::Sqlite)
        .compile(&approved_loans())
        .unwrap();
    let page = ReportExecutor::new(db).run(&report, 0, 50).unwrap();

    assert_eq!(
        page.columns,
        ["entity_id", "first_name", "loan_data.loan_amount"]
    );
    assert_eq!(page.rows.len(), 2);
    assert_eq!(
        Value::Object(page.rows[0].clone()),
        json!({ "entity_id": 1, "first_name": "Alice", "loan_data.loan_amount": "5000" })
    );
    // Bob's only loan is filtered out of the joined side
    assert_eq!(page.rows[1]["first_name"], "Bob");
    assert_eq!(page.rows[1]["loan_data.loan_amount"], Value::Null);
}

#[test]
fn test_rows_keep_column_order() {
    let db = seeded();
    let report = ReportCompiler::new(Dialect::Sqlite)
        .compile(&approved_loans())
        .unwrap();
    let page = ReportExecutor::new(db).run(&report, 0, 1).unwrap();

    let keys: Vec<_> = page.rows[0].keys().cloned().collect();
    assert_eq!(keys, page.columns);
}

#[test]
fn test_base_filter_drops_rows() {
    let db = seeded();
    let request = ReportRequest::new("user_data")
        .with_columns(&["first_name"])
        .with_filter("first_name", "like", Some("A%"));
    let report = ReportCompiler::new(Dialect::Sqlite).compile(&request).unwrap();
    let page = ReportExecutor::new(db).run(&report, 0, 10).unwrap();

    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0]["first_name"], "Alice");
}

#[test]
fn test_missing_attribute_is_null() {
    let db = seeded();
    let request = ReportRequest::new("user_data").with_columns(&["nickname"]);
    let report = ReportCompiler::new(Dialect::Sqlite).compile(&request).unwrap();
    let page = ReportExecutor::new(db).run(&report, 0, 10).unwrap();

    assert_eq!(page.rows.len(), 2);
    assert!(page.rows.iter().all(|row| row["nickname"].is_null()));
}

#[test]
fn test_pages_partition_the_result() {
    let db = Database::open_in_memory().unwrap();
    db.create_entity_table("user_data").unwrap();
    for id in 1..=25i64 {
        let name = format!("user-{:02}", id);
        db.insert_entity("user_data", id, &[("first_name", name.as_str())])
            .unwrap();
    }

    let request = ReportRequest::new("user_data").with_columns(&["first_name"]);
    let report = ReportCompiler::new(Dialect::Sqlite).compile(&request).unwrap();
    let executor = ReportExecutor::new(db);

    let full = executor.run(&report, 0, 100).unwrap().rows;
    assert_eq!(full.len(), 25);

    let mut paged = Vec::new();
    for page in 0..3 {
        let rows = executor.run(&report, page, 10).unwrap().rows;
        assert_eq!(rows.len(), if page < 2 { 10 } else { 5 });
        paged.extend(rows);
    }
    assert_eq!(paged, full);

    let beyond = executor.run(&report, 3, 10).unwrap();
    assert!(beyond.rows.is_empty());
}

#[test]
fn test_invalid_pagination() {
    let db = seeded();
    let report = ReportCompiler::new(Dialect::Sqlite)
        .compile(&approved_loans())
        .unwrap();
    let executor = ReportExecutor::new(db);

    for (page, size) in [(-1, 10), (0, 0), (0, -5)] {
        let err = executor.run(&report, page, size).unwrap_err();
        assert!(
            matches!(err, Error::Report(ReportError::InvalidPagination { .. })),
            "page={} size={}",
            page,
            size
        );
    }
}

#[test]
fn test_missing_table_is_a_storage_error() {
    let db = Database::open_in_memory().unwrap();
    let report = ReportCompiler::new(Dialect::Sqlite)
        .compile(&ReportRequest::new("ghost_data"))
        .unwrap();
    let err = ReportExecutor::new(db).run(&report, 0, 10).unwrap_err();
    assert!(matches!(err, Error::Store(_)));
}
