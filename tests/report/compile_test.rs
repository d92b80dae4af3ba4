use eavql::report::{ParamValue, ReportCompiler, ReportError, ReportRequest};
use eavql::sql::Dialect;
use insta::assert_snapshot;
use sqlparser::dialect::{PostgreSqlDialect, SQLiteDialect};
use sqlparser::parser::Parser;

fn approved_loans() -> ReportRequest {
    ReportRequest::new("user_data")
        .with_join("loan_data", "user_id=user_id")
        .with_columns(&["first_name", "loan_data.loan_amount"])
        .with_filter("loan_data.status", "=", Some("approved"))
}

fn text(value: &str) -> ParamValue {
    ParamValue::Text(value.to_string())
}

#[test]
fn test_approved_loans_oracle() {
    let report = ReportCompiler::new(Dialect::Oracle)
        .compile(&approved_loans())
        .unwrap();

    assert_snapshot!(report.sql, @r"
SELECT
  b.entity_id AS entity_id,
  b.b_c1 AS col0,
  j0.j0_c1 AS col1
FROM (
SELECT
  b_src.entity_id AS entity_id,
  MAX(CASE WHEN b_src.column_key = :p0 THEN b_src.column_value END) AS b_c0,
  MAX(CASE WHEN b_src.column_key = :p1 THEN b_src.column_value END) AS b_c1
FROM user_data b_src
GROUP BY b_src.entity_id
) b
LEFT JOIN (
SELECT
  j0_src.entity_id AS entity_id,
  MAX(CASE WHEN j0_src.column_key = :p2 THEN j0_src.column_value END) AS j0_c0,
  MAX(CASE WHEN j0_src.column_key = :p3 THEN j0_src.column_value END) AS j0_c1,
  MAX(CASE WHEN j0_src.column_key = :p4 THEN j0_src.column_value END) AS j0_c2
FROM loan_data j0_src
GROUP BY j0_src.entity_id
HAVING MAX(CASE WHEN j0_src.column_key = :p4 THEN j0_src.column_value END) = :p5
) j0 ON b.b_c0 = j0.j0_c0
ORDER BY b.entity_id
");
}

#[test]
fn test_approved_loans_parameters_and_columns() {
    let report = ReportCompiler::new(Dialect::Oracle)
        .compile(&approved_loans())
        .unwrap();

    let params: Vec<_> = report
        .parameters
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("p0".to_string(), text("user_id")),
            ("p1".to_string(), text("first_name")),
            ("p2".to_string(), text("user_id")),
            ("p3".to_string(), text("loan_amount")),
            ("p4".to_string(), text("status")),
            ("p5".to_string(), text("approved")),
        ]
    );

    assert_eq!(
        report.display_names(),
        ["entity_id", "first_name", "loan_data.loan_amount"]
    );
    let labels: Vec<_> = report.columns.iter().map(|c| c.label.as_str()).collect();
    assert_eq!(labels, ["entity_id", "col0", "col1"]);
    assert_eq!(report.columns[2].entity_alias, "j0");
    assert_eq!(report.columns[2].entity_name, "loan_data");
}

#[test]
fn test_joins_attach_to_base_in_declared_order() {
    let request = ReportRequest::new("user_data")
        .with_join("loan_data", "user_id=user_id")
        .with_join("card_data", "account_id=card_account_id")
        .with_columns(&["first_name", "card_data.card_type"])
        .with_filter("card_data.card_type", "=", Some("gold"));
    let report = ReportCompiler::new(Dialect::Oracle).compile(&request).unwrap();

    assert_snapshot!(report.sql, @r"
SELECT
  b.entity_id AS entity_id,
  b.b_c2 AS col0,
  j1.j1_c1 AS col1
FROM (
SELECT
  b_src.entity_id AS entity_id,
  MAX(CASE WHEN b_src.column_key = :p0 THEN b_src.column_value END) AS b_c0,
  MAX(CASE WHEN b_src.column_key = :p1 THEN b_src.column_value END) AS b_c1,
  MAX(CASE WHEN b_src.column_key = :p2 THEN b_src.column_value END) AS b_c2
FROM user_data b_src
GROUP BY b_src.entity_id
) b
LEFT JOIN (
SELECT
  j0_src.entity_id AS entity_id,
  MAX(CASE WHEN j0_src.column_key = :p3 THEN j0_src.column_value END) AS j0_c0
FROM loan_data j0_src
GROUP BY j0_src.entity_id
) j0 ON b.b_c0 = j0.j0_c0
LEFT JOIN (
SELECT
  j1_src.entity_id AS entity_id,
  MAX(CASE WHEN j1_src.column_key = :p4 THEN j1_src.column_value END) AS j1_c0,
  MAX(CASE WHEN j1_src.column_key = :p5 THEN j1_src.column_value END) AS j1_c1
FROM card_data j1_src
GROUP BY j1_src.entity_id
HAVING MAX(CASE WHEN j1_src.column_key = :p5 THEN j1_src.column_value END) = :p6
) j1 ON b.b_c1 = j1.j1_c0
ORDER BY b.entity_id
");

    let first = report.sql.find(") j0 ON b.b_c0 = j0.j0_c0").unwrap();
    let second = report.sql.find(") j1 ON b.b_c1 = j1.j1_c0").unwrap();
    assert!(first < second);

    let params: Vec<_> = report
        .parameters
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    assert_eq!(
        params,
        vec![
            ("p0".to_string(), text("user_id")),
            ("p1".to_string(), text("account_id")),
            ("p2".to_string(), text("first_name")),
            ("p3".to_string(), text("user_id")),
            ("p4".to_string(), text("card_account_id")),
            ("p5".to_string(), text("card_type")),
            ("p6".to_string(), text("gold")),
        ]
    );
}

#[test]
fn test_sql_never_contains_values() {
    let request = approved_loans().with_filter("first_name", "like", Some("O'Brien%"));
    let report = ReportCompiler::new(Dialect::Postgres).compile(&request).unwrap();

    assert!(!report.sql.contains("approved"));
    assert!(!report.sql.contains("O'Brien"));
    assert!(report
        .parameters
        .iter()
        .any(|(_, v)| *v == text("O'Brien%")));
}

#[test]
fn test_emitted_sql_parses() {
    let report = ReportCompiler::new(Dialect::Postgres)
        .compile(&approved_loans())
        .unwrap();
    Parser::parse_sql(&PostgreSqlDialect {}, &report.paginated_sql("off", "lim")).unwrap();

    let report = ReportCompiler::new(Dialect::Sqlite)
        .compile(&approved_loans())
        .unwrap();
    Parser::parse_sql(&SQLiteDialect {}, &report.paginated_sql("off", "lim")).unwrap();
}

#[test]
fn test_tsql_quotes_and_fetch() {
    let report = ReportCompiler::new(Dialect::TSql)
        .compile(&approved_loans())
        .unwrap();
    let sql = report.paginated_sql("off", "lim");

    assert!(sql.contains("FROM [user_data] AS [b_src]"));
    assert!(sql.ends_with("OFFSET :off ROWS FETCH NEXT :lim ROWS ONLY"));
}

#[test]
fn test_selection_count_is_identity_plus_distinct_pairs() {
    let request = ReportRequest::new("user_data")
        .with_join("loan_data", "user_id=user_id")
        .with_columns(&[
            "first_name",
            "user_data.first_name",
            "",
            "loan_data.status",
            "status",
            "loan_data.status",
        ]);
    let report = ReportCompiler::default().compile(&request).unwrap();

    // entity_id + first_name + loan_data.status + status
    assert_eq!(report.columns.len(), 4);
    assert_eq!(
        report.display_names(),
        ["entity_id", "first_name", "loan_data.status", "status"]
    );
}

#[test]
fn test_explicit_identity_column_is_not_repeated() {
    let request = ReportRequest::new("user_data").with_columns(&["entity_id", "first_name"]);
    let report = ReportCompiler::default().compile(&request).unwrap();
    assert_eq!(report.display_names(), ["entity_id", "first_name"]);
}

#[test]
fn test_operator_not_allowed() {
    for op in ["in", "!=", "<>", "", "not like"] {
        let request = approved_loans().with_filter("first_name", op, Some("x"));
        assert_eq!(
            ReportCompiler::default().compile(&request),
            Err(ReportError::OperatorNotAllowed(op.to_string())),
            "operator {:?}",
            op
        );
    }
}

#[test]
fn test_operators_are_case_insensitive() {
    let request = ReportRequest::new("user_data")
        .with_filter("first_name", "LIKE", Some("Al%"))
        .with_filter("user_id", " Between ", Some("1,9"));
    assert!(ReportCompiler::default().compile(&request).is_ok());
}

#[test]
fn test_between() {
    let request = ReportRequest::new("loan_data").with_filter("loan_amount", "between", Some("10,20"));
    let report = ReportCompiler::new(Dialect::Sqlite).compile(&request).unwrap();

    // key + two bounds
    assert_eq!(report.parameters.len(), 3);
    assert_eq!(report.parameters.get("p1"), Some(&text("10")));
    assert_eq!(report.parameters.get("p2"), Some(&text("20")));
    assert!(report.sql.contains("HAVING b_c0 BETWEEN :p1 AND :p2"));

    for value in [Some("10"), Some(""), None] {
        let request = ReportRequest::new("loan_data").with_filter("loan_amount", "between", value);
        assert_eq!(
            ReportCompiler::default().compile(&request),
            Err(ReportError::InvalidBetweenValue)
        );
    }
}

#[test]
fn test_duplicate_join() {
    let request = ReportRequest::new("user_data")
        .with_join("loan_data", "user_id=user_id")
        .with_join("loan_data", "user_id=user_id");
    assert_eq!(
        ReportCompiler::default().compile(&request),
        Err(ReportError::DuplicateJoinEntity("loan_data".into()))
    );

    let request = ReportRequest::new("user_data").with_join("user_data", "user_id=user_id");
    assert_eq!(
        ReportCompiler::default().compile(&request),
        Err(ReportError::DuplicateJoinEntity("user_data".into()))
    );
}

#[test]
fn test_invalid_joins() {
    let request = ReportRequest::new("user_data").with_join("loan_data", "user_id");
    assert!(matches!(
        ReportCompiler::default().compile(&request),
        Err(ReportError::InvalidJoinCondition(_))
    ));

    let request = ReportRequest::new("user_data").with_join("  ", "user_id=user_id");
    assert_eq!(
        ReportCompiler::default().compile(&request),
        Err(ReportError::MissingJoinEntity)
    );

    let request = ReportRequest::new("user_data").with_join("loan_data", "user_id=user_data.user_id");
    assert!(matches!(
        ReportCompiler::default().compile(&request),
        Err(ReportError::JoinTargetMismatch { .. })
    ));
}

#[test]
fn test_unknown_entity_reference() {
    let request = ReportRequest::new("user_data").with_columns(&["loan_data.loan_amount"]);
    assert_eq!(
        ReportCompiler::default().compile(&request),
        Err(ReportError::UnknownEntity("loan_data".into()))
    );
}

#[test]
fn test_compile_from_json() {
    let request: ReportRequest = serde_json::from_str(
        r#"{
            "baseEntity": "user_data",
            "columns": ["first_name", "loan_data.loan_amount"],
            "filters": [{ "key": "loan_data.status", "op": "=", "value": "approved" }],
            "joins": [{ "rightEntity": "loan_data", "on": "user_id=user_id" }]
        }"#,
    )
    .unwrap();
    assert_eq!(request, approved_loans());

    let report = ReportCompiler::new(Dialect::Oracle).compile(&request).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["parameters"]["p5"], "approved");
    assert_eq!(json["columns"][1]["displayName"], "first_name");
    assert!(json.get("query").is_none());
}
