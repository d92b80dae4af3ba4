use eavql::report::ReportRequest;
use eavql::store::Database;
use eavql::template::{TemplateError, TemplateService, SYSTEM_USER};
use rusqlite::params;

fn approved_loans() -> ReportRequest {
    ReportRequest::new("user_data")
        .with_join("loan_data", "user_id=user_id")
        .with_columns(&["first_name", "loan_data.loan_amount"])
        .with_filter("loan_data.status", "=", Some("approved"))
        .with_filter("loan_data.loan_amount", "between", Some("1000,9000"))
}

#[test]
fn test_round_trip() {
    let templates = TemplateService::new(Database::open_in_memory().unwrap());
    let request = approved_loans();

    let saved = templates.save("X", &request, Some("alice")).unwrap();
    assert!(saved.id > 0);

    let listed = templates.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].name, "X");
    assert_eq!(listed[0].request, request);
    assert_eq!(listed[0].created_by, "alice");
    assert_eq!(listed[0], saved);
}

#[test]
fn test_list_is_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let templates = TemplateService::new(db.clone());

    let first = templates
        .save("first", &ReportRequest::new("user_data"), None)
        .unwrap();
    let second = templates
        .save("second", &ReportRequest::new("loan_data"), None)
        .unwrap();

    // Force an older timestamp onto the second row
    db.connection()
        .execute(
            "UPDATE report_templates SET created_at = ?1 WHERE id = ?2",
            params!["2020-01-01T00:00:00.000Z", second.id],
        )
        .unwrap();

    let names: Vec<_> = templates
        .list()
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, ["first", "second"]);

    // Equal timestamps fall back to the newer id
    db.connection()
        .execute(
            "UPDATE report_templates SET created_at = ?1",
            params!["2024-06-01T12:00:00.000Z"],
        )
        .unwrap();
    let ids: Vec<_> = templates.list().unwrap().into_iter().map(|t| t.id).collect();
    assert_eq!(ids, [second.id, first.id]);
}

#[test]
fn test_legacy_payload() {
    let db = Database::open_in_memory().unwrap();
    db.connection()
        .execute(
            "INSERT INTO report_templates (name, config_json, created_at) VALUES (?1, ?2, ?3)",
            params![
                "legacy",
                r#"{"baseEntity":"user_data","columns":["first_name"]}"#,
                "2023-03-04T05:06:07Z"
            ],
        )
        .unwrap();

    let templates = TemplateService::new(db).list().unwrap();
    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].created_by, SYSTEM_USER);
    assert_eq!(
        templates[0].request,
        ReportRequest::new("user_data").with_columns(&["first_name"])
    );
    assert_eq!(templates[0].created_at.to_rfc3339(), "2023-03-04T05:06:07+00:00");
}

#[test]
fn test_blank_name_and_author() {
    let templates = TemplateService::new(Database::open_in_memory().unwrap());

    assert!(matches!(
        templates.save("   ", &approved_loans(), Some("alice")),
        Err(TemplateError::BlankName)
    ));
    assert!(templates.list().unwrap().is_empty());

    let saved = templates.save("Nightly", &approved_loans(), None).unwrap();
    assert_eq!(saved.created_by, SYSTEM_USER);
}

#[test]
fn test_corrupt_payload() {
    let db = Database::open_in_memory().unwrap();
    db.connection()
        .execute(
            "INSERT INTO report_templates (name, config_json, created_at) VALUES ('bad', '[1,2', '2023-03-04T05:06:07Z')",
            [],
        )
        .unwrap();

    let err = TemplateService::new(db).list().unwrap_err();
    assert!(matches!(err, TemplateError::InvalidPayload { .. }));
}

#[test]
fn test_serialized_shape() {
    let templates = TemplateService::new(Database::open_in_memory().unwrap());
    let saved = templates
        .save("Loans", &approved_loans(), Some("bob"))
        .unwrap();

    let json = serde_json::to_value(&saved).unwrap();
    assert_eq!(json["name"], "Loans");
    assert_eq!(json["createdBy"], "bob");
    assert_eq!(json["request"]["baseEntity"], "user_data");
    assert_eq!(json["request"]["joins"][0]["rightEntity"], "loan_data");
    assert!(json["createdAt"].is_string());
}
