use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use eavql::config::{Settings, SettingsError};
use eavql::metadata::RelationshipCatalog;
use eavql::store::Database;
use eavql::web::{router, AppState};
use eavql::Error;
use serde_json::{json, Value};
use tower::ServiceExt;

fn seeded() -> (Database, RelationshipCatalog) {
    let db = Database::open_in_memory().unwrap();
    db.create_entity_table("user_data").unwrap();
    db.create_entity_table("loan_data").unwrap();
    db.insert_entity("user_data", 1, &[("user_id", "U-1"), ("first_name", "Alice")])
        .unwrap();
    db.insert_entity("user_data", 2, &[("user_id", "U-2"), ("first_name", "Bob")])
        .unwrap();
    db.insert_entity(
        "loan_data",
        10,
        &[("user_id", "U-1"), ("loan_amount", "5000"), ("status", "approved")],
    )
    .unwrap();

    let catalog = RelationshipCatalog::from_toml_str(
        r#"
        [user_data]
        relationships = [{ to = "loan_data", via = "user_id" }]
        "#,
    )
    .unwrap();

    (db, catalog)
}

fn app() -> Router {
    let (db, catalog) = seeded();
    let state = AppState::new(db, catalog, &Settings::default()).unwrap();
    router(Arc::new(state))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn approved_loans() -> Value {
    json!({
        "baseEntity": "user_data",
        "columns": ["first_name", "loan_data.loan_amount"],
        "filters": [{ "key": "loan_data.status", "op": "=", "value": "approved" }],
        "joins": [{ "rightEntity": "loan_data", "on": "user_id=user_id" }]
    })
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_meta_lists_entities() {
    let app = app();
    let (status, body) = send(&app, get("/reports/meta")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "entities": ["loan_data", "user_data"] }));

    let (_, blank) = send(&app, get("/reports/meta?entity=%20")).await;
    assert_eq!(blank, body);
}

#[tokio::test]
async fn test_meta_for_entity() {
    let (status, body) = send(&app(), get("/reports/meta?entity=User_Data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "entity": "user_data",
            "availableKeys": ["first_name", "user_id"],
            "relationships": [{ "to": "loan_data", "via": "user_id" }]
        })
    );
}

#[tokio::test]
async fn test_meta_rejects_invalid_entity() {
    let (status, body) = send(&app(), get("/reports/meta?entity=user-data")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Bad Request");
    assert_eq!(body["message"], "Invalid entity name: user-data");
}

#[tokio::test]
async fn test_run_report() {
    let (status, body) = send(&app(), post_json("/reports/run", approved_loans())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["columns"],
        json!(["entity_id", "first_name", "loan_data.loan_amount"])
    );
    assert_eq!(
        body["rows"][0],
        json!({ "entity_id": 1, "first_name": "Alice", "loan_data.loan_amount": "5000" })
    );
    assert_eq!(body["rows"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_run_pages() {
    let app = app();
    let request = json!({ "baseEntity": "user_data", "columns": ["first_name"] });

    let (_, first) = send(&app, post_json("/reports/run?page=0&size=1", request.clone())).await;
    let (_, second) = send(&app, post_json("/reports/run?page=1&size=1", request.clone())).await;
    assert_eq!(first["rows"][0]["first_name"], "Alice");
    assert_eq!(second["rows"][0]["first_name"], "Bob");

    let (status, body) = send(&app, post_json("/reports/run?page=-1&size=1", request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid pagination: page=-1, size=1");
}

#[tokio::test]
async fn test_run_rejects_bad_requests() {
    let app = app();

    let (status, body) = send(
        &app,
        post_json(
            "/reports/run",
            json!({ "baseEntity": "user_data", "filters": [{ "key": "first_name", "op": "in", "value": "x" }] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Operator not allowed: in");

    let (status, _) = send(&app, post_json("/reports/run", json!({ "columns": ["x"] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, post_json("/reports/run?page=abc", approved_loans())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_templates() {
    let app = app();

    let save = Request::builder()
        .method("POST")
        .uri("/reports/templates")
        .header(header::CONTENT_TYPE, "application/json")
        .header("X-USER-ID", "alice")
        .body(Body::from(
            json!({ "name": " Approved loans ", "request": approved_loans() }).to_string(),
        ))
        .unwrap();
    let (status, saved) = send(&app, save).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["name"], "Approved loans");
    assert_eq!(saved["createdBy"], "alice");
    assert_eq!(saved["request"], approved_loans());

    let (status, _) = send(
        &app,
        post_json(
            "/reports/templates",
            json!({ "name": "Everyone", "request": { "baseEntity": "user_data" } }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, get("/reports/templates")).await;
    assert_eq!(status, StatusCode::OK);
    let templates = body["templates"].as_array().unwrap();
    assert_eq!(templates.len(), 2);
    assert_eq!(templates[0]["name"], "Everyone");
    assert_eq!(templates[0]["createdBy"], "system");
    assert_eq!(templates[1]["id"], saved["id"]);
}

#[tokio::test]
async fn test_template_keeps_empty_lists() {
    let app = app();
    let request = json!({
        "baseEntity": "user_data",
        "columns": ["first_name"],
        "filters": [],
        "joins": []
    });

    let (status, saved) = send(
        &app,
        post_json(
            "/reports/templates",
            json!({ "name": "Names", "request": request.clone() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["request"], request);

    let (_, body) = send(&app, get("/reports/templates")).await;
    assert_eq!(body["templates"][0]["request"], request);
}

#[test]
fn test_server_requires_sqlite_dialect() {
    for dialect in ["oracle", "tsql", "postgres"] {
        let (db, catalog) = seeded();
        let mut settings = Settings::default();
        settings.database.dialect = dialect.into();

        let err = AppState::new(db, catalog, &settings).err().unwrap();
        assert!(
            matches!(err, Error::Settings(SettingsError::InvalidConfig(_))),
            "dialect={}",
            dialect
        );
    }

    let (db, catalog) = seeded();
    let mut settings = Settings::default();
    settings.database.dialect = "SQLite".into();
    assert!(AppState::new(db, catalog, &settings).is_ok());
}

#[tokio::test]
async fn test_template_requires_name() {
    let (status, body) = send(
        &app(),
        post_json(
            "/reports/templates",
            json!({ "name": "  ", "request": approved_loans() }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Template name is required");
}
