//! Report API handlers.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::server::AppState;
use crate::metadata::EntityMetadata;
use crate::report::{ReportPage, ReportRequest};
use crate::template::StoredTemplate;

/// Run `f` on the blocking pool; every database call goes through here.
async fn blocking<T, F>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> crate::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f).await?;
    Ok(result?)
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct MetaParams {
    entity: Option<String>,
}

#[derive(Debug, Serialize)]
struct EntityList {
    entities: Vec<String>,
}

/// GET /reports/meta - Entity list, or one entity's keys and relationships
pub async fn meta(
    State(state): State<Arc<AppState>>,
    params: Result<Query<MetaParams>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Query(params) = params?;

    match params.entity.filter(|e| !e.trim().is_empty()) {
        None => {
            let entities =
                blocking(move || Ok(state.metadata.list_entities())).await?;
            Ok(Json(EntityList { entities }).into_response())
        }
        Some(entity) => {
            let metadata: EntityMetadata =
                blocking(move || Ok(state.metadata.metadata(&entity)?)).await?;
            Ok(Json(metadata).into_response())
        }
    }
}

// ============================================================================
// Execution
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RunParams {
    page: Option<i64>,
    size: Option<i64>,
}

/// POST /reports/run - Compile and execute one page of a report
pub async fn run(
    State(state): State<Arc<AppState>>,
    params: Result<Query<RunParams>, QueryRejection>,
    body: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<Json<ReportPage>, ApiError> {
    let Query(params) = params?;
    let Json(request) = body?;

    let page = params.page.unwrap_or(0);
    let size = params.size.unwrap_or(state.default_page_size);

    let report = state.compiler.compile(&request).map_err(crate::Error::from)?;
    let page = blocking(move || state.executor.run(&report, page, size)).await?;
    Ok(Json(page))
}

// ============================================================================
// Templates
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SaveTemplateRequest {
    #[serde(default)]
    name: String,
    request: ReportRequest,
}

#[derive(Debug, Serialize)]
struct TemplateList {
    templates: Vec<StoredTemplate>,
}

/// POST /reports/templates - Save a named report definition
pub async fn save_template(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<SaveTemplateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<StoredTemplate>), ApiError> {
    let Json(body) = body?;
    let user = headers
        .get(&state.user_header)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let saved = blocking(move || {
        Ok(state
            .templates
            .save(&body.name, &body.request, user.as_deref())?)
    })
    .await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// GET /reports/templates - All templates, newest first
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
) -> Result<Response, ApiError> {
    let templates = blocking(move || Ok(state.templates.list()?)).await?;
    Ok(Json(TemplateList { templates }).into_response())
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
