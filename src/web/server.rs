//! Axum web server for the report API.

use std::sync::Arc;

use axum::{
    http::HeaderName,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers;
use crate::config::{Settings, SettingsError};
use crate::metadata::{MetadataService, RelationshipCatalog};
use crate::report::{ReportCompiler, ReportExecutor};
use crate::sql::Dialect;
use crate::store::Database;
use crate::template::TemplateService;

/// Application state shared across handlers
pub struct AppState {
    pub compiler: ReportCompiler,
    pub executor: ReportExecutor,
    pub metadata: Arc<MetadataService>,
    pub templates: TemplateService,
    /// Header carrying the requesting user id
    pub user_header: HeaderName,
    /// Page size for run requests that give none
    pub default_page_size: i64,
}

impl AppState {
    /// Wire every service over one database.
    pub fn new(
        db: Database,
        catalog: RelationshipCatalog,
        settings: &Settings,
    ) -> crate::Result<Self> {
        let user_header = HeaderName::try_from(settings.server.user_header.trim())
            .map_err(|e| {
                SettingsError::InvalidConfig(format!(
                    "server.user_header '{}': {}",
                    settings.server.user_header, e
                ))
            })?;

        // Served reports run on the embedded SQLite store
        let dialect = settings.dialect()?;
        if dialect != Dialect::Sqlite {
            return Err(SettingsError::InvalidConfig(format!(
                "database.dialect '{}': the report server executes on sqlite",
                settings.database.dialect
            ))
            .into());
        }

        let metadata =
            MetadataService::new(Arc::new(db.clone()), catalog).with_ttl(settings.cache_ttl());

        Ok(Self {
            compiler: ReportCompiler::new(dialect),
            executor: ReportExecutor::new(db.clone()),
            metadata: Arc::new(metadata),
            templates: TemplateService::new(db),
            user_header,
            default_page_size: settings.default_page_size()?,
        })
    }

    /// Open the configured database and relationship catalog.
    pub fn from_settings(settings: &Settings) -> crate::Result<Self> {
        let db = Database::open(settings.database_path()?)?;
        let catalog = RelationshipCatalog::load(settings.relationships_path()?)?;
        Self::new(db, catalog, settings)
    }
}

/// Build the axum router with all routes
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/reports/meta", get(handlers::meta))
        .route("/reports/run", post(handlers::run))
        .route(
            "/reports/templates",
            get(handlers::list_templates).post(handlers::save_template),
        )
        .route("/health", get(handlers::health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the web server
pub async fn serve(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::from_settings(&settings)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&settings.server.listen_addr).await?;
    tracing::info!(
        addr = %listener.local_addr()?,
        dialect = %settings.database.dialect,
        "report server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("report server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
