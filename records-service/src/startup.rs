//! Application startup and lifecycle management.

use crate::config::{RecordsConfig, StoreBackend};
use crate::handlers;
use crate::services::{init_metrics, Database, MemoryStore, RecordStore};
use axum::{
    middleware,
    routing::{get, patch},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::{make_request_span, request_id_middleware};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: RecordsConfig,
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(config: RecordsConfig, store: Arc<dyn RecordStore>) -> Self {
        Self { config, store }
    }
}

/// Build the HTTP router with all record routes and operational endpoints.
pub fn build_router(state: AppState) -> Router {
    let students = Router::new()
        .route(
            "/students",
            get(handlers::students::list_students).post(handlers::students::create_student),
        )
        .route(
            "/students/enriched",
            get(handlers::students::list_students_enriched)
                .patch(handlers::students::reserved_student_id)
                .delete(handlers::students::reserved_student_id),
        )
        .route(
            "/students/:student_id",
            patch(handlers::students::update_student)
                .delete(handlers::students::delete_student),
        )
        .route(
            "/students/:student_id/library-membership",
            get(handlers::library::get_membership)
                .post(handlers::library::create_membership)
                .patch(handlers::library::update_membership)
                .delete(handlers::library::delete_membership),
        );

    let professors = Router::new()
        .route(
            "/professors",
            get(handlers::professors::list_professors)
                .post(handlers::professors::create_professor),
        )
        .route(
            "/professors/:professor_id",
            patch(handlers::professors::update_professor)
                .delete(handlers::professors::delete_professor),
        )
        .route(
            "/professors/:professor_id/proctorships",
            get(handlers::proctorships::list_proctorships)
                .post(handlers::proctorships::assign_proctorship),
        );

    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .merge(students)
        .merge(professors)
        .with_state(state)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(middleware::from_fn(request_id_middleware))
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: RecordsConfig) -> Result<Self, AppError> {
        init_metrics();

        let store: Arc<dyn RecordStore> = match config.store {
            StoreBackend::Postgres => {
                let url = config.database.url.as_deref().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!(
                        "DATABASE_URL is required for the postgres store"
                    ))
                })?;

                let db = Database::new(
                    url,
                    config.database.max_connections,
                    config.database.min_connections,
                )
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, "Failed to connect to PostgreSQL");
                    e
                })?;

                db.run_migrations().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to run migrations");
                    e
                })?;

                Arc::new(db)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; records are lost on restart");
                Arc::new(MemoryStore::new())
            }
        };

        Self::with_store(config, store).await
    }

    /// Build the application around an already constructed store.
    pub async fn with_store(
        config: RecordsConfig,
        store: Arc<dyn RecordStore>,
    ) -> Result<Self, AppError> {
        let addr = config.common.bind_addr();
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!(error = %e, addr = %addr, "Failed to bind HTTP listener");
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!(port, "Records service listening");

        Ok(Self {
            port,
            listener,
            state: AppState::new(config, store),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run until `shutdown` resolves.
    pub async fn run_until(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> std::io::Result<()> {
        let router = build_router(self.state);

        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "HTTP server error");
                e
            })
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.run_until(std::future::pending()).await
    }
}
