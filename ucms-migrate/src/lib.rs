//! ucms-migrate library interface
//!
//! Exposes the state actor, orchestrator and HTTP router for integration
//! testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::{middleware, Router};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use crate::services::{MigrationActor, MigrationOrchestrator};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Content store connection pool
    pub db: SqlitePool,
    /// Starts operations and owns the actor handle
    pub orchestrator: MigrationOrchestrator,
    /// Expected bearer token for `/admin/*`; `None` disables the gate
    pub admin_token: Option<String>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        orchestrator: MigrationOrchestrator,
        admin_token: Option<String>,
    ) -> Self {
        Self {
            db,
            orchestrator,
            admin_token,
            startup_time: Utc::now(),
        }
    }

    pub fn actor(&self) -> &MigrationActor {
        self.orchestrator.actor()
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    // Admin routes (require the admin token)
    let admin = Router::new()
        .nest("/admin", api::migration_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), api::admin_auth));

    // Public routes
    let public = Router::new().merge(api::health_routes());

    Router::new()
        .merge(admin)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
