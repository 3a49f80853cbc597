//! ucms-migrate - legacy content migration service
//!
//! Imports the legacy static-site content repository (members, articles,
//! projects and their images) into the CMS database and object storage.
//! Operations are started over HTTP and observed through an SSE stream.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use ucms_common::config::locate_config_file;
use ucms_migrate::config::{CliOverrides, ServiceSettings, CONFIG_FILE_NAME, ENV_CONFIG};
use ucms_migrate::services::{
    ContentImageUploader, GitCloner, HttpObjectStorage, MigrationActor, MigrationOrchestrator,
    OrchestratorSettings, WebpCompressor,
};
use ucms_migrate::{build_router, AppState};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "ucms-migrate")]
#[command(about = "Legacy content migration service", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Path to SQLite database (overrides config and data folder)
    #[arg(short, long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let cli = CliOverrides {
        bind: args.bind,
        database: args.database,
    };
    let config_path = locate_config_file(args.config.as_deref(), ENV_CONFIG, CONFIG_FILE_NAME);
    let settings = ServiceSettings::load(config_path.as_deref(), &cli)?;

    // RUST_LOG wins over the configured level
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(
        "Starting ucms-migrate v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }
    info!("Database: {}", settings.database_path.display());
    info!("Source repository: {}", settings.source_repo_url);

    let pool = match ucms_migrate::db::init_database_pool(&settings.database_path).await {
        Ok(pool) => {
            info!("✓ Database connection established");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e);
        }
    };

    let storage = HttpObjectStorage::new(
        &settings.storage.endpoint,
        &settings.storage.bucket,
        &settings.storage.public_url,
        settings.storage.access_token.clone(),
    )
    .context("Failed to create object storage client")?;
    info!("Object storage: {}", storage_label(&settings));

    let uploader = ContentImageUploader::new(
        Arc::new(storage),
        Arc::new(WebpCompressor::new(settings.max_dimension)),
    );

    let orchestrator = MigrationOrchestrator::new(
        pool.clone(),
        MigrationActor::new(),
        Arc::new(GitCloner),
        uploader,
        OrchestratorSettings {
            source_repo_url: settings.source_repo_url.clone(),
            temp_root: settings.temp_root.clone(),
        },
    );

    if !settings.storage.is_configured() {
        warn!("Object storage endpoint not configured; image uploads and cleanup will fail");
    }
    if settings.admin_token.is_none() {
        warn!("No admin token configured; /admin endpoints are unauthenticated");
    } else {
        info!("✓ Admin token loaded");
    }

    let state = AppState::new(pool, orchestrator, settings.admin_token.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&settings.bind)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind))?;
    info!("ucms-migrate listening on http://{}", settings.bind);
    info!("Health check: http://{}/health", settings.bind);

    axum::serve(listener, app).await?;

    Ok(())
}

fn storage_label(settings: &ServiceSettings) -> String {
    if settings.storage.public_url.is_empty() {
        "(not configured)".to_string()
    } else {
        settings.storage.public_url.clone()
    }
}
