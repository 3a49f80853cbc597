//! Migration orchestrator
//!
//! Executes the effect handed back by the migration actor, outside the actor's
//! lock, and reports progress through the actor's `log`/`complete`/`fail`.
//!
//! # Migration run
//! CLONE → MEMBERS → ARTICLES → PROJECTS → IMAGES → cleanup → COMPLETE
//!
//! Workers run strictly in that order: articles and project links resolve
//! member ids created by the members worker. A clone failure fails the run;
//! per-item failures are only counted. Each worker lives in its own module:
//!
//! - `migrate_members`, `migrate_articles`, `migrate_projects`: legacy documents
//! - `migrate_images`: cover/portrait uploads for already-inserted rows
//! - `maintenance`: image URL cleanup and delete-all

use crate::models::{MigrationEffect, MigrationOperation, MigrationResults};
use crate::services::content_images::ContentImageUploader;
use crate::services::frontmatter::{parse_frontmatter, ParsedDocument};
use crate::services::migration_actor::MigrationActor;
use crate::services::repo_cloner::RepoCloner;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

mod maintenance;
mod migrate_articles;
mod migrate_images;
mod migrate_members;
mod migrate_projects;

/// Legacy content directories inside the cloned repository
pub const MEMBERS_DIR: &str = "contents/members";
pub const ARTICLES_DIR: &str = "contents/articles";
pub const PROJECTS_DIR: &str = "contents/projects";

/// Reply to a start request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartOutcome {
    pub started: bool,
    pub message: String,
}

/// Orchestrator settings resolved from configuration
#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    /// Git URL of the legacy content repository
    pub source_repo_url: String,
    /// Parent directory for per-run checkouts
    pub temp_root: PathBuf,
}

/// Result of one legacy document
enum ItemOutcome {
    /// Inserted; carries the text shown after the slug
    Created(Option<String>),
    /// Slug already present
    Skipped,
}

/// Prefix of per-run checkout directories under the temp root
const CHECKOUT_PREFIX: &str = "ucms-migration-";

/// Create a uniquely named checkout directory under `root`
///
/// The directory is removed when the returned handle is closed or dropped.
fn create_checkout_dir(root: &Path) -> Result<TempDir> {
    tempfile::Builder::new()
        .prefix(CHECKOUT_PREFIX)
        .tempdir_in(root)
        .with_context(|| format!("Failed to create temporary directory in {}", root.display()))
}

/// Runs migration, cleanup and delete operations in the background
#[derive(Clone)]
pub struct MigrationOrchestrator {
    db: SqlitePool,
    actor: MigrationActor,
    cloner: Arc<dyn RepoCloner>,
    uploader: ContentImageUploader,
    settings: OrchestratorSettings,
}

impl MigrationOrchestrator {
    pub fn new(
        db: SqlitePool,
        actor: MigrationActor,
        cloner: Arc<dyn RepoCloner>,
        uploader: ContentImageUploader,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            db,
            actor,
            cloner,
            uploader,
            settings,
        }
    }

    pub fn actor(&self) -> &MigrationActor {
        &self.actor
    }

    /// Request an operation
    ///
    /// Returns immediately. When accepted the work runs on a background task;
    /// progress is observed through the actor.
    pub fn start_operation(&self, operation: MigrationOperation) -> StartOutcome {
        let outcome = self.actor.start(operation);

        let Some(effect) = outcome.effect else {
            tracing::info!(operation = %operation, "Operation rejected: already running");
            return StartOutcome {
                started: false,
                message: "Migration already in progress".to_string(),
            };
        };

        tracing::info!(operation = %operation, effect = ?effect, "Operation accepted");
        self.dispatch(effect);

        let message = match operation {
            MigrationOperation::Migrate => "Migration started",
            MigrationOperation::Cleanup => "Cleanup started",
            MigrationOperation::Delete => "Delete started",
        };
        StartOutcome {
            started: true,
            message: message.to_string(),
        }
    }

    /// Spawn the effect with a supervisor that turns a panic into FAIL
    fn dispatch(&self, effect: MigrationEffect) {
        let orchestrator = self.clone();
        let actor = self.actor.clone();

        tokio::spawn(async move {
            let work = tokio::spawn(async move { orchestrator.run_effect(effect).await });

            if let Err(e) = work.await {
                tracing::error!(effect = ?effect, error = %e, "Migration task aborted");
                actor.fail(format!("Operation aborted: {}", e));
            }
        });
    }

    /// Execute one effect to its terminal transition
    pub async fn run_effect(&self, effect: MigrationEffect) {
        match effect {
            MigrationEffect::RunMigration => self.run_migration().await,
            MigrationEffect::RunCleanup => self.run_cleanup().await,
            MigrationEffect::RunDelete => self.run_delete().await,
        }
    }

    async fn run_migration(&self) {
        let workdir = match create_checkout_dir(&self.settings.temp_root) {
            Ok(dir) => dir,
            Err(e) => return self.finish("Migration", Err(e)),
        };

        // git wants a destination that does not exist yet
        let outcome = self.migrate_from_checkout(&workdir.path().join("repo")).await;

        self.log("Cleaning up temporary files...");
        let path = workdir.path().to_path_buf();
        match tokio::task::spawn_blocking(move || workdir.close()).await {
            Ok(Ok(())) => tracing::debug!(path = %path.display(), "Temporary checkout removed"),
            Ok(Err(e)) => tracing::warn!(
                path = %path.display(),
                error = %e,
                "Failed to remove temporary checkout"
            ),
            Err(e) => tracing::warn!(error = %e, "Temporary checkout removal task failed"),
        }

        self.finish("Migration", outcome);
    }

    async fn migrate_from_checkout(&self, repo: &Path) -> Result<MigrationResults> {
        let url = &self.settings.source_repo_url;
        self.log(format!("Cloning {}...", url));
        self.cloner
            .shallow_clone(url, repo)
            .await
            .context("Failed to clone source repository")?;
        self.log("Repository cloned successfully");

        let members = self.migrate_members(repo).await;
        let articles = self.migrate_articles(repo).await;
        let projects = self.migrate_projects(repo).await;
        let images = self.migrate_images(repo).await;

        Ok(MigrationResults {
            members,
            articles,
            projects,
            images,
        })
    }

    /// Drive the actor into its terminal state
    fn finish(&self, label: &str, outcome: Result<MigrationResults>) {
        match outcome {
            Ok(results) => {
                tracing::info!(
                    operation = label,
                    errors = results.total_errors(),
                    "Operation complete"
                );
                self.actor.complete(results);
            }
            Err(e) => {
                let message = format!("{:#}", e);
                tracing::error!(operation = label, error = %message, "Operation failed");
                self.actor.fail(message);
            }
        }
    }

    fn log(&self, message: impl Into<String>) {
        self.actor.log(message);
    }

    /// Logger handed to helpers that only see a closure
    fn log_sink(&self) -> impl Fn(String) + Send + Sync + '_ {
        move |line: String| self.actor.log(line)
    }
}

/// Read and parse one legacy document
async fn read_document<T: DeserializeOwned>(file: &Path) -> Result<ParsedDocument<T>> {
    let content = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    Ok(parse_frontmatter(&content)?)
}

/// Local file referenced by a frontmatter image field, relative to `doc_dir`
fn local_image_path(doc_dir: &Path, reference: &str) -> Option<PathBuf> {
    let relative = Path::new(reference.strip_prefix("./").unwrap_or(reference));
    let contained = relative
        .components()
        .all(|c| matches!(c, std::path::Component::Normal(_) | std::path::Component::CurDir));
    contained.then(|| doc_dir.join(relative))
}
