//! PROJECTS: `contents/projects/**/<slug>/index.md`

use super::{read_document, ItemOutcome, MigrationOrchestrator, PROJECTS_DIR};
use crate::db::projects::DEFAULT_MEMBER_ROLE;
use crate::db::{self, ContentTable};
use crate::models::{MigrationTally, NewProject, ProjectCategory, ProjectFrontmatter};
use crate::services::content_images::StorageFolder;
use crate::services::content_scanner::ContentScanner;
use crate::services::slugs;
use anyhow::Result;
use std::path::Path;

impl MigrationOrchestrator {
    /// Import every project document not yet in the store, with member links
    ///
    /// Member references that do not resolve are logged and left out.
    pub(super) async fn migrate_projects(&self, repo: &Path) -> MigrationTally {
        self.log("--- Migrating Projects ---");
        let root = repo.join(PROJECTS_DIR);
        let files = ContentScanner::scan_async(root).await;
        self.log(format!("Found {} project files", files.len()));

        let mut tally = MigrationTally::default();

        for file in &files {
            let Some(slug) = slugs::project_slug(file) else {
                continue;
            };

            match self.migrate_project(&slug, file).await {
                Ok(ItemOutcome::Created(name)) => {
                    self.log(format!("  ✓ Created: {} ({})", slug, name.unwrap_or_default()));
                    tally.created += 1;
                }
                Ok(ItemOutcome::Skipped) => {
                    self.log(format!("  ⊘ Skipped: {} (already exists)", slug));
                    tally.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "Project migration failed");
                    self.log(format!("  ✗ Error: {} - {:#}", slug, e));
                    tally.errors += 1;
                }
            }
        }

        self.log(tally.summary("Projects"));
        tally
    }

    async fn migrate_project(&self, slug: &str, file: &Path) -> Result<ItemOutcome> {
        let document = read_document::<ProjectFrontmatter>(file).await?;
        let frontmatter = document.frontmatter;

        if db::exists_by_slug(&self.db, ContentTable::Projects, slug).await? {
            return Ok(ItemOutcome::Skipped);
        }

        let app = frontmatter.app.clone().unwrap_or_default();
        let name = if app.name.is_empty() {
            slug.to_string()
        } else {
            app.name.clone()
        };

        let content = if document.body.is_empty() {
            None
        } else {
            let doc_dir = file.parent().unwrap_or(file);
            let sink = self.log_sink();
            Some(
                self.uploader
                    .process(&document.body, doc_dir, StorageFolder::Projects, &sink)
                    .await,
            )
        };

        let project = NewProject {
            slug: slug.to_string(),
            name: name.clone(),
            description: app.description,
            content,
            cover_url: frontmatter.cover_ref().map(String::from),
            repo_url: frontmatter.social.as_ref().and_then(|s| s.github.clone()),
            demo_url: app.url,
            category: ProjectCategory::from_legacy_kind(frontmatter.kind.as_deref()),
        };
        let project_id = db::projects::insert_project(&self.db, &project).await?;

        for reference in frontmatter.members.iter().flatten() {
            let Some(member_slug) = slugs::member_ref_slug(reference) else {
                continue;
            };

            match db::members::find_member_id(&self.db, member_slug).await? {
                Some(member_id) => {
                    db::projects::link_member(&self.db, &project_id, &member_id, DEFAULT_MEMBER_ROLE)
                        .await?;
                }
                None => self.log(format!("    ⊘ Member not found: {}", member_slug)),
            }
        }

        Ok(ItemOutcome::Created(Some(name)))
    }
}
