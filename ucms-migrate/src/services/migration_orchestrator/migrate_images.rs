//! IMAGES: member portraits and article/project covers
//!
//! Runs after the entity workers. For each legacy document with an image
//! field, the referenced local file is uploaded and the row's URL replaced.

use super::{
    local_image_path, read_document, MigrationOrchestrator, ARTICLES_DIR, MEMBERS_DIR,
    PROJECTS_DIR,
};
use crate::db::{self, ContentTable};
use crate::models::{ArticleFrontmatter, MemberFrontmatter, MigrationTally, ProjectFrontmatter};
use crate::services::content_images::StorageFolder;
use crate::services::content_scanner::ContentScanner;
use crate::services::slugs;
use anyhow::Result;
use std::path::Path;

/// Outcome of one cover upload
enum CoverOutcome {
    /// Document has no image field
    NoReference,
    Uploaded,
    Skipped(&'static str),
}

impl MigrationOrchestrator {
    pub(super) async fn migrate_images(&self, repo: &Path) -> MigrationTally {
        self.log("--- Migrating Images ---");

        let mut tally = MigrationTally::default();
        for table in ContentTable::ALL {
            self.migrate_table_images(repo, table, &mut tally).await;
        }

        self.log(tally.summary("Images"));
        tally
    }

    async fn migrate_table_images(&self, repo: &Path, table: ContentTable, tally: &mut MigrationTally) {
        let (dir, heading) = match table {
            ContentTable::Members => (MEMBERS_DIR, "Processing member images..."),
            ContentTable::Articles => (ARTICLES_DIR, "Processing article images..."),
            ContentTable::Projects => (PROJECTS_DIR, "Processing project images..."),
        };
        self.log(heading);

        let root = repo.join(dir);
        let files = ContentScanner::scan_async(root.clone()).await;

        for file in &files {
            let slug = match table {
                ContentTable::Members => slugs::member_slug(&root, file),
                ContentTable::Articles => Some(slugs::article_slug(&root, file)),
                ContentTable::Projects => slugs::project_slug(file),
            };
            let Some(slug) = slug else {
                continue;
            };
            let label = format!("{}/{}", table.entity_label(), slug);

            match self.migrate_cover(table, &slug, file).await {
                Ok(CoverOutcome::NoReference) => {}
                Ok(CoverOutcome::Uploaded) => {
                    self.log(format!("  ✓ Uploaded: {}", label));
                    tally.created += 1;
                }
                Ok(CoverOutcome::Skipped(reason)) => {
                    self.log(format!("  ⊘ Skipped: {} ({})", label, reason));
                    tally.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(entity = %label, error = %e, "Image migration failed");
                    self.log(format!("  ✗ Error: {} - {:#}", label, e));
                    tally.errors += 1;
                }
            }
        }
    }

    async fn migrate_cover(&self, table: ContentTable, slug: &str, file: &Path) -> Result<CoverOutcome> {
        let reference = match table {
            ContentTable::Members => read_document::<MemberFrontmatter>(file)
                .await?
                .frontmatter
                .image_ref()
                .map(String::from),
            ContentTable::Articles => read_document::<ArticleFrontmatter>(file)
                .await?
                .frontmatter
                .cover_ref()
                .map(String::from),
            ContentTable::Projects => read_document::<ProjectFrontmatter>(file)
                .await?
                .frontmatter
                .cover_ref()
                .map(String::from),
        };
        let Some(reference) = reference else {
            return Ok(CoverOutcome::NoReference);
        };

        let doc_dir = file.parent().unwrap_or(file);
        let Some(image_path) = local_image_path(doc_dir, &reference) else {
            return Ok(CoverOutcome::Skipped("image file not found"));
        };
        if !tokio::fs::try_exists(&image_path).await.unwrap_or(false) {
            return Ok(CoverOutcome::Skipped("image file not found"));
        }

        let Some(existing) = db::find_by_slug(&self.db, table, slug).await? else {
            return Ok(CoverOutcome::Skipped("not in database"));
        };

        let public_url = self.uploader.public_url();
        if !public_url.is_empty()
            && existing
                .image_url
                .as_deref()
                .is_some_and(|url| url.starts_with(public_url))
        {
            return Ok(CoverOutcome::Skipped("already has storage URL"));
        }

        let url = self.uploader.upload_file(&image_path, storage_folder(table)).await?;
        db::set_image_url(&self.db, table, &existing.id, Some(&url)).await?;

        Ok(CoverOutcome::Uploaded)
    }
}

fn storage_folder(table: ContentTable) -> StorageFolder {
    match table {
        ContentTable::Members => StorageFolder::Members,
        ContentTable::Articles => StorageFolder::Articles,
        ContentTable::Projects => StorageFolder::Projects,
    }
}
