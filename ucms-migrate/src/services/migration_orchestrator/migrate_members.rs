//! MEMBERS: `contents/members/**/<slug>/index.md`

use super::{read_document, ItemOutcome, MigrationOrchestrator, MEMBERS_DIR};
use crate::db::{self, ContentTable};
use crate::models::{MemberFrontmatter, MigrationTally, NewMember};
use crate::services::content_images::StorageFolder;
use crate::services::content_scanner::ContentScanner;
use crate::services::slugs;
use anyhow::Result;
use std::path::Path;

impl MigrationOrchestrator {
    /// Import every member document not yet in the store
    pub(super) async fn migrate_members(&self, repo: &Path) -> MigrationTally {
        self.log("--- Migrating Members ---");
        let root = repo.join(MEMBERS_DIR);
        let files = ContentScanner::scan_async(root.clone()).await;
        self.log(format!("Found {} member files", files.len()));

        let mut tally = MigrationTally::default();

        for file in &files {
            let Some(slug) = slugs::member_slug(&root, file) else {
                continue;
            };

            match self.migrate_member(&slug, file).await {
                Ok(ItemOutcome::Created(name)) => {
                    self.log(format!("  ✓ Created: {} ({})", slug, name.unwrap_or_default()));
                    tally.created += 1;
                }
                Ok(ItemOutcome::Skipped) => {
                    self.log(format!("  ⊘ Skipped: {} (already exists)", slug));
                    tally.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "Member migration failed");
                    self.log(format!("  ✗ Error: {} - {:#}", slug, e));
                    tally.errors += 1;
                }
            }
        }

        self.log(tally.summary("Members"));
        tally
    }

    async fn migrate_member(&self, slug: &str, file: &Path) -> Result<ItemOutcome> {
        let document = read_document::<MemberFrontmatter>(file).await?;
        let frontmatter = document.frontmatter;

        if db::exists_by_slug(&self.db, ContentTable::Members, slug).await? {
            return Ok(ItemOutcome::Skipped);
        }

        let page_content = if document.body.is_empty() {
            None
        } else {
            let doc_dir = file.parent().unwrap_or(file);
            let sink = self.log_sink();
            Some(
                self.uploader
                    .process(&document.body, doc_dir, StorageFolder::Members, &sink)
                    .await,
            )
        };

        let member = NewMember {
            slug: slug.to_string(),
            name: frontmatter.name_ja.clone(),
            bio: frontmatter.bio(),
            image_url: frontmatter.image_ref().map(String::from),
            page_content,
        };
        db::members::insert_member(&self.db, &member).await?;

        Ok(ItemOutcome::Created(Some(frontmatter.name_ja)))
    }
}
