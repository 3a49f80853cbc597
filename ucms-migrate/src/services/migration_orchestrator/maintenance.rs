//! CLEANUP and DELETE operations
//!
//! Both report through the shared [`MigrationResults`] shape: cleanup counts
//! cleared URLs as `created` and valid ones as `skipped`; delete counts removed
//! rows as `created`.

use super::MigrationOrchestrator;
use crate::db::{self, ContentTable};
use crate::models::{MigrationResults, MigrationTally};
use anyhow::{Context, Result};

fn plural_label(table: ContentTable) -> &'static str {
    match table {
        ContentTable::Members => "Members",
        ContentTable::Articles => "Articles",
        ContentTable::Projects => "Projects",
    }
}

impl MigrationOrchestrator {
    pub(super) async fn run_cleanup(&self) {
        let outcome = self.cleanup_image_urls().await;
        self.finish("Cleanup", outcome);
    }

    pub(super) async fn run_delete(&self) {
        let outcome = self.delete_all_content().await;
        self.finish("Delete", outcome);
    }

    /// Clear image URLs that do not point at object storage
    ///
    /// A missing URL counts as valid. Fails without a storage public URL,
    /// since every URL would then match the empty prefix.
    async fn cleanup_image_urls(&self) -> Result<MigrationResults> {
        self.log("--- Cleaning Invalid Image URLs ---");
        let prefix = self.uploader.public_url().to_string();
        if prefix.is_empty() {
            anyhow::bail!("Object storage public URL is not configured");
        }

        let mut results = MigrationResults::default();

        for table in ContentTable::ALL {
            self.log(format!("Processing {} images...", table.entity_label()));

            let rows = db::list_image_urls(&self.db, table)
                .await
                .with_context(|| format!("Failed to list {}", table.table_name()))?;

            let mut tally = MigrationTally::default();
            for row in rows {
                let Some(url) = row.image_url.as_deref() else {
                    tally.skipped += 1;
                    continue;
                };
                if url.starts_with(&prefix) {
                    tally.skipped += 1;
                    continue;
                }

                db::set_image_url(&self.db, table, &row.id, None)
                    .await
                    .with_context(|| format!("Failed to clear {} {}", table.entity_label(), row.id))?;
                self.log(format!(
                    "  ✓ Cleaned: {} {} (was: {})",
                    table.entity_label(),
                    row.id,
                    url
                ));
                tally.created += 1;
            }

            self.log(format!(
                "{}: {} cleaned, {} skipped",
                plural_label(table),
                tally.created,
                tally.skipped
            ));

            match table {
                ContentTable::Members => results.members = tally,
                ContentTable::Articles => results.articles = tally,
                ContentTable::Projects => results.projects = tally,
            }
        }

        self.log("--- Cleanup Complete ---");
        Ok(results)
    }

    /// Delete every migrated row, links first, members last
    async fn delete_all_content(&self) -> Result<MigrationResults> {
        self.log("--- Deleting All Migrated Data ---");
        self.log("WARNING: This will delete all members, articles, and projects!");

        self.log("Deleting project members...");
        let links = db::projects::delete_all_links(&self.db)
            .await
            .context("Failed to delete project members")?;
        self.log(format!("  ✓ Deleted {} project member associations", links));

        let mut results = MigrationResults::default();

        for table in [ContentTable::Articles, ContentTable::Projects, ContentTable::Members] {
            self.log(format!("Deleting {}...", table.table_name()));
            let deleted = db::delete_all(&self.db, table)
                .await
                .with_context(|| format!("Failed to delete {}", table.table_name()))?;
            self.log(format!("  ✓ Deleted {} {}", deleted, table.table_name()));

            let tally = MigrationTally::created_only(deleted as usize);
            match table {
                ContentTable::Members => results.members = tally,
                ContentTable::Articles => results.articles = tally,
                ContentTable::Projects => results.projects = tally,
            }
        }

        self.log("--- Delete Complete ---");
        Ok(results)
    }
}
