//! ARTICLES: `contents/articles/<year>/<MM-DD>_<name>/index.md`

use super::{read_document, ItemOutcome, MigrationOrchestrator, ARTICLES_DIR};
use crate::db::{self, ContentTable};
use crate::models::{ArticleFrontmatter, MigrationTally, NewArticle};
use crate::services::content_images::StorageFolder;
use crate::services::content_scanner::ContentScanner;
use crate::services::excerpt::{generate_excerpt, DEFAULT_EXCERPT_LENGTH};
use crate::services::frontmatter::parse_legacy_date;
use crate::services::slugs;
use anyhow::Result;
use std::path::Path;

impl MigrationOrchestrator {
    /// Import every article document not yet in the store
    ///
    /// Authors must already be migrated; an unknown author is logged and the
    /// article is stored without one.
    pub(super) async fn migrate_articles(&self, repo: &Path) -> MigrationTally {
        self.log("--- Migrating Articles ---");
        let root = repo.join(ARTICLES_DIR);
        let files = ContentScanner::scan_async(root.clone()).await;
        self.log(format!("Found {} article files", files.len()));

        let mut tally = MigrationTally::default();

        for file in &files {
            let slug = slugs::article_slug(&root, file);

            match self.migrate_article(&slug, file).await {
                Ok(ItemOutcome::Created(_)) => {
                    self.log(format!("  ✓ Created: {}", slug));
                    tally.created += 1;
                }
                Ok(ItemOutcome::Skipped) => {
                    self.log(format!("  ⊘ Skipped: {} (already exists)", slug));
                    tally.skipped += 1;
                }
                Err(e) => {
                    tracing::warn!(slug = %slug, error = %e, "Article migration failed");
                    self.log(format!("  ✗ Error: {} - {:#}", slug, e));
                    tally.errors += 1;
                }
            }
        }

        self.log(tally.summary("Articles"));
        tally
    }

    async fn migrate_article(&self, slug: &str, file: &Path) -> Result<ItemOutcome> {
        let document = read_document::<ArticleFrontmatter>(file).await?;
        let frontmatter = document.frontmatter;

        if db::exists_by_slug(&self.db, ContentTable::Articles, slug).await? {
            return Ok(ItemOutcome::Skipped);
        }

        let published_at = parse_legacy_date(&frontmatter.date)?;
        let author_id = self.resolve_author(frontmatter.author.as_deref()).await?;

        let doc_dir = file.parent().unwrap_or(file);
        let sink = self.log_sink();
        let content = self
            .uploader
            .process(&document.body, doc_dir, StorageFolder::Articles, &sink)
            .await;

        let article = NewArticle {
            slug: slug.to_string(),
            title: frontmatter.title.clone(),
            excerpt: generate_excerpt(&content, DEFAULT_EXCERPT_LENGTH),
            content,
            cover_url: frontmatter.cover_ref().map(String::from),
            author_id,
            published: true,
            published_at,
        };
        db::articles::insert_article(&self.db, &article).await?;

        Ok(ItemOutcome::Created(None))
    }

    /// Member id for a `"YYYY/member-slug"` author reference
    async fn resolve_author(&self, reference: Option<&str>) -> Result<Option<String>> {
        let Some(member_slug) = reference.and_then(slugs::member_ref_slug) else {
            return Ok(None);
        };

        let id = db::members::find_member_id(&self.db, member_slug).await?;
        if id.is_none() {
            self.log(format!("    ⊘ Author not found: {}", member_slug));
        }
        Ok(id)
    }
}
