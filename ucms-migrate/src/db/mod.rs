//! Database access for ucms-migrate
//!
//! SQLite content store: members, articles, projects and the
//! project/member join table. The migration workers only touch the store
//! through the functions in this module and its submodules.

pub mod articles;
pub mod members;
pub mod projects;

use anyhow::Result;
use sqlx::{Row, SqlitePool};
use std::path::Path;
use ucms_common::Result as DbResult;

/// Content tables that carry a slug and an image URL
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTable {
    Members,
    Articles,
    Projects,
}

impl ContentTable {
    pub const ALL: [ContentTable; 3] = [
        ContentTable::Members,
        ContentTable::Articles,
        ContentTable::Projects,
    ];

    pub fn table_name(self) -> &'static str {
        match self {
            ContentTable::Members => "members",
            ContentTable::Articles => "articles",
            ContentTable::Projects => "projects",
        }
    }

    /// Column holding the portrait/cover URL
    pub fn image_column(self) -> &'static str {
        match self {
            ContentTable::Members => "image_url",
            ContentTable::Articles | ContentTable::Projects => "cover_url",
        }
    }

    /// Singular label used in log lines (`member/<slug>`)
    pub fn entity_label(self) -> &'static str {
        match self {
            ContentTable::Members => "member",
            ContentTable::Articles => "article",
            ContentTable::Projects => "project",
        }
    }
}

/// Minimal view of an existing content row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRef {
    pub id: String,
    pub image_url: Option<String>,
}

/// Initialize database connection pool
///
/// Creates the database file (and parent directory) when missing and makes
/// sure all content tables exist.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create content tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS members (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            bio TEXT,
            image_url TEXT,
            page_content TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS articles (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            excerpt TEXT,
            cover_url TEXT,
            author_id TEXT REFERENCES members(id) ON DELETE SET NULL,
            published INTEGER NOT NULL DEFAULT 0,
            published_at TEXT,
            view_count INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            slug TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            description TEXT,
            content TEXT,
            cover_url TEXT,
            repo_url TEXT,
            demo_url TEXT,
            category TEXT NOT NULL DEFAULT 'active',
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_members (
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            member_id TEXT NOT NULL REFERENCES members(id) ON DELETE CASCADE,
            role TEXT NOT NULL DEFAULT 'member',
            PRIMARY KEY (project_id, member_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (members, articles, projects, project_members)");

    Ok(())
}

/// Whether a row with this slug already exists
pub async fn exists_by_slug(pool: &SqlitePool, table: ContentTable, slug: &str) -> DbResult<bool> {
    let query = format!("SELECT 1 FROM {} WHERE slug = ? LIMIT 1", table.table_name());
    let row = sqlx::query(&query).bind(slug).fetch_optional(pool).await?;
    Ok(row.is_some())
}

/// Look up a row's id and image URL by slug
pub async fn find_by_slug(
    pool: &SqlitePool,
    table: ContentTable,
    slug: &str,
) -> DbResult<Option<ContentRef>> {
    let query = format!(
        "SELECT id, {} AS image_url FROM {} WHERE slug = ? LIMIT 1",
        table.image_column(),
        table.table_name()
    );
    let row = sqlx::query(&query).bind(slug).fetch_optional(pool).await?;

    Ok(row.map(|row| ContentRef {
        id: row.get("id"),
        image_url: row.get("image_url"),
    }))
}

/// All `(id, image_url)` pairs of a table, ordered by id
pub async fn list_image_urls(
    pool: &SqlitePool,
    table: ContentTable,
) -> DbResult<Vec<ContentRef>> {
    let query = format!(
        "SELECT id, {} AS image_url FROM {} ORDER BY id",
        table.image_column(),
        table.table_name()
    );
    let rows = sqlx::query(&query).fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|row| ContentRef {
            id: row.get("id"),
            image_url: row.get("image_url"),
        })
        .collect())
}

/// Overwrite (or clear) a row's image URL
pub async fn set_image_url(
    pool: &SqlitePool,
    table: ContentTable,
    id: &str,
    url: Option<&str>,
) -> DbResult<()> {
    let query = format!(
        "UPDATE {} SET {} = ? WHERE id = ?",
        table.table_name(),
        table.image_column()
    );
    sqlx::query(&query).bind(url).bind(id).execute(pool).await?;
    Ok(())
}

/// Delete every row of a content table, returning the number of rows removed
pub async fn delete_all(pool: &SqlitePool, table: ContentTable) -> DbResult<u64> {
    let query = format!("DELETE FROM {}", table.table_name());
    let result = sqlx::query(&query).execute(pool).await?;
    Ok(result.rows_affected())
}

/// Row count of a content table
pub async fn count(pool: &SqlitePool, table: ContentTable) -> DbResult<i64> {
    let query = format!("SELECT COUNT(*) FROM {}", table.table_name());
    let count: i64 = sqlx::query_scalar(&query).fetch_one(pool).await?;
    Ok(count)
}
