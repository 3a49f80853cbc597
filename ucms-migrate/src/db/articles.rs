//! Article rows

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use ucms_common::Result;
use uuid::Uuid;

use crate::models::NewArticle;

/// Insert an article, returning the generated id
pub async fn insert_article(pool: &SqlitePool, article: &NewArticle) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO articles (
            id, slug, title, content, excerpt, cover_url, author_id,
            published, published_at, view_count, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(&id)
    .bind(&article.slug)
    .bind(&article.title)
    .bind(&article.content)
    .bind(&article.excerpt)
    .bind(&article.cover_url)
    .bind(&article.author_id)
    .bind(article.published)
    .bind(article.published_at.to_rfc3339())
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Author id of an article (None if the article or its author is absent)
pub async fn author_id(pool: &SqlitePool, slug: &str) -> Result<Option<String>> {
    let row = sqlx::query("SELECT author_id FROM articles WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(row.and_then(|r| r.get::<Option<String>, _>("author_id")))
}

/// Stored body of an article
pub async fn content(pool: &SqlitePool, slug: &str) -> Result<Option<String>> {
    let content: Option<String> = sqlx::query_scalar("SELECT content FROM articles WHERE slug = ?")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(content)
}
