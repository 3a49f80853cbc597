//! Member rows

use chrono::Utc;
use sqlx::SqlitePool;
use ucms_common::Result;
use uuid::Uuid;

use crate::models::NewMember;

/// Insert a member, returning the generated id
pub async fn insert_member(pool: &SqlitePool, member: &NewMember) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO members (id, slug, name, bio, image_url, page_content, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&member.slug)
    .bind(&member.name)
    .bind(&member.bio)
    .bind(&member.image_url)
    .bind(&member.page_content)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Resolve a member slug to its id
pub async fn find_member_id(pool: &SqlitePool, slug: &str) -> Result<Option<String>> {
    let id: Option<String> = sqlx::query_scalar("SELECT id FROM members WHERE slug = ? LIMIT 1")
        .bind(slug)
        .fetch_optional(pool)
        .await?;
    Ok(id)
}
