//! Project rows and project/member links

use chrono::Utc;
use sqlx::SqlitePool;
use ucms_common::Result;
use uuid::Uuid;

use crate::models::NewProject;

/// Role given to every migrated project member
pub const DEFAULT_MEMBER_ROLE: &str = "member";

/// Insert a project, returning the generated id
pub async fn insert_project(pool: &SqlitePool, project: &NewProject) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO projects (
            id, slug, name, description, content, cover_url,
            repo_url, demo_url, category, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&project.slug)
    .bind(&project.name)
    .bind(&project.description)
    .bind(&project.content)
    .bind(&project.cover_url)
    .bind(&project.repo_url)
    .bind(&project.demo_url)
    .bind(project.category.as_str())
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(id)
}

/// Link a member to a project; an existing link is left untouched
pub async fn link_member(
    pool: &SqlitePool,
    project_id: &str,
    member_id: &str,
    role: &str,
) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO project_members (project_id, member_id, role) VALUES (?, ?, ?)",
    )
    .bind(project_id)
    .bind(member_id)
    .bind(role)
    .execute(pool)
    .await?;
    Ok(())
}

/// Member ids linked to a project (by project slug), sorted
pub async fn member_ids(pool: &SqlitePool, project_slug: &str) -> Result<Vec<String>> {
    let ids: Vec<String> = sqlx::query_scalar(
        r#"
        SELECT pm.member_id FROM project_members pm
        JOIN projects p ON p.id = pm.project_id
        WHERE p.slug = ?
        ORDER BY pm.member_id
        "#,
    )
    .bind(project_slug)
    .fetch_all(pool)
    .await?;
    Ok(ids)
}

/// Stored category of a project
pub async fn category(pool: &SqlitePool, slug: &str) -> Result<Option<String>> {
    let category: Option<String> =
        sqlx::query_scalar("SELECT category FROM projects WHERE slug = ?")
            .bind(slug)
            .fetch_optional(pool)
            .await?;
    Ok(category)
}

/// Delete every project/member link, returning the number removed
pub async fn delete_all_links(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM project_members").execute(pool).await?;
    Ok(result.rows_affected())
}
