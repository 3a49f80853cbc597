//! End-to-end migration, cleanup and delete runs against fake
//! clone/storage backends and a temporary SQLite store.

mod helpers;

use helpers::{
    messages, write_file, write_sample_repo, FailingCloner, MemoryStorage, TestHarness, PUBLIC_URL,
};
use std::sync::Arc;
use tempfile::TempDir;
use ucms_migrate::db::{self, ContentTable};
use ucms_migrate::models::{MigrationOperation, MigrationStatus, MigrationTally, NewMember};

fn tally(created: usize, skipped: usize, errors: usize) -> MigrationTally {
    MigrationTally {
        created,
        skipped,
        errors,
    }
}

fn position(lines: &[String], needle: &str) -> usize {
    lines
        .iter()
        .position(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("log line containing {:?} not found in {:#?}", needle, lines))
}

#[tokio::test]
async fn test_migration_imports_sample_repository() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    let state = harness.run(MigrationOperation::Migrate).await;

    assert_eq!(state.status, MigrationStatus::Completed, "logs: {:#?}", state.logs);
    assert!(state.error.is_none());
    let results = state.result.unwrap();
    assert_eq!(results.members, tally(2, 0, 0));
    assert_eq!(results.articles, tally(1, 0, 0));
    assert_eq!(results.projects, tally(1, 0, 0));
    assert_eq!(results.images, tally(2, 0, 0));

    // Article author resolved to the migrated member
    let taro = db::members::find_member_id(&harness.pool, "taro").await.unwrap();
    assert!(taro.is_some());
    let author = db::articles::author_id(&harness.pool, "2022-07-15-summer-events")
        .await
        .unwrap();
    assert_eq!(author, taro);

    // Project linked to the known member only; category from `kind`
    let members = db::projects::member_ids(&harness.pool, "ucms").await.unwrap();
    assert_eq!(members, vec![taro.clone().unwrap()]);
    assert_eq!(
        db::projects::category(&harness.pool, "ucms").await.unwrap().as_deref(),
        Some("hackathon")
    );

    let lines = messages(&state);
    assert!(lines.iter().any(|l| l == "    ⊘ Member not found: ghost"));
    assert!(lines.iter().any(|l| l == "  ✓ Created: taro (山田 太郎)"));
}

#[tokio::test]
async fn test_migration_uploads_portraits_and_covers() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    harness.run(MigrationOperation::Migrate).await;

    let taro = db::find_by_slug(&harness.pool, ContentTable::Members, "taro")
        .await
        .unwrap()
        .unwrap();
    let portrait = taro.image_url.unwrap();
    assert!(portrait.starts_with(&format!("{}/members/", PUBLIC_URL)), "{}", portrait);
    assert!(portrait.ends_with("-face.png"));

    let hanako = db::find_by_slug(&harness.pool, ContentTable::Members, "hanako")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hanako.image_url, None);

    let article = db::find_by_slug(&harness.pool, ContentTable::Articles, "2022-07-15-summer-events")
        .await
        .unwrap()
        .unwrap();
    assert!(article
        .image_url
        .unwrap()
        .starts_with(&format!("{}/articles/", PUBLIC_URL)));

    // Body image, portrait and article cover
    assert_eq!(harness.storage.keys().len(), 3);
}

#[tokio::test]
async fn test_member_body_images_are_rewritten() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    harness.run(MigrationOperation::Migrate).await;

    let page: Option<String> = sqlx::query_scalar("SELECT page_content FROM members WHERE slug = ?")
        .bind("taro")
        .fetch_one(&harness.pool)
        .await
        .unwrap();
    let page = page.unwrap();
    assert!(page.contains(&format!("![me]({}/members/", PUBLIC_URL)), "{}", page);
    assert!(!page.contains("./face.png"));

    // Empty body stores no page content
    let empty: Option<String> = sqlx::query_scalar("SELECT page_content FROM members WHERE slug = ?")
        .bind("hanako")
        .fetch_one(&harness.pool)
        .await
        .unwrap();
    assert_eq!(empty, None);
}

#[tokio::test]
async fn test_second_run_skips_everything() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    harness.run(MigrationOperation::Migrate).await;
    let uploads_after_first = harness.storage.keys().len();

    let state = harness.run(MigrationOperation::Migrate).await;

    assert_eq!(state.status, MigrationStatus::Completed);
    let results = state.result.unwrap();
    assert_eq!(results.members, tally(0, 2, 0));
    assert_eq!(results.articles, tally(0, 1, 0));
    assert_eq!(results.projects, tally(0, 1, 0));
    assert_eq!(results.images, tally(0, 2, 0));
    assert_eq!(harness.storage.keys().len(), uploads_after_first);

    let lines = messages(&state);
    assert!(lines
        .iter()
        .any(|l| l == "  ⊘ Skipped: member/taro (already has storage URL)"));
    assert_eq!(db::count(&harness.pool, ContentTable::Members).await.unwrap(), 2);
}

#[tokio::test]
async fn test_one_bad_document_does_not_stop_the_phase() {
    let repo = TempDir::new().unwrap();
    for i in 0..9 {
        write_file(
            repo.path(),
            &format!("contents/members/2023/member-{}/index.md", i),
            format!("---\nnameJa: Member {}\n---\n", i),
        );
    }
    write_file(
        repo.path(),
        "contents/members/2023/broken/index.md",
        "no frontmatter here\n",
    );
    let harness = TestHarness::with_fixture(repo.path()).await;

    let state = harness.run(MigrationOperation::Migrate).await;

    assert_eq!(state.status, MigrationStatus::Completed);
    assert_eq!(state.result.unwrap().members, tally(9, 0, 1));
    let lines = messages(&state);
    assert!(lines.iter().any(|l| l.starts_with("  ✗ Error: broken - ")));
    assert!(lines.iter().any(|l| l == "Members: 9 created, 0 skipped, 1 errors"));
}

#[tokio::test]
async fn test_phases_run_in_dependency_order() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    let state = harness.run(MigrationOperation::Migrate).await;
    let lines = messages(&state);

    let started = position(&lines, "=== Data Migration Started ===");
    let cloned = position(&lines, "Repository cloned successfully");
    let members = position(&lines, "--- Migrating Members ---");
    let articles = position(&lines, "--- Migrating Articles ---");
    let projects = position(&lines, "--- Migrating Projects ---");
    let images = position(&lines, "--- Migrating Images ---");
    let cleanup = position(&lines, "Cleaning up temporary files...");
    let complete = position(&lines, "=== Operation Complete ===");

    assert_eq!(started, 0);
    assert!(started < cloned);
    assert!(cloned < members);
    assert!(members < articles);
    assert!(articles < projects);
    assert!(projects < images);
    assert!(images < cleanup);
    assert_eq!(complete, lines.len() - 1);
    assert_eq!(cleanup, complete - 1);

    assert_eq!(harness.temp_entries(), 0, "temporary checkout left behind");
}

#[tokio::test]
async fn test_missing_content_directories_complete_with_zero_counts() {
    let repo = TempDir::new().unwrap();
    write_file(repo.path(), "README.md", "legacy site\n");
    let harness = TestHarness::with_fixture(repo.path()).await;

    let state = harness.run(MigrationOperation::Migrate).await;

    assert_eq!(state.status, MigrationStatus::Completed);
    let results = state.result.unwrap();
    assert_eq!(results.members.total(), 0);
    assert_eq!(results.articles.total(), 0);
    assert_eq!(results.projects.total(), 0);
    assert_eq!(results.images.total(), 0);
    assert!(messages(&state).iter().any(|l| l == "Found 0 member files"));
}

#[tokio::test]
async fn test_clone_failure_ends_in_error_and_removes_checkout() {
    let harness = TestHarness::new(Arc::new(FailingCloner)).await;

    let state = harness.run(MigrationOperation::Migrate).await;

    assert_eq!(state.status, MigrationStatus::Error);
    assert!(state.result.is_none());
    let error = state.error.clone().unwrap();
    assert!(error.starts_with("Failed to clone source repository"), "{}", error);
    assert!(error.contains("repository not found"), "{}", error);

    let lines = messages(&state);
    assert!(!lines.iter().any(|l| l.contains("--- Migrating Members ---")));
    assert!(lines.iter().any(|l| l == "Cleaning up temporary files..."));
    assert!(lines.last().unwrap().starts_with("=== Operation Failed: "));

    assert_eq!(harness.temp_entries(), 0);
    assert_eq!(db::count(&harness.pool, ContentTable::Members).await.unwrap(), 0);
}

#[tokio::test]
async fn test_cleanup_clears_foreign_image_urls() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;
    harness.run(MigrationOperation::Migrate).await;

    // hanako: no URL; taro: storage URL; add one stale legacy URL
    let hanako = db::find_by_slug(&harness.pool, ContentTable::Members, "hanako")
        .await
        .unwrap()
        .unwrap();
    db::set_image_url(
        &harness.pool,
        ContentTable::Members,
        &hanako.id,
        Some("https://old-site.example/hanako.jpg"),
    )
    .await
    .unwrap();

    let state = harness.run(MigrationOperation::Cleanup).await;

    assert_eq!(state.status, MigrationStatus::Completed);
    let results = state.result.unwrap();
    assert_eq!(results.members, tally(1, 1, 0));
    assert_eq!(results.articles, tally(0, 1, 0));
    assert_eq!(results.projects, tally(0, 1, 0));
    assert_eq!(results.images, MigrationTally::default());

    let hanako = db::find_by_slug(&harness.pool, ContentTable::Members, "hanako")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(hanako.image_url, None);

    let lines = messages(&state);
    assert_eq!(lines[0], "=== Image URL Cleanup Started ===");
    assert!(lines.iter().any(|l| l
        == &format!(
            "  ✓ Cleaned: member {} (was: https://old-site.example/hanako.jpg)",
            hanako.id
        )));
    assert!(lines.iter().any(|l| l == "--- Cleanup Complete ---"));
}

#[tokio::test]
async fn test_cleanup_fails_without_storage_public_url() {
    let harness =
        TestHarness::with_storage(Arc::new(FailingCloner), MemoryStorage::unconfigured()).await;
    let stale = "https://old-site.example/taro.jpg";
    let id = db::members::insert_member(
        &harness.pool,
        &NewMember {
            slug: "taro".to_string(),
            name: "山田 太郎".to_string(),
            bio: None,
            image_url: Some(stale.to_string()),
            page_content: None,
        },
    )
    .await
    .unwrap();

    let state = harness.run(MigrationOperation::Cleanup).await;

    assert_eq!(state.status, MigrationStatus::Error);
    assert!(state.result.is_none());
    let error = state.error.clone().unwrap();
    assert!(error.contains("public URL is not configured"), "{}", error);

    // Nothing counted as valid, nothing cleared
    let lines = messages(&state);
    assert!(!lines.iter().any(|l| l.starts_with("Members: ")));
    let member = db::find_by_slug(&harness.pool, ContentTable::Members, "taro")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.id, id);
    assert_eq!(member.image_url.as_deref(), Some(stale));
}

#[tokio::test]
async fn test_delete_removes_all_migrated_rows() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;
    harness.run(MigrationOperation::Migrate).await;

    let state = harness.run(MigrationOperation::Delete).await;

    assert_eq!(state.status, MigrationStatus::Completed, "logs: {:#?}", state.logs);
    let results = state.result.unwrap();
    assert_eq!(results.members, MigrationTally::created_only(2));
    assert_eq!(results.articles, MigrationTally::created_only(1));
    assert_eq!(results.projects, MigrationTally::created_only(1));

    for table in ContentTable::ALL {
        assert_eq!(db::count(&harness.pool, table).await.unwrap(), 0);
    }

    let lines = messages(&state);
    assert!(lines
        .iter()
        .any(|l| l == "  ✓ Deleted 1 project member associations"));
    let articles = position(&lines, "Deleting articles...");
    let members = position(&lines, "Deleting members...");
    assert!(articles < members);
}

#[tokio::test]
async fn test_concurrent_start_is_rejected() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    let first = harness.orchestrator.start_operation(MigrationOperation::Migrate);
    let second = harness.orchestrator.start_operation(MigrationOperation::Delete);

    assert!(first.started);
    assert_eq!(first.message, "Migration started");
    assert!(!second.started);
    assert_eq!(second.message, "Migration already in progress");

    let state = helpers::wait_for_terminal(harness.actor()).await;
    assert_eq!(messages(&state)[0], "=== Data Migration Started ===");
    assert_eq!(db::count(&harness.pool, ContentTable::Members).await.unwrap(), 2);
}

#[tokio::test]
async fn test_pushed_logs_concatenate_to_final_log() {
    let repo = TempDir::new().unwrap();
    write_sample_repo(repo.path());
    let harness = TestHarness::with_fixture(repo.path()).await;

    let pushed = Arc::new(std::sync::Mutex::new(Vec::<String>::new()));
    let sink = pushed.clone();
    let (snapshot, _subscription) = harness.actor().subscribe_with_snapshot(move |_, new_logs| {
        sink.lock().unwrap().extend_from_slice(new_logs);
        Ok(())
    });
    assert_eq!(snapshot.status, MigrationStatus::Idle);

    let state = harness.run(MigrationOperation::Migrate).await;

    assert_eq!(*pushed.lock().unwrap(), state.logs);
}
