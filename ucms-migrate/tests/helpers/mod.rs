//! Test Helper Utilities
//!
//! Shared fakes and fixtures for ucms-migrate integration tests

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use ucms_migrate::models::MigrationState;
use ucms_migrate::services::{
    CloneError, CompressedImage, ContentImageUploader, ImageCompressor, MigrationActor,
    MigrationOrchestrator, ObjectStorage, OrchestratorSettings, RepoCloner, StorageError,
};

pub const PUBLIC_URL: &str = "https://media.test/ucms";

/// Create temporary test database with content tables
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for duration of test
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_ucms.db");
    let pool = ucms_migrate::db::init_database_pool(&db_path).await?;
    Ok((temp_dir, pool))
}

/// Write `contents` to `root/relative`, creating parent directories
pub fn write_file(root: &Path, relative: &str, contents: impl AsRef<[u8]>) {
    let path = root.join(relative);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// Small legacy repository: two members, one article, one project
pub fn write_sample_repo(root: &Path) {
    write_file(
        root,
        "contents/members/2020/taro/index.md",
        "---\nnameJa: 山田 太郎\ndescription: Rust enthusiast\ngithub: taro\nimage: ./face.png\n---\nHello from Taro.\n\n![me](./face.png)\n",
    );
    write_file(root, "contents/members/2020/taro/face.png", b"\x89PNG taro");

    write_file(
        root,
        "contents/members/2021/hanako/index.md",
        "---\nnameJa: 鈴木 花子\n---\n",
    );

    write_file(
        root,
        "contents/articles/2022/07-15_summer_events/index.md",
        "---\ntitle: Summer events\ndate: 2022-07-15\nauthor: 2020/taro\nthumbnail:\n  src: ./cover.jpg\n---\nWe held a **summer** event.\n",
    );
    write_file(root, "contents/articles/2022/07-15_summer_events/cover.jpg", b"jpeg cover");

    write_file(
        root,
        "contents/projects/long-term/ucms/index.md",
        "---\napp:\n  name: UCMS\n  description: Content management\nkind: hackathon\nmembers:\n  - 2020/taro\n  - 2019/ghost\n---\nProject body.\n",
    );
}

/// Copies a prepared directory tree in place of `git clone`
pub struct FixtureCloner {
    pub source: PathBuf,
}

#[async_trait]
impl RepoCloner for FixtureCloner {
    async fn shallow_clone(&self, _url: &str, dest: &Path) -> Result<(), CloneError> {
        for entry in walkdir::WalkDir::new(&self.source) {
            let entry = entry.map_err(|e| CloneError::Failed(e.to_string()))?;
            let relative = entry.path().strip_prefix(&self.source).unwrap();
            let target = dest.join(relative);
            if entry.file_type().is_dir() {
                tokio::fs::create_dir_all(&target).await?;
            } else {
                tokio::fs::copy(entry.path(), &target).await?;
            }
        }
        Ok(())
    }
}

/// Leaves a partial checkout behind, then fails
pub struct FailingCloner;

#[async_trait]
impl RepoCloner for FailingCloner {
    async fn shallow_clone(&self, _url: &str, dest: &Path) -> Result<(), CloneError> {
        tokio::fs::create_dir_all(dest.join(".git")).await?;
        Err(CloneError::Failed("fatal: repository not found".to_string()))
    }
}

/// In-memory object store recording every key
pub struct MemoryStorage {
    pub public_url: String,
    pub keys: Mutex<Vec<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self {
            public_url: PUBLIC_URL.to_string(),
            keys: Mutex::new(Vec::new()),
        }
    }

    /// Store without a configured public URL
    pub fn unconfigured() -> Self {
        Self {
            public_url: String::new(),
            keys: Mutex::new(Vec::new()),
        }
    }

    pub fn keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStorage for MemoryStorage {
    async fn put_object(
        &self,
        key: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        self.keys.lock().unwrap().push(key.to_string());
        Ok(format!("{}/{}", self.public_url, key))
    }

    fn public_url(&self) -> &str {
        &self.public_url
    }
}

/// Keeps bytes and format unchanged
pub struct PassthroughCompressor;

#[async_trait]
impl ImageCompressor for PassthroughCompressor {
    async fn compress(&self, bytes: Vec<u8>, mime_type: &str) -> Result<CompressedImage> {
        let extension = mime_type.rsplit('/').next().unwrap_or("bin").to_string();
        Ok(CompressedImage {
            bytes,
            mime_type: mime_type.to_string(),
            extension,
        })
    }
}

/// Orchestrator wired to fakes
pub struct TestHarness {
    pub db_dir: TempDir,
    pub temp_root: TempDir,
    pub pool: SqlitePool,
    pub storage: Arc<MemoryStorage>,
    pub orchestrator: MigrationOrchestrator,
}

impl TestHarness {
    pub async fn new(cloner: Arc<dyn RepoCloner>) -> Self {
        Self::with_storage(cloner, MemoryStorage::new()).await
    }

    pub async fn with_storage(cloner: Arc<dyn RepoCloner>, storage: MemoryStorage) -> Self {
        let (db_dir, pool) = create_test_db().await.unwrap();
        let temp_root = TempDir::new().unwrap();
        let storage = Arc::new(storage);
        let uploader = ContentImageUploader::new(storage.clone(), Arc::new(PassthroughCompressor));

        let orchestrator = MigrationOrchestrator::new(
            pool.clone(),
            MigrationActor::new(),
            cloner,
            uploader,
            OrchestratorSettings {
                source_repo_url: "https://example.invalid/legacy-site.git".to_string(),
                temp_root: temp_root.path().to_path_buf(),
            },
        );

        Self {
            db_dir,
            temp_root,
            pool,
            storage,
            orchestrator,
        }
    }

    /// Harness cloning from a fixture directory
    pub async fn with_fixture(source: &Path) -> Self {
        Self::new(Arc::new(FixtureCloner {
            source: source.to_path_buf(),
        }))
        .await
    }

    pub fn actor(&self) -> &MigrationActor {
        self.orchestrator.actor()
    }

    /// Start `operation` and wait for its terminal state
    pub async fn run(&self, operation: ucms_migrate::models::MigrationOperation) -> MigrationState {
        let outcome = self.orchestrator.start_operation(operation);
        assert!(outcome.started, "operation rejected: {}", outcome.message);
        wait_for_terminal(self.actor()).await
    }

    /// Entries left in the temp root
    pub fn temp_entries(&self) -> usize {
        std::fs::read_dir(self.temp_root.path()).unwrap().count()
    }
}

/// Poll the actor until it leaves `running`
pub async fn wait_for_terminal(actor: &MigrationActor) -> MigrationState {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let state = actor.state();
            if state.status.is_terminal() {
                return state;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("operation did not finish within 10s")
}

/// Log lines with the `[HH:MM:SS] ` prefix removed
pub fn messages(state: &MigrationState) -> Vec<String> {
    state
        .logs
        .iter()
        .map(|line| match line.find("] ") {
            Some(i) => line[i + 2..].to_string(),
            None => line.clone(),
        })
        .collect()
}
