//! Service modules for the legacy content migration
//!
//! Leaf helpers (frontmatter, slugs, excerpt, scanning), external
//! collaborators (object storage, image compression, repository cloning),
//! the migration state actor and the orchestrator that drives the workers.

pub mod content_images;
pub mod content_scanner;
pub mod excerpt;
pub mod frontmatter;
pub mod image_compressor;
pub mod migration_actor;
pub mod migration_orchestrator;
pub mod object_storage;
pub mod repo_cloner;
pub mod slugs;

pub use content_images::{mime_type_for, ContentImageUploader, StorageFolder};
pub use content_scanner::ContentScanner;
pub use excerpt::{generate_excerpt, DEFAULT_EXCERPT_LENGTH};
pub use frontmatter::{parse_frontmatter, parse_legacy_date, FrontmatterError, ParsedDocument};
pub use image_compressor::{CompressedImage, ImageCompressor, WebpCompressor};
pub use migration_actor::{MigrationActor, SendOutcome, Subscription};
pub use migration_orchestrator::{MigrationOrchestrator, OrchestratorSettings, StartOutcome};
pub use object_storage::{HttpObjectStorage, ObjectStorage, StorageError};
pub use repo_cloner::{CloneError, GitCloner, RepoCloner};
