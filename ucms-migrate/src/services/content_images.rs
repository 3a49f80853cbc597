//! Embedded image upload for legacy document bodies
//!
//! Markdown references of the form `![alt](./relative/path)` are resolved
//! against the document's directory, compressed, uploaded and replaced by the
//! public URL. A reference that cannot be processed is logged and left as is.

use super::image_compressor::ImageCompressor;
use super::object_storage::ObjectStorage;
use anyhow::{Context, Result};
use regex::Regex;
use std::path::{Component, Path};
use std::sync::{Arc, OnceLock};
use uuid::Uuid;

/// Storage folder per entity type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageFolder {
    Members,
    Articles,
    Projects,
}

impl StorageFolder {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageFolder::Members => "members",
            StorageFolder::Articles => "articles",
            StorageFolder::Projects => "projects",
        }
    }
}

/// MIME type from file extension
pub fn mime_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

fn image_reference_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"!\[([^\]]*)\]\(\./([^)]+)\)").expect("image reference regex")
    })
}

/// Relative path stays inside the directory it is joined to
fn is_contained(relative: &Path) -> bool {
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Compresses and uploads local images, rewriting references
#[derive(Clone)]
pub struct ContentImageUploader {
    storage: Arc<dyn ObjectStorage>,
    compressor: Arc<dyn ImageCompressor>,
}

impl ContentImageUploader {
    pub fn new(storage: Arc<dyn ObjectStorage>, compressor: Arc<dyn ImageCompressor>) -> Self {
        Self {
            storage,
            compressor,
        }
    }

    /// Public URL prefix of the underlying storage
    pub fn public_url(&self) -> &str {
        self.storage.public_url()
    }

    /// Upload one local image file, returning its public URL
    ///
    /// Object key: `{folder}/{uuid}-{file stem}.{compressed extension}`.
    pub async fn upload_file(&self, path: &Path, folder: StorageFolder) -> Result<String> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let compressed = self.compressor.compress(bytes, mime_type_for(path)).await?;

        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let key = format!(
            "{}/{}-{}.{}",
            folder.as_str(),
            Uuid::new_v4(),
            stem,
            compressed.extension
        );

        let url = self
            .storage
            .put_object(&key, compressed.bytes, &compressed.mime_type)
            .await?;

        Ok(url)
    }

    /// Rewrite every `![alt](./path)` in `content` to point at object storage
    ///
    /// `doc_dir` is the directory of the document the content came from. The
    /// source file is never modified.
    pub async fn process(
        &self,
        content: &str,
        doc_dir: &Path,
        folder: StorageFolder,
        log: &(dyn Fn(String) + Send + Sync),
    ) -> String {
        let references: Vec<(String, String, String)> = image_reference_pattern()
            .captures_iter(content)
            .map(|caps| {
                (
                    caps[0].to_string(),
                    caps[1].to_string(),
                    caps[2].to_string(),
                )
            })
            .collect();

        let mut processed = content.to_string();

        for (full_match, alt, relative) in references {
            let relative_path = Path::new(&relative);
            if !is_contained(relative_path) {
                log(format!("    ⊘ Image outside document directory: {}", relative));
                continue;
            }

            let image_path = doc_dir.join(relative_path);
            if !tokio::fs::try_exists(&image_path).await.unwrap_or(false) {
                log(format!("    ⊘ Image not found: {}", relative));
                continue;
            }

            match self.upload_file(&image_path, folder).await {
                Ok(url) => {
                    processed = processed.replacen(&full_match, &format!("![{}]({})", alt, url), 1);
                    log(format!("    ✓ Uploaded: {}", relative));
                }
                Err(e) => {
                    tracing::warn!(path = %image_path.display(), error = %e, "Content image upload failed");
                    log(format!("    ✗ Failed to upload: {} - {}", relative, e));
                }
            }
        }

        processed
    }
}
