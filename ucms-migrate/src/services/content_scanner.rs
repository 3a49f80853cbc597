//! Legacy document discovery
//!
//! Recursive walk of a content subtree collecting every `index.md` /
//! `index.mdx`, returned in lexicographic path order so worker logs are
//! reproducible.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// File names that mark a legacy document
const DOCUMENT_FILE_NAMES: [&str; 2] = ["index.md", "index.mdx"];

/// Legacy document scanner
pub struct ContentScanner {
    ignore_patterns: Vec<String>,
}

impl ContentScanner {
    /// Create scanner with default ignore patterns (`.git`, `node_modules`, ...)
    pub fn new() -> Self {
        Self {
            ignore_patterns: vec![
                ".git".to_string(),
                "node_modules".to_string(),
                ".DS_Store".to_string(),
            ],
        }
    }

    /// Collect legacy documents below `root`, sorted
    ///
    /// A missing `root` yields an empty list. Unreadable entries are logged and
    /// skipped.
    pub fn scan(&self, root: &Path) -> Vec<PathBuf> {
        if !root.is_dir() {
            tracing::debug!(root = %root.display(), "Content directory not present");
            return Vec::new();
        }

        let mut documents = Vec::new();

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| self.should_process_entry(e));

        for entry in walker {
            match entry {
                Ok(entry) => {
                    if entry.file_type().is_file() && is_document(entry.path()) {
                        documents.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                }
            }
        }

        documents.sort();
        documents
    }

    /// Scan on the blocking pool
    pub async fn scan_async(root: PathBuf) -> Vec<PathBuf> {
        let root_label = root.display().to_string();
        match tokio::task::spawn_blocking(move || ContentScanner::new().scan(&root)).await {
            Ok(documents) => documents,
            Err(e) => {
                tracing::error!(root = %root_label, error = %e, "Content scan task failed");
                Vec::new()
            }
        }
    }

    fn should_process_entry(&self, entry: &DirEntry) -> bool {
        let name = entry.file_name().to_string_lossy();
        !self.ignore_patterns.iter().any(|p| name == p.as_str())
    }
}

impl Default for ContentScanner {
    fn default() -> Self {
        Self::new()
    }
}

fn is_document(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| DOCUMENT_FILE_NAMES.contains(&n))
        .unwrap_or(false)
}
