//! Source repository checkout

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use thiserror::Error;
use tokio::process::Command;

/// Clone errors
#[derive(Debug, Error)]
pub enum CloneError {
    /// `git` could not be started
    #[error("Failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    /// `git clone` exited unsuccessfully
    #[error("git clone failed: {0}")]
    Failed(String),
}

/// Fetches the legacy content repository into a local directory
#[async_trait]
pub trait RepoCloner: Send + Sync {
    /// Clone `url` into `dest`, which must not exist yet
    async fn shallow_clone(&self, url: &str, dest: &Path) -> Result<(), CloneError>;
}

/// Shallow clone through the `git` executable
#[derive(Debug, Clone, Default)]
pub struct GitCloner;

#[async_trait]
impl RepoCloner for GitCloner {
    async fn shallow_clone(&self, url: &str, dest: &Path) -> Result<(), CloneError> {
        tracing::info!(url = %url, dest = %dest.display(), "Cloning source repository");

        let output = Command::new("git")
            .arg("clone")
            .arg("--depth")
            .arg("1")
            .arg(url)
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(CloneError::Failed(stderr));
        }

        tracing::info!(dest = %dest.display(), "Source repository cloned");
        Ok(())
    }
}
