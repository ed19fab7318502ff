use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tracing::debug;

use crate::issue_body_markers::replace_between_markers;

#[async_trait]
/// Persisted issue body that commands read from and write to.
pub trait IssueDocument: Send + Sync {
    async fn read_body(&self) -> Result<String>;

    /// Replaces the region between two literal markers. Returns `false` when
    /// the markers are not present and nothing was written.
    async fn update_body(&self, start_marker: &str, end_marker: &str, new_content: &str)
        -> Result<bool>;
}

#[async_trait]
/// Channel that posts a reply comment on the originating issue.
pub trait Responder: Send + Sync {
    async fn respond(&self, message: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileIssueDocument {
    path: PathBuf,
}

impl FileIssueDocument {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl IssueDocument for FileIssueDocument {
    async fn read_body(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read issue body {}", self.path.display()))
    }

    async fn update_body(
        &self,
        start_marker: &str,
        end_marker: &str,
        new_content: &str,
    ) -> Result<bool> {
        let body = self.read_body().await?;
        let Some(updated) = replace_between_markers(&body, start_marker, end_marker, new_content)
        else {
            debug!(
                path = %self.path.display(),
                start_marker,
                "issue body markers not found; body left unchanged"
            );
            return Ok(false);
        };
        tokio::fs::write(&self.path, updated)
            .await
            .with_context(|| format!("failed to write issue body {}", self.path.display()))?;
        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct InMemoryIssueDocument {
    body: Mutex<String>,
}

impl InMemoryIssueDocument {
    pub fn new(body: impl Into<String>) -> Self {
        Self {
            body: Mutex::new(body.into()),
        }
    }

    pub fn snapshot(&self) -> String {
        self.body
            .lock()
            .map(|body| body.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl IssueDocument for InMemoryIssueDocument {
    async fn read_body(&self) -> Result<String> {
        self.body
            .lock()
            .map(|body| body.clone())
            .map_err(|_| anyhow!("issue body lock poisoned"))
    }

    async fn update_body(
        &self,
        start_marker: &str,
        end_marker: &str,
        new_content: &str,
    ) -> Result<bool> {
        let mut body = self
            .body
            .lock()
            .map_err(|_| anyhow!("issue body lock poisoned"))?;
        match replace_between_markers(&body, start_marker, end_marker, new_content) {
            Some(updated) => {
                *body = updated;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Default)]
/// Responder that keeps every reply in memory.
pub struct RecordingResponder {
    replies: Mutex<Vec<String>>,
}

impl RecordingResponder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replies(&self) -> Vec<String> {
        self.replies
            .lock()
            .map(|replies| replies.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Responder for RecordingResponder {
    async fn respond(&self, message: &str) -> Result<()> {
        self.replies
            .lock()
            .map_err(|_| anyhow!("responder lock poisoned"))?
            .push(message.to_string());
        Ok(())
    }
}
