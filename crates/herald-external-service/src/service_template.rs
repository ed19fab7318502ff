use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::debug;

use crate::service_error::ExternalServiceError;

#[async_trait]
/// Fetches reply template content by location identifier.
pub trait TemplateSource: Send + Sync {
    async fn fetch_template(&self, location: &str) -> Result<String, ExternalServiceError>;
}

/// Substitutes `{{key}}` placeholders with values from `fields`.
///
/// Unknown keys render as empty text. An unterminated `{{` is copied through
/// unchanged.
pub fn render_reply_template(template: &str, fields: &Map<String, Value>) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut cursor = 0usize;

    while let Some(open_offset) = template[cursor..].find("{{") {
        let open_index = cursor + open_offset;
        let Some(close_offset) = template[open_index + 2..].find("}}") else {
            break;
        };
        rendered.push_str(&template[cursor..open_index]);
        let close_index = open_index + 2 + close_offset;
        let placeholder = template[open_index + 2..close_index].trim();
        if let Some(value) = fields.get(placeholder) {
            rendered.push_str(&template_value_text(value));
        }
        cursor = close_index + 2;
    }

    rendered.push_str(&template[cursor..]);
    rendered
}

fn template_value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Base URL for templates stored in a repository and served as raw content,
/// e.g. `https://raw.githubusercontent.com/<repo>/<branch>/<templates_path>`.
pub fn raw_content_templates_base_url(
    raw_base_url: &str,
    repo: &str,
    branch: &str,
    templates_path: &str,
) -> String {
    let mut segments = vec![raw_base_url.trim_end_matches('/').to_string()];
    for segment in [repo, branch, templates_path] {
        let trimmed = segment.trim().trim_matches('/');
        if !trimmed.is_empty() {
            segments.push(trimmed.to_string());
        }
    }
    segments.join("/")
}

#[derive(Debug, Clone)]
/// Reads templates from a local directory.
pub struct FsTemplateSource {
    root: PathBuf,
}

impl FsTemplateSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, location: &str) -> Result<PathBuf, ExternalServiceError> {
        let relative = Path::new(location.trim());
        let escapes_root = relative
            .components()
            .any(|component| !matches!(component, Component::Normal(_) | Component::CurDir));
        if location.trim().is_empty() || escapes_root {
            return Err(ExternalServiceError::TemplateFetch {
                location: location.to_string(),
                detail: "template location must be a relative path inside the templates directory"
                    .to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TemplateSource for FsTemplateSource {
    async fn fetch_template(&self, location: &str) -> Result<String, ExternalServiceError> {
        let path = self.resolve(location)?;
        debug!(template = %path.display(), "reading reply template from disk");
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|error| ExternalServiceError::TemplateFetch {
                location: location.to_string(),
                detail: format!("failed to read {}: {error}", path.display()),
            })
    }
}

#[derive(Debug, Clone)]
/// Fetches templates over HTTP relative to a base URL.
pub struct HttpTemplateSource {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTemplateSource {
    pub fn new(
        base_url: impl Into<String>,
        request_timeout_ms: u64,
    ) -> Result<Self, ExternalServiceError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(request_timeout_ms.max(1)))
            .build()
            .map_err(|error| ExternalServiceError::Client(error.to_string()))?;
        let base_url: String = base_url.into();
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn template_url(&self, location: &str) -> String {
        format!("{}/{}", self.base_url, location.trim().trim_start_matches('/'))
    }
}

#[async_trait]
impl TemplateSource for HttpTemplateSource {
    async fn fetch_template(&self, location: &str) -> Result<String, ExternalServiceError> {
        let url = self.template_url(location);
        debug!(template = %url, "fetching reply template");
        let fetch_error = |detail: String| ExternalServiceError::TemplateFetch {
            location: location.to_string(),
            detail,
        };
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|error| fetch_error(format!("request to {url} failed: {error}")))?;
        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error(format!(
                "{url} returned status {}",
                status.as_u16()
            )));
        }
        response
            .text()
            .await
            .map_err(|error| fetch_error(format!("failed to read {url} body: {error}")))
    }
}
