use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use herald_external_service::{
    raw_content_templates_base_url, FsTemplateSource, HttpTemplateSource, ServiceDescriptor,
    SuccessStatusPolicy, TemplateSource,
};
use serde::Deserialize;

const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RAW_BASE_URL: &str = "https://raw.githubusercontent.com";
const DEFAULT_TEMPLATES_BRANCH: &str = "main";
const DEFAULT_TEMPLATES_PATH: &str = ".herald/templates";

fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeraldConfig {
    pub bot_name: String,
    #[serde(default)]
    pub http: HttpSettings,
    #[serde(default)]
    pub templates: TemplateSettings,
    #[serde(default)]
    pub services: Vec<ServiceDescriptor>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HttpSettings {
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub success_status: SuccessStatusPolicy,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            success_status: SuccessStatusPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
/// Where `template_file` references are resolved.
///
/// `directory` wins when set; otherwise templates are fetched as raw content
/// from the event's repository.
pub struct TemplateSettings {
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub raw_base_url: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

impl TemplateSettings {
    pub fn build_source(
        &self,
        config_dir: &Path,
        repo: &str,
        request_timeout_ms: u64,
    ) -> Result<Arc<dyn TemplateSource>> {
        if let Some(directory) = self.directory.as_ref() {
            return Ok(Arc::new(FsTemplateSource::new(config_dir.join(directory))));
        }
        let base_url = raw_content_templates_base_url(
            self.raw_base_url.as_deref().unwrap_or(DEFAULT_RAW_BASE_URL),
            repo,
            self.branch.as_deref().unwrap_or(DEFAULT_TEMPLATES_BRANCH),
            self.path.as_deref().unwrap_or(DEFAULT_TEMPLATES_PATH),
        );
        let source = HttpTemplateSource::new(base_url, request_timeout_ms)
            .context("failed to create template source")?;
        Ok(Arc::new(source))
    }
}

pub fn parse_herald_config(raw: &str) -> Result<HeraldConfig> {
    let config: HeraldConfig = toml::from_str(raw).context("failed to parse herald config")?;
    validate_herald_config(&config)?;
    Ok(config)
}

pub fn load_herald_config(path: &Path) -> Result<HeraldConfig> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read herald config {}", path.display()))?;
    parse_herald_config(&raw).with_context(|| format!("invalid herald config {}", path.display()))
}

pub fn validate_herald_config(config: &HeraldConfig) -> Result<()> {
    if config.bot_name.trim().trim_start_matches('@').is_empty() {
        bail!("bot_name must not be empty");
    }
    if config.http.request_timeout_ms == 0 {
        bail!("http.request_timeout_ms must be greater than 0");
    }
    let mut names = BTreeSet::new();
    for service in &config.services {
        let name = service.name.trim();
        if name.is_empty() {
            bail!("every service must have a name");
        }
        if !names.insert(name.to_ascii_lowercase()) {
            bail!("duplicate service name '{name}'");
        }
        if service.command.trim().is_empty() {
            bail!("service '{name}' must define a command");
        }
    }
    Ok(())
}
