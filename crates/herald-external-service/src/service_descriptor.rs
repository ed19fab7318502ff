use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
/// Declarative description of a callable external service.
///
/// Field names are a configuration contract shared with operators' config
/// files; every field except `name` is optional.
pub struct ServiceDescriptor {
    pub name: String,
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub query_params: Map<String, Value>,
    /// Request parameter name to context key.
    #[serde(default)]
    pub mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub data_from_issue: Vec<String>,
    #[serde(default)]
    pub silent: bool,
    #[serde(default)]
    pub template_file: Option<String>,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            ..Self::default()
        }
    }

    /// Returns the trimmed target URL, or `None` when the service is disabled.
    pub fn target_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn http_method(&self) -> HttpMethod {
        HttpMethod::from_name(self.method.as_deref())
    }

    pub fn template_location(&self) -> Option<&str> {
        self.template_file
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Anything other than `get` (case-insensitive) dispatches as POST.
    pub fn from_name(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(name) if name.eq_ignore_ascii_case("get") => Self::Get,
            _ => Self::Post,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
/// Named runtime values available to an invocation (sender, issue id, repo...).
pub struct InvocationContext {
    values: BTreeMap<String, Value>,
}

impl InvocationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Context value for `key`, `null` when the key is unknown.
    pub fn value_or_null(&self, key: &str) -> Value {
        self.values.get(key).cloned().unwrap_or(Value::Null)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for InvocationContext
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::{HttpMethod, InvocationContext, ServiceDescriptor};
    use serde_json::{json, Value};

    #[test]
    fn unit_http_method_defaults_to_post_for_unknown_or_missing_names() {
        assert_eq!(HttpMethod::from_name(None), HttpMethod::Post);
        assert_eq!(HttpMethod::from_name(Some("post")), HttpMethod::Post);
        assert_eq!(HttpMethod::from_name(Some("delete")), HttpMethod::Post);
        assert_eq!(HttpMethod::from_name(Some("")), HttpMethod::Post);
    }

    #[test]
    fn functional_http_method_matches_get_case_insensitively() {
        assert_eq!(HttpMethod::from_name(Some("get")), HttpMethod::Get);
        assert_eq!(HttpMethod::from_name(Some("GET")), HttpMethod::Get);
        assert_eq!(HttpMethod::from_name(Some(" Get ")), HttpMethod::Get);
    }

    #[test]
    fn unit_target_url_treats_blank_values_as_disabled() {
        let mut descriptor = ServiceDescriptor::new("tests", "run specs");
        assert_eq!(descriptor.target_url(), None);
        descriptor.url = Some("   ".to_string());
        assert_eq!(descriptor.target_url(), None);
        descriptor.url = Some(" http://tests.example.org ".to_string());
        assert_eq!(descriptor.target_url(), Some("http://tests.example.org"));
    }

    #[test]
    fn integration_descriptor_deserializes_with_documented_defaults() {
        let descriptor: ServiceDescriptor = serde_json::from_value(json!({
            "name": "tests",
            "url": "http://tests.example.org",
            "query_params": {"api_user_id": 51},
            "mapping": {"id": "issue_id"}
        }))
        .expect("descriptor");
        assert_eq!(descriptor.command, "");
        assert_eq!(descriptor.http_method(), HttpMethod::Post);
        assert!(descriptor.headers.is_empty());
        assert!(descriptor.data_from_issue.is_empty());
        assert!(!descriptor.silent);
        assert_eq!(descriptor.template_location(), None);
        assert_eq!(descriptor.query_params.get("api_user_id"), Some(&json!(51)));
    }

    #[test]
    fn regression_context_value_or_null_returns_null_for_missing_keys() {
        let context = InvocationContext::new().with("issue_id", 11);
        assert_eq!(context.value_or_null("issue_id"), json!(11));
        assert_eq!(context.value_or_null("missing"), Value::Null);
        assert_eq!(context.len(), 1);
    }
}
