use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::service_descriptor::{HttpMethod, InvocationContext, ServiceDescriptor};

const CONTENT_TYPE_HEADER: &str = "Content-Type";
const ACCEPT_HEADER: &str = "Accept";
const JSON_MEDIA_TYPE: &str = "application/json";

#[derive(Debug, Clone, PartialEq)]
/// Fully resolved outbound request for one invocation.
pub struct ServiceRequest {
    pub method: HttpMethod,
    pub url: String,
    pub parameters: Map<String, Value>,
    pub headers: BTreeMap<String, String>,
}

impl ServiceRequest {
    /// JSON object body sent with non-GET requests.
    pub fn json_body(&self) -> String {
        Value::Object(self.parameters.clone()).to_string()
    }

    /// Query pairs sent with GET requests.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.parameters
            .iter()
            .map(|(key, value)| (key.clone(), query_value_text(value)))
            .collect()
    }
}

/// Builds the outbound request, or `None` when the descriptor has no URL.
pub fn build_service_request(
    descriptor: &ServiceDescriptor,
    context: &InvocationContext,
) -> Option<ServiceRequest> {
    let url = descriptor.target_url()?;
    Some(ServiceRequest {
        method: descriptor.http_method(),
        url: url.to_string(),
        parameters: merge_request_parameters(descriptor, context),
        headers: build_request_headers(descriptor),
    })
}

/// Merges static query params, verbatim context copies and mapped context
/// values. Later sources win on key collision.
pub fn merge_request_parameters(
    descriptor: &ServiceDescriptor,
    context: &InvocationContext,
) -> Map<String, Value> {
    let mut parameters = descriptor.query_params.clone();
    for key in &descriptor.data_from_issue {
        parameters.insert(key.clone(), context.value_or_null(key));
    }
    for (parameter, context_key) in &descriptor.mapping {
        parameters.insert(parameter.clone(), context.value_or_null(context_key));
    }
    parameters
}

pub fn build_request_headers(descriptor: &ServiceDescriptor) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    headers.insert(CONTENT_TYPE_HEADER.to_string(), JSON_MEDIA_TYPE.to_string());
    headers.insert(ACCEPT_HEADER.to_string(), JSON_MEDIA_TYPE.to_string());
    for (name, value) in &descriptor.headers {
        // header names are case-insensitive on the wire
        headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        headers.insert(name.clone(), value.clone());
    }
    headers
}

fn query_value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
