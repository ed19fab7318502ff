use std::sync::Arc;

use herald_external_service::{
    raw_content_templates_base_url, ExternalServiceInvoker, HttpTemplateSource,
    InvocationContext, ReqwestTransport, ReqwestTransportConfig, ServiceDescriptor,
    SuppressReason, ServiceReply, TemplateSource,
};
use httpmock::prelude::*;
use serde_json::json;

fn transport() -> Arc<ReqwestTransport> {
    Arc::new(
        ReqwestTransport::new(ReqwestTransportConfig {
            request_timeout_ms: 5_000,
            ..ReqwestTransportConfig::default()
        })
        .expect("transport should be created"),
    )
}

fn issue_context() -> InvocationContext {
    InvocationContext::new()
        .with("bot_name", "botsci")
        .with("issue_id", 11)
        .with("repo", "openjournals/tests")
        .with("sender", "editor1")
}

fn descriptor_for(url: String) -> ServiceDescriptor {
    let mut descriptor = ServiceDescriptor::new("tests", "run specs");
    descriptor.url = Some(url);
    descriptor
}

#[tokio::test]
async fn integration_reqwest_transport_posts_json_body_with_json_headers() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/run")
            .header("content-type", "application/json")
            .header("accept", "application/json")
            .header("x-auth", "secret-token")
            .json_body(json!({
                "extra_param": "testing",
                "repo": "openjournals/tests",
                "id": 11
            }));
        then.status(200).body("Tests suite OK, build passed");
    });

    let mut descriptor = descriptor_for(server.url("/run"));
    descriptor.query_params = json!({"extra_param": "testing"})
        .as_object()
        .cloned()
        .expect("object");
    descriptor.data_from_issue = vec!["repo".to_string()];
    descriptor
        .mapping
        .insert("id".to_string(), "issue_id".to_string());
    descriptor
        .headers
        .insert("X-Auth".to_string(), "secret-token".to_string());

    let reply = ExternalServiceInvoker::new(transport())
        .invoke(&descriptor, &issue_context())
        .await
        .expect("invoke should succeed");

    mock.assert();
    assert_eq!(reply.message(), Some("Tests suite OK, build passed"));
}

#[tokio::test]
async fn integration_reqwest_transport_sends_get_parameters_as_query() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/status")
            .query_param("id", "11")
            .query_param("user", "botsci");
        then.status(200).body("[\"### Test Coverage Results\\n99%\"]");
    });

    let mut descriptor = descriptor_for(server.url("/status"));
    descriptor.method = Some("GET".to_string());
    descriptor
        .mapping
        .insert("id".to_string(), "issue_id".to_string());
    descriptor
        .mapping
        .insert("user".to_string(), "bot_name".to_string());

    let reply = ExternalServiceInvoker::new(transport())
        .invoke(&descriptor, &issue_context())
        .await
        .expect("invoke should succeed");

    mock.assert();
    assert_eq!(reply.message(), Some("### Test Coverage Results\n99%"));
}

#[tokio::test]
async fn integration_reqwest_transport_maps_server_errors_to_unavailable_reply() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/run");
        then.status(500).body("internal failure details");
    });

    let reply = ExternalServiceInvoker::new(transport())
        .invoke(&descriptor_for(server.url("/run")), &issue_context())
        .await
        .expect("invoke should succeed");

    mock.assert();
    assert_eq!(
        reply,
        ServiceReply::Message("Error (500). The tests service is currently unavailable".to_string())
    );
}

#[tokio::test]
async fn integration_http_template_source_renders_remote_template() {
    let server = MockServer::start();
    let template_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/openjournals/tests/main/.herald/templates/test_service_reply.md");
        then.status(200).body("Tests {{result}}");
    });
    let service_mock = server.mock(|when, then| {
        when.method(POST).path("/run");
        then.status(200).body(r#"{"result":"passed"}"#);
    });

    let base_url = raw_content_templates_base_url(
        &server.base_url(),
        "openjournals/tests",
        "main",
        ".herald/templates",
    );
    let templates =
        Arc::new(HttpTemplateSource::new(base_url, 5_000).expect("template source"));
    let mut descriptor = descriptor_for(server.url("/run"));
    descriptor.template_file = Some("test_service_reply.md".to_string());

    let reply = ExternalServiceInvoker::new(transport())
        .with_template_source(templates)
        .invoke(&descriptor, &issue_context())
        .await
        .expect("invoke should succeed");

    service_mock.assert();
    template_mock.assert();
    assert_eq!(reply.message(), Some("Tests passed"));
}

#[tokio::test]
async fn regression_http_template_source_reports_missing_templates() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/templates/missing.md");
        then.status(404).body("not found");
    });

    let templates = HttpTemplateSource::new(server.url("/templates/"), 5_000)
        .expect("template source");
    let error = templates
        .fetch_template("missing.md")
        .await
        .expect_err("missing template should fail");
    assert_eq!(error.reason_code(), "external_service_template_fetch_failed");
    assert!(error.to_string().contains("404"), "{error}");
}

#[tokio::test]
async fn regression_silent_service_still_calls_endpoint_but_stays_quiet() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST).path("/run");
        then.status(400).body("bad request");
    });

    let mut descriptor = descriptor_for(server.url("/run"));
    descriptor.silent = true;
    let reply = ExternalServiceInvoker::new(transport())
        .invoke(&descriptor, &issue_context())
        .await
        .expect("invoke should succeed");

    mock.assert();
    assert_eq!(reply, ServiceReply::Suppressed(SuppressReason::Silent));
}
