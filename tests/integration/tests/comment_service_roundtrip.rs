use std::sync::Arc;

use herald_commands::{
    CommandDispatcher, CommandTable, FileIssueDocument, IssueEvent, RecordingResponder,
    EVENT_ISSUE_COMMENT_CREATED,
};
use herald_external_service::{
    ExternalServiceInvoker, FsTemplateSource, ReqwestTransport, ReqwestTransportConfig,
    ServiceDescriptor,
};
use httpmock::prelude::*;
use serde_json::json;

const ISSUE_BODY: &str = "**Reviewer 1:** <!--reviewer-1-->Pending<!--end-reviewer-1-->\n\
**Repository:** <!--target-repository-->https://github.com/openjournals/paper<!--end-target-repository-->\n";

struct Workspace {
    _temp: tempfile::TempDir,
    issue_path: std::path::PathBuf,
    dispatcher: CommandDispatcher,
    responder: Arc<RecordingResponder>,
}

fn workspace(services: Vec<ServiceDescriptor>) -> Workspace {
    let temp = tempfile::tempdir().expect("tempdir");
    let issue_path = temp.path().join("issue.md");
    std::fs::write(&issue_path, ISSUE_BODY).expect("write issue body");
    let templates_dir = temp.path().join("templates");
    std::fs::create_dir_all(&templates_dir).expect("templates dir");
    std::fs::write(
        templates_dir.join("coverage_reply.md"),
        "Coverage for {{repository}}: **{{coverage}}%**",
    )
    .expect("write template");

    let transport = ReqwestTransport::new(ReqwestTransportConfig {
        request_timeout_ms: 5_000,
        ..ReqwestTransportConfig::default()
    })
    .expect("transport");
    let invoker = ExternalServiceInvoker::new(Arc::new(transport))
        .with_template_source(Arc::new(FsTemplateSource::new(templates_dir)));
    let responder = Arc::new(RecordingResponder::new());
    let dispatcher = CommandDispatcher::new(
        CommandTable::new("botsci", &services).expect("command table"),
        invoker,
        Arc::new(FileIssueDocument::new(&issue_path)),
        responder.clone(),
    );
    Workspace {
        _temp: temp,
        issue_path,
        dispatcher,
        responder,
    }
}

fn comment(text: &str) -> IssueEvent {
    IssueEvent {
        category: EVENT_ISSUE_COMMENT_CREATED.to_string(),
        text: text.to_string(),
        sender: "editor1".to_string(),
        issue_id: 11,
        repo: "openjournals/tests".to_string(),
    }
}

#[tokio::test]
async fn integration_service_command_posts_issue_data_and_renders_template_reply() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(POST)
            .path("/coverage")
            .header("x-auth", "secret-token")
            .json_body(json!({
                "api_user_id": 51,
                "target-repository": "https://github.com/openjournals/paper",
                "issue": 11,
                "requested_by": "editor1"
            }));
        then.status(200)
            .body(r#"{"repository":"openjournals/paper","coverage":99}"#);
    });

    let mut coverage = ServiceDescriptor::new("coverage", "check coverage");
    coverage.url = Some(server.url("/coverage"));
    coverage.headers.insert("X-Auth".to_string(), "secret-token".to_string());
    coverage.query_params.insert("api_user_id".to_string(), json!(51));
    coverage.data_from_issue = vec!["target-repository".to_string()];
    coverage.mapping.insert("issue".to_string(), "issue_id".to_string());
    coverage.mapping.insert("requested_by".to_string(), "sender".to_string());
    coverage.template_file = Some("coverage_reply.md".to_string());

    let workspace = workspace(vec![coverage]);
    let report = workspace
        .dispatcher
        .dispatch(&comment("@botsci check coverage"))
        .await
        .expect("dispatch");

    mock.assert();
    assert_eq!(report.handled.len(), 1);
    assert_eq!(
        workspace.responder.replies(),
        vec!["Coverage for openjournals/paper: **99%**"]
    );
}

#[tokio::test]
async fn integration_failed_service_replies_with_unavailable_message_only() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/tests").query_param("id", "11");
        then.status(503).body("upstream exploded: stack trace");
    });

    let mut tests = ServiceDescriptor::new("tests", "run specs");
    tests.url = Some(server.url("/tests"));
    tests.method = Some("GET".to_string());
    tests.mapping.insert("id".to_string(), "issue_id".to_string());

    let workspace = workspace(vec![tests]);
    workspace
        .dispatcher
        .dispatch(&comment("@botsci run specs."))
        .await
        .expect("dispatch");

    assert_eq!(
        workspace.responder.replies(),
        vec!["Error (503). The tests service is currently unavailable"]
    );
}

#[tokio::test]
async fn integration_assign_reviewer_updates_issue_file_without_calling_services() {
    // any request to this port would fail the dispatch with a transport error
    let mut tests = ServiceDescriptor::new("tests", "run specs");
    tests.url = Some("http://127.0.0.1:9/tests".to_string());

    let workspace = workspace(vec![tests]);
    let report = workspace
        .dispatcher
        .dispatch(&comment("@botsci assign @arfon as reviewer 1"))
        .await
        .expect("dispatch");

    assert_eq!(report.handled.len(), 1);
    assert_eq!(report.handled[0].command, "assign_reviewer_n");
    assert_eq!(workspace.responder.replies(), vec!["Reviewer 1 assigned!"]);
    let body = std::fs::read_to_string(&workspace.issue_path).expect("read issue body");
    assert!(body.contains("<!--reviewer-1-->@arfon<!--end-reviewer-1-->"));
    assert!(body.contains("<!--target-repository-->https://github.com/openjournals/paper"));
}

#[tokio::test]
async fn integration_unmatched_comment_is_ignored_silently() {
    let workspace = workspace(Vec::new());
    let report = workspace
        .dispatcher
        .dispatch(&comment("@botsci please do something unknown"))
        .await
        .expect("dispatch");
    assert!(report.is_ignored());
    assert!(workspace.responder.replies().is_empty());
    assert_eq!(
        std::fs::read_to_string(&workspace.issue_path).expect("read issue body"),
        ISSUE_BODY
    );
}
