use std::sync::Arc;

use async_trait::async_trait;
use axum_test::TestServer;
use serde_json::{Value, json};

use blockrun::{
    api,
    config::Config,
    error::ExecuteError,
    models::Language,
    runner::{CodeRunner, RunOutput, RunRequest},
};

enum StubBehavior {
    Output(RunOutput),
    Unavailable(Language),
}

struct StubRunner(StubBehavior);

#[async_trait]
impl CodeRunner for StubRunner {
    async fn run(&self, _request: RunRequest) -> Result<RunOutput, ExecuteError> {
        match &self.0 {
            StubBehavior::Output(output) => Ok(output.clone()),
            StubBehavior::Unavailable(language) => Err(ExecuteError::RuntimeUnavailable {
                language: *language,
            }),
        }
    }
}

fn output(stdout: &str, stderr: &str, exit_code: i32, timed_out: bool) -> RunOutput {
    RunOutput {
        stdout: stdout.to_string(),
        stderr: stderr.to_string(),
        exit_code,
        duration_ms: 5,
        timed_out,
    }
}

fn server_with(config: Config, behavior: StubBehavior) -> TestServer {
    TestServer::new(api::routes(config, Arc::new(StubRunner(behavior)))).unwrap()
}

fn server(behavior: StubBehavior) -> TestServer {
    server_with(Config::default(), behavior)
}

#[tokio::test]
async fn empty_code_is_rejected_without_execution() {
    let server = server(StubBehavior::Output(output("never runs", "", 0, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "", "language": "javascript" }))
        .await;
    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "code is required");
}

#[tokio::test]
async fn non_string_code_is_rejected_as_code_required() {
    let server = server(StubBehavior::Output(output("never runs", "", 0, false)));
    for code in [json!(42), json!(null), json!(["print(1)"])] {
        let response = server
            .post("/execute")
            .json(&json!({ "code": code, "language": "python" }))
            .await;
        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "code is required");
    }
}

#[tokio::test]
async fn missing_code_field_is_rejected() {
    let server = server(StubBehavior::Output(output("never runs", "", 0, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "language": "python" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "code is required");
}

#[tokio::test]
async fn unsupported_language_is_rejected() {
    let server = server(StubBehavior::Output(output("never runs", "", 0, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "puts 1", "language": "ruby" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["error"],
        "unsupported language: ruby"
    );
}

#[tokio::test]
async fn language_defaults_to_javascript() {
    let server = server(StubBehavior::Output(output("hi\n", "", 0, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "console.log('hi')" }))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["output"], "hi");
}

#[tokio::test]
async fn empty_output_substitutes_placeholder() {
    let server = server(StubBehavior::Output(output("", "", 0, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "1 + 1", "language": "javascript" }))
        .await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["output"], "(no output)");
}

#[tokio::test]
async fn timeout_maps_to_budget_message() {
    let server = server(StubBehavior::Output(output("", "", -1, true)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "while(true){}", "language": "javascript" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["error"],
        "execution timed out after 1200ms"
    );
}

#[tokio::test]
async fn nonzero_exit_reports_stderr_text() {
    let server = server(StubBehavior::Output(output(
        "",
        "SyntaxError: invalid syntax\n",
        1,
        false,
    )));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "print(", "language": "python" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["error"],
        "SyntaxError: invalid syntax"
    );
}

#[tokio::test]
async fn nonzero_exit_with_silent_stderr_gets_generic_message() {
    let server = server(StubBehavior::Output(output("", "", 3, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "import sys; sys.exit(3)", "language": "python" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "python execution failed");
}

#[tokio::test]
async fn missing_runtime_is_its_own_failure() {
    let server = server(StubBehavior::Unavailable(Language::Python));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "print(1)", "language": "python" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["error"],
        "python runtime is not available on this host"
    );
}

#[tokio::test]
async fn oversized_code_is_rejected_before_execution() {
    let config = Config {
        max_code_bytes: 64,
        ..Config::default()
    };
    let server = server_with(config, StubBehavior::Output(output("never", "", 0, false)));
    let response = server
        .post("/execute")
        .json(&json!({ "code": "x".repeat(65), "language": "python" }))
        .await;
    assert_eq!(response.status_code(), 400);
    assert_eq!(
        response.json::<Value>()["error"],
        "code exceeds the 64 byte limit"
    );
}

#[tokio::test]
async fn execute_is_rate_limited_per_client() {
    let config = Config {
        rate_limit_per_minute: 1,
        rate_limit_burst: 2,
        ..Config::default()
    };
    let server = server_with(config, StubBehavior::Output(output("ok\n", "", 0, false)));
    let body = json!({ "code": "1", "language": "javascript" });
    assert_eq!(server.post("/execute").json(&body).await.status_code(), 200);
    assert_eq!(server.post("/execute").json(&body).await.status_code(), 200);
    let limited = server.post("/execute").json(&body).await;
    assert_eq!(limited.status_code(), 429);
    assert_eq!(limited.json::<Value>()["error"], "rate limit exceeded");

    // health endpoint is not behind the limiter
    assert_eq!(server.get("/healthz").await.status_code(), 200);
}

#[tokio::test]
async fn metrics_reflect_outcomes() {
    let server = server(StubBehavior::Output(output("hi\n", "", 0, false)));
    let body = json!({ "code": "console.log('hi')", "language": "javascript" });
    server.post("/execute").json(&body).await;
    server
        .post("/execute")
        .json(&json!({ "code": "", "language": "javascript" }))
        .await;
    let rendered = server.get("/metrics").await.text();
    assert!(rendered.contains("execute_received_total 2"));
    assert!(rendered.contains("execute_succeeded_total 1"));
    assert!(rendered.contains("execute_rejected_total 1"));
}

#[tokio::test]
async fn health_endpoint_answers() {
    let server = server(StubBehavior::Output(output("", "", 0, false)));
    let response = server.get("/healthz").await;
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["ok"], true);
}
