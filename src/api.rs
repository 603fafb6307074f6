use std::{
    net::SocketAddr,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    Json, Router,
    extract::{ConnectInfo, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    config::Config,
    error::ExecuteError,
    metrics::MetricsRegistry,
    models::{ExecuteRequest, ExecuteResponse, Language},
    ratelimit::ClientRateLimiter,
    runner::{CodeRunner, RunRequest},
};

#[derive(Clone)]
pub struct AppState {
    config: Config,
    runner: Arc<dyn CodeRunner>,
    metrics: Arc<MetricsRegistry>,
    rate_limiter: ClientRateLimiter,
}

pub fn routes(config: Config, runner: Arc<dyn CodeRunner>) -> Router {
    let rate_limiter = ClientRateLimiter::new(
        config.rate_limit_per_minute,
        config.rate_limit_burst,
        Duration::from_secs(config.rate_limit_idle_secs),
    );
    let state = AppState {
        config,
        runner,
        metrics: Arc::new(MetricsRegistry::new()),
        rate_limiter,
    };
    Router::new()
        .route("/execute", post(execute))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ))
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn(log_requests))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "ok": true }))
}

async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    (StatusCode::OK, state.metrics.render_prometheus())
}

async fn execute(
    State(state): State<AppState>,
    Json(request): Json<ExecuteRequest>,
) -> Result<Json<ExecuteResponse>, ExecuteError> {
    state.metrics.received();
    let result = run_submission(&state, request).await;
    match &result {
        Ok(_) => state.metrics.succeeded(),
        Err(ExecuteError::Timeout { .. }) => state.metrics.timed_out(),
        Err(
            ExecuteError::CodeRequired
            | ExecuteError::CodeTooLarge(_)
            | ExecuteError::UnsupportedLanguage(_),
        ) => state.metrics.rejected(),
        Err(_) => state.metrics.failed(),
    }
    result.map(Json)
}

async fn run_submission(
    state: &AppState,
    request: ExecuteRequest,
) -> Result<ExecuteResponse, ExecuteError> {
    let code = match request.code_text() {
        Some(code) => code.to_string(),
        None => return Err(ExecuteError::CodeRequired),
    };
    if code.len() > state.config.max_code_bytes {
        return Err(ExecuteError::CodeTooLarge(state.config.max_code_bytes));
    }
    let language: Language = request
        .language
        .parse()
        .map_err(|_| ExecuteError::UnsupportedLanguage(request.language.clone()))?;

    let id = Uuid::new_v4();
    tracing::info!(
        execution_id = %id,
        %language,
        code_bytes = code.len(),
        "executing submission"
    );

    let out = state
        .runner
        .run(RunRequest { id, language, code })
        .await?;

    if out.timed_out {
        return Err(ExecuteError::Timeout {
            budget_ms: state.config.timeout_ms(language),
        });
    }
    if out.exit_code != 0 {
        let message = if out.stderr.trim().is_empty() {
            format!("{language} execution failed")
        } else {
            out.stderr.trim_end().to_string()
        };
        return Err(ExecuteError::Runtime(message));
    }

    // interpreters append a trailing newline the caller never typed
    let mut output = out.stdout;
    if let Some(stripped) = output.strip_suffix('\n') {
        output = stripped.strip_suffix('\r').unwrap_or(stripped).to_string();
    }
    if output.is_empty() {
        output = "(no output)".to_string();
    }
    Ok(ExecuteResponse {
        success: true,
        output,
    })
}

async fn enforce_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ExecuteError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    if !state.rate_limiter.allow(&client).await {
        state.metrics.rejected();
        tracing::warn!(client = %client, "rate limit exceeded");
        return Err(ExecuteError::RateLimited);
    }
    Ok(next.run(request).await)
}

async fn log_requests(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    let started = Instant::now();
    tracing::info!(
        %request_id,
        %method,
        path = %path,
        client_ip = ?client_ip,
        "incoming request"
    );
    let response = next.run(request).await;
    tracing::info!(
        %request_id,
        %method,
        path = %path,
        status = %response.status(),
        latency_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );
    response
}
