//! HTTP service layer
//!
//! Thin axum wrapper over the crew engine:
//!
//! - `GET /health` - liveness
//! - `GET /agents` / `GET /tasks` - template listings
//! - `GET /crews` - available crew shapes
//! - `POST /run` - build and execute a crew
//! - `GET /history` / `GET /history/:id` - execution records
//!
//! The engine does the real work; handlers only validate, marshal JSON and
//! append to the history log.

use crate::config::Config;
use crate::crew::{CrewBuilder, CrewKind};
use crate::history::{ExecutionHistory, ExecutionRecord, ExecutionStatus};
use crate::runtime::{CrewRuntime, Executor, OpenAiRuntime, RuntimeError};
use crate::templates::TemplateStore;
use crate::tools;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Creates the runtime that executes a run, given the model name.
///
/// Injected so tests can swap the real OpenAI-backed runtime for a scripted
/// one.
pub type RuntimeFactory =
    dyn Fn(&str) -> Result<Arc<dyn CrewRuntime>, RuntimeError> + Send + Sync;

pub struct AppState {
    pub store: Arc<TemplateStore>,
    pub history: Arc<ExecutionHistory>,
    pub config: Config,
    runtime_factory: Box<RuntimeFactory>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<TemplateStore>) -> Self {
        let llm = config.llm.clone();
        Self {
            store,
            history: Arc::new(ExecutionHistory::new()),
            config,
            runtime_factory: Box::new(move |model| {
                let runtime = OpenAiRuntime::from_config(&llm, model, tools::create_registry())?;
                Ok(Arc::new(runtime) as Arc<dyn CrewRuntime>)
            }),
        }
    }

    /// Swap the runtime factory (used by tests).
    pub fn with_runtime_factory(mut self, factory: Box<RuntimeFactory>) -> Self {
        self.runtime_factory = factory;
        self
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/agents", get(list_agents))
        .route("/tasks", get(list_tasks))
        .route("/crews", get(list_crews))
        .route("/run", post(run_crew))
        .route("/history", get(get_history))
        .route("/history/:id", get(get_execution))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<AppState>) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.server.host, state.config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "muster",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn list_agents(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "agents": state.store.agent_summaries(),
    }))
}

async fn list_tasks(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "tasks": state.store.task_summaries(),
    }))
}

async fn list_crews() -> Json<serde_json::Value> {
    let crews: Vec<serde_json::Value> = [
        CrewKind::Research,
        CrewKind::Analysis,
        CrewKind::Full,
        CrewKind::Custom,
    ]
    .iter()
    .map(|kind| {
        json!({
            "id": kind.as_str(),
            "name": kind.display_name(),
            "description": kind.description(),
            "agents": kind.agent_ids(),
        })
    })
    .collect();

    Json(json!({"success": true, "crews": crews}))
}

#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub topic: String,
    pub crew_type: Option<String>,
    pub model: Option<String>,
    #[serde(default)]
    pub agents: Vec<String>,
    #[serde(default)]
    pub tasks: Vec<String>,
    pub document_context: Option<String>,
}

async fn run_crew(State(state): State<Arc<AppState>>, Json(req): Json<RunRequest>) -> Response {
    let topic = req.topic.trim().to_string();
    if topic.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Topic is required");
    }

    // Unknown selectors and custom requests without both lists fall back to
    // the research crew (documented default, not an error).
    let mut kind = CrewKind::from_selector(req.crew_type.as_deref().unwrap_or("research"));
    if kind == CrewKind::Custom && (req.agents.is_empty() || req.tasks.is_empty()) {
        kind = CrewKind::Research;
    }

    let model = req
        .model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| state.config.llm.model.clone());

    let mut builder = CrewBuilder::new(state.store.clone(), model.as_str());
    if let Some(documents) = req.document_context {
        builder = builder.with_document_context(documents);
    }

    let crew = match kind {
        CrewKind::Research => builder.research_crew(&topic),
        CrewKind::Analysis => builder.analysis_crew(&topic),
        CrewKind::Full => builder.full_crew(&topic),
        CrewKind::Custom => builder.custom_crew(&topic, &req.agents, &req.tasks),
    };
    let crew = match crew {
        Ok(crew) => crew,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    let runtime = match (state.runtime_factory)(builder.model()) {
        Ok(runtime) => runtime,
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    let execution_id = ExecutionRecord::new_id();
    info!(id = %execution_id, crew = kind.as_str(), %topic, "starting crew run");

    let started_at = Utc::now();
    let outcome = Executor::new(runtime).run(&crew, None).await;
    let completed_at = Utc::now();
    let duration_seconds = (completed_at - started_at).num_milliseconds() as f64 / 1000.0;

    let (result, status) = match &outcome {
        Ok(text) => (text.clone(), ExecutionStatus::Completed),
        Err(e) => (e.to_string(), ExecutionStatus::Failed),
    };
    state.history.append(ExecutionRecord {
        id: execution_id.clone(),
        topic,
        crew_type: kind.as_str().to_string(),
        model,
        started_at,
        completed_at,
        duration_seconds,
        result: result.clone(),
        status,
    });

    match outcome {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "execution_id": execution_id,
                "result": result,
                "duration_seconds": duration_seconds,
            })),
        )
            .into_response(),
        Err(e) => {
            error!(id = %execution_id, error = %e, "crew run failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    10
}

async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "executions": state.history.recent(query.limit),
    }))
}

async fn get_execution(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.history.get(&id) {
        Some(execution) => Json(json!({"success": true, "execution": execution})).into_response(),
        None => error_response(StatusCode::NOT_FOUND, "Execution not found"),
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "error": message}))).into_response()
}
