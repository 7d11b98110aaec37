use crate::error::stack_trace;
use crate::models::ScrapeResult;
use crate::orchestrator::ScrapeOrchestrator;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::task::JoinError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::error;

pub type SharedOrchestrator = Arc<ScrapeOrchestrator>;

#[derive(Debug, Serialize)]
struct ServiceInfo {
    message: &'static str,
    endpoints: Vec<&'static str>,
}

/// Failure of the scrape task itself, as opposed to an error envelope
#[derive(Debug)]
pub struct FacadeError {
    error: String,
    stack_trace: String,
}

impl From<JoinError> for FacadeError {
    fn from(err: JoinError) -> Self {
        let stack_trace = stack_trace(&err, false);
        let error = if err.is_panic() {
            let payload = err.into_panic();
            payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "scrape task panicked".to_string())
        } else {
            err.to_string()
        };
        Self { error, stack_trace }
    }
}

impl IntoResponse for FacadeError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.error, "stack_trace": self.stack_trace }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

pub fn router(orchestrator: SharedOrchestrator) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/scrape", get(scrape))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(orchestrator)
}

async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "Welcome to the Oddschecker scraper",
        endpoints: vec!["/scrape"],
    })
}

/// Runs a whole browser scrape on the blocking pool and returns its envelope
async fn scrape(
    State(orchestrator): State<SharedOrchestrator>,
) -> Result<Json<ScrapeResult>, FacadeError> {
    let result = tokio::task::spawn_blocking(move || orchestrator.scrape())
        .await
        .map_err(|e| {
            error!("SCRAPER ERROR: {:?}", e);
            FacadeError::from(e)
        })?;
    Ok(Json(result))
}
