//! HTTP API and browser UI
//!
//! | Route | |
//! |---|---|
//! | `GET /` | single-page UI |
//! | `GET /api/sessions` | session summaries |
//! | `GET /api/sessions/{id}` | full session |
//! | `GET /api/sessions/{id}/messages` | sliced timeline (`offset`, `limit`) |
//! | `GET /api/sessions/{id}/export` | download (`format`) |
//! | `GET /api/ai/status` | analysis availability |
//! | `POST /api/sessions/{id}/ai/*` | summarize, errors, improvements, chat |

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;

use crate::analysis::AnalysisCapability;
use crate::session::SessionRepository;

pub use error::ApiError;

/// Shared, read-only request state
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<SessionRepository>,
    pub analysis: AnalysisCapability,
}

impl AppState {
    pub fn new(repository: SessionRepository, analysis: AnalysisCapability) -> Self {
        Self {
            repository: Arc::new(repository),
            analysis,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions/{id}", get(handlers::get_session))
        .route("/api/sessions/{id}/messages", get(handlers::get_messages))
        .route("/api/sessions/{id}/export", get(handlers::export_session))
        .route("/api/ai/status", get(handlers::ai_status))
        .route("/api/sessions/{id}/ai/summarize", post(handlers::ai_summarize))
        .route("/api/sessions/{id}/ai/errors", post(handlers::ai_errors))
        .route("/api/sessions/{id}/ai/improvements", post(handlers::ai_improvements))
        .route("/api/sessions/{id}/ai/chat", post(handlers::ai_chat))
        .layer(middleware::from_fn(log_request))
        .with_state(state)
}

async fn log_request(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    response
}

/// Bind the listening socket
pub async fn bind(address: &str) -> Result<TcpListener> {
    TcpListener::bind(address)
        .await
        .with_context(|| format!("Failed to bind {}", address))
}

/// Serve until Ctrl-C
pub async fn serve(listener: TcpListener, state: AppState) -> Result<()> {
    let local: SocketAddr = listener.local_addr().context("Listener has no local address")?;
    tracing::info!(%local, "Session viewer listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::write_sample_sessions;

    #[tokio::test]
    async fn test_router_serves_index() {
        let temp = tempfile::TempDir::new().unwrap();
        write_sample_sessions(temp.path());
        let state = AppState::new(
            SessionRepository::open(temp.path()).unwrap(),
            AnalysisCapability::unavailable("off"),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, build_router(state)).await;
        });

        let body = reqwest::get(format!("http://{}/", addr))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert!(body.contains("Session Viewer"));

        server.abort();
    }
}
