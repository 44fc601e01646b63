//! Route handlers
//!
//! Repository calls touch the filesystem, so they run on the blocking pool.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderValue};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use super::error::ApiError;
use super::AppState;
use crate::analysis::ChatTurn;
use crate::export::{self, ExportFormat};
use crate::session::{MessagePage, SessionRecord};

const INDEX_HTML: &str = include_str!("../../static/index.html");

type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn list_sessions(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let repository = state.repository.clone();
    let sessions = tokio::task::spawn_blocking(move || repository.list_sessions()).await?;
    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let session = load_session(&state, session_id).await?;
    Ok(Json(json!({ "success": true, "session": &*session })))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(page): Query<MessagePage>,
) -> ApiResult<Json<Value>> {
    let repository = state.repository.clone();
    let messages =
        tokio::task::spawn_blocking(move || repository.get_messages(&session_id, page)).await?;
    Ok(Json(json!({ "success": true, "messages": messages })))
}

pub async fn export_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ExportQuery>,
) -> ApiResult<Response> {
    let session = load_session(&state, session_id.clone()).await?;

    let format: ExportFormat = query
        .format
        .as_deref()
        .unwrap_or(ExportFormat::Markdown.name())
        .parse()?;
    let body = export::format_session(&session, format)?;
    let filename = export::export_filename(&session_id, format);

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", filename))
        .map_err(|e| ApiError::internal(format!("Invalid export filename: {}", e)))?;

    tracing::info!(%session_id, format = %format, "Exported session");

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn ai_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.analysis.status())
}

pub async fn ai_summarize(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let analyzer = state.analysis.analyzer()?;
    let session = load_session(&state, session_id).await?;
    let summary = analyzer.summarize_session(session).await?;
    Ok(Json(json!({ "success": true, "summary": summary })))
}

pub async fn ai_errors(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let analyzer = state.analysis.analyzer()?;
    let session = load_session(&state, session_id).await?;
    let analysis = analyzer.analyze_errors(session).await?;
    Ok(Json(json!({ "success": true, "analysis": analysis })))
}

pub async fn ai_improvements(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Json<Value>> {
    let analyzer = state.analysis.analyzer()?;
    let session = load_session(&state, session_id).await?;
    let suggestions = analyzer.suggest_improvements(session).await?;
    Ok(Json(json!({ "success": true, "suggestions": suggestions })))
}

pub async fn ai_chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<Value>> {
    let analyzer = state.analysis.analyzer()?;
    if request.question.trim().is_empty() {
        return Err(ApiError::bad_request("Question must not be empty"));
    }

    let session = load_session(&state, session_id).await?;
    let answer = analyzer
        .answer_question(session, &request.question, &request.history)
        .await?;
    Ok(Json(json!({ "success": true, "answer": answer })))
}

async fn load_session(state: &AppState, session_id: String) -> ApiResult<Arc<SessionRecord>> {
    let repository = state.repository.clone();
    tokio::task::spawn_blocking(move || repository.get_session(&session_id))
        .await?
        .map(Arc::new)
        .ok_or_else(ApiError::session_not_found)
}
