//! HTTP error responses
//!
//! Every failure leaves the API as a status code plus `{"detail": "..."}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::core::ViewerError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, detail)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, detail)
    }

    pub fn session_not_found() -> Self {
        Self::not_found("Session not found")
    }
}

impl From<ViewerError> for ApiError {
    fn from(err: ViewerError) -> Self {
        let status = match &err {
            ViewerError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ViewerError::AnalysisUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            e if e.is_invalid_argument() => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(format!("{:#}", err))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::internal(format!("Background task failed: {}", err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "{}", self.detail);
        }
        (self.status, Json(serde_json::json!({ "detail": self.detail }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ViewerError::SessionNotFound("x".into()), StatusCode::NOT_FOUND),
            (ViewerError::UnsupportedFormat("bogus".into()), StatusCode::BAD_REQUEST),
            (
                ViewerError::AnalysisUnavailable("no model".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (ViewerError::other("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_unsupported_format_detail() {
        let err = ApiError::from(ViewerError::UnsupportedFormat("bogus".into()));
        assert!(err.detail.contains("Unsupported format: bogus"));
    }

    #[test]
    fn test_anyhow_is_internal() {
        let err = ApiError::from(anyhow::anyhow!("provider down"));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.detail, "provider down");
    }
}
