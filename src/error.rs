use axum::{http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;

use crate::analysis::AnalysisStage;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    #[error("Upstream request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream {url} returned status {status}")]
    UpstreamStatus { status: u16, url: String },

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed game record: {0}")]
    MalformedRecord(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Any failure inside the analysis pipeline, tagged with the stage it aborted.
    #[error("Failed to analyze props: {source}")]
    Analysis {
        stage: AnalysisStage,
        #[source]
        source: Box<AppError>,
    },
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// True for transport failures and non-success upstream statuses.
    pub fn is_upstream(&self) -> bool {
        matches!(self, AppError::Http(_) | AppError::UpstreamStatus { .. })
    }

    /// The innermost error, looking through `Analysis` wrappers.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::Analysis { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self.root() {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PlayerNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Http(_)
            | AppError::UpstreamStatus { .. }
            | AppError::Json(_)
            | AppError::MalformedRecord(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped(inner: AppError) -> AppError {
        AppError::Analysis {
            stage: AnalysisStage::Start,
            source: Box::new(inner),
        }
    }

    #[test]
    fn analysis_wrapper_carries_cause_message() {
        let err = wrapped(AppError::PlayerNotFound("Nobody".to_string()));
        assert_eq!(err.to_string(), "Failed to analyze props: Player not found: Nobody");
    }

    #[test]
    fn status_code_follows_root_cause() {
        assert_eq!(
            wrapped(AppError::PlayerNotFound("x".into())).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            wrapped(AppError::InvalidRequest("x".into())).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            wrapped(AppError::UpstreamStatus { status: 503, url: "u".into() }).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Config("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn upstream_status_is_upstream() {
        assert!(AppError::UpstreamStatus { status: 500, url: "u".into() }.is_upstream());
        assert!(!AppError::PlayerNotFound("x".into()).is_upstream());
    }
}
