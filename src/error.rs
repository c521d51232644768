use axum::http::StatusCode;
use axum::Json;

#[derive(Debug, thiserror::Error)]
pub enum CrmError {
    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,

    #[error("AI not configured (set ROLODEX_LLM_URL)")]
    AiNotConfigured,

    #[error("AI backend error: {0}")]
    AiBackend(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl CrmError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AiNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
            Self::AiBackend(_) | Self::Transcription(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl axum::response::IntoResponse for CrmError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
