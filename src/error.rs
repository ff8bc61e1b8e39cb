use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to load review guidelines: {0}")]
    Guidelines(String),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required config: {0}")]
    MissingRequired(String),

    #[error("invalid value for {0}")]
    InvalidValue(String),
}

/// Errors from a chat model invocation.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("AI model request timed out after {0} seconds")]
    Timeout(u64),

    #[error("rate limit exceeded: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl LlmError {
    /// Human-readable failure category attached to a degraded file outcome.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Timeout(_) => {
                "AI model request timed out - the service may be experiencing high load"
            }
            Self::Network(e) if e.is_timeout() => "Network timeout connecting to AI service",
            Self::Network(e) if e.is_connect() => "Connection refused by AI service",
            _ => "AI analysis failed",
        }
    }
}

/// Errors from the repository host API.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("host API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("unexpected host response: {0}")]
    InvalidResponse(String),
}

/// Errors that abort an entire review pass before any file is processed.
#[derive(Debug, Error)]
pub enum PassError {
    #[error("repository {0} not found")]
    RepositoryNotFound(String),

    #[error("pull request has no iterations")]
    NoIterations,

    #[error(transparent)]
    Host(#[from] HostError),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Guidelines(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let code = match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Config(_) => "CONFIG_ERROR",
            ApiError::Guidelines(_) => "GUIDELINE_ERROR",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
        };
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        })
    }
}
