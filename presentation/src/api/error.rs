//! API error responses

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::{error, warn};
use verdict_application::{JudgeError, RunConsensusError, RunDebateError};

#[derive(Debug)]
pub enum ApiError {
    /// Validation failure; no backend was called
    BadRequest(String),
    /// The tier may not use the requested backend
    Forbidden(String),
    Internal {
        message: String,
        stage: Option<String>,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RunConsensusError> for ApiError {
    fn from(error: RunConsensusError) -> Self {
        match error {
            RunConsensusError::Invalid(e) => ApiError::BadRequest(e.to_string()),
            RunConsensusError::Billing(e) => ApiError::Forbidden(e.to_string()),
        }
    }
}

impl From<RunDebateError> for ApiError {
    fn from(error: RunDebateError) -> Self {
        match error {
            RunDebateError::Invalid(e) => ApiError::BadRequest(e.to_string()),
            RunDebateError::Billing(e) | RunDebateError::Verdict(JudgeError::Billing(e)) => {
                ApiError::Forbidden(e.to_string())
            }
            other => ApiError::Internal {
                stage: other.stage().map(|s| s.label()),
                message: other.to_string(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::BadRequest(message) | ApiError::Forbidden(message) => {
                warn!(status = status.as_u16(), "Request rejected: {}", message);
                json!({ "error": message })
            }
            ApiError::Internal { message, stage } => {
                error!(stage = ?stage, "Request failed: {}", message);
                json!({ "error": message, "stage": stage })
            }
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verdict_domain::DomainError;

    #[test]
    fn test_consensus_error_status() {
        let err: ApiError = RunConsensusError::Invalid(DomainError::MissingPrompt).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err: ApiError =
            RunConsensusError::Billing(DomainError::BillingInvariantViolation("pro".into())).into();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_debate_errors_are_internal() {
        let err: ApiError = RunDebateError::Invalid(DomainError::MissingPrompt).into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        let err: ApiError = RunDebateError::Verdict(JudgeError::NoResponses).into();
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
