use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Ledger error taxonomy.
///
/// Every variant maps to a stable machine-readable `code` so callers can
/// tell a structurally invalid request apart from one that is safe to
/// ignore. Transitions that are already in their target state are not
/// errors at all; they come back as successful responses with
/// `applied: false`.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Unknown plan tier or similar deployment bug. Fatal, never swallowed.
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("A referral already exists for this referrer/referred pair")]
    DuplicateReferral,
    #[error("Referrer has not accepted the current program terms")]
    NotAMember,
    #[error("Self-referral is not allowed")]
    SelfReferral,
    #[error("Invalid state transition: {0}")]
    InvalidState(String),
    #[error("Unknown user: no program membership on record")]
    UnknownUser,
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

impl LedgerError {
    /// Stable error code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::Configuration(_) => "configuration",
            LedgerError::DuplicateReferral => "duplicate_referral",
            LedgerError::NotAMember => "not_a_member",
            LedgerError::SelfReferral => "self_referral",
            LedgerError::InvalidState(_) => "invalid_state",
            LedgerError::UnknownUser => "unknown_user",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::BadRequest(_) => "bad_request",
            LedgerError::Internal(_) => "internal",
            LedgerError::Db(_) => "internal",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            LedgerError::Configuration(_) | LedgerError::Internal(_) | LedgerError::Db(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            LedgerError::DuplicateReferral | LedgerError::InvalidState(_) => StatusCode::CONFLICT,
            LedgerError::NotAMember => StatusCode::FORBIDDEN,
            LedgerError::SelfReferral => StatusCode::UNPROCESSABLE_ENTITY,
            LedgerError::UnknownUser | LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
            LedgerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": self.code(),
        }));

        (status, body).into_response()
    }
}
