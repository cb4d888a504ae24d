use crate::error::{LedgerError, ValidationErrors};
use crate::service::validation::codes;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Error body: `{"success": false, "code": ..., "message": ..., "errors": [...]}`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<ValidationErrors>,
}

impl ErrorResponse {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            success: false,
            code,
            message: message.into(),
            errors: None,
        }
    }
}

/// Map a sqlx error to status/code/message. Row-not-found is a 404, unique
/// violations (constraint names starting with `uq_`) a 409, the rest a 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, ErrorResponse) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("NOT_FOUND", "Resource not found"),
        ),
        sqlx::Error::Database(db_err)
            if db_err.code().as_deref() == Some("23505")
                && db_err.constraint().is_some_and(|c| c.starts_with("uq_")) =>
        {
            (
                StatusCode::CONFLICT,
                ErrorResponse::new(
                    "CONFLICT",
                    format!(
                        "Duplicate value violates unique constraint: {}",
                        db_err.constraint().unwrap_or("unknown")
                    ),
                ),
            )
        }
        other => {
            tracing::error!(error = %other, "database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new("INTERNAL_ERROR", format!("Database error: {}", other)),
            )
        }
    }
}

impl IntoResponse for LedgerError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            LedgerError::Validation(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse {
                    success: false,
                    code: "VALIDATION_ERROR",
                    message: errors.to_string(),
                    errors: Some(errors),
                },
            ),
            e @ LedgerError::NoRateConfigured { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new(codes::MISSING_RATE, e.to_string()),
            ),
            e @ LedgerError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ErrorResponse::new("NOT_FOUND", e.to_string()))
            }
            LedgerError::Forbidden(msg) => {
                (StatusCode::FORBIDDEN, ErrorResponse::new("FORBIDDEN", msg))
            }
            LedgerError::Database(err) => classify_sqlx_error(&err),
            e @ (LedgerError::Store(_) | LedgerError::Export(_)) => {
                tracing::error!(error = %e, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new("INTERNAL_ERROR", e.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}
