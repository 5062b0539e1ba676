use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The first three variants are applicant mistakes; the form handler turns them
/// into flash messages instead of returning them.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("All fields except Resume/Experience are required (missing: {0}).")]
    MissingField(&'static str),

    #[error("Please upload a resume or enter your experience.")]
    MissingQualification,

    #[error("This email, phone, or WhatsApp number is already registered.")]
    DuplicateApplicant,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Application store is corrupt: {0}")]
    CorruptStore(String),

    #[error("Failed to write {}: {source}", .path.display())]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// True for errors caused by what the applicant typed, which are reported
    /// back on the form rather than failing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingField(_) | AppError::MissingQualification | AppError::DuplicateApplicant
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingField(_)
            | AppError::MissingQualification
            | AppError::DuplicateApplicant => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                self.to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::CorruptStore(msg) => {
                tracing::error!("Corrupt application store: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "The application store could not be read".to_string(),
                )
            }
            AppError::FileWrite { path, source } => {
                tracing::error!("File write failed for {}: {source}", path.display());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "FILE_WRITE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "TEMPLATE_ERROR",
                    "The page could not be rendered".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
