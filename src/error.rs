use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::dto::{ErrorBody, ErrorResponse};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    /// Read failed; callers that hold a previous result keep serving it.
    #[error("Could not load {what}: {source}")]
    Fetch {
        what: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Write failed; nothing was stored and the client keeps its input.
    #[error("Could not save {what}: {source}")]
    Save {
        what: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Nothing to export: {0}")]
    NothingToExport(String),

    #[error("Account deletion failed: {source}")]
    AccountDeletion {
        support_contact: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation_failed",
            AppError::RateLimited => "rate_limited",
            AppError::Fetch { .. } => "fetch_failed",
            AppError::Save { .. } => "save_failed",
            AppError::NothingToExport(_) => "nothing_to_export",
            AppError::AccountDeletion { .. } => "account_deletion_failed",
            AppError::Database(_) | AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) | AppError::NothingToExport(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Fetch { .. } | AppError::Save { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::AccountDeletion { .. }
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing body. Backend details are logged, never returned.
    pub fn body(&self) -> ErrorBody {
        let status = self.status();
        let (message, details) = match self {
            AppError::Unauthorized | AppError::RateLimited => (self.to_string(), None),
            AppError::NotFound(msg)
            | AppError::Validation(msg)
            | AppError::NothingToExport(msg) => (msg.clone(), None),
            AppError::Fetch { what, .. } => (
                format!("We couldn't load your {what} right now. Please try again."),
                None,
            ),
            AppError::Save { what, .. } => (
                format!("We couldn't save your {what}. Your input has not been lost; please try again."),
                None,
            ),
            AppError::AccountDeletion {
                support_contact, ..
            } => (
                format!(
                    "We couldn't delete your account data. Nothing was removed. Please contact {support_contact}."
                ),
                Some(json!({
                    "support_contact": support_contact,
                    "sign_out": true,
                })),
            ),
            AppError::Database(_) | AppError::Internal(_) => ("Internal server error".into(), None),
        };

        ErrorBody {
            code: self.code().to_string(),
            message,
            status: status.as_u16(),
            details,
        }
    }
}

impl AppError {
    pub fn log(&self) {
        match self {
            AppError::Fetch { what, source } => {
                tracing::warn!(error = %source, what = *what, "Read failed");
            }
            AppError::Save { what, source } => {
                tracing::error!(error = %source, what = *what, "Write failed");
            }
            AppError::AccountDeletion { source, .. } => {
                tracing::error!(error = %source, "Account deletion rolled back");
            }
            AppError::Database(e) => tracing::error!(error = %e, "Database error"),
            AppError::Internal(e) => tracing::error!(error = %e, "Internal error"),
            _ => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = ErrorResponse { error: self.body() };
        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
