use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use aws_smithy_types::error::operation::BuildError as SmithyBuildError;
use thiserror::Error; // Use thiserror for cleaner error definitions

use crate::html;

// --- Domain/Infrastructure Errors ---

#[derive(Error, Debug)]
pub enum RepoError {
    #[error("A prompt with slug '{0}' already exists")]
    DuplicateSlug(String),

    #[error("Stored prompt data is corrupt: {0}")]
    DataCorruption(String),

    #[error("Database backend error: {0}")]
    BackendError(#[from] anyhow::Error), // Wrap Anyhow errors from DB layer
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Identity token rejected: {0}")]
    InvalidToken(String),

    #[error("Identity provider error: {0}")]
    Backend(#[from] anyhow::Error),
}

// --- Web Layer Error ---

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Could not reach the identity provider")]
    Identity(#[source] AuthError),

    // Configuration / Startup errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Initialization error: {0}")]
    InitError(String),

    // Generic Internal Server Error
    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        AppError::Identity(err)
    }
}

impl From<crate::config::ConfigError> for AppError {
    fn from(err: crate::config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<SmithyBuildError> for AppError {
    fn from(err: SmithyBuildError) -> Self {
        AppError::InitError(format!("Failed to build DynamoDB request: {}", err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalServerError(format!("IO error: {}", err))
    }
}

// --- Axum Response Implementation ---

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Identity(e) => {
                tracing::error!(error.source = ?e, "Identity provider error occurred");
                (StatusCode::BAD_GATEWAY, "Login failed, please try again.".to_string())
            }
            AppError::ConfigError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error".to_string())
            }
            AppError::InitError(msg) => {
                tracing::error!("Initialization error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server initialization error".to_string())
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "An internal server error occurred".to_string())
            }
        };

        tracing::error!(error.message = %error_message, error.detail = %self, "Responding with error");

        (status, Html(html::error_page(status, &error_message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_error_maps_to_bad_gateway() {
        let err: AppError = AuthError::Backend(anyhow::anyhow!("connection refused")).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_duplicate_slug_message_names_slug() {
        let err = RepoError::DuplicateSlug("diwali-portrait".into());
        assert_eq!(err.to_string(), "A prompt with slug 'diwali-portrait' already exists");
    }
}
