// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid identity credential: {0}")]
    InvalidCredential(String),

    #[error("Identity token expired")]
    TokenExpired,

    #[error("Identity token is missing required claims: {0}")]
    MissingClaims(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Slot is already booked")]
    AlreadyBooked,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable code used in error bodies and booking reports.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "unauthorized",
            AppError::InvalidToken => "invalid_token",
            AppError::InvalidCredential(_) => "invalid_credential",
            AppError::TokenExpired => "token_expired",
            AppError::MissingClaims(_) => "missing_claims",
            AppError::Validation(_) => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::AlreadyBooked => "already_booked",
            AppError::Database(_) => "database_error",
            AppError::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::AlreadyBooked
            | AppError::InvalidCredential(_)
            | AppError::MissingClaims(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized | AppError::InvalidToken | AppError::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // 5xx bodies carry the underlying message for diagnostics. This is an
        // internal tool; a public deployment should drop `error` here.
        let body = match &self {
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ErrorResponse {
                    message: "Database error".to_string(),
                    error: Some(msg.clone()),
                }
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ErrorResponse {
                    message: "Internal server error".to_string(),
                    error: Some(err.to_string()),
                }
            }
            other => ErrorResponse {
                message: other.to_string(),
                error: Some(other.code().to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
