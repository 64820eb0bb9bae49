//! Unified error types for the feed bridge
//!
//! This module defines error types for each layer:
//! - `DomainError`: Pipeline errors (identity loading, lookups, log queries)
//! - `RenderError`: Per-record rendering failures, never escalated past assembly
//! - `AppError`: Application layer errors (wraps domain errors for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    /// Unknown account name or key
    #[error("Not found: {0}")]
    NotFound(String),

    /// Identity caches unreadable or not in the expected shape
    #[error("Failed to load identity cache: {0}")]
    Load(String),

    /// Message log access failure
    #[error("Message log query failed: {0}")]
    Query(String),
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        DomainError::Query(e.to_string())
    }
}

/// A single message record could not be turned into a feed item
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot render message {message_id:?}: {reason}")]
pub struct RenderError {
    pub message_id: String,
    pub reason: String,
}

impl RenderError {
    pub fn new(message_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            message_id: message_id.into(),
            reason: reason.into(),
        }
    }
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("Invalid request: {0}")]
    BadRequest(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match &self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Load(msg)) => {
                tracing::error!("Identity cache error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Identity data unavailable",
                    None,
                )
            }
            AppError::Domain(DomainError::Query(msg)) => {
                tracing::error!("Message log error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
