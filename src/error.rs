//! # Centralized Error Handling
//!
//! This module provides a unified error handling system for the CRUD handlers.
//! It centralizes error logging and HTTP response generation, so every failure
//! reaches the client as the standard `{status: "FAILED", message}` envelope.

use std::borrow::Cow;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use crate::config::ConfigError;
use crate::models::Envelope;
use crate::services::hasher::HashError;
use crate::store::StoreError;

/// Central application error type for the CRUD handlers.
///
/// _Store errors are logged automatically, while other errors should be logged
/// at the point of creation if needed._
#[derive(Error, Debug)]
pub enum AppError {
    #[error("store error")]
    Store(#[from] StoreError),

    #[error("hashing error")]
    Hash(#[from] HashError),

    #[error("UUID parsing error")]
    Uuid(#[from] uuid::Error),

    #[error("not found: {0}")]
    NotFound(&'static str),

    #[error("bad request: {0}")]
    BadRequest(Cow<'static, str>),

    #[error("forbidden: {0}")]
    Forbidden(&'static str),
}

impl AppError {
    #[inline]
    pub fn bad_request(message: impl Into<Cow<'static, str>>) -> Self {
        AppError::BadRequest(message.into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Store(StoreError::Conflict(_)) => {}
            AppError::Store(e) => error!(?e, "Store error occurred"),
            AppError::Hash(e) => error!(?e, "Hashing error occurred"),
            _ => {}
        }

        let (status, message): (StatusCode, Cow<'static, str>) = match self {
            AppError::Store(StoreError::Conflict(msg)) => (StatusCode::CONFLICT, msg.into()),
            AppError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database error".into()),
            AppError::Hash(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An error occurred while hashing!".into(),
            ),
            AppError::Uuid(_) => (StatusCode::BAD_REQUEST, "Invalid UUID format".into()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.into()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.into()),
        };

        Envelope::failed(message).reply(status)
    }
}

/// Convenience Result type alias that uses AppError as the error type.
pub type AppResult<T> = Result<T, AppError>;

/// Everything that can stop the server from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("store initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
