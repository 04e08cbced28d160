//! # Request Extractors
//!
//! [`AppJson`] replaces `axum::Json` on the input side so a malformed or
//! mistyped body is answered with the standard `FAILED` envelope instead of
//! axum's plain-text rejection.

use axum::extract::{FromRequest, rejection::JsonRejection};
use tracing::warn;

use crate::error::AppError;

#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(status = %rejection.status(), reason = %rejection.body_text(), "Request body rejected");
        AppError::bad_request(rejection.body_text())
    }
}
