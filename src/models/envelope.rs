//! # Response Envelope
//!
//! Every JSON response body has the shape `{ status, message, data? }`.
//! The status strings are part of the mobile client contract, including the
//! historical `SUCCESFUL` spelling returned by signin.

use std::borrow::Cow;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "PENDING")]
    Pending,
    #[serde(rename = "FAILED")]
    Failed,
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "SUCCESFUL")]
    Succesful,
}

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub message: Cow<'static, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn new(status: Status, message: impl Into<Cow<'static, str>>, data: Option<T>) -> Self {
        Self {
            status,
            message: message.into(),
            data,
        }
    }

    #[inline]
    pub fn success(message: impl Into<Cow<'static, str>>, data: T) -> Self {
        Self::new(Status::Success, message, Some(data))
    }

    /// Pairs the envelope with an HTTP status code.
    pub fn reply(self, code: StatusCode) -> Response {
        (code, Json(self)).into_response()
    }
}

impl Envelope<()> {
    #[inline]
    pub fn failed(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Status::Failed, message, None)
    }

    #[inline]
    pub fn done(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(Status::Success, message, None)
    }
}
