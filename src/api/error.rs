//! Mapping of [`Error`] onto HTTP responses.
//!
//! Most endpoints answer failures as `{ "success": false, "message": .. }`.
//! The setup and catalog endpoints answer `{ "error": .. }` through [`PlainError`].
//! Store failures are logged in full and reach the client only as a generic
//! message.

use crate::errors::{Error, ErrorKind};
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

const INTERNAL_MESSAGE: &str = "Internal server error";

fn status_and_message(err: &Error) -> (StatusCode, String) {
    match err.kind() {
        ErrorKind::Validation => (StatusCode::BAD_REQUEST, err.to_string()),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        ErrorKind::Conflict => (StatusCode::CONFLICT, err.to_string()),
        ErrorKind::StoreUnavailable => {
            error!(error = %err, "Request failed");
            (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, message) = status_and_message(&self);
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

/// An [`Error`] rendered as `{ "error": message }`.
#[derive(Debug)]
pub struct PlainError(pub Error);

impl From<Error> for PlainError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for PlainError {
    fn into_response(self) -> Response {
        let (status, message) = status_and_message(&self.0);
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Turns a malformed JSON body into a validation error, so clients get a 400
/// in the usual envelope instead of axum's plain-text rejection.
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, Error> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::validation(rejection.body_text()))
}
