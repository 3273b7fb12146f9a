//! HTTP handlers.
//!
//! Response bodies differ per route: some wrap the payload in `message`,
//! `data` or `student`, some return it bare, and errors use either a
//! `message` or an `error` key. Each handler keeps its own shape.

pub mod health;
pub mod library;
pub mod metrics;
pub mod professors;
pub mod proctorships;
pub mod students;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

pub type HandlerResult = Result<Response, Response>;

/// `{"message": value}`
pub(crate) fn message<T: Serialize>(status: StatusCode, value: T) -> Response {
    (status, Json(json!({ "message": value }))).into_response()
}

/// `{"error": text}`
pub(crate) fn error(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "error": text }))).into_response()
}

/// Payload serialized as-is.
pub(crate) fn raw<T: Serialize>(status: StatusCode, value: T) -> Response {
    (status, Json(value)).into_response()
}

/// Identifiers are UUIDs; anything else cannot name an existing record.
pub(crate) fn parse_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw).ok()
}

/// Unwrap and validate a JSON body.
///
/// Missing or mistyped fields and failed validation go through `invalid`
/// (the route's 400). Unparseable JSON or a wrong content type goes through
/// `malformed` (the route's generic failure).
pub(crate) fn read_body<T, I, M>(
    body: Result<Json<T>, JsonRejection>,
    invalid: I,
    malformed: M,
) -> Result<T, Response>
where
    T: DeserializeOwned + Validate,
    I: Fn(&str) -> Response,
    M: FnOnce() -> Response,
{
    let req = match body {
        Ok(Json(req)) => req,
        Err(JsonRejection::JsonDataError(e)) => {
            tracing::debug!(error = %e.body_text(), "Rejected request body");
            return Err(invalid(&e.body_text()));
        }
        Err(rejection) => {
            tracing::error!(error = %rejection.body_text(), "Unreadable request body");
            return Err(malformed());
        }
    };

    req.validate().map_err(|e| invalid(&e.to_string()))?;
    Ok(req)
}
