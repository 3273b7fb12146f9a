use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use uuid::Uuid;

use super::{error, message, parse_id, raw, read_body, HandlerResult};
use crate::dtos::library::{CreateMembershipRequest, UpdateMembershipRequest};
use crate::models::UpdateMembership;
use crate::services::metrics::{record_error, record_write};
use crate::services::StoreError;
use crate::startup::AppState;

fn internal_error(operation: &str, err: StoreError) -> Response {
    tracing::error!(error = %err, operation, "Library membership operation failed");
    record_error(operation);
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

fn malformed() -> Response {
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

fn bad_request(text: &str) -> Response {
    error(StatusCode::BAD_REQUEST, text)
}

fn student_not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Student not found")
}

fn invalid_window() -> Response {
    bad_request("expiryDate must not precede issueDate")
}

fn no_membership() -> Response {
    bad_request("Student does not have a library membership")
}

/// Resolve the path id to an existing student, or answer 404.
async fn require_student(
    state: &AppState,
    raw_id: &str,
    operation: &str,
) -> Result<Uuid, Response> {
    let student_id = parse_id(raw_id).ok_or_else(student_not_found)?;
    let student = state
        .store
        .get_student(student_id)
        .await
        .map_err(|e| internal_error(operation, e))?;
    match student {
        Some(_) => Ok(student_id),
        None => Err(student_not_found()),
    }
}

pub async fn get_membership(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult {
    let student_id = require_student(&state, &student_id, "get_membership").await?;

    let membership = state
        .store
        .get_membership(student_id)
        .await
        .map_err(|e| internal_error("get_membership", e))?
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "Student has no library membership"))?;

    Ok(raw(StatusCode::OK, membership))
}

pub async fn create_membership(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    body: Result<Json<CreateMembershipRequest>, JsonRejection>,
) -> HandlerResult {
    let req = read_body(body, bad_request, malformed)?;
    let student_id = require_student(&state, &student_id, "create_membership").await?;

    let existing = state
        .store
        .get_membership(student_id)
        .await
        .map_err(|e| internal_error("create_membership", e))?;
    if existing.is_some() {
        return Err(bad_request("Student already has a library membership"));
    }

    let membership = state
        .store
        .create_membership(student_id, req.into())
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => bad_request("Student already has a library membership"),
            StoreError::InvalidReference(_) => student_not_found(),
            StoreError::InvalidValue(_) => invalid_window(),
            other => internal_error("create_membership", other),
        })?;

    record_write("library_membership", "created");
    tracing::info!(membership_id = %membership.id, %student_id, "Library membership created");

    Ok(raw(StatusCode::CREATED, membership))
}

pub async fn update_membership(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    body: Result<Json<UpdateMembershipRequest>, JsonRejection>,
) -> HandlerResult {
    let req = read_body(body, bad_request, malformed)?;
    let student_id = require_student(&state, &student_id, "update_membership").await?;

    let mut current = state
        .store
        .get_membership(student_id)
        .await
        .map_err(|e| internal_error("update_membership", e))?
        .ok_or_else(no_membership)?;

    let update = UpdateMembership::from(req);
    current.apply(&update);
    if !current.is_valid_window() {
        return Err(invalid_window());
    }

    let membership = state
        .store
        .update_membership(student_id, &update)
        .await
        .map_err(|e| match e {
            StoreError::InvalidValue(_) => invalid_window(),
            other => internal_error("update_membership", other),
        })?
        .ok_or_else(no_membership)?;

    record_write("library_membership", "updated");

    Ok(raw(StatusCode::OK, membership))
}

pub async fn delete_membership(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult {
    let student_id = require_student(&state, &student_id, "delete_membership").await?;

    let existing = state
        .store
        .get_membership(student_id)
        .await
        .map_err(|e| internal_error("delete_membership", e))?;
    if existing.is_none() {
        return Err(no_membership());
    }

    let deleted = state
        .store
        .delete_membership(student_id)
        .await
        .map_err(|e| internal_error("delete_membership", e))?;
    if !deleted {
        return Err(no_membership());
    }

    record_write("library_membership", "deleted");

    Ok(message(StatusCode::OK, "Library membership deleted successfully"))
}
