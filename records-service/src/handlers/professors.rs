use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde_json::json;

use super::{message, parse_id, raw, read_body, HandlerResult};
use crate::dtos::professors::{CreateProfessorRequest, UpdateProfessorRequest};
use crate::services::metrics::{record_error, record_write};
use crate::services::StoreError;
use crate::startup::AppState;

fn internal_error(operation: &str, err: StoreError) -> Response {
    tracing::error!(error = %err, operation, "Store operation failed");
    record_error(operation);
    message(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR")
}

fn bad_request(text: &str) -> Response {
    message(StatusCode::BAD_REQUEST, text)
}

fn duplicate_aadhar() -> Response {
    bad_request("Aadhar number already exists")
}

fn professor_missing() -> Response {
    bad_request("Professor does not exist")
}

pub async fn list_professors(State(state): State<AppState>) -> HandlerResult {
    let professors = state.store.list_professors().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to list professors");
        record_error("list_professors");
        message(StatusCode::BAD_REQUEST, "Bad request")
    })?;

    Ok(message(StatusCode::OK, professors))
}

pub async fn create_professor(
    State(state): State<AppState>,
    body: Result<Json<CreateProfessorRequest>, JsonRejection>,
) -> HandlerResult {
    let create_failed = |err: &dyn std::fmt::Display| {
        tracing::error!(error = %err, "Failed to create professor");
        record_error("create_professor");
        message(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    };

    let req = read_body(body, bad_request, || create_failed(&"Malformed request body"))?;

    let existing = state
        .store
        .find_professor_by_aadhar(&req.aadhar_number)
        .await
        .map_err(|e| create_failed(&e))?;
    if existing.is_some() {
        return Err(duplicate_aadhar());
    }

    let professor = state
        .store
        .create_professor(&req.into())
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => duplicate_aadhar(),
            other => create_failed(&other),
        })?;

    record_write("professor", "created");
    tracing::info!(professor_id = %professor.professor.id, "Professor created");

    Ok(raw(StatusCode::OK, professor))
}

pub async fn update_professor(
    State(state): State<AppState>,
    Path(professor_id): Path<String>,
    body: Result<Json<UpdateProfessorRequest>, JsonRejection>,
) -> HandlerResult {
    let req = read_body(body, bad_request, || {
        message(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR")
    })?;

    let professor_id = parse_id(&professor_id).ok_or_else(professor_missing)?;

    let existing = state
        .store
        .get_professor(professor_id)
        .await
        .map_err(|e| internal_error("update_professor", e))?;
    if existing.is_none() {
        return Err(professor_missing());
    }

    let professor = state
        .store
        .update_professor(professor_id, &req.into())
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => duplicate_aadhar(),
            other => internal_error("update_professor", other),
        })?
        .ok_or_else(professor_missing)?;

    record_write("professor", "updated");

    Ok(raw(StatusCode::CREATED, json!({ "data": professor })))
}

pub async fn delete_professor(
    State(state): State<AppState>,
    Path(professor_id): Path<String>,
) -> HandlerResult {
    let professor_id = parse_id(&professor_id).ok_or_else(professor_missing)?;

    let existing = state
        .store
        .get_professor(professor_id)
        .await
        .map_err(|e| internal_error("delete_professor", e))?;
    if existing.is_none() {
        return Err(professor_missing());
    }

    let deleted = state
        .store
        .delete_professor(professor_id)
        .await
        .map_err(|e| internal_error("delete_professor", e))?;
    if !deleted {
        return Err(professor_missing());
    }

    record_write("professor", "deleted");

    Ok(message(StatusCode::OK, "Professor deleted successfully"))
}
