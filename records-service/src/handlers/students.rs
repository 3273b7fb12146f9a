use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde_json::json;

use super::{error, message, parse_id, read_body, HandlerResult};
use crate::dtos::students::{CreateStudentRequest, UpdateStudentRequest};
use crate::models::{CreateStudent, UpdateStudent};
use crate::services::metrics::{record_error, record_write};
use crate::services::StoreError;
use crate::startup::AppState;

fn list_failed(operation: &str, err: StoreError) -> Response {
    tracing::error!(error = %err, operation, "Failed to list records");
    record_error(operation);
    message(StatusCode::BAD_REQUEST, "Bad request")
}

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

fn proctor_not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Professor not found")
}

fn proctor_missing() -> Response {
    bad_request("Professor does not exist")
}

fn student_missing() -> Response {
    bad_request("Student does not exist")
}

pub async fn list_students(State(state): State<AppState>) -> HandlerResult {
    let students = state
        .store
        .list_students()
        .await
        .map_err(|e| list_failed("list_students", e))?;

    Ok(message(StatusCode::OK, students))
}

pub async fn list_students_enriched(State(state): State<AppState>) -> HandlerResult {
    let students = state
        .store
        .list_students_with_proctor()
        .await
        .map_err(|e| list_failed("list_students_enriched", e))?;

    Ok(message(StatusCode::OK, students))
}

pub async fn create_student(
    State(state): State<AppState>,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> HandlerResult {
    let create_failed = |err: &dyn std::fmt::Display| {
        tracing::error!(error = %err, "Failed to create student");
        record_error("create_student");
        super::raw(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({ "message": "Internal server error", "error": err.to_string() }),
        )
    };

    let req = read_body(body, bad_request, || create_failed(&"Malformed request body"))?;

    let existing = state
        .store
        .find_student_by_aadhar(&req.aadhar_number)
        .await
        .map_err(|e| create_failed(&e))?;
    if existing.is_some() {
        return Err(duplicate_aadhar());
    }

    let input = CreateStudent::try_from(req).map_err(|_| proctor_not_found())?;

    if let Some(proctor_id) = input.proctor_id {
        let proctor = state
            .store
            .get_professor(proctor_id)
            .await
            .map_err(|e| create_failed(&e))?;
        if proctor.is_none() {
            return Err(proctor_not_found());
        }
    }

    let student = state
        .store
        .create_student(&input)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => duplicate_aadhar(),
            StoreError::InvalidReference(_) => proctor_not_found(),
            other => create_failed(&other),
        })?;

    record_write("student", "created");
    tracing::info!(student_id = %student.id, "Student created");

    Ok(super::raw(StatusCode::CREATED, json!({ "student": student })))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    body: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> HandlerResult {
    let req = read_body(body, bad_request, || {
        message(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR")
    })?;

    let student_id = parse_id(&student_id).ok_or_else(student_missing)?;

    let existing = state
        .store
        .get_student(student_id)
        .await
        .map_err(|e| internal_error("update_student", e))?;
    if existing.is_none() {
        return Err(student_missing());
    }

    let update = UpdateStudent::try_from(req).map_err(|_| proctor_missing())?;

    let student = state
        .store
        .update_student(student_id, &update)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => duplicate_aadhar(),
            StoreError::InvalidReference(_) => proctor_missing(),
            other => internal_error("update_student", other),
        })?
        // Deleted between the check and the write.
        .ok_or_else(student_missing)?;

    record_write("student", "updated");

    Ok(super::raw(StatusCode::CREATED, json!({ "data": student })))
}

/// `PATCH`/`DELETE /students/enriched`: the literal segment is never a
/// student id.
pub async fn reserved_student_id() -> Response {
    student_missing()
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> HandlerResult {
    let student_id = parse_id(&student_id).ok_or_else(student_missing)?;

    let existing = state
        .store
        .get_student(student_id)
        .await
        .map_err(|e| internal_error("delete_student", e))?;
    if existing.is_none() {
        return Err(student_missing());
    }

    let deleted = state
        .store
        .delete_student(student_id)
        .await
        .map_err(|e| internal_error("delete_student", e))?;
    if !deleted {
        return Err(student_missing());
    }

    record_write("student", "deleted");

    Ok(message(StatusCode::OK, "Student deleted successfully"))
}
