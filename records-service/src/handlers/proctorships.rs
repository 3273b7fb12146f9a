use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde_json::json;

use super::{error, parse_id, raw, read_body, HandlerResult};
use crate::dtos::professors::AssignProctorshipRequest;
use crate::models::StudentWithProctor;
use crate::services::metrics::{record_error, record_write};
use crate::services::StoreError;
use crate::startup::AppState;

fn internal_error(err: StoreError) -> Response {
    tracing::error!(error = %err, "Failed to assign proctorship");
    record_error("assign_proctorship");
    error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
}

fn professor_not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Professor not found")
}

fn student_not_found() -> Response {
    error(StatusCode::NOT_FOUND, "Student not found")
}

/// Students supervised by a professor, each with the proctor embedded.
pub async fn list_proctorships(
    State(state): State<AppState>,
    Path(professor_id): Path<String>,
) -> HandlerResult {
    // An unparseable id matches no proctor_id.
    let Some(professor_id) = parse_id(&professor_id) else {
        return Ok(raw(StatusCode::OK, Vec::<StudentWithProctor>::new()));
    };

    let students = state
        .store
        .list_proctorships(professor_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch proctorships");
            record_error("list_proctorships");
            error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch proctorships",
            )
        })?;

    Ok(raw(StatusCode::OK, students))
}

/// Put a student under the proctorship of a professor.
pub async fn assign_proctorship(
    State(state): State<AppState>,
    Path(professor_id): Path<String>,
    body: Result<Json<AssignProctorshipRequest>, JsonRejection>,
) -> HandlerResult {
    let req = read_body(
        body,
        |text| error(StatusCode::BAD_REQUEST, text),
        || error(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error"),
    )?;

    let professor_id = parse_id(&professor_id).ok_or_else(professor_not_found)?;
    let professor = state
        .store
        .get_professor(professor_id)
        .await
        .map_err(internal_error)?;
    if professor.is_none() {
        return Err(professor_not_found());
    }

    let student_id = parse_id(&req.student_id).ok_or_else(student_not_found)?;
    let student = state
        .store
        .get_student(student_id)
        .await
        .map_err(internal_error)?;
    if student.is_none() {
        return Err(student_not_found());
    }

    let student = state
        .store
        .assign_proctor(student_id, professor_id)
        .await
        .map_err(|e| match e {
            StoreError::InvalidReference(_) => professor_not_found(),
            other => internal_error(other),
        })?
        .ok_or_else(student_not_found)?;

    record_write("proctorship", "created");
    tracing::info!(%student_id, %professor_id, "Student assigned to proctor");

    Ok(raw(
        StatusCode::OK,
        json!({ "message": "Student assigned to proctor", "student": student }),
    ))
}
