//! Library membership integration tests.

mod common;

use common::{id_of, TestApp};
use reqwest::StatusCode;
use serde_json::{json, Value};

const UNKNOWN_ID: &str = "6f1c1f5e-2b54-4f39-9b5e-0c4a2f1d9a11";

fn path(student: &Value) -> String {
    format!("/students/{}/library-membership", id_of(student))
}

async fn create_membership(app: &TestApp, student: &Value) -> Value {
    let (status, body) = app
        .post(
            &path(student),
            json!({ "issueDate": "2024-01-01", "expiryDate": "2025-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create membership: {}", body);
    body
}

#[tokio::test]
async fn create_membership_returns_record() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;

    let membership = create_membership(&app, &student).await;

    assert_eq!(membership["studentId"], student["id"]);
    assert_eq!(membership["issueDate"], "2024-01-01T00:00:00Z");
    assert_eq!(membership["expiryDate"], "2025-01-01T00:00:00Z");
    assert!(membership["id"].as_str().is_some());

    let (status, body) = app.get(&path(&student)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, membership);
}

#[tokio::test]
async fn create_second_membership_is_rejected() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;
    let original = create_membership(&app, &student).await;

    let (status, body) = app
        .post(
            &path(&student),
            json!({ "issueDate": "2030-01-01", "expiryDate": "2031-01-01" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Student already has a library membership" })
    );

    let (_, current) = app.get(&path(&student)).await;
    assert_eq!(current, original);
}

#[tokio::test]
async fn create_membership_for_unknown_student_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .post(
            &format!("/students/{}/library-membership", UNKNOWN_ID),
            json!({ "issueDate": "2024-01-01", "expiryDate": "2025-01-01" }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Student not found" }));
}

#[tokio::test]
async fn create_membership_with_inverted_window_is_bad_request() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;

    let (status, body) = app
        .post(
            &path(&student),
            json!({ "issueDate": "2025-01-01", "expiryDate": "2024-01-01" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, _) = app.get(&path(&student)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_membership_distinguishes_missing_student_and_membership() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;

    let (status, body) = app
        .get(&format!("/students/{}/library-membership", UNKNOWN_ID))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Student not found" }));

    let (status, body) = app.get(&path(&student)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Student has no library membership" }));
}

#[tokio::test]
async fn update_membership_changes_given_dates() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;
    let original = create_membership(&app, &student).await;

    let (status, body) = app
        .patch(&path(&student), json!({ "expiryDate": "2026-06-30" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], original["id"]);
    assert_eq!(body["issueDate"], original["issueDate"]);
    assert_eq!(body["expiryDate"], "2026-06-30T00:00:00Z");
}

#[tokio::test]
async fn update_membership_rejects_inverted_window() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;
    let original = create_membership(&app, &student).await;

    let (status, body) = app
        .patch(&path(&student), json!({ "expiryDate": "2023-01-01" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "expiryDate must not precede issueDate" })
    );

    let (_, current) = app.get(&path(&student)).await;
    assert_eq!(current, original);
}

#[tokio::test]
async fn update_without_membership_is_bad_request() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;

    let (status, body) = app
        .patch(&path(&student), json!({ "expiryDate": "2026-06-30" }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Student does not have a library membership" })
    );
}

#[tokio::test]
async fn delete_membership_removes_it() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;
    create_membership(&app, &student).await;

    let (status, body) = app.delete(&path(&student)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "message": "Library membership deleted successfully" })
    );

    let (status, body) = app.delete(&path(&student)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({ "error": "Student does not have a library membership" })
    );
}

#[tokio::test]
async fn delete_membership_for_unknown_student_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, body) = app.delete("/students/not-a-uuid/library-membership").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Student not found" }));
}

#[tokio::test]
async fn deleting_student_removes_membership() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;
    create_membership(&app, &student).await;

    let (status, _) = app.delete(&format!("/students/{}", id_of(&student))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&path(&student)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Student not found" }));

    // A recreated student with the same aadhar starts without a membership.
    let again = app.create_student("Asha Rao", "1").await;
    let (status, _) = app.get(&path(&again)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_membership_for_unknown_student_is_not_found() {
    let app = TestApp::spawn().await;

    let (status, body) = app
        .patch(
            &format!("/students/{}/library-membership", UNKNOWN_ID),
            json!({ "expiryDate": "2026-06-30" }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Student not found" }));
}

#[tokio::test]
async fn membership_on_store_failure_is_internal_error() {
    let app = TestApp::spawn().await;
    let student = app.create_student("Asha Rao", "1").await;
    app.store.set_unavailable(true);

    let (status, body) = app.get(&path(&student)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));

    let (status, body) = app
        .post(
            &path(&student),
            json!({ "issueDate": "2024-01-01", "expiryDate": "2025-01-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Internal Server Error" }));
}
