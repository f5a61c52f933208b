//! Queue polling over HTTP: counts, matching, staleness and the approval gate.

mod common;

use crate::common::{enrollee_queue_uri, students_queue_uri, TestApp};
use admissions_core::common::MemberId;
use axum::http::StatusCode;
use chrono::Duration;

#[tokio::test]
async fn lone_enrollee_sees_themselves_in_the_counts() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();

    let (status, body) = app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "online");
    assert_eq!(body["queue_students_online"], 0);
    assert_eq!(body["queue_enrollees_online"], 1);
}

#[tokio::test]
async fn polling_requires_authentication() {
    let app = TestApp::new();
    let org = app.organization("State University");

    let (status, _) = app.post(&enrollee_queue_uri(org), None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn unapproved_student_is_rejected_without_joining() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();
    let stranger = MemberId::new();

    app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    let (status, _) = app.post(&students_queue_uri(org), Some(stranger), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // The enrollee is still waiting and nobody joined the student side
    let (_, body) = app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    assert_eq!(body["type"], "online");
    assert_eq!(body["queue_students_online"], 0);
}

#[tokio::test]
async fn student_approved_elsewhere_is_rejected() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let other = app.organization("Technical College");
    let student = app.approved_student(other);

    let (status, body) = app.post(&students_queue_uri(org), Some(student), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn both_sides_are_sent_to_the_same_dialog() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();
    let student = app.approved_student(org);

    let (_, waiting) = app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    assert_eq!(waiting["type"], "online");

    let (status, student_view) = app.post(&students_queue_uri(org), Some(student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(student_view["type"], "join_dialog");

    let (_, enrollee_view) = app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    assert_eq!(enrollee_view["type"], "join_dialog");
    assert_eq!(enrollee_view["dialog_id"], student_view["dialog_id"]);
    assert_eq!(app.store.len(), 1);

    let dialog_id = student_view["dialog_id"].as_str().unwrap();
    let (status, dialog) = app
        .get(&format!("/chatting/dialogs/{}", dialog_id), Some(enrollee))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dialog["closed"], false);
    assert!(dialog["title"]
        .as_str()
        .unwrap()
        .starts_with("State University - Student ["));
}

#[tokio::test]
async fn matched_members_leave_the_counts() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();
    let student = app.approved_student(org);
    let late_enrollee = MemberId::new();

    app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    app.post(&students_queue_uri(org), Some(student), None).await;

    let (_, body) = app
        .post(&enrollee_queue_uri(org), Some(late_enrollee), None)
        .await;
    assert_eq!(body["type"], "online");
    assert_eq!(body["queue_students_online"], 0);
    assert_eq!(body["queue_enrollees_online"], 1);
}

#[tokio::test]
async fn silent_enrollee_is_not_matched() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();
    let student = app.approved_student(org);

    app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    app.clock.advance(Duration::seconds(31));

    let (_, body) = app.post(&students_queue_uri(org), Some(student), None).await;

    assert_eq!(body["type"], "online");
    assert_eq!(body["queue_students_online"], 1);
    assert_eq!(body["queue_enrollees_online"], 0);
    assert!(app.store.is_empty());
}

#[tokio::test]
async fn oldest_waiting_enrollee_is_matched_first() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let first = MemberId::new();
    let second = MemberId::new();
    let student = app.approved_student(org);

    app.post(&enrollee_queue_uri(org), Some(first), None).await;
    app.clock.advance(Duration::seconds(2));
    app.post(&enrollee_queue_uri(org), Some(second), None).await;

    let (_, matched) = app.post(&students_queue_uri(org), Some(student), None).await;
    let (_, first_view) = app.post(&enrollee_queue_uri(org), Some(first), None).await;
    let (_, second_view) = app.post(&enrollee_queue_uri(org), Some(second), None).await;

    assert_eq!(first_view["dialog_id"], matched["dialog_id"]);
    assert_eq!(second_view["type"], "online");
}

#[tokio::test]
async fn leaving_the_queue_removes_the_member() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();
    let student = app.approved_student(org);

    app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    let (status, _) = app
        .post(
            &format!("/chatting/chat-queue/leave/{}", org),
            Some(enrollee),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = app.post(&students_queue_uri(org), Some(student), None).await;
    assert_eq!(body["type"], "online");
    assert_eq!(body["queue_enrollees_online"], 0);
}

#[tokio::test]
async fn queues_are_separate_per_organization() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let other = app.organization("Technical College");
    let enrollee = MemberId::new();
    let student = app.approved_student(other);

    app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    let (_, body) = app.post(&students_queue_uri(other), Some(student), None).await;

    assert_eq!(body["type"], "online");
    assert_eq!(body["queue_students_online"], 1);
    assert_eq!(body["queue_enrollees_online"], 0);
}

#[tokio::test]
async fn malformed_organization_id_is_a_client_error() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/chatting/chat-queue/update-enrollee-queue/not-a-uuid",
            Some(MemberId::new()),
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn storage_failure_keeps_the_match_for_the_next_poll() {
    let app = TestApp::new();
    let org = app.organization("State University");
    let enrollee = MemberId::new();
    let late_enrollee = MemberId::new();
    let student = app.approved_student(org);

    app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    app.store.fail_next_lookups(1);
    let (status, body) = app.post(&students_queue_uri(org), Some(student), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());

    // A newcomer must not steal the student from the failed match
    app.post(&enrollee_queue_uri(org), Some(late_enrollee), None)
        .await;

    let (_, enrollee_view) = app.post(&enrollee_queue_uri(org), Some(enrollee), None).await;
    let (_, student_view) = app.post(&students_queue_uri(org), Some(student), None).await;

    assert_eq!(enrollee_view["type"], "join_dialog");
    assert_eq!(student_view["type"], "join_dialog");
    assert_eq!(student_view["dialog_id"], enrollee_view["dialog_id"]);
    assert_eq!(app.store.len(), 1);

    let (_, newcomer_view) = app
        .post(&enrollee_queue_uri(org), Some(late_enrollee), None)
        .await;
    assert_eq!(newcomer_view["type"], "online");
    assert_eq!(newcomer_view["queue_enrollees_online"], 1);
}
