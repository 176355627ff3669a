//! Submission integration tests.
//!
//! Exercises multipart upload and listings over real HTTP:
//!
//! - `POST /v1/submissions/{meeting_id}` - Upload (PDF/JPG/DOCX, 10MB cap)
//! - `GET /v1/submissions/meeting/{meeting_id}` - Meeting listing
//! - `GET /v1/submissions/user` - Caller's listing

// Test code is allowed to use expect/unwrap for assertions
#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use meet_test_utils::{create_test_meeting, create_test_user, TestServer, TestUser};
use reqwest::multipart::{Form, Part};
use sqlx::PgPool;
use uuid::Uuid;

const TEN_MIB: usize = 10 * 1024 * 1024;

async fn spawn_with_user(pool: PgPool) -> Result<(TestServer, TestUser, String)> {
    let server = TestServer::spawn(pool.clone()).await?;
    let user = create_test_user(&pool, "student@example.com", "student", "password123x").await?;
    let token = server.token_for(user.user_id, &user.email)?;
    Ok((server, user, token))
}

fn pdf_form(file_name: &str, size: usize) -> Result<Form> {
    let part = Part::bytes(vec![0x25u8; size])
        .file_name(file_name.to_string())
        .mime_str("application/pdf")?;
    Ok(Form::new().part("file", part))
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_pdf_creates_submission(pool: PgPool) -> Result<()> {
    let (server, user, token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    let response = client
        .post(format!(
            "{}/v1/submissions/{}",
            server.url(),
            meeting.meeting_id
        ))
        .bearer_auth(&token)
        .multipart(pdf_form("assignment.pdf", 2048)?)
        .send()
        .await?;

    assert_eq!(response.status(), 201);

    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["meeting_id"], meeting.meeting_id.to_string());
    assert_eq!(body["user_id"], user.user_id.to_string());
    assert_eq!(body["file_name"], "assignment.pdf");
    assert_eq!(body["file_type"], "application/pdf");
    assert_eq!(body["file_size"], 2048);
    assert_eq!(body["user"]["username"], "student");

    // The payload landed in the file store and the URL points at it
    assert_eq!(server.storage().len(), 1);
    assert!(body["file_url"].as_str().unwrap().starts_with("memory://"));

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_rejects_disallowed_type(pool: PgPool) -> Result<()> {
    let (server, user, token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    let part = Part::bytes(b"#!/bin/sh".to_vec())
        .file_name("script.sh")
        .mime_str("text/x-shellscript")?;

    let response = client
        .post(format!(
            "{}/v1/submissions/{}",
            server.url(),
            meeting.meeting_id
        ))
        .bearer_auth(&token)
        .multipart(Form::new().part("file", part))
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await?;
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("allowed"));
    assert!(server.storage().is_empty());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_rejects_oversized_file(pool: PgPool) -> Result<()> {
    let (server, user, token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    let response = client
        .post(format!(
            "{}/v1/submissions/{}",
            server.url(),
            meeting.meeting_id
        ))
        .bearer_auth(&token)
        .multipart(pdf_form("big.pdf", TEN_MIB + 1)?)
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    assert!(server.storage().is_empty());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_accepts_exactly_max_size(pool: PgPool) -> Result<()> {
    let (server, user, token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    let response = client
        .post(format!(
            "{}/v1/submissions/{}",
            server.url(),
            meeting.meeting_id
        ))
        .bearer_auth(&token)
        .multipart(pdf_form("exact.pdf", TEN_MIB)?)
        .send()
        .await?;

    assert_eq!(response.status(), 201);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_without_file_part(pool: PgPool) -> Result<()> {
    let (server, user, token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    let form = Form::new().text("comment", "forgot the attachment");

    let response = client
        .post(format!(
            "{}/v1/submissions/{}",
            server.url(),
            meeting.meeting_id
        ))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await?;

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await?;
    assert_eq!(body["error"]["message"], "No file uploaded");

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_to_unknown_meeting(pool: PgPool) -> Result<()> {
    let (server, _user, token) = spawn_with_user(pool).await?;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/v1/submissions/{}", server.url(), Uuid::new_v4()))
        .bearer_auth(&token)
        .multipart(pdf_form("orphan.pdf", 128)?)
        .send()
        .await?;

    assert_eq!(response.status(), 404);
    assert!(server.storage().is_empty());

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_upload_requires_auth(pool: PgPool) -> Result<()> {
    let (server, user, _token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    let response = client
        .post(format!(
            "{}/v1/submissions/{}",
            server.url(),
            meeting.meeting_id
        ))
        .multipart(pdf_form("anon.pdf", 128)?)
        .send()
        .await?;

    assert_eq!(response.status(), 401);

    Ok(())
}

#[sqlx::test(migrations = "../../migrations")]
async fn test_listings_by_meeting_and_user(pool: PgPool) -> Result<()> {
    let (server, user, token) = spawn_with_user(pool.clone()).await?;
    let client = reqwest::Client::new();

    let meeting = create_test_meeting(&pool, user.user_id, "Exam").await?;

    // One PDF and one JPEG
    for (name, mime, payload) in [
        ("report.pdf", "application/pdf", b"%PDF".to_vec()),
        ("photo.jpg", "image/jpeg", vec![0xffu8, 0xd8, 0xff]),
    ] {
        let part = Part::bytes(payload)
            .file_name(name.to_string())
            .mime_str(mime)?;

        let response = client
            .post(format!(
                "{}/v1/submissions/{}",
                server.url(),
                meeting.meeting_id
            ))
            .bearer_auth(&token)
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        assert_eq!(response.status(), 201);
    }

    // Meeting listing carries submitter identities
    let by_meeting: serde_json::Value = client
        .get(format!(
            "{}/v1/submissions/meeting/{}",
            server.url(),
            meeting.meeting_id
        ))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;

    let by_meeting = by_meeting.as_array().unwrap();
    assert_eq!(by_meeting.len(), 2);
    assert!(by_meeting
        .iter()
        .all(|s| s["user"]["email"] == "student@example.com"));

    // User listing carries meeting identities
    let by_user: serde_json::Value = client
        .get(format!("{}/v1/submissions/user", server.url()))
        .bearer_auth(&token)
        .send()
        .await?
        .json()
        .await?;

    let by_user = by_user.as_array().unwrap();
    assert_eq!(by_user.len(), 2);
    assert!(by_user
        .iter()
        .all(|s| s["meeting"]["code"] == meeting.code));

    Ok(())
}
