//! Video record API integration tests.
//!
//! Run with: `cargo test -p tubely-api --test videos_test`

mod helpers;

use axum::http::StatusCode;
use helpers::auth::{create_test_user, token_for};
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};
use uuid::Uuid;

#[tokio::test]
async fn test_health_is_public() {
    let app = setup_test_app().await;
    let response = app.client().get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "alive");
}

#[tokio::test]
async fn test_create_and_get_video() {
    let app = setup_test_app().await;
    let client = app.client();
    let user = create_test_user();

    let response = client
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": "Boots", "description": "Trail test" }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    assert_eq!(created["title"], "Boots");
    assert_eq!(created["user_id"], json!(user.user_id));
    assert!(created["video_url"].is_null());
    assert!(created["thumbnail_url"].is_null());

    let id = created["id"].as_str().unwrap();
    let response = client
        .get(&api_path(&format!("/videos/{}", id)))
        .add_header("Authorization", user.bearer())
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["id"], created["id"]);
}

#[tokio::test]
async fn test_create_video_rejects_blank_title() {
    let app = setup_test_app().await;
    let user = create_test_user();

    let response = app
        .client()
        .post(&api_path("/videos"))
        .add_header("Authorization", user.bearer())
        .json(&json!({ "title": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], "INVALID_ARGUMENT");
}

#[tokio::test]
async fn test_list_only_returns_own_videos() {
    let app = setup_test_app().await;
    let alice = create_test_user();
    let bob = create_test_user();
    app.seed_video(alice.user_id, "first").await;
    app.seed_video(alice.user_id, "second").await;
    app.seed_video(bob.user_id, "other").await;

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_header("Authorization", alice.bearer())
        .await;
    response.assert_status_ok();
    let videos: Vec<Value> = response.json();
    assert_eq!(videos.len(), 2);
    assert!(videos
        .iter()
        .all(|v| v["user_id"] == json!(alice.user_id)));
}

#[tokio::test]
async fn test_requests_without_token_are_unauthorized() {
    let app = setup_test_app().await;

    let response = app.client().get(&api_path("/videos")).await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    assert_eq!(response.json::<Value>()["code"], "UNAUTHORIZED");

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_token_is_unauthorized() {
    let app = setup_test_app().await;
    let token = token_for(Uuid::new_v4(), chrono::Duration::seconds(-60));

    let response = app
        .client()
        .get(&api_path("/videos"))
        .add_header("Authorization", format!("Bearer {}", token))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_get_video_error_ordering() {
    let app = setup_test_app().await;
    let client = app.client();
    let owner = create_test_user();
    let stranger = create_test_user();
    let video = app.seed_video(owner.user_id, "mine").await;

    // Malformed id wins over a missing token
    let response = client.get(&api_path("/videos/not-a-uuid")).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = client
        .get(&api_path(&format!("/videos/{}", video.id)))
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = client
        .get(&api_path(&format!("/videos/{}", Uuid::new_v4())))
        .add_header("Authorization", owner.bearer())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = client
        .get(&api_path(&format!("/videos/{}", video.id)))
        .add_header("Authorization", stranger.bearer())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
