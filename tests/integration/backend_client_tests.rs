//! Backend client behaviour against a stub generation server.

use axum::http::StatusCode;
use serde_json::json;

use skilltrail::generation::client::{PLAYLIST_GENERATE_PATH, ROADMAP_GENERATE_PATH};
use skilltrail::generation::mock::create_mock_roadmap;
use skilltrail::generation::PlaylistRequest;
use skilltrail::models::profile::{Depth, UserPreferences, VideoLength};
use skilltrail::AppError;

use super::test_helpers::{backend_client, spawn_stub_backend, unreachable_config};

fn playlist_request() -> PlaylistRequest {
    PlaylistRequest {
        roadmap_id: "r1".into(),
        point_id: "p1".into(),
        topic: "Python".into(),
        point_title: "Python Fundamentals".into(),
    }
}

#[tokio::test]
async fn successful_roadmap_is_decoded() {
    let stub = spawn_stub_backend().await;
    let expected = create_mock_roadmap("Python");
    stub.reply_data(serde_json::to_value(&expected).unwrap());
    let (client, _profiles) = backend_client(&stub.config()).await;

    let roadmap = client.generate_roadmap_from_backend("Python").await.unwrap();

    assert_eq!(roadmap, expected);
}

#[tokio::test]
async fn roadmap_request_carries_topic_and_preferences() {
    let stub = spawn_stub_backend().await;
    stub.reply_data(serde_json::to_value(create_mock_roadmap("Go")).unwrap());
    let (client, profiles) = backend_client(&stub.config()).await;
    profiles
        .set_preferences(UserPreferences {
            depth: Depth::Detailed,
            video_length: VideoLength::Short,
        })
        .await
        .unwrap();

    client.generate_roadmap_from_backend("Go").await.unwrap();

    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let (path, body) = &requests[0];
    assert_eq!(path, ROADMAP_GENERATE_PATH);
    assert_eq!(
        body,
        &json!({
            "topic": "Go",
            "userPreferences": { "depth": "Detailed", "videoLength": "Short" }
        })
    );
}

#[tokio::test]
async fn reported_failure_uses_server_message() {
    let stub = spawn_stub_backend().await;
    stub.reply(
        StatusCode::OK,
        json!({ "success": false, "error": { "message": "topic too vague" } }),
    );
    let (client, _profiles) = backend_client(&stub.config()).await;

    let err = client.generate_roadmap_from_backend("x").await.unwrap_err();

    assert!(matches!(&err, AppError::Generation(msg) if msg == "topic too vague"));
}

#[tokio::test]
async fn reported_failure_without_message_uses_generic_text() {
    let stub = spawn_stub_backend().await;
    stub.reply(StatusCode::OK, json!({ "success": false }));
    let (client, _profiles) = backend_client(&stub.config()).await;

    let roadmap_err = client.generate_roadmap_from_backend("x").await.unwrap_err();
    let playlist_err = client
        .generate_playlists_from_backend(&playlist_request())
        .await
        .unwrap_err();

    assert!(matches!(&roadmap_err, AppError::Generation(msg) if msg == "Failed to generate roadmap"));
    assert!(
        matches!(&playlist_err, AppError::Generation(msg) if msg == "Failed to generate playlists")
    );
}

#[tokio::test]
async fn error_status_is_http_error() {
    let stub = spawn_stub_backend().await;
    stub.reply(StatusCode::INTERNAL_SERVER_ERROR, json!({ "success": true }));
    let (client, _profiles) = backend_client(&stub.config()).await;

    let err = client.generate_roadmap_from_backend("x").await.unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
}

#[tokio::test]
async fn success_without_data_is_generation_error() {
    let stub = spawn_stub_backend().await;
    stub.reply(StatusCode::OK, json!({ "success": true, "data": null }));
    let (client, _profiles) = backend_client(&stub.config()).await;

    let err = client.generate_roadmap_from_backend("x").await.unwrap_err();

    assert!(matches!(err, AppError::Generation(_)));
}

#[tokio::test]
async fn undecodable_data_is_generation_error() {
    let stub = spawn_stub_backend().await;
    stub.reply_data(json!({ "id": 42 }));
    let (client, _profiles) = backend_client(&stub.config()).await;

    let err = client.generate_roadmap_from_backend("x").await.unwrap_err();

    assert!(matches!(err, AppError::Generation(_)));
}

#[tokio::test]
async fn unreachable_backend_is_http_error() {
    let config = unreachable_config().await;
    let (client, _profiles) = backend_client(&config).await;

    let err = client.generate_roadmap_from_backend("x").await.unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
}

#[tokio::test]
async fn playlists_are_requested_for_one_point() {
    let stub = spawn_stub_backend().await;
    stub.reply_data(json!([
        {
            "id": "v1",
            "title": "Intro",
            "videoUrl": "https://videos.example/v1",
            "duration": "12:30"
        },
        { "id": "v2", "title": "Setup", "videoUrl": "https://videos.example/v2" }
    ]));
    let (client, _profiles) = backend_client(&stub.config()).await;

    let items = client
        .generate_playlists_from_backend(&playlist_request())
        .await
        .unwrap();

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].duration.as_deref(), Some("12:30"));
    assert_eq!(items[1].duration, None);

    let (path, body) = &stub.requests()[0];
    assert_eq!(path, PLAYLIST_GENERATE_PATH);
    assert_eq!(body["roadmapId"], "r1");
    assert_eq!(body["pointId"], "p1");
    assert_eq!(body["topic"], "Python");
    assert_eq!(body["pointTitle"], "Python Fundamentals");
    assert_eq!(body["userPreferences"]["depth"], "Balanced");
}
