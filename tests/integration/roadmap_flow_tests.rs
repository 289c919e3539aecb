//! End-to-end roadmap creation through `AppState`.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use skilltrail::generation::mock::{create_mock_roadmap, MockGenerator};
use skilltrail::models::profile::{Depth, UserPreferences, VideoLength};
use skilltrail::models::progress::Progress;
use skilltrail::{AppError, AppState, GlobalConfig};

use super::test_helpers::{backend_client, memory_store, spawn_stub_backend};

async fn backend_state(config: GlobalConfig) -> AppState {
    let store = memory_store().await;
    let (client, _profiles) = backend_client(&config).await;
    AppState::from_parts(config, store, Arc::new(client))
}

#[tokio::test]
async fn generated_roadmap_becomes_active() {
    let stub = spawn_stub_backend().await;
    let mut remote = create_mock_roadmap("Python");
    remote.progress = Some(Progress {
        completed_points: 2,
        total_points: 3,
        percentage: 67,
    });
    stub.reply_data(serde_json::to_value(&remote).unwrap());
    let state = backend_state(stub.config()).await;

    let roadmap = state.generate_new_roadmap("  Python ").await.unwrap();

    assert_eq!(roadmap.id, remote.id);
    assert_eq!(roadmap.progress.unwrap().percentage, 0);
    let active = state.roadmaps.get_active_roadmap().await.unwrap().unwrap();
    let stored = state
        .roadmaps
        .get_roadmap_by_id(&roadmap.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active, stored);
    assert_eq!(active, roadmap);
    assert_eq!(stub.requests()[0].1["topic"], "Python");
}

#[tokio::test]
async fn backend_error_writes_nothing() {
    let stub = spawn_stub_backend().await;
    stub.reply(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
    let state = backend_state(stub.config()).await;

    let err = state.generate_new_roadmap("Python").await.unwrap_err();

    assert!(matches!(err, AppError::Http(_)));
    assert!(state.roadmaps.get_all_roadmaps().await.is_empty());
    assert!(state.roadmaps.get_active_roadmap().await.unwrap().is_none());
}

#[tokio::test]
async fn blank_topic_is_rejected_before_any_request() {
    let stub = spawn_stub_backend().await;
    let state = backend_state(stub.config()).await;

    let err = state.generate_new_roadmap("   ").await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(stub.requests().is_empty());
}

#[tokio::test]
async fn playlists_load_once_through_backend() {
    let stub = spawn_stub_backend().await;
    let state = backend_state(stub.config()).await;
    stub.reply_data(serde_json::to_value(create_mock_roadmap("Rust")).unwrap());
    let roadmap = state.generate_new_roadmap("Rust").await.unwrap();
    let point = roadmap.points[0].clone();

    stub.reply_data(json!([
        { "id": "v1", "title": "Ownership", "videoUrl": "https://videos.example/v1" }
    ]));
    let first = state
        .playlists
        .load_playlists_for_point(&roadmap.id, &point.id, &roadmap.topic, &point.title)
        .await
        .unwrap();
    let second = state
        .playlists
        .load_playlists_for_point(&roadmap.id, &point.id, &roadmap.topic, &point.title)
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(stub.requests().len(), 2, "one roadmap call, one playlist call");
    let active = state.roadmaps.get_active_roadmap().await.unwrap().unwrap();
    assert!(active.points[0].playlists.is_hydrated());
}

#[tokio::test]
async fn offline_flow_uses_mock_generator() {
    let state = AppState::from_parts(
        GlobalConfig::default(),
        memory_store().await,
        Arc::new(MockGenerator),
    );

    let roadmap = state.generate_new_roadmap("Haskell").await.unwrap();
    assert_eq!(roadmap.points.len(), 3);

    let point = &roadmap.points[1];
    let items = state
        .playlists
        .load_playlists_for_point(&roadmap.id, &point.id, &roadmap.topic, &point.title)
        .await
        .unwrap();
    assert!(items.is_empty());
    assert!(state
        .playlists
        .are_playlists_loaded_for_point(&roadmap.id, &point.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn reset_forgets_roadmaps_and_profile() {
    let state = AppState::from_parts(
        GlobalConfig::default(),
        memory_store().await,
        Arc::new(MockGenerator),
    );
    state.generate_new_roadmap("Go").await.unwrap();
    state.profiles.set_user_name("Ada").await.unwrap();

    state.reset().await.unwrap();

    assert!(state.roadmaps.get_all_roadmaps().await.is_empty());
    assert!(state.roadmaps.get_active_roadmap().await.unwrap().is_none());
    assert!(state.profiles.get_profile().await.unwrap().name.is_empty());
}

#[tokio::test]
async fn connected_state_sends_profile_preferences_to_backend() {
    let stub = spawn_stub_backend().await;
    stub.reply_data(serde_json::to_value(create_mock_roadmap("Go")).unwrap());
    let temp = tempfile::tempdir().expect("tempdir");
    let config = GlobalConfig {
        database_path: temp.path().join("skilltrail.db"),
        ..stub.config()
    };
    let state = AppState::connect(config, false).await.expect("connect");

    state
        .profiles
        .set_preferences(UserPreferences {
            depth: Depth::Fast,
            video_length: VideoLength::Long,
        })
        .await
        .unwrap();
    state.generate_new_roadmap("Go").await.unwrap();

    let (_, body) = &stub.requests()[0];
    assert_eq!(
        body["userPreferences"],
        json!({ "depth": "Fast", "videoLength": "Long" })
    );
}
