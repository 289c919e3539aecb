//! State written through one `AppState` is visible after reopening the
//! database file.

use skilltrail::{AppState, GlobalConfig};

fn file_config(dir: &std::path::Path) -> GlobalConfig {
    GlobalConfig {
        database_path: dir.join("data").join("skilltrail.db"),
        ..GlobalConfig::default()
    }
}

#[tokio::test]
async fn roadmaps_and_active_pointer_survive_reopen() {
    let temp = tempfile::tempdir().expect("tempdir");

    let (roadmap_id, point_id) = {
        let state = AppState::connect(file_config(temp.path()), true)
            .await
            .expect("first connect");
        let roadmap = state.generate_new_roadmap("Python").await.unwrap();
        let point_id = roadmap.points[0].id.clone();
        state
            .roadmaps
            .update_roadmap_progress(&roadmap.id, &point_id, true)
            .await
            .unwrap();
        state.profiles.set_user_name("Ada").await.unwrap();
        (roadmap.id, point_id)
    };

    let state = AppState::connect(file_config(temp.path()), true)
        .await
        .expect("second connect");

    let active = state.roadmaps.get_active_roadmap().await.unwrap().unwrap();
    assert_eq!(active.id, roadmap_id);
    assert!(active.point(&point_id).unwrap().is_completed);
    assert_eq!(active.progress.unwrap().percentage, 33);
    assert_eq!(state.roadmaps.get_all_roadmaps().await.len(), 1);
    assert_eq!(state.profiles.get_profile().await.unwrap().name, "Ada");
}

#[tokio::test]
async fn connect_creates_missing_parent_directories() {
    let temp = tempfile::tempdir().expect("tempdir");
    let config = file_config(temp.path());
    let path = config.database_path.clone();

    AppState::connect(config, true).await.expect("connect");

    assert!(path.exists());
}
