use std::sync::atomic::Ordering;
use std::sync::Arc;

use skilltrail::models::roadmap::Playlists;
use skilltrail::orchestrator::playlist_loader::PlaylistLoader;
use skilltrail::persistence::roadmap_repo::RoadmapRepo;
use skilltrail::AppError;

use super::support::{memory_store, roadmap, video, CountingGenerator};

async fn setup(generator: CountingGenerator) -> (RoadmapRepo, Arc<CountingGenerator>, PlaylistLoader) {
    let repo = RoadmapRepo::new(memory_store().await);
    repo.set_active_roadmap(&roadmap("py", "Python")).await.unwrap();
    let generator = Arc::new(generator);
    let loader = PlaylistLoader::new(repo.clone(), generator.clone());
    (repo, generator, loader)
}

#[tokio::test]
async fn second_load_is_served_from_store() {
    let (repo, generator, loader) =
        setup(CountingGenerator::with_playlists(vec![video("a"), video("b")])).await;

    assert!(!loader
        .are_playlists_loaded_for_point("py", "py-p1")
        .await
        .unwrap());

    let first = loader
        .load_playlists_for_point("py", "py-p1", "Python", "Python Fundamentals")
        .await
        .unwrap();
    let second = loader
        .load_playlists_for_point("py", "py-p1", "Python", "Python Fundamentals")
        .await
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
    assert_eq!(generator.playlist_calls(), 1);
    assert!(loader
        .are_playlists_loaded_for_point("py", "py-p1")
        .await
        .unwrap());

    let active = repo.get_active_roadmap().await.unwrap().unwrap();
    assert_eq!(
        active.points[0].playlists,
        Playlists::Hydrated(vec![video("a"), video("b")])
    );
}

#[tokio::test]
async fn empty_result_still_counts_as_loaded() {
    let (_repo, generator, loader) = setup(CountingGenerator::default()).await;

    let items = loader
        .load_playlists_for_point("py", "py-p2", "Python", "Intermediate Python")
        .await
        .unwrap();
    assert!(items.is_empty());
    assert!(loader
        .are_playlists_loaded_for_point("py", "py-p2")
        .await
        .unwrap());

    loader
        .load_playlists_for_point("py", "py-p2", "Python", "Intermediate Python")
        .await
        .unwrap();
    assert_eq!(generator.playlist_calls(), 1);
}

#[tokio::test]
async fn regenerate_always_calls_generator() {
    let (_repo, generator, loader) =
        setup(CountingGenerator::with_playlists(vec![video("a")])).await;

    loader
        .load_playlists_for_point("py", "py-p1", "Python", "Python Fundamentals")
        .await
        .unwrap();
    loader
        .regenerate_playlists_for_point("py", "py-p1", "Python", "Python Fundamentals")
        .await
        .unwrap();

    assert_eq!(generator.playlist_calls(), 2);
}

#[tokio::test]
async fn failed_load_leaves_point_unhydrated_and_can_retry() {
    let (repo, generator, loader) =
        setup(CountingGenerator::with_playlists(vec![video("a")])).await;
    generator.fail.store(true, Ordering::SeqCst);

    let err = loader
        .load_playlists_for_point("py", "py-p1", "Python", "Python Fundamentals")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Http(_)));
    assert!(!loader
        .are_playlists_loaded_for_point("py", "py-p1")
        .await
        .unwrap());
    let stored = repo.get_roadmap_by_id("py").await.unwrap().unwrap();
    assert_eq!(stored.points[0].playlists, Playlists::Unhydrated);

    generator.fail.store(false, Ordering::SeqCst);
    let items = loader
        .load_playlists_for_point("py", "py-p1", "Python", "Python Fundamentals")
        .await
        .unwrap();
    assert_eq!(items, vec![video("a")]);
    assert_eq!(generator.playlist_calls(), 2);
}

#[tokio::test]
async fn hydrating_one_point_leaves_siblings_alone() {
    let (repo, _generator, loader) =
        setup(CountingGenerator::with_playlists(vec![video("a")])).await;

    loader
        .load_playlists_for_point("py", "py-p3", "Python", "Advanced Python")
        .await
        .unwrap();

    let stored = repo.get_roadmap_by_id("py").await.unwrap().unwrap();
    assert!(!stored.points[0].playlists.is_hydrated());
    assert!(!stored.points[1].playlists.is_hydrated());
    assert!(stored.points[2].playlists.is_hydrated());
}

#[tokio::test]
async fn unknown_roadmap_or_point_is_not_found() {
    let (_repo, generator, loader) = setup(CountingGenerator::default()).await;

    assert!(matches!(
        loader.are_playlists_loaded_for_point("missing", "py-p1").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        loader
            .load_playlists_for_point("py", "missing", "Python", "?")
            .await,
        Err(AppError::NotFound(_))
    ));
    assert_eq!(generator.playlist_calls(), 0);
}
