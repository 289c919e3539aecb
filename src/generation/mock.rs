//! Offline roadmap generator.

use chrono::Utc;

use crate::models::progress::calculate_progress;
use crate::models::roadmap::{PlaylistItem, Playlists, PointLevel, Roadmap, RoadmapPoint};

use super::{GenerationFuture, PlaylistRequest, RoadmapGenerator};

/// Build a three-step beginner → advanced roadmap for `topic` without any
/// network access. Points start unhydrated and incomplete.
#[must_use]
pub fn create_mock_roadmap(topic: &str) -> Roadmap {
    let now = Utc::now();
    let id = format!("roadmap_{}", now.timestamp_millis());

    let steps = [
        (
            format!("{topic} Fundamentals"),
            format!("Learn the basics of {topic}"),
            PointLevel::Beginner,
        ),
        (
            format!("Intermediate {topic}"),
            format!("Dive deeper into {topic} concepts"),
            PointLevel::Intermediate,
        ),
        (
            format!("Advanced {topic}"),
            format!("Master advanced {topic} techniques"),
            PointLevel::Advanced,
        ),
    ];

    let points: Vec<RoadmapPoint> = steps
        .into_iter()
        .zip(1u32..)
        .map(|((title, description, level), order)| RoadmapPoint {
            id: format!("point_{id}_{order}"),
            title,
            description,
            level,
            order,
            playlists: Playlists::Unhydrated,
            is_completed: false,
        })
        .collect();

    let progress = calculate_progress(&points);
    Roadmap {
        title: format!("{topic} Learning Roadmap"),
        description: format!("A comprehensive learning roadmap for {topic}"),
        id,
        topic: topic.to_owned(),
        created_at: now,
        updated_at: now,
        points,
        progress: Some(progress),
    }
}

/// Generator that never touches the network.
///
/// Roadmaps come from [`create_mock_roadmap`]; playlists resolve to an
/// empty list so points still transition to hydrated.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockGenerator;

impl RoadmapGenerator for MockGenerator {
    fn generate_roadmap<'a>(&'a self, topic: &'a str) -> GenerationFuture<'a, Roadmap> {
        Box::pin(async move { Ok(create_mock_roadmap(topic)) })
    }

    fn generate_playlists<'a>(
        &'a self,
        _request: &'a PlaylistRequest,
    ) -> GenerationFuture<'a, Vec<PlaylistItem>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}
