//! Roadmap, roadmap point, and playlist models.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::progress::{calculate_progress, Progress};
use crate::AppError;

/// Difficulty tier of a roadmap point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PointLevel {
    /// Entry-level material.
    Beginner,
    /// Builds on the fundamentals.
    Intermediate,
    /// Specialist material.
    Advanced,
}

impl PointLevel {
    /// Wire representation of the level.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl Display for PointLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PointLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(AppError::Validation(format!("invalid point level: {other}"))),
        }
    }
}

/// A single video resource attached to a roadmap point.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistItem {
    /// Identifier unique within the owning point.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Link to the video.
    pub video_url: String,
    /// Human-readable running time, e.g. `12:34`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    /// Short summary of the video.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Hydration state of a point's playlist.
///
/// Persisted as JSON `null` (unhydrated) or an array (hydrated, possibly
/// empty). A hydrated list never returns to `Unhydrated`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(
    from = "Option<Vec<PlaylistItem>>",
    into = "Option<Vec<PlaylistItem>>"
)]
pub enum Playlists {
    /// Not yet requested from the generator.
    #[default]
    Unhydrated,
    /// Resolved by the generator; an empty list is still resolved.
    Hydrated(Vec<PlaylistItem>),
}

impl Playlists {
    /// Whether the generator has already been consulted for this point.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        matches!(self, Self::Hydrated(_))
    }

    /// Hydrated items, or an empty slice when unhydrated.
    #[must_use]
    pub fn items(&self) -> &[PlaylistItem] {
        match self {
            Self::Unhydrated => &[],
            Self::Hydrated(items) => items,
        }
    }

    /// Insert or replace an item by id, hydrating an unhydrated list first.
    pub fn upsert(&mut self, item: PlaylistItem) {
        if let Self::Unhydrated = self {
            *self = Self::Hydrated(Vec::new());
        }
        if let Self::Hydrated(items) = self {
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => *existing = item,
                None => items.push(item),
            }
        }
    }
}

impl From<Option<Vec<PlaylistItem>>> for Playlists {
    fn from(value: Option<Vec<PlaylistItem>>) -> Self {
        value.map_or(Self::Unhydrated, Self::Hydrated)
    }
}

impl From<Playlists> for Option<Vec<PlaylistItem>> {
    fn from(value: Playlists) -> Self {
        match value {
            Playlists::Unhydrated => None,
            Playlists::Hydrated(items) => Some(items),
        }
    }
}

/// One learning step within a roadmap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPoint {
    /// Opaque identifier, immutable after creation.
    pub id: String,
    /// Short step title.
    pub title: String,
    /// What the step covers.
    pub description: String,
    /// Difficulty tier.
    pub level: PointLevel,
    /// Display position; unique within the roadmap.
    pub order: u32,
    /// Video playlist hydration state.
    #[serde(default)]
    pub playlists: Playlists,
    /// Whether the learner has finished this step.
    #[serde(default)]
    pub is_completed: bool,
}

/// A topic-scoped learning path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Roadmap {
    /// Opaque identifier, immutable after creation.
    pub id: String,
    /// Free-text topic the roadmap was generated for.
    pub topic: String,
    /// Display title.
    pub title: String,
    /// Summary text.
    pub description: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last mutation.
    pub updated_at: DateTime<Utc>,
    /// Ordered learning steps.
    pub points: Vec<RoadmapPoint>,
    /// Cached completion statistics, recomputed after every point mutation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

impl Roadmap {
    /// Find a point by identifier.
    #[must_use]
    pub fn point(&self, point_id: &str) -> Option<&RoadmapPoint> {
        self.points.iter().find(|point| point.id == point_id)
    }

    /// Find a point by identifier for mutation.
    pub fn point_mut(&mut self, point_id: &str) -> Option<&mut RoadmapPoint> {
        self.points.iter_mut().find(|point| point.id == point_id)
    }

    /// Recompute the cached progress from the current points.
    pub fn refresh_progress(&mut self) {
        self.progress = Some(calculate_progress(&self.points));
    }

    /// Record a mutation: refresh progress and bump `updated_at`.
    pub fn touch(&mut self) {
        self.refresh_progress();
        self.updated_at = Utc::now();
    }

    /// Case-insensitive substring match over topic, title, and description.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_query(&self, needle: &str) -> bool {
        [&self.topic, &self.title, &self.description]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}
