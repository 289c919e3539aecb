//! Completion statistics derived from roadmap points.

use serde::{Deserialize, Serialize};

use super::roadmap::{Roadmap, RoadmapPoint};

/// Completion summary for a single roadmap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    /// Points marked complete.
    pub completed_points: usize,
    /// All points in the roadmap.
    pub total_points: usize,
    /// `round(100 * completed / total)`, or 0 for an empty roadmap.
    pub percentage: u8,
}

/// Derive completion statistics from an ordered sequence of points.
#[must_use]
pub fn calculate_progress(points: &[RoadmapPoint]) -> Progress {
    let completed_points = points.iter().filter(|point| point.is_completed).count();
    let total_points = points.len();
    Progress {
        completed_points,
        total_points,
        percentage: percentage(completed_points, total_points),
    }
}

/// Integer half-up rounding of `100 * completed / total`.
fn percentage(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded.min(100)).unwrap_or(100)
}

/// Aggregate learning statistics across every stored roadmap.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LearningStats {
    /// Roadmaps in the collection.
    pub total_roadmaps: usize,
    /// Completed points summed over all roadmaps.
    pub completed_points: usize,
    /// Points summed over all roadmaps.
    pub total_points: usize,
    /// Cached percentage of the active roadmap; 0 when none is active.
    pub active_roadmap_progress: u8,
}

impl LearningStats {
    /// Summarise a collection and the (optional) active roadmap.
    #[must_use]
    pub fn collect(roadmaps: &[Roadmap], active: Option<&Roadmap>) -> Self {
        let (completed_points, total_points) =
            roadmaps.iter().fold((0, 0), |(done, total), roadmap| {
                let progress = calculate_progress(&roadmap.points);
                (
                    done + progress.completed_points,
                    total + progress.total_points,
                )
            });

        Self {
            total_roadmaps: roadmaps.len(),
            completed_points,
            total_points,
            active_roadmap_progress: active
                .and_then(|roadmap| roadmap.progress)
                .map_or(0, |progress| progress.percentage),
        }
    }
}
