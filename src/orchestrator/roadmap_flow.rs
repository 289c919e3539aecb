//! Roadmap creation flow: generate, normalise, promote to active.

use tracing::{info, info_span, Instrument};

use crate::generation::RoadmapGenerator;
use crate::models::roadmap::Roadmap;
use crate::persistence::roadmap_repo::RoadmapRepo;
use crate::{AppError, Result};

/// Generate a roadmap for `topic`, store it, and make it the active one.
///
/// Progress is recomputed from the generated points before storing. If the
/// generator fails nothing is written.
///
/// # Errors
///
/// Returns `AppError::Validation` for a blank topic, the generator's
/// `AppError::Http`/`AppError::Generation` on remote failure, and
/// `AppError::Storage` if persisting fails.
pub async fn generate_new_roadmap(
    topic: &str,
    generator: &dyn RoadmapGenerator,
    roadmaps: &RoadmapRepo,
) -> Result<Roadmap> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(AppError::Validation("topic must not be empty".into()));
    }

    let span = info_span!("generate_new_roadmap", topic);
    async {
        let mut roadmap = generator.generate_roadmap(topic).await?;
        roadmap.refresh_progress();
        roadmaps.set_active_roadmap(&roadmap).await?;
        info!(roadmap_id = %roadmap.id, points = roadmap.points.len(), "new roadmap active");
        Ok(roadmap)
    }
    .instrument(span)
    .await
}
