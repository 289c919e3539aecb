//! Lazy, memoised playlist hydration for roadmap points.
//!
//! A point's playlist is requested from the generator at most once: after a
//! successful load the point is hydrated (even with zero items) and later
//! loads are served from the store. Only
//! [`PlaylistLoader::regenerate_playlists_for_point`] calls the generator
//! for an already hydrated point. A failed call leaves the point unhydrated
//! so it can be retried.

use std::sync::Arc;

use tracing::{debug, info, info_span, warn, Instrument};

use crate::generation::{PlaylistRequest, RoadmapGenerator};
use crate::models::roadmap::{PlaylistItem, Playlists, RoadmapPoint};
use crate::persistence::roadmap_repo::RoadmapRepo;
use crate::{AppError, Result};

/// Playlist hydration over a roadmap repository and a generator.
#[derive(Clone)]
pub struct PlaylistLoader {
    roadmaps: RoadmapRepo,
    generator: Arc<dyn RoadmapGenerator>,
}

impl PlaylistLoader {
    /// Create a loader writing through `roadmaps`.
    #[must_use]
    pub fn new(roadmaps: RoadmapRepo, generator: Arc<dyn RoadmapGenerator>) -> Self {
        Self {
            roadmaps,
            generator,
        }
    }

    /// Whether the point's playlist has been resolved, including to an
    /// empty list.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the roadmap or point does not exist.
    pub async fn are_playlists_loaded_for_point(
        &self,
        roadmap_id: &str,
        point_id: &str,
    ) -> Result<bool> {
        Ok(self
            .find_point(roadmap_id, point_id)
            .await?
            .playlists
            .is_hydrated())
    }

    /// Return the point's playlist, generating and storing it on first use.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` for an unknown roadmap or point,
    /// `AppError::Http`/`AppError::Generation` if the generator fails, and
    /// `AppError::Storage` if the result cannot be persisted.
    pub async fn load_playlists_for_point(
        &self,
        roadmap_id: &str,
        point_id: &str,
        topic: &str,
        point_title: &str,
    ) -> Result<Vec<PlaylistItem>> {
        let span = info_span!("load_playlists", roadmap_id, point_id);
        async {
            let point = self.find_point(roadmap_id, point_id).await?;
            if let Playlists::Hydrated(items) = point.playlists {
                debug!(count = items.len(), "playlists already loaded");
                return Ok(items);
            }
            self.fetch_and_store(roadmap_id, point_id, topic, point_title)
                .await
        }
        .instrument(span)
        .await
    }

    /// Ask the generator again and overwrite whatever the point holds.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`PlaylistLoader::load_playlists_for_point`].
    pub async fn regenerate_playlists_for_point(
        &self,
        roadmap_id: &str,
        point_id: &str,
        topic: &str,
        point_title: &str,
    ) -> Result<Vec<PlaylistItem>> {
        let span = info_span!("regenerate_playlists", roadmap_id, point_id);
        async {
            self.find_point(roadmap_id, point_id).await?;
            info!("regenerating playlists");
            self.fetch_and_store(roadmap_id, point_id, topic, point_title)
                .await
        }
        .instrument(span)
        .await
    }

    async fn fetch_and_store(
        &self,
        roadmap_id: &str,
        point_id: &str,
        topic: &str,
        point_title: &str,
    ) -> Result<Vec<PlaylistItem>> {
        let request = PlaylistRequest {
            roadmap_id: roadmap_id.to_owned(),
            point_id: point_id.to_owned(),
            topic: topic.to_owned(),
            point_title: point_title.to_owned(),
        };

        let items = self
            .generator
            .generate_playlists(&request)
            .await
            .inspect_err(|err| warn!(%err, "playlist generation failed, point left unhydrated"))?;

        self.roadmaps
            .initialize_playlists_for_point(roadmap_id, point_id, items.clone())
            .await?;
        Ok(items)
    }

    async fn find_point(&self, roadmap_id: &str, point_id: &str) -> Result<RoadmapPoint> {
        let roadmap = self
            .roadmaps
            .get_roadmap_by_id(roadmap_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("roadmap {roadmap_id}")))?;
        roadmap
            .points
            .into_iter()
            .find(|point| point.id == point_id)
            .ok_or_else(|| AppError::NotFound(format!("point {point_id} in roadmap {roadmap_id}")))
    }
}
