//! Roadmap and playlist generation.
//!
//! The [`RoadmapGenerator`] trait decouples the stores and the playlist
//! loader from where roadmaps come from: the HTTP backend in production,
//! the offline mock generator, or a stub in tests.

pub mod client;
pub mod mock;

use std::future::Future;
use std::pin::Pin;

use crate::models::roadmap::{PlaylistItem, Roadmap};
use crate::Result;

/// Boxed future returned by [`RoadmapGenerator`] methods.
pub type GenerationFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Identifies the roadmap point a playlist is generated for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistRequest {
    /// Owning roadmap.
    pub roadmap_id: String,
    /// Target point.
    pub point_id: String,
    /// Roadmap topic, used as search context.
    pub topic: String,
    /// Title of the target point.
    pub point_title: String,
}

/// Source of generated roadmaps and point playlists.
pub trait RoadmapGenerator: Send + Sync {
    /// Produce a complete roadmap for `topic`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Http`](crate::AppError::Http) on transport failure or
    /// a non-2xx status, and [`AppError::Generation`](crate::AppError::Generation)
    /// when the backend reports failure or returns no usable roadmap.
    fn generate_roadmap<'a>(&'a self, topic: &'a str) -> GenerationFuture<'a, Roadmap>;

    /// Produce the video playlist for one roadmap point.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`RoadmapGenerator::generate_roadmap`].
    fn generate_playlists<'a>(
        &'a self,
        request: &'a PlaylistRequest,
    ) -> GenerationFuture<'a, Vec<PlaylistItem>>;
}
