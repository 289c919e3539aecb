//! HTTP client for the roadmap/playlist generation backend.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::GlobalConfig;
use crate::models::profile::UserPreferences;
use crate::models::roadmap::{PlaylistItem, Roadmap};
use crate::persistence::profile_repo::ProfileRepo;
use crate::{AppError, Result};

use super::{GenerationFuture, PlaylistRequest, RoadmapGenerator};

/// Roadmap generation endpoint path.
pub const ROADMAP_GENERATE_PATH: &str = "/api/roadmaps/generate";

/// Playlist generation endpoint path.
pub const PLAYLIST_GENERATE_PATH: &str = "/api/playlists/generate";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RoadmapGenerateBody<'a> {
    topic: &'a str,
    user_preferences: UserPreferences,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistGenerateBody<'a> {
    roadmap_id: &'a str,
    point_id: &'a str,
    topic: &'a str,
    point_title: &'a str,
    user_preferences: UserPreferences,
}

/// Response envelope shared by both endpoints.
#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    data: Option<serde_json::Value>,
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    message: Option<String>,
}

/// Generation backend client.
///
/// Every request carries the user's current preferences, read from the
/// profile repository at call time.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    roadmap_url: String,
    playlist_url: String,
    profiles: ProfileRepo,
}

impl BackendClient {
    /// Build a client for the configured backend.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` if the underlying HTTP client cannot be built.
    pub fn new(config: &GlobalConfig, profiles: ProfileRepo) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|err| AppError::Http(format!("failed to build http client: {err}")))?;

        Ok(Self {
            client,
            roadmap_url: config.endpoint(ROADMAP_GENERATE_PATH),
            playlist_url: config.endpoint(PLAYLIST_GENERATE_PATH),
            profiles,
        })
    }

    /// Request a roadmap for `topic`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Http` on transport failure or non-2xx status,
    /// `AppError::Generation` if the envelope reports failure or lacks a
    /// roadmap, and `AppError::Storage` if preferences cannot be read.
    pub async fn generate_roadmap_from_backend(&self, topic: &str) -> Result<Roadmap> {
        let body = RoadmapGenerateBody {
            topic,
            user_preferences: self.profiles.get_preferences().await?,
        };
        let roadmap: Roadmap = self
            .post_envelope(&self.roadmap_url, &body, "Failed to generate roadmap")
            .await?;
        info!(topic, roadmap_id = %roadmap.id, points = roadmap.points.len(), "roadmap generated");
        Ok(roadmap)
    }

    /// Request the playlist for one roadmap point.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`BackendClient::generate_roadmap_from_backend`].
    pub async fn generate_playlists_from_backend(
        &self,
        request: &PlaylistRequest,
    ) -> Result<Vec<PlaylistItem>> {
        let body = PlaylistGenerateBody {
            roadmap_id: &request.roadmap_id,
            point_id: &request.point_id,
            topic: &request.topic,
            point_title: &request.point_title,
            user_preferences: self.profiles.get_preferences().await?,
        };
        let items: Vec<PlaylistItem> = self
            .post_envelope(&self.playlist_url, &body, "Failed to generate playlists")
            .await?;
        info!(
            roadmap_id = %request.roadmap_id,
            point_id = %request.point_id,
            count = items.len(),
            "playlists generated"
        );
        Ok(items)
    }

    async fn post_envelope<B, T>(&self, url: &str, body: &B, fallback: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|err| AppError::Http(format!("request to {url} failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            warn!(url, %status, "generation backend returned error status");
            return Err(AppError::Http(format!("{url} returned status {status}")));
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|err| AppError::Generation(format!("invalid response envelope: {err}")))?;

        if !envelope.success {
            let message = envelope
                .error
                .and_then(|error| error.message)
                .filter(|message| !message.trim().is_empty())
                .unwrap_or_else(|| fallback.to_owned());
            warn!(url, %message, "generation backend reported failure");
            return Err(AppError::Generation(message));
        }

        let data = envelope
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| AppError::Generation("response envelope carried no data".into()))?;
        serde_json::from_value(data)
            .map_err(|err| AppError::Generation(format!("unusable response data: {err}")))
    }
}

impl RoadmapGenerator for BackendClient {
    fn generate_roadmap<'a>(&'a self, topic: &'a str) -> GenerationFuture<'a, Roadmap> {
        Box::pin(self.generate_roadmap_from_backend(topic))
    }

    fn generate_playlists<'a>(
        &'a self,
        request: &'a PlaylistRequest,
    ) -> GenerationFuture<'a, Vec<PlaylistItem>> {
        Box::pin(self.generate_playlists_from_backend(request))
    }
}
