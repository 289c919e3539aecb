//! Application-scoped state shared by every front end.
//!
//! Built once at startup and passed by reference; there is no ambient
//! "current roadmap" global. The active roadmap lives in the store and is
//! reached through [`AppState::roadmaps`].

use std::sync::Arc;

use tracing::info;

use crate::config::GlobalConfig;
use crate::generation::client::BackendClient;
use crate::generation::mock::MockGenerator;
use crate::generation::RoadmapGenerator;
use crate::models::roadmap::Roadmap;
use crate::orchestrator::playlist_loader::PlaylistLoader;
use crate::orchestrator::roadmap_flow;
use crate::persistence::db;
use crate::persistence::kv_store::{KeyValueStore, SqliteKvStore};
use crate::persistence::profile_repo::ProfileRepo;
use crate::persistence::roadmap_repo::RoadmapRepo;
use crate::Result;

/// Shared application state.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Roadmap collection and active pointer.
    pub roadmaps: RoadmapRepo,
    /// User profile and preferences.
    pub profiles: ProfileRepo,
    /// Roadmap and playlist source.
    pub generator: Arc<dyn RoadmapGenerator>,
    /// Memoised playlist hydration.
    pub playlists: PlaylistLoader,
}

impl AppState {
    /// Open the configured database and wire every component.
    ///
    /// With `offline` set the mock generator replaces the HTTP backend.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the database cannot be opened and
    /// `AppError::Http` if the backend client cannot be built.
    pub async fn connect(config: GlobalConfig, offline: bool) -> Result<Self> {
        let pool = db::connect(&config.database_path).await?;
        info!(path = %config.database_path.display(), "database connected");
        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteKvStore::new(Arc::new(pool)));

        let profiles = ProfileRepo::new(Arc::clone(&store));
        let generator: Arc<dyn RoadmapGenerator> = if offline {
            info!("offline mode, using mock generator");
            Arc::new(MockGenerator)
        } else {
            Arc::new(BackendClient::new(&config, profiles.clone())?)
        };

        Ok(Self::assemble(config, store, profiles, generator))
    }

    /// Wire components over an existing store and generator.
    #[must_use]
    pub fn from_parts(
        config: GlobalConfig,
        store: Arc<dyn KeyValueStore>,
        generator: Arc<dyn RoadmapGenerator>,
    ) -> Self {
        let profiles = ProfileRepo::new(Arc::clone(&store));
        Self::assemble(config, store, profiles, generator)
    }

    fn assemble(
        config: GlobalConfig,
        store: Arc<dyn KeyValueStore>,
        profiles: ProfileRepo,
        generator: Arc<dyn RoadmapGenerator>,
    ) -> Self {
        let roadmaps = RoadmapRepo::new(store);
        let playlists = PlaylistLoader::new(roadmaps.clone(), Arc::clone(&generator));
        Self {
            config: Arc::new(config),
            roadmaps,
            profiles,
            generator,
            playlists,
        }
    }

    /// Generate a roadmap for `topic` and make it active.
    ///
    /// # Errors
    ///
    /// See [`roadmap_flow::generate_new_roadmap`].
    pub async fn generate_new_roadmap(&self, topic: &str) -> Result<Roadmap> {
        roadmap_flow::generate_new_roadmap(topic, self.generator.as_ref(), &self.roadmaps).await
    }

    /// Forget every roadmap and the user profile.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if any delete fails.
    pub async fn reset(&self) -> Result<()> {
        self.roadmaps.clear_all_roadmaps().await?;
        self.profiles.clear_user_data().await
    }
}
