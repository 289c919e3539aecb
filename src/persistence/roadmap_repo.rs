//! Roadmap collection and active-roadmap pointer persistence.
//!
//! Two keys are kept in the key-value store: the full collection and a copy
//! of the active roadmap. Point and playlist mutations write the collection
//! first and re-sync the pointer second; activation writes the pointer
//! first. The two writes are not atomic, so the pointer is a cache of the
//! collection and may disagree with it after a crash between the writes.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::models::progress::{calculate_progress, LearningStats, Progress};
use crate::models::roadmap::{PlaylistItem, Playlists, PointLevel, Roadmap, RoadmapPoint};
use crate::{AppError, Result};

use super::kv_store::{decode_json, encode_json, KeyValueStore};

/// Store key holding the JSON array of every roadmap.
pub const ROADMAPS_KEY: &str = "@skilltrail_roadmaps";

/// Store key holding the JSON copy of the active roadmap.
pub const ACTIVE_ROADMAP_KEY: &str = "@skilltrail_active_roadmap";

/// Repository over the roadmap collection and active pointer.
///
/// Clones share one write lock, so read-modify-write cycles issued through
/// the same repository never interleave. Writers in other processes are
/// still last-writer-wins.
#[derive(Clone)]
pub struct RoadmapRepo {
    store: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl RoadmapRepo {
    /// Create a new repository instance.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Upsert a roadmap into the collection by id.
    ///
    /// An existing entry is replaced in place; otherwise the roadmap is
    /// appended. The active pointer is not touched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read or write fails.
    pub async fn save_roadmap(&self, roadmap: &Roadmap) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.save_unlocked(roadmap).await
    }

    /// Every stored roadmap in storage order.
    ///
    /// Never fails: an absent key, content that is not a roadmap array, or
    /// an unavailable store all yield an empty list.
    pub async fn get_all_roadmaps(&self) -> Vec<Roadmap> {
        match self.load_collection().await {
            Ok(roadmaps) => roadmaps,
            Err(err) => {
                warn!(%err, "roadmap collection unreadable, returning empty list");
                Vec::new()
            }
        }
    }

    /// Look up a roadmap by id.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read fails.
    pub async fn get_roadmap_by_id(&self, id: &str) -> Result<Option<Roadmap>> {
        let roadmaps = self.load_collection().await?;
        Ok(roadmaps.into_iter().find(|roadmap| roadmap.id == id))
    }

    /// Remove a roadmap; clears the active pointer if it referenced `id`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if any store operation fails.
    pub async fn delete_roadmap(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut roadmaps = self.load_collection().await?;
        roadmaps.retain(|roadmap| roadmap.id != id);
        self.store_collection(&roadmaps).await?;

        if self.load_active().await?.is_some_and(|active| active.id == id) {
            self.store.remove_item(ACTIVE_ROADMAP_KEY).await?;
            info!(roadmap_id = %id, "deleted roadmap was active, pointer cleared");
        }

        info!(roadmap_id = %id, "roadmap deleted");
        Ok(())
    }

    /// Make `roadmap` the active one and upsert it into the collection.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if either write fails. A failure on the
    /// second write leaves the pointer updated but the collection stale.
    pub async fn set_active_roadmap(&self, roadmap: &Roadmap) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_active(roadmap).await?;
        self.save_unlocked(roadmap).await?;
        info!(roadmap_id = %roadmap.id, "active roadmap set");
        Ok(())
    }

    /// The active roadmap, or `None` when unset.
    ///
    /// A pointer that no longer decodes is treated as unset.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read fails.
    pub async fn get_active_roadmap(&self) -> Result<Option<Roadmap>> {
        self.load_active().await
    }

    /// Remove the active pointer; the collection is untouched.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the delete fails.
    pub async fn clear_active_roadmap(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove_item(ACTIVE_ROADMAP_KEY).await?;
        info!("active roadmap cleared");
        Ok(())
    }

    /// Set a point's completion flag and recompute progress.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the roadmap or point does not exist,
    /// or `AppError::Storage` if persistence fails.
    pub async fn update_roadmap_progress(
        &self,
        roadmap_id: &str,
        point_id: &str,
        is_completed: bool,
    ) -> Result<Roadmap> {
        let updated = self
            .modify_roadmap(roadmap_id, |roadmap| {
                point_mut(roadmap, point_id)?.is_completed = is_completed;
                Ok(())
            })
            .await?;
        info!(
            roadmap_id,
            point_id,
            is_completed,
            percentage = updated.progress.map_or(0, |p| p.percentage),
            "roadmap progress updated"
        );
        Ok(updated)
    }

    /// Freshly computed progress for a stored roadmap.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read fails.
    pub async fn get_roadmap_progress(&self, roadmap_id: &str) -> Result<Option<Progress>> {
        Ok(self
            .get_roadmap_by_id(roadmap_id)
            .await?
            .map(|roadmap| calculate_progress(&roadmap.points)))
    }

    /// Roadmaps whose topic, title, or description contains `query`,
    /// ignoring case, in collection order.
    pub async fn search_roadmaps(&self, query: &str) -> Vec<Roadmap> {
        let needle = query.to_lowercase();
        self.get_all_roadmaps()
            .await
            .into_iter()
            .filter(|roadmap| roadmap.matches_query(&needle))
            .collect()
    }

    /// Points of the active roadmap at `level`, in stored order.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if the store read fails.
    pub async fn get_points_by_level(&self, level: PointLevel) -> Result<Vec<RoadmapPoint>> {
        Ok(self
            .load_active()
            .await?
            .map(|roadmap| {
                roadmap
                    .points
                    .into_iter()
                    .filter(|point| point.level == level)
                    .collect()
            })
            .unwrap_or_default())
    }

    /// Hydrated playlist items of a point; empty while unhydrated.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the roadmap or point does not exist.
    pub async fn get_playlists_for_point(
        &self,
        roadmap_id: &str,
        point_id: &str,
    ) -> Result<Vec<PlaylistItem>> {
        let roadmap = self.require_roadmap(roadmap_id).await?;
        let point = point_ref(&roadmap, point_id)?;
        Ok(point.playlists.items().to_vec())
    }

    /// Replace a point's playlists with `items`, marking it hydrated.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the roadmap or point does not exist,
    /// or `AppError::Storage` if persistence fails.
    pub async fn initialize_playlists_for_point(
        &self,
        roadmap_id: &str,
        point_id: &str,
        items: Vec<PlaylistItem>,
    ) -> Result<Roadmap> {
        let count = items.len();
        let updated = self
            .modify_roadmap(roadmap_id, |roadmap| {
                point_mut(roadmap, point_id)?.playlists = Playlists::Hydrated(items);
                Ok(())
            })
            .await?;
        info!(roadmap_id, point_id, count, "point playlists stored");
        Ok(updated)
    }

    /// Insert or replace a single playlist item on a point.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NotFound` if the roadmap or point does not exist,
    /// or `AppError::Storage` if persistence fails.
    pub async fn update_playlist_item(
        &self,
        roadmap_id: &str,
        point_id: &str,
        item: PlaylistItem,
    ) -> Result<Roadmap> {
        self.modify_roadmap(roadmap_id, |roadmap| {
            point_mut(roadmap, point_id)?.playlists.upsert(item);
            Ok(())
        })
        .await
    }

    /// Aggregate statistics across the collection and the active roadmap.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if reading the active pointer fails.
    pub async fn learning_stats(&self) -> Result<LearningStats> {
        let roadmaps = self.get_all_roadmaps().await;
        let active = self.load_active().await?;
        Ok(LearningStats::collect(&roadmaps, active.as_ref()))
    }

    /// Remove the collection and the active pointer.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Storage` if either delete fails.
    pub async fn clear_all_roadmaps(&self) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.store.remove_item(ROADMAPS_KEY).await?;
        self.store.remove_item(ACTIVE_ROADMAP_KEY).await?;
        info!("all roadmaps cleared");
        Ok(())
    }

    /// Load, mutate, and persist one roadmap, keeping the pointer in sync.
    ///
    /// `apply` runs on an in-memory copy; nothing is written if it fails.
    async fn modify_roadmap<F>(&self, roadmap_id: &str, apply: F) -> Result<Roadmap>
    where
        F: FnOnce(&mut Roadmap) -> Result<()>,
    {
        let _guard = self.write_lock.lock().await;

        let mut roadmaps = self.load_collection().await?;
        let roadmap = roadmaps
            .iter_mut()
            .find(|roadmap| roadmap.id == roadmap_id)
            .ok_or_else(|| AppError::NotFound(format!("roadmap {roadmap_id}")))?;

        apply(roadmap)?;
        roadmap.touch();
        let updated = roadmap.clone();

        self.store_collection(&roadmaps).await?;
        if self
            .load_active()
            .await?
            .is_some_and(|active| active.id == roadmap_id)
        {
            self.write_active(&updated).await?;
            debug!(roadmap_id, "active pointer re-synced");
        }

        Ok(updated)
    }

    async fn require_roadmap(&self, roadmap_id: &str) -> Result<Roadmap> {
        self.get_roadmap_by_id(roadmap_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("roadmap {roadmap_id}")))
    }

    async fn save_unlocked(&self, roadmap: &Roadmap) -> Result<()> {
        let mut roadmaps = self.load_collection().await?;
        match roadmaps.iter_mut().find(|existing| existing.id == roadmap.id) {
            Some(existing) => existing.clone_from(roadmap),
            None => roadmaps.push(roadmap.clone()),
        }
        self.store_collection(&roadmaps).await
    }

    /// Read the collection. Content that is not a JSON array reads as empty;
    /// array entries that do not decode as a roadmap are skipped one by one.
    async fn load_collection(&self) -> Result<Vec<Roadmap>> {
        let Some(raw) = self.store.get_item(ROADMAPS_KEY).await? else {
            return Ok(Vec::new());
        };
        let entries: Vec<serde_json::Value> = match decode_json(ROADMAPS_KEY, &raw) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(%err, "malformed roadmap collection treated as empty");
                return Ok(Vec::new());
            }
        };
        Ok(entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                serde_json::from_value(entry)
                    .inspect_err(|err| warn!(index, %err, "undecodable roadmap entry skipped"))
                    .ok()
            })
            .collect())
    }

    async fn store_collection(&self, roadmaps: &[Roadmap]) -> Result<()> {
        let raw = encode_json(ROADMAPS_KEY, &roadmaps)?;
        self.store.set_item(ROADMAPS_KEY, raw).await
    }

    async fn load_active(&self) -> Result<Option<Roadmap>> {
        let Some(raw) = self.store.get_item(ACTIVE_ROADMAP_KEY).await? else {
            return Ok(None);
        };
        match decode_json(ACTIVE_ROADMAP_KEY, &raw) {
            Ok(roadmap) => Ok(Some(roadmap)),
            Err(err) => {
                warn!(%err, "malformed active roadmap treated as unset");
                Ok(None)
            }
        }
    }

    async fn write_active(&self, roadmap: &Roadmap) -> Result<()> {
        let raw = encode_json(ACTIVE_ROADMAP_KEY, roadmap)?;
        self.store.set_item(ACTIVE_ROADMAP_KEY, raw).await
    }
}

fn point_ref<'a>(roadmap: &'a Roadmap, point_id: &str) -> Result<&'a RoadmapPoint> {
    roadmap
        .point(point_id)
        .ok_or_else(|| AppError::NotFound(format!("point {point_id} in roadmap {}", roadmap.id)))
}

fn point_mut<'a>(roadmap: &'a mut Roadmap, point_id: &str) -> Result<&'a mut RoadmapPoint> {
    let roadmap_id = roadmap.id.clone();
    roadmap
        .point_mut(point_id)
        .ok_or_else(|| AppError::NotFound(format!("point {point_id} in roadmap {roadmap_id}")))
}
