//! Durable string-keyed store the repositories are built on.
//!
//! The [`KeyValueStore`] trait mirrors a minimal async storage API
//! (`get_item` / `set_item` / `remove_item`). It offers no multi-key
//! transactions: callers that write two keys must tolerate a failure
//! between the writes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use chrono::Utc;

use crate::Result;

use super::db::Database;

/// Boxed future returned by [`KeyValueStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Asynchronous persistent map of string keys to string values.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`](crate::AppError::Storage) if the store is unavailable.
    fn get_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`](crate::AppError::Storage) if the write is rejected.
    fn set_item<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()>;

    /// Delete `key`. Removing an absent key succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Storage`](crate::AppError::Storage) if the delete is rejected.
    fn remove_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()>;
}

/// [`KeyValueStore`] backed by the `kv_store` table.
#[derive(Clone)]
pub struct SqliteKvStore {
    db: Arc<Database>,
}

impl SqliteKvStore {
    /// Create a new store over an existing pool.
    #[must_use]
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, Option<String>> {
        Box::pin(async move {
            let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = ?1")
                .bind(key)
                .fetch_optional(self.db.as_ref())
                .await?;
            Ok(row.map(|(value,)| value))
        })
    }

    fn set_item<'a>(&'a self, key: &'a str, value: String) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let updated_at = Utc::now().to_rfc3339();
            sqlx::query(
                "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            )
            .bind(key)
            .bind(&value)
            .bind(&updated_at)
            .execute(self.db.as_ref())
            .await?;
            Ok(())
        })
    }

    fn remove_item<'a>(&'a self, key: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                .bind(key)
                .execute(self.db.as_ref())
                .await?;
            Ok(())
        })
    }
}

/// Decode a stored JSON value, tagging failures as malformed data.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(key: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw)
        .map_err(|err| crate::AppError::MalformedData(format!("{key}: {err}")))
}

/// Encode a value for storage.
pub(crate) fn encode_json<T: serde::Serialize>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|err| crate::AppError::Storage(format!("failed to encode {key}: {err}")))
}
