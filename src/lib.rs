#![forbid(unsafe_code)]

//! `skilltrail`: learning roadmap store.
//!
//! Persists generated learning roadmaps in a durable key-value store,
//! keeps an active-roadmap pointer in sync with the collection, derives
//! completion progress, and lazily hydrates per-point video playlists from
//! a generation backend.

pub mod config;
pub mod errors;
pub mod generation;
pub mod models;
pub mod orchestrator;
pub mod persistence;
pub mod state;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
pub use state::AppState;
