//! Persistence layer modules.

pub mod db;
pub mod kv_store;
pub mod profile_repo;
pub mod roadmap_repo;
pub mod schema;

