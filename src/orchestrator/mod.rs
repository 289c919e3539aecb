//! Coordination of repositories and the roadmap generator.
//!
//! Covers new-roadmap generation and lazy playlist hydration.

pub mod playlist_loader;
pub mod roadmap_flow;
