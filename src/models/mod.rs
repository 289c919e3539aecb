//! Domain model module declarations.

pub mod profile;
pub mod progress;
pub mod roadmap;
