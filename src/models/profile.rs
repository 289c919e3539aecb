//! User profile and roadmap generation preferences.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::AppError;

/// How deep a generated roadmap should go.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Depth {
    /// Fast and short.
    Fast,
    /// Middle ground.
    #[default]
    Balanced,
    /// Detailed and deep.
    Detailed,
}

/// Preferred length of recommended videos.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum VideoLength {
    /// Short clips.
    Short,
    /// Typical lecture length.
    #[default]
    Medium,
    /// Long-form content.
    Long,
}

impl FromStr for Depth {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "detailed" => Ok(Self::Detailed),
            other => Err(AppError::Validation(format!("invalid depth: {other}"))),
        }
    }
}

impl FromStr for VideoLength {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(AppError::Validation(format!("invalid video length: {other}"))),
        }
    }
}

/// Preferences injected into every generation request.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    /// Roadmap depth.
    #[serde(default)]
    pub depth: Depth,
    /// Video length.
    #[serde(default)]
    pub video_length: VideoLength,
}

/// Locally stored user profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    /// Display name; empty when never set.
    #[serde(default)]
    pub name: String,
    /// Generation preferences.
    #[serde(default)]
    pub preferences: UserPreferences,
}
