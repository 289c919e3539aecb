//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// Durable store unreachable or write rejected.
    Storage(String),
    /// Stored JSON did not decode into the expected shape.
    ///
    /// Read paths recover from this by treating the key as empty; it is
    /// only surfaced from internal decode helpers.
    MalformedData(String),
    /// Requested roadmap or point does not exist.
    NotFound(String),
    /// Transport failure or non-2xx status from the generation backend.
    Http(String),
    /// Backend answered but reported `success: false` or carried no usable data.
    Generation(String),
    /// Caller supplied input that cannot be acted on.
    Validation(String),
    /// File-system or I/O operation failure.
    Io(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Storage(msg) => write!(f, "storage: {msg}"),
            Self::MalformedData(msg) => write!(f, "malformed data: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::Http(msg) => write!(f, "http: {msg}"),
            Self::Generation(msg) => write!(f, "generation: {msg}"),
            Self::Validation(msg) => write!(f, "validation: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}
