//! Error types for Postdeck

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostdeckError>;

#[derive(Error, Debug)]
pub enum PostdeckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Save failed: {0}")]
    Save(#[from] SaveError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("A save is already in progress")]
    CommitInFlight,

    #[error("Composer session has shut down")]
    SessionClosed,
}

impl PostdeckError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PostdeckError::InvalidInput(_) => 3,
            PostdeckError::Validation(_) => 3,
            PostdeckError::Save(_) => 1,
            PostdeckError::Config(_) => 1,
            PostdeckError::CommitInFlight => 1,
            PostdeckError::SessionClosed => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Reasons a post cannot be committed yet. The user has to amend the input.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("select at least one channel")]
    NoChannels,

    #[error("add a caption or media before saving")]
    EmptyContent,

    #[error("pick a date for at least one channel before scheduling")]
    NoSchedule,
}

impl ValidationError {
    /// Stable machine-readable code for inline UI messaging
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::NoChannels => "no-channels",
            ValidationError::EmptyContent => "empty-content",
            ValidationError::NoSchedule => "no-schedule",
        }
    }
}

/// Failure reported by a [`PostSink`](crate::sinks::PostSink)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("Post rejected: {0}")]
    Rejected(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone)]
#[error("{sink} could not record the post: {source}")]
pub struct SaveError {
    pub sink: String,
    #[source]
    pub source: SinkError,
}

/// Broken reconciliation invariant. Indicates a bug, never a user mistake.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    #[error("{map} still holds an entry for removed channel '{platform_id}'")]
    DanglingChannel {
        map: &'static str,
        platform_id: String,
    },

    #[error("channel '{platform_id}' references media '{media_id}' missing from master")]
    DanglingMedia {
        platform_id: String,
        media_id: String,
    },

    #[error("master media holds {len} items, capacity is {capacity}")]
    MasterOverCapacity { len: usize, capacity: usize },
}
