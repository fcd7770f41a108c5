//! Postdeck - composer core for multi-channel social posts
//!
//! This library keeps one post's content consistent across several
//! channels: a master caption and media library, per-channel overrides,
//! options and schedules, and assembly of the final post for a sink.

pub mod catalog;
pub mod composer;
pub mod config;
pub mod error;
pub mod logging;
pub mod media_source;
pub mod service;
pub mod sinks;
pub mod types;

// Re-export commonly used types
pub use catalog::{Platform, PlatformCatalog};
pub use composer::{Composer, ComposerAction};
pub use config::Config;
pub use error::{PostdeckError, Result};
pub use service::assembler::PostAssembler;
pub use types::{MediaItem, Post, PostMode, PostStatus};
