//! Core types for Postdeck

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::OptionValue;
use crate::composer::schedule::SchedulingEntry;

/// Kind of media attached to a post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image => write!(f, "image"),
            Self::Video => write!(f, "video"),
        }
    }
}

/// A media item in the composer library
///
/// Items are immutable once created. The master list and every channel
/// selection hold the same allocation through [`SharedMedia`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub display_name: String,
    pub full_url: String,
    pub thumbnail_url: String,
}

impl MediaItem {
    /// Create a new item with an auto-generated ID
    pub fn new(kind: MediaKind, display_name: String, full_url: String, thumbnail_url: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            display_name,
            full_url,
            thumbnail_url,
        }
    }
}

pub type SharedMedia = Arc<MediaItem>;

/// Final state a post is committed with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Draft,
    Scheduled,
    Published,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Scheduled => write!(f, "scheduled"),
            Self::Published => write!(f, "published"),
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "schedule" | "scheduled" => Ok(Self::Scheduled),
            "publish" | "published" => Ok(Self::Published),
            _ => Err(format!(
                "Invalid action: '{}'. Valid options: draft, schedule, publish",
                s
            )),
        }
    }
}

/// How a scheduled channel goes out when its slot arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostMode {
    AutoPost,
    ReminderOnly,
}

/// One channel's slice of an assembled post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelPost {
    pub platform_id: String,
    pub post_type: Option<String>,
    pub resolved_caption: String,
    pub resolved_media: Vec<MediaItem>,
    pub options: BTreeMap<String, OptionValue>,
    pub scheduling: SchedulingEntry,
}

/// Finished post document handed to a sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub master_caption: String,
    pub master_media: Vec<MediaItem>,
    pub channels: Vec<ChannelPost>,
    pub created_at: DateTime<Utc>,
    pub status: PostStatus,
}

impl Post {
    pub fn channel(&self, platform_id: &str) -> Option<&ChannelPost> {
        self.channels.iter().find(|c| c.platform_id == platform_id)
    }
}
