//! Ordered set of selected channels

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedChannel {
    pub platform_id: String,
    pub post_type: Option<String>,
}

/// Outcome of [`ChannelSelectionSet::update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelChange {
    Added,
    Updated,
}

/// Selected channels in insertion order
///
/// The order is user-visible (preview tabs, caption fields) and survives
/// post type updates.
#[derive(Debug, Clone, Default)]
pub struct ChannelSelectionSet {
    channels: Vec<SelectedChannel>,
}

impl ChannelSelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a channel. Returns `false` without touching anything when the
    /// platform is already selected.
    pub fn add(&mut self, platform_id: &str, post_type: Option<String>) -> bool {
        if self.contains(platform_id) {
            return false;
        }
        self.channels.push(SelectedChannel {
            platform_id: platform_id.to_string(),
            post_type,
        });
        true
    }

    /// Replace the post type in place, or add the channel when absent
    pub fn update(&mut self, platform_id: &str, post_type: Option<String>) -> ChannelChange {
        match self.channels.iter_mut().find(|c| c.platform_id == platform_id) {
            Some(channel) => {
                channel.post_type = post_type;
                ChannelChange::Updated
            }
            None => {
                self.add(platform_id, post_type);
                ChannelChange::Added
            }
        }
    }

    pub fn remove(&mut self, platform_id: &str) -> bool {
        let before = self.channels.len();
        self.channels.retain(|c| c.platform_id != platform_id);
        self.channels.len() != before
    }

    pub fn contains(&self, platform_id: &str) -> bool {
        self.channels.iter().any(|c| c.platform_id == platform_id)
    }

    pub fn get(&self, platform_id: &str) -> Option<&SelectedChannel> {
        self.channels.iter().find(|c| c.platform_id == platform_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SelectedChannel> {
        self.channels.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.platform_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn clear(&mut self) {
        self.channels.clear();
    }
}
