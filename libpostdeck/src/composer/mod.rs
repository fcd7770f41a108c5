//! Composer state and its reconciliation rules
//!
//! [`Composer`] owns everything a post is assembled from: the selected
//! channels, master and per-channel captions, the master media library and
//! per-channel selections, channel options, and scheduling entries. All
//! mutation goes through its methods (or [`Composer::dispatch`]) so that
//! channel removal cascades to every per-channel map and new channels are
//! initialized before anything else touches them.
//!
//! # Example
//!
//! ```
//! use libpostdeck::composer::Composer;
//!
//! # fn example() -> libpostdeck::Result<()> {
//! let mut composer = Composer::with_defaults();
//! composer.set_master_caption("Hello");
//! composer.add_channel("instagram", Some("Reel".to_string()))?;
//! composer.add_channel("tiktok", None)?;
//!
//! // tiktok adopted the first channel's caption
//! assert_eq!(composer.effective_caption("tiktok"), "Hello");
//! # Ok(())
//! # }
//! ```

pub mod actions;
pub mod caption;
pub mod channels;
pub mod media;
pub mod options;
pub mod overrides;
pub mod schedule;

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error};

pub use self::actions::ComposerAction;
pub use self::caption::{CaptionReconciler, CaptionSeed};
pub use self::channels::{ChannelChange, ChannelSelectionSet, SelectedChannel};
pub use self::media::{MediaAddOutcome, MediaReconciler};
pub use self::options::ChannelOptions;
pub use self::schedule::{ScheduleField, ScheduledSlot, SchedulingEntry, SchedulingTable};

use crate::catalog::{OptionValue, Platform, PlatformCatalog};
use crate::config::ComposerSettings;
use crate::error::{IntegrityError, PostdeckError, Result};
use crate::service::events::{ComposerEvent, EventBus, EventReceiver};
use crate::types::{MediaItem, PostMode, SharedMedia};

/// Which aspects of a channel diverged from the master content
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CustomizationFlags {
    pub media: bool,
    pub caption: bool,
}

#[derive(Debug, Clone)]
pub struct Composer {
    catalog: Arc<PlatformCatalog>,
    settings: ComposerSettings,
    channels: ChannelSelectionSet,
    captions: CaptionReconciler,
    media: MediaReconciler,
    options: ChannelOptions,
    schedule: SchedulingTable,
    channels_separated: bool,
    events: EventBus,
}

impl Composer {
    pub fn new(catalog: Arc<PlatformCatalog>, settings: ComposerSettings) -> Self {
        Self {
            captions: CaptionReconciler::new(
                settings.caption_soft_limit,
                settings.applied_ack_window(),
            ),
            media: MediaReconciler::new(settings.media_capacity),
            schedule: SchedulingTable::new(settings.default_post_time),
            channels: ChannelSelectionSet::new(),
            options: ChannelOptions::new(),
            channels_separated: false,
            events: EventBus::default(),
            catalog,
            settings,
        }
    }

    /// Composer over the builtin catalog with default settings
    pub fn with_defaults() -> Self {
        Self::new(PlatformCatalog::builtin(), ComposerSettings::default())
    }

    pub fn catalog(&self) -> &PlatformCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &ComposerSettings {
        &self.settings
    }

    pub fn channels(&self) -> &ChannelSelectionSet {
        &self.channels
    }

    pub fn captions(&self) -> &CaptionReconciler {
        &self.captions
    }

    pub fn media(&self) -> &MediaReconciler {
        &self.media
    }

    pub fn options(&self) -> &ChannelOptions {
        &self.options
    }

    pub fn schedule(&self) -> &SchedulingTable {
        &self.schedule
    }

    pub fn channels_separated(&self) -> bool {
        self.channels_separated
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> EventReceiver {
        self.events.subscribe()
    }

    // === Channels ===

    /// Add a channel and seed its caption and media
    ///
    /// Returns `Ok(false)` when the channel is already selected.
    pub fn add_channel(&mut self, platform_id: &str, post_type: Option<String>) -> Result<bool> {
        self.check_platform(platform_id, post_type.as_deref())?;
        let is_first = self.channels.is_empty();
        if !self.channels.add(platform_id, post_type) {
            debug!(platform = platform_id, "channel already selected");
            return Ok(false);
        }
        self.initialize_channel(platform_id, is_first);
        Ok(true)
    }

    /// Change a channel's post type, adding the channel when absent
    pub fn update_channel(
        &mut self,
        platform_id: &str,
        post_type: Option<String>,
    ) -> Result<ChannelChange> {
        self.check_platform(platform_id, post_type.as_deref())?;
        let is_first = self.channels.is_empty();
        let change = self.channels.update(platform_id, post_type);
        if change == ChannelChange::Added {
            self.initialize_channel(platform_id, is_first);
        }
        Ok(change)
    }

    fn initialize_channel(&mut self, platform_id: &str, is_first: bool) {
        self.captions.initialize_channel(platform_id, is_first);
        self.media
            .initialize_channel(platform_id, self.channels_separated);
        debug!(platform = platform_id, is_first, "channel added");
        self.events.emit(ComposerEvent::ChannelAdded {
            platform_id: platform_id.to_string(),
        });
        self.verify_integrity();
    }

    /// Remove a channel and everything held for it
    pub fn remove_channel(&mut self, platform_id: &str) -> bool {
        if !self.channels.remove(platform_id) {
            return false;
        }
        let selection_empty = self.channels.is_empty();
        self.captions.remove_channel(platform_id, selection_empty);
        self.media.remove_channel(platform_id);
        self.options.remove_channel(platform_id);
        self.schedule.remove_channel(platform_id);

        debug!(platform = platform_id, selection_empty, "channel removed");
        self.events.emit(ComposerEvent::ChannelRemoved {
            platform_id: platform_id.to_string(),
        });
        self.verify_integrity();
        true
    }

    /// Toggle the per-channel editing view
    ///
    /// Copies or clears nothing; only channels added afterwards start with
    /// an empty media selection.
    pub fn set_channels_separated(&mut self, separated: bool) {
        self.channels_separated = separated;
    }

    // === Captions ===

    pub fn set_master_caption(&mut self, text: impl Into<String>) {
        self.captions.set_master_caption(text.into());
    }

    pub fn edit_channel_caption(&mut self, platform_id: &str, text: impl Into<String>) -> Result<()> {
        self.require_channel(platform_id)?;
        let any_selected = !self.channels.is_empty();
        self.captions
            .edit_channel_caption(platform_id, text.into(), any_selected);
        self.verify_integrity();
        Ok(())
    }

    pub fn apply_caption_to_all(&mut self, source: &str) -> Result<()> {
        self.apply_caption_to_all_at(source, Instant::now())
    }

    /// [`apply_caption_to_all`](Self::apply_caption_to_all) with an explicit clock
    pub fn apply_caption_to_all_at(&mut self, source: &str, now: Instant) -> Result<()> {
        self.require_channel(source)?;
        self.captions.apply_to_all(source, self.channels.ids(), now);
        debug!(source, "caption applied to all channels");
        self.events.emit(ComposerEvent::CaptionsApplied {
            source: source.to_string(),
        });
        self.verify_integrity();
        Ok(())
    }

    /// Whether the "applied" acknowledgment for `source` is showing
    pub fn caption_applied(&self, source: &str) -> bool {
        self.captions.is_applied(source, Instant::now())
    }

    pub fn effective_caption(&self, platform_id: &str) -> &str {
        self.captions.effective_caption(platform_id)
    }

    // === Media ===

    /// Upload items into the master library
    pub fn add_master_media(&mut self, items: Vec<MediaItem>) -> usize {
        let accepted = self.media.add_master_media(share(items));
        self.verify_integrity();
        accepted
    }

    pub fn add_media_to_channel(
        &mut self,
        platform_id: &str,
        items: Vec<MediaItem>,
    ) -> Result<MediaAddOutcome> {
        self.require_channel(platform_id)?;
        let outcome = self.media.add_media_to_channel(platform_id, share(items));
        self.verify_integrity();
        Ok(outcome)
    }

    /// Returns whether the item also left the master library
    pub fn remove_media_from_channel(&mut self, platform_id: &str, media_id: &str) -> Result<bool> {
        self.require_channel(platform_id)?;
        let removed_from_master =
            self.media
                .remove_media_from_channel(platform_id, media_id, self.channels.ids());
        self.verify_integrity();
        Ok(removed_from_master)
    }

    pub fn replace_master_media(&mut self, items: Vec<MediaItem>) {
        self.media.replace_master_media(share(items));
        self.verify_integrity();
    }

    pub fn effective_media(&self, platform_id: &str) -> &[SharedMedia] {
        self.media.effective_media(platform_id)
    }

    // === Options and scheduling ===

    pub fn set_option(&mut self, platform_id: &str, field_id: &str, value: OptionValue) -> Result<()> {
        self.require_channel(platform_id)?;
        let platform = self.catalog.get(platform_id).ok_or_else(|| unknown_platform(platform_id))?;
        self.options
            .set(platform, field_id, value)
            .map_err(PostdeckError::InvalidInput)?;
        self.verify_integrity();
        Ok(())
    }

    /// Parse raw input with the field's own kind, then store it
    pub fn set_option_from_str(&mut self, platform_id: &str, field_id: &str, raw: &str) -> Result<()> {
        let platform = self.catalog.get(platform_id).ok_or_else(|| unknown_platform(platform_id))?;
        let field = platform.option_field(field_id).ok_or_else(|| {
            PostdeckError::InvalidInput(format!(
                "{} has no option named '{}'",
                platform.display_name, field_id
            ))
        })?;
        let value = field.kind.parse(raw).map_err(|e| {
            PostdeckError::InvalidInput(format!("{} {}: {}", platform.display_name, field.label, e))
        })?;
        self.set_option(platform_id, field_id, value)
    }

    pub fn set_schedule_field(&mut self, platform_id: &str, field: ScheduleField) -> Result<()> {
        self.require_channel(platform_id)?;
        if self.settings.enforce_reminder_only_on_write
            && field == ScheduleField::Mode(PostMode::AutoPost)
            && self.platform(platform_id).is_some_and(|p| !p.is_connected())
        {
            return Err(PostdeckError::InvalidInput(format!(
                "{} is not connected; only reminders can be scheduled",
                platform_id
            )));
        }
        self.schedule.set_field(platform_id, field);
        self.verify_integrity();
        Ok(())
    }

    pub fn scheduled_channels(&self) -> Vec<ScheduledSlot> {
        self.schedule.scheduled_channels(self.channels.ids())
    }

    pub fn earliest_schedule(&self) -> Option<ScheduledSlot> {
        self.schedule.earliest_schedule(self.channels.ids())
    }

    pub fn all_same_schedule(&self) -> bool {
        self.schedule.all_same_schedule(self.channels.ids())
    }

    /// Mode as shown to the user, `None` for unselected channels
    pub fn effective_mode(&self, platform_id: &str) -> Option<PostMode> {
        if !self.channels.contains(platform_id) {
            return None;
        }
        let platform = self.platform(platform_id)?;
        Some(self.schedule.effective_mode(platform_id, platform.connection))
    }

    // === Whole composition ===

    pub fn customization(&self, platform_id: &str) -> Option<CustomizationFlags> {
        let flags = CustomizationFlags {
            media: self.media.is_customized(platform_id),
            caption: self.captions.is_customized(platform_id),
        };
        (flags.media || flags.caption).then_some(flags)
    }

    /// Whether discarding would lose master content
    ///
    /// Per-channel overrides are not inspected.
    pub fn has_unsaved_changes(&self) -> bool {
        !self.captions.master_caption().trim().is_empty() || !self.media.master_media().is_empty()
    }

    /// Reset to an empty composition
    pub fn discard(&mut self) {
        self.channels.clear();
        self.captions.reset();
        self.media.reset();
        self.options.clear();
        self.schedule.clear();
        self.channels_separated = false;
        debug!("composition discarded");
        self.events.emit(ComposerEvent::Discarded);
    }

    /// Apply one queued user action
    pub fn dispatch(&mut self, action: ComposerAction) -> Result<()> {
        match action {
            ComposerAction::AddChannel {
                platform_id,
                post_type,
            } => self.add_channel(&platform_id, post_type).map(drop),
            ComposerAction::UpdateChannel {
                platform_id,
                post_type,
            } => self.update_channel(&platform_id, post_type).map(drop),
            ComposerAction::RemoveChannel { platform_id } => {
                self.remove_channel(&platform_id);
                Ok(())
            }
            ComposerAction::SetChannelsSeparated(separated) => {
                self.set_channels_separated(separated);
                Ok(())
            }
            ComposerAction::SetMasterCaption(text) => {
                self.set_master_caption(text);
                Ok(())
            }
            ComposerAction::EditChannelCaption { platform_id, text } => {
                self.edit_channel_caption(&platform_id, text)
            }
            ComposerAction::ApplyCaptionToAll { source } => self.apply_caption_to_all(&source),
            ComposerAction::AddMasterMedia(items) => {
                self.add_master_media(items);
                Ok(())
            }
            ComposerAction::AddMediaToChannel { platform_id, items } => {
                self.add_media_to_channel(&platform_id, items).map(drop)
            }
            ComposerAction::RemoveMediaFromChannel {
                platform_id,
                media_id,
            } => self
                .remove_media_from_channel(&platform_id, &media_id)
                .map(drop),
            ComposerAction::ReplaceMasterMedia(items) => {
                self.replace_master_media(items);
                Ok(())
            }
            ComposerAction::SetScheduleField { platform_id, field } => {
                self.set_schedule_field(&platform_id, field)
            }
            ComposerAction::SetOption {
                platform_id,
                field_id,
                value,
            } => self.set_option(&platform_id, &field_id, value),
            ComposerAction::Discard => {
                self.discard();
                Ok(())
            }
        }
    }

    // === Integrity ===

    /// Check the cross-map invariants
    pub fn check_integrity(&self) -> std::result::Result<(), IntegrityError> {
        let maps: [(&'static str, Vec<&str>); 4] = [
            ("captions", self.captions.tracked_keys().collect()),
            ("media", self.media.tracked_keys().collect()),
            ("options", self.options.tracked_keys().collect()),
            ("scheduling", self.schedule.tracked_keys().collect()),
        ];
        for (map, keys) in maps {
            if let Some(platform_id) = keys.into_iter().find(|k| !self.channels.contains(k)) {
                return Err(IntegrityError::DanglingChannel {
                    map,
                    platform_id: platform_id.to_string(),
                });
            }
        }

        let master = self.media.master_media();
        if master.len() > self.media.capacity() {
            return Err(IntegrityError::MasterOverCapacity {
                len: master.len(),
                capacity: self.media.capacity(),
            });
        }
        for (platform_id, selection) in self.media.selections() {
            if let Some(item) = selection
                .iter()
                .find(|item| !master.iter().any(|m| m.id == item.id))
            {
                return Err(IntegrityError::DanglingMedia {
                    platform_id: platform_id.to_string(),
                    media_id: item.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn verify_integrity(&self) {
        if let Err(e) = self.check_integrity() {
            error!(error = %e, "composer state integrity violated");
            debug_assert!(false, "composer state integrity violated: {}", e);
        }
    }

    fn platform(&self, platform_id: &str) -> Option<&Platform> {
        self.catalog.get(platform_id)
    }

    fn check_platform(&self, platform_id: &str, post_type: Option<&str>) -> Result<()> {
        let platform = self.platform(platform_id).ok_or_else(|| unknown_platform(platform_id))?;
        if let Some(post_type) = post_type {
            if !platform.supports_post_type(post_type) {
                return Err(PostdeckError::InvalidInput(format!(
                    "{} does not support '{}' posts",
                    platform.display_name, post_type
                )));
            }
        }
        Ok(())
    }

    fn require_channel(&self, platform_id: &str) -> Result<()> {
        if self.channels.contains(platform_id) {
            Ok(())
        } else {
            Err(PostdeckError::InvalidInput(format!(
                "Channel '{}' is not selected",
                platform_id
            )))
        }
    }
}

fn share(items: Vec<MediaItem>) -> Vec<SharedMedia> {
    items.into_iter().map(Arc::new).collect()
}

fn unknown_platform(platform_id: &str) -> PostdeckError {
    PostdeckError::InvalidInput(format!("Unknown platform: {}", platform_id))
}
