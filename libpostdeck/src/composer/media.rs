//! Master media library and per-channel media selections
//!
//! The master list is capped. Channels start from a snapshot of it and are
//! flagged as customized the first time they are edited individually. Edits
//! flow both ways: media added to a channel joins the master list, and media
//! removed from the last channel that needs it leaves the master list.

use tracing::{debug, warn};

use super::overrides::OverrideStore;
use crate::types::SharedMedia;

/// Result of [`MediaReconciler::add_media_to_channel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaAddOutcome {
    /// Items newly appended to the channel selection
    pub added_to_channel: usize,
    /// Items newly appended to the master list
    pub added_to_master: usize,
    /// Brand-new items skipped because the master list was full
    pub dropped: usize,
}

#[derive(Debug, Clone)]
pub struct MediaReconciler {
    store: OverrideStore<Vec<SharedMedia>>,
    capacity: usize,
}

fn contains_id(items: &[SharedMedia], id: &str) -> bool {
    items.iter().any(|m| m.id == id)
}

impl MediaReconciler {
    pub fn new(capacity: usize) -> Self {
        Self {
            store: OverrideStore::new(Vec::new()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn master_media(&self) -> &[SharedMedia] {
        self.store.master()
    }

    pub fn selection(&self, platform_id: &str) -> Option<&[SharedMedia]> {
        self.store.override_for(platform_id).map(Vec::as_slice)
    }

    /// Selection if the channel has one, master otherwise
    pub fn effective_media(&self, platform_id: &str) -> &[SharedMedia] {
        self.store.effective(platform_id)
    }

    pub fn is_customized(&self, platform_id: &str) -> bool {
        self.store.is_customized(platform_id)
    }

    pub fn selections(&self) -> impl Iterator<Item = (&str, &[SharedMedia])> {
        self.store.overrides().map(|(k, v)| (k, v.as_slice()))
    }

    /// Master's own handle for `id`, so selections share its allocation
    fn find_in_master(&self, id: &str) -> Option<SharedMedia> {
        self.store.master().iter().find(|m| m.id == id).cloned()
    }

    /// Seed the selection of a channel that was just added
    pub fn initialize_channel(&mut self, platform_id: &str, channels_separated: bool) {
        if self.store.has_override(platform_id) {
            return;
        }
        let snapshot = if self.store.is_customized(platform_id) || channels_separated {
            Vec::new()
        } else {
            self.store.master().clone()
        };
        debug!(
            platform = platform_id,
            items = snapshot.len(),
            "seeded channel media"
        );
        self.store.set_override(platform_id, snapshot);
    }

    /// Upload straight into the master list
    ///
    /// Channels that were never customized still inherit the master list, so
    /// they receive the accepted items as well.
    pub fn add_master_media(&mut self, items: Vec<SharedMedia>) -> usize {
        let accepted = self.push_to_master(items);
        if accepted.is_empty() {
            return 0;
        }
        let inheriting: Vec<String> = self
            .store
            .overrides()
            .map(|(k, _)| k.to_string())
            .filter(|k| !self.store.is_customized(k))
            .collect();
        for platform_id in inheriting {
            if let Some(selection) = self.store.override_mut(&platform_id) {
                for item in &accepted {
                    if !contains_id(selection, &item.id) {
                        selection.push(item.clone());
                    }
                }
            }
        }
        accepted.len()
    }

    /// Append new ids to master up to capacity, returning the accepted items
    fn push_to_master(&mut self, items: Vec<SharedMedia>) -> Vec<SharedMedia> {
        let capacity = self.capacity;
        let master = self.store.master_mut();
        let mut accepted = Vec::new();
        for item in items {
            if contains_id(master, &item.id) {
                continue;
            }
            if master.len() >= capacity {
                warn!(media = %item.id, capacity, "master media is full, dropping item");
                continue;
            }
            master.push(item.clone());
            accepted.push(item);
        }
        accepted
    }

    /// Add items to one channel and sync them into the master list
    ///
    /// Items already in master are always accepted. A brand-new item that
    /// does not fit in master is skipped for the channel too.
    pub fn add_media_to_channel(
        &mut self,
        platform_id: &str,
        items: Vec<SharedMedia>,
    ) -> MediaAddOutcome {
        self.store.mark_customized(platform_id);

        let mut outcome = MediaAddOutcome::default();
        let mut room = self.capacity.saturating_sub(self.store.master().len());
        let mut admitted: Vec<SharedMedia> = Vec::new();
        for item in items {
            if contains_id(&admitted, &item.id) {
                continue;
            }
            let canonical = match self.find_in_master(&item.id) {
                Some(existing) => existing,
                None if room == 0 => {
                    outcome.dropped += 1;
                    continue;
                }
                None => {
                    room -= 1;
                    item
                }
            };
            admitted.push(canonical);
        }

        let selection = self.store.override_or_insert_with(platform_id, Vec::new);
        for item in &admitted {
            if !contains_id(selection, &item.id) {
                selection.push(item.clone());
                outcome.added_to_channel += 1;
            }
        }

        outcome.added_to_master = self.push_to_master(admitted).len();
        if outcome.dropped > 0 {
            warn!(
                platform = platform_id,
                dropped = outcome.dropped,
                capacity = self.capacity,
                "master media is full, skipped new items"
            );
        }
        outcome
    }

    /// Remove an item from one channel
    ///
    /// Returns `true` when the item also left the master list because no
    /// other channel holds it and no selected channel still inherits master.
    pub fn remove_media_from_channel<'a>(
        &mut self,
        platform_id: &str,
        media_id: &str,
        selected: impl IntoIterator<Item = &'a str>,
    ) -> bool {
        self.store.mark_customized(platform_id);
        if let Some(selection) = self.store.override_mut(platform_id) {
            selection.retain(|m| m.id != media_id);
        }

        let mut used_elsewhere = false;
        let mut any_inheriting = false;
        for other in selected {
            if !self.store.is_customized(other) {
                any_inheriting = true;
            }
            if other != platform_id
                && self
                    .store
                    .override_for(other)
                    .is_some_and(|s| contains_id(s, media_id))
            {
                used_elsewhere = true;
            }
        }

        if used_elsewhere || any_inheriting {
            debug!(
                media = media_id,
                used_elsewhere, any_inheriting, "keeping media in master"
            );
            return false;
        }
        let master = self.store.master_mut();
        let before = master.len();
        master.retain(|m| m.id != media_id);
        master.len() != before
    }

    /// Replace the master list; deletions propagate to every channel
    ///
    /// Only removals reach the channels. Items new to master are not pushed
    /// into inheriting channels, unlike [`Self::add_master_media`].
    pub fn replace_master_media(&mut self, items: Vec<SharedMedia>) {
        let mut next: Vec<SharedMedia> = Vec::with_capacity(items.len().min(self.capacity));
        for item in items {
            if contains_id(&next, &item.id) {
                continue;
            }
            if next.len() >= self.capacity {
                warn!(capacity = self.capacity, "master media truncated to capacity");
                break;
            }
            next.push(self.find_in_master(&item.id).unwrap_or(item));
        }
        self.store.set_master(next);

        let master = self.store.master().clone();
        for (_, selection) in self.store.overrides_mut() {
            selection.retain(|m| contains_id(&master, &m.id));
        }
    }

    pub fn remove_channel(&mut self, platform_id: &str) {
        self.store.forget(platform_id);
    }

    pub(crate) fn tracked_keys(&self) -> impl Iterator<Item = &str> {
        self.store.tracked_keys()
    }

    pub fn reset(&mut self) {
        self.store = OverrideStore::new(Vec::new());
    }
}
