//! Master caption, per-channel caption overrides, and template adoption
//!
//! When channels are added one after another, the first channel's caption
//! becomes a template that later channels copy, until someone edits a
//! channel caption by hand. From then on new channels start blank. The
//! template and the edit flag are forgotten once the selection is empty.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use super::overrides::OverrideStore;

/// How a newly added channel's caption was seeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptionSeed {
    /// First channel; the trimmed master caption became the template
    Template,
    /// Copied from the template
    Adopted,
    /// Started empty
    Blank,
}

#[derive(Debug, Clone)]
pub struct CaptionReconciler {
    store: OverrideStore<String>,
    initial_template: String,
    has_edited_after_selection: bool,
    applied_at: HashMap<String, Instant>,
    ack_window: Duration,
    soft_limit: usize,
}

impl CaptionReconciler {
    pub fn new(soft_limit: usize, ack_window: Duration) -> Self {
        Self {
            store: OverrideStore::new(String::new()),
            initial_template: String::new(),
            has_edited_after_selection: false,
            applied_at: HashMap::new(),
            ack_window,
            soft_limit,
        }
    }

    pub fn master_caption(&self) -> &str {
        self.store.master()
    }

    pub fn set_master_caption(&mut self, text: String) {
        self.store.set_master(text);
    }

    pub fn initial_template(&self) -> &str {
        &self.initial_template
    }

    pub fn has_edited_after_selection(&self) -> bool {
        self.has_edited_after_selection
    }

    /// Seed the caption of a channel that was just added
    ///
    /// `is_first` is true when the selection was empty before the add.
    pub fn initialize_channel(&mut self, platform_id: &str, is_first: bool) -> CaptionSeed {
        let trimmed_master = self.store.master().trim().to_string();

        let (seed, caption) = if is_first && !trimmed_master.is_empty() {
            self.initial_template = trimmed_master.clone();
            (CaptionSeed::Template, trimmed_master)
        } else if !is_first
            && !self.initial_template.is_empty()
            && !self.has_edited_after_selection
        {
            (CaptionSeed::Adopted, self.initial_template.clone())
        } else {
            (CaptionSeed::Blank, String::new())
        };

        debug!(platform = platform_id, ?seed, "seeded channel caption");
        self.store.set_override(platform_id, caption);
        seed
    }

    /// Hand edit of one channel's caption
    ///
    /// Freezes template adoption for the rest of the selection session.
    pub fn edit_channel_caption(&mut self, platform_id: &str, text: String, any_selected: bool) {
        self.store.set_override(platform_id, text);
        self.store.mark_customized(platform_id);
        if any_selected {
            self.has_edited_after_selection = true;
        }
    }

    /// Copy `source`'s caption to every selected channel
    pub fn apply_to_all<'a>(
        &mut self,
        source: &str,
        selected: impl IntoIterator<Item = &'a str>,
        now: Instant,
    ) {
        let value = self.store.override_for(source).cloned().unwrap_or_default();
        for platform_id in selected {
            self.store.set_override(platform_id, value.clone());
        }
        self.has_edited_after_selection = true;
        self.applied_at.insert(source.to_string(), now);
    }

    /// Whether the "applied" acknowledgment for `source` is still showing
    pub fn is_applied(&self, source: &str, now: Instant) -> bool {
        self.applied_at
            .get(source)
            .is_some_and(|at| now.saturating_duration_since(*at) < self.ack_window)
    }

    /// Drop acknowledgments whose display window has passed
    pub fn clear_expired_acknowledgments(&mut self, now: Instant) {
        let window = self.ack_window;
        self.applied_at
            .retain(|_, at| now.saturating_duration_since(*at) < window);
    }

    pub fn remove_channel(&mut self, platform_id: &str, selection_empty: bool) {
        self.store.forget(platform_id);
        self.applied_at.remove(platform_id);
        if selection_empty {
            self.has_edited_after_selection = false;
            self.initial_template.clear();
        }
    }

    pub fn channel_caption(&self, platform_id: &str) -> Option<&str> {
        self.store.override_for(platform_id).map(String::as_str)
    }

    pub fn effective_caption(&self, platform_id: &str) -> &str {
        self.store.effective(platform_id)
    }

    pub fn is_customized(&self, platform_id: &str) -> bool {
        self.store.is_customized(platform_id)
    }

    /// Character count of the effective caption, in Unicode scalar values
    pub fn char_count(&self, platform_id: &str) -> usize {
        self.effective_caption(platform_id).chars().count()
    }

    pub fn soft_limit(&self) -> usize {
        self.soft_limit
    }

    pub fn is_over_soft_limit(&self, platform_id: &str) -> bool {
        self.char_count(platform_id) > self.soft_limit
    }

    pub fn channel_captions(&self) -> impl Iterator<Item = (&str, &str)> {
        self.store.overrides().map(|(k, v)| (k, v.as_str()))
    }

    pub(crate) fn tracked_keys(&self) -> impl Iterator<Item = &str> {
        self.store
            .tracked_keys()
            .chain(self.applied_at.keys().map(String::as_str))
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.soft_limit, self.ack_window);
    }
}
