//! Per-channel scheduling entries
//!
//! Each field of an entry is set independently. An unset time reads as the
//! configured default (11:30 unless overridden) without being written back.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::catalog::ConnectionStatus;
use crate::types::PostMode;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingEntry {
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub mode: Option<PostMode>,
}

/// A single field update for [`SchedulingTable::set_field`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleField {
    Date(Option<NaiveDate>),
    Time(NaiveTime),
    Mode(PostMode),
}

/// A channel with a date, and the time it resolves to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSlot {
    pub platform_id: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
}

#[derive(Debug, Clone)]
pub struct SchedulingTable {
    entries: HashMap<String, SchedulingEntry>,
    default_time: NaiveTime,
}

impl SchedulingTable {
    pub fn new(default_time: NaiveTime) -> Self {
        Self {
            entries: HashMap::new(),
            default_time,
        }
    }

    pub fn default_time(&self) -> NaiveTime {
        self.default_time
    }

    pub fn set_field(&mut self, platform_id: &str, field: ScheduleField) {
        let entry = self.entries.entry(platform_id.to_string()).or_default();
        match field {
            ScheduleField::Date(date) => entry.date = date,
            ScheduleField::Time(time) => entry.time = Some(time),
            ScheduleField::Mode(mode) => entry.mode = Some(mode),
        }
    }

    pub fn entry(&self, platform_id: &str) -> Option<&SchedulingEntry> {
        self.entries.get(platform_id)
    }

    pub fn effective_time(&self, platform_id: &str) -> NaiveTime {
        self.entries
            .get(platform_id)
            .and_then(|e| e.time)
            .unwrap_or(self.default_time)
    }

    /// Mode as displayed: unconnected platforms can only send reminders
    pub fn effective_mode(&self, platform_id: &str, connection: ConnectionStatus) -> PostMode {
        match connection {
            ConnectionStatus::Unconnected => PostMode::ReminderOnly,
            ConnectionStatus::Connected => self
                .entries
                .get(platform_id)
                .and_then(|e| e.mode)
                .unwrap_or(PostMode::AutoPost),
        }
    }

    /// Channels with a date, in the given selection order
    pub fn scheduled_channels<'a>(
        &self,
        order: impl IntoIterator<Item = &'a str>,
    ) -> Vec<ScheduledSlot> {
        order
            .into_iter()
            .filter_map(|platform_id| {
                let date = self.entries.get(platform_id)?.date?;
                Some(ScheduledSlot {
                    platform_id: platform_id.to_string(),
                    date,
                    time: self.effective_time(platform_id),
                })
            })
            .collect()
    }

    /// Earliest slot by (date, time); ties go to the earlier channel
    pub fn earliest_schedule<'a>(
        &self,
        order: impl IntoIterator<Item = &'a str>,
    ) -> Option<ScheduledSlot> {
        self.scheduled_channels(order)
            .into_iter()
            .reduce(|best, slot| {
                if (slot.date, slot.time) < (best.date, best.time) {
                    slot
                } else {
                    best
                }
            })
    }

    /// True when every scheduled channel shares one (date, time)
    pub fn all_same_schedule<'a>(&self, order: impl IntoIterator<Item = &'a str>) -> bool {
        let slots = self.scheduled_channels(order);
        slots
            .windows(2)
            .all(|pair| (pair[0].date, pair[0].time) == (pair[1].date, pair[1].time))
    }

    pub fn remove_channel(&mut self, platform_id: &str) {
        self.entries.remove(platform_id);
    }

    pub(crate) fn tracked_keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
