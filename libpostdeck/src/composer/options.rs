//! Per-channel option values
//!
//! Values are checked against the platform's option schema when they are
//! set. The assembler passes them through untouched.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::{OptionValue, Platform};

#[derive(Debug, Clone, Default)]
pub struct ChannelOptions {
    values: HashMap<String, BTreeMap<String, OptionValue>>,
}

impl ChannelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a value after checking it against `platform`'s schema
    pub fn set(&mut self, platform: &Platform, field_id: &str, value: OptionValue) -> Result<(), String> {
        let field = platform.option_field(field_id).ok_or_else(|| {
            format!("{} has no option named '{}'", platform.display_name, field_id)
        })?;
        field
            .kind
            .validate(&value)
            .map_err(|e| format!("{} {}: {}", platform.display_name, field.label, e))?;
        self.values
            .entry(platform.id.clone())
            .or_default()
            .insert(field_id.to_string(), value);
        Ok(())
    }

    pub fn clear_field(&mut self, platform_id: &str, field_id: &str) {
        if let Some(fields) = self.values.get_mut(platform_id) {
            fields.remove(field_id);
            if fields.is_empty() {
                self.values.remove(platform_id);
            }
        }
    }

    pub fn get(&self, platform_id: &str, field_id: &str) -> Option<&OptionValue> {
        self.values.get(platform_id).and_then(|f| f.get(field_id))
    }

    /// All stored values for a channel, empty when none were set
    pub fn values_for(&self, platform_id: &str) -> BTreeMap<String, OptionValue> {
        self.values.get(platform_id).cloned().unwrap_or_default()
    }

    pub fn remove_channel(&mut self, platform_id: &str) {
        self.values.remove(platform_id);
    }

    pub(crate) fn tracked_keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
