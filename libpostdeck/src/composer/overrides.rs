//! Two-layer "inherits master until customized" store
//!
//! A master value plus a sparse map of per-channel overrides and a set of
//! channels flagged as customized. Reading a channel resolves to its
//! override when one exists and to the master otherwise. Captions and media
//! both sit on top of this store.

use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default)]
pub struct OverrideStore<V> {
    master: V,
    overrides: HashMap<String, V>,
    customized: HashSet<String>,
}

impl<V> OverrideStore<V> {
    pub fn new(master: V) -> Self {
        Self {
            master,
            overrides: HashMap::new(),
            customized: HashSet::new(),
        }
    }

    pub fn master(&self) -> &V {
        &self.master
    }

    pub fn master_mut(&mut self) -> &mut V {
        &mut self.master
    }

    pub fn set_master(&mut self, value: V) {
        self.master = value;
    }

    /// Value a channel resolves to
    pub fn effective(&self, key: &str) -> &V {
        self.overrides.get(key).unwrap_or(&self.master)
    }

    pub fn override_for(&self, key: &str) -> Option<&V> {
        self.overrides.get(key)
    }

    pub fn override_mut(&mut self, key: &str) -> Option<&mut V> {
        self.overrides.get_mut(key)
    }

    pub fn has_override(&self, key: &str) -> bool {
        self.overrides.contains_key(key)
    }

    pub fn set_override(&mut self, key: &str, value: V) {
        self.overrides.insert(key.to_string(), value);
    }

    /// Override for `key`, created with `init` when absent
    pub fn override_or_insert_with(&mut self, key: &str, init: impl FnOnce() -> V) -> &mut V {
        self.overrides.entry(key.to_string()).or_insert_with(init)
    }

    pub fn overrides(&self) -> impl Iterator<Item = (&str, &V)> {
        self.overrides.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn overrides_mut(&mut self) -> impl Iterator<Item = (&str, &mut V)> {
        self.overrides.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    pub fn is_customized(&self, key: &str) -> bool {
        self.customized.contains(key)
    }

    pub fn mark_customized(&mut self, key: &str) {
        self.customized.insert(key.to_string());
    }

    pub fn customized(&self) -> impl Iterator<Item = &str> {
        self.customized.iter().map(String::as_str)
    }

    /// Drop everything held for `key`; it inherits the master again
    pub fn forget(&mut self, key: &str) {
        self.overrides.remove(key);
        self.customized.remove(key);
    }

    /// Keys that still have an override or a customization flag
    pub fn tracked_keys(&self) -> impl Iterator<Item = &str> {
        self.overrides
            .keys()
            .chain(self.customized.iter().filter(|k| !self.overrides.contains_key(*k)))
            .map(String::as_str)
    }
}
