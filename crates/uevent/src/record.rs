//! Parsed uevent record

use crate::action::Action;
use crate::keys;
use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map;

/// Key/value view of one kernel uevent
///
/// Keys are unique; inserting an existing key replaces its value. Ordering of
/// the original payload is not preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UeventRecord {
    fields: HashMap<String, String>,
}

impl UeventRecord {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a field, returning the value it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.fields.insert(key.into(), value.into())
    }

    /// Look up a field
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterate over all fields in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Typed `ACTION` field
    ///
    /// Returns `None` when the field is missing or holds an action the kernel
    /// does not define.
    pub fn action(&self) -> Option<Action> {
        self.get(keys::ACTION).and_then(|a| a.parse().ok())
    }

    pub fn subsystem(&self) -> Option<&str> {
        self.get(keys::SUBSYSTEM)
    }

    pub fn devpath(&self) -> Option<&str> {
        self.get(keys::DEVPATH)
    }

    pub fn devtype(&self) -> Option<&str> {
        self.get(keys::DEVTYPE)
    }

    /// Kernel sequence number, if present and numeric
    pub fn seqnum(&self) -> Option<u64> {
        self.get(keys::SEQNUM).and_then(|s| s.parse().ok())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for UeventRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl IntoIterator for UeventRecord {
    type Item = (String, String);
    type IntoIter = hash_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
