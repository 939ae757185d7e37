// src/data_analysis/aggregation.rs

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::constants::{DEFAULT_DEVICE_ID_DELIMITER, DEFAULT_DEVICE_ID_INDEX, UNKNOWN_DEVICE_ID};

/// Where the device identifier sits in a capture file name.
///
/// The file stem is split on `delimiter` and the token at `index` is the id, so
/// `scope_A1_run3.csv` yields `A1` with the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeviceIdRule {
    pub delimiter: String,
    pub index: usize,
    /// Bucket for file names the rule cannot split.
    pub unknown_bucket: String,
}

impl Default for DeviceIdRule {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DEVICE_ID_DELIMITER.to_string(),
            index: DEFAULT_DEVICE_ID_INDEX,
            unknown_bucket: UNKNOWN_DEVICE_ID.to_string(),
        }
    }
}

impl DeviceIdRule {
    /// Token at `index`, or `None` when the name has too few tokens or the token is empty.
    pub fn extract(&self, file_name: &str) -> Option<String> {
        let stem = Path::new(file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(file_name);
        stem.split(self.delimiter.as_str())
            .nth(self.index)
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_string)
    }

    /// Like [`extract`](Self::extract) but falls back to the unknown bucket with a warning.
    pub fn device_for(&self, file_name: &str) -> String {
        self.extract(file_name).unwrap_or_else(|| {
            warn!(
                file = file_name,
                bucket = %self.unknown_bucket,
                "file name does not carry a device id at token {}",
                self.index
            );
            self.unknown_bucket.clone()
        })
    }
}

/// Measurements for one device, in the order they were recorded.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord<T> {
    pub device_id: String,
    pub values: Vec<T>,
}

/// Append-only mapping from device id to measurements.
///
/// Devices iterate in first-seen order. A device only appears once something was
/// recorded for it, so every entry has at least one value.
#[derive(Debug, Clone)]
pub struct DeviceRecords<T> {
    records: Vec<DeviceRecord<T>>,
    index: HashMap<String, usize>,
}

impl<T> Default for DeviceRecords<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> DeviceRecords<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `values` to the device's list, creating the entry on first use.
    /// An empty `values` leaves the mapping untouched.
    pub fn record<I>(&mut self, device_id: &str, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }
        let slot = match self.index.get(device_id) {
            Some(&slot) => slot,
            None => {
                self.records.push(DeviceRecord {
                    device_id: device_id.to_string(),
                    values: Vec::new(),
                });
                let slot = self.records.len() - 1;
                self.index.insert(device_id.to_string(), slot);
                slot
            }
        };
        self.records[slot].values.extend(values);
    }

    pub fn push(&mut self, device_id: &str, value: T) {
        self.record(device_id, std::iter::once(value));
    }

    pub fn get(&self, device_id: &str) -> Option<&[T]> {
        self.index
            .get(device_id)
            .map(|&slot| self.records[slot].values.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord<T>> {
        self.records.iter()
    }

    pub fn device_ids(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.device_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_measurements(&self) -> usize {
        self.records.iter().map(|r| r.values.len()).sum()
    }
}

impl<'a, T> IntoIterator for &'a DeviceRecords<T> {
    type Item = &'a DeviceRecord<T>;
    type IntoIter = std::slice::Iter<'a, DeviceRecord<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
