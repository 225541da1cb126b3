//! libudev-backed device database

use super::{DeviceDatabase, DeviceEntry, DeviceScan, SYSFS_ATTRIBUTES};
use crate::{Error, Result};
use tracing::debug;

/// Device database that enumerates through libudev
///
/// Each scan creates a fresh udev context and enumerator, and releases both
/// before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdevDatabase;

impl UdevDatabase {
    pub fn new() -> Self {
        Self
    }
}

impl DeviceDatabase for UdevDatabase {
    fn scan(&self, subsystem: &str) -> Result<DeviceScan<'_>> {
        let mut enumerator = ::udev::Enumerator::new()
            .map_err(|e| Error::Database(format!("Cannot create udev context: {}", e)))?;
        enumerator
            .match_subsystem(subsystem)
            .map_err(|e| Error::Database(format!("Cannot filter on {}: {}", subsystem, e)))?;

        let entries: Vec<DeviceEntry> = enumerator
            .scan_devices()
            .map_err(|e| Error::Database(format!("Cannot scan {} devices: {}", subsystem, e)))?
            .map(|device| entry_from_device(&device))
            .collect();

        debug!("libudev scan of {} found {} entries", subsystem, entries.len());
        Ok(Box::new(entries.into_iter()))
    }
}

fn entry_from_device(device: &::udev::Device) -> DeviceEntry {
    let mut entry = DeviceEntry::new(device.syspath().to_string_lossy());

    for property in device.properties() {
        entry = entry.with_property(
            property.name().to_string_lossy(),
            property.value().to_string_lossy(),
        );
    }

    for name in SYSFS_ATTRIBUTES {
        if let Some(value) = device.attribute_value(name) {
            entry = entry.with_attribute(*name, value.to_string_lossy());
        }
    }

    if let Some(node) = device.devnode() {
        entry = entry.with_devnode(node.to_string_lossy());
    }

    if let Some(parent) = device.parent() {
        entry = entry.with_parent(parent.syspath().to_string_lossy());
    }

    entry
}
