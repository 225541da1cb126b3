//! Test utilities for usb-hotplug
//!
//! Provides an in-memory device database, entry builders and an on-disk
//! sysfs fixture for tests across crates.
//!
//! # Example
//!
//! ```
//! use common::DeviceEnumerator;
//! use common::test_utils::{FakeDatabase, usb_entry};
//!
//! let db = FakeDatabase::new().with_entry("usb", usb_entry("1-1", "0403", "6001", "FTDI", "FT232R"));
//! let inventory = DeviceEnumerator::new(&db).usb_inventory().unwrap();
//! assert_eq!(inventory.len(), 1);
//! assert_eq!(db.scanned(), vec!["usb"]);
//! ```

use crate::database::{DeviceDatabase, DeviceEntry, DeviceScan};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// In-memory device database that records which subsystems were scanned
#[derive(Debug, Default)]
pub struct FakeDatabase {
    entries: HashMap<String, Vec<DeviceEntry>>,
    scanned: Mutex<Vec<String>>,
    failing: bool,
}

impl FakeDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry to `subsystem`; scans return entries in insertion order
    pub fn with_entry(mut self, subsystem: &str, entry: DeviceEntry) -> Self {
        self.entries
            .entry(subsystem.to_string())
            .or_default()
            .push(entry);
        self
    }

    /// Make every scan fail as if the database could not be opened
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Subsystems scanned so far, in call order
    pub fn scanned(&self) -> Vec<String> {
        self.scanned
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

impl DeviceDatabase for FakeDatabase {
    fn scan(&self, subsystem: &str) -> Result<DeviceScan<'_>> {
        if let Ok(mut scanned) = self.scanned.lock() {
            scanned.push(subsystem.to_string());
        }

        if self.failing {
            return Err(Error::Database("fake database unavailable".to_string()));
        }

        let entries = self.entries.get(subsystem).cloned().unwrap_or_default();
        Ok(Box::new(entries.into_iter()))
    }
}

/// USB device entry with both property and sysfs attribute namespaces filled
///
/// The syspath is `/sys/devices/pci0000:00/usb1/<sysname>`; the device class
/// is `00`.
pub fn usb_entry(
    sysname: &str,
    vendor_id: &str,
    product_id: &str,
    manufacturer: &str,
    product: &str,
) -> DeviceEntry {
    DeviceEntry::new(format!("/sys/devices/pci0000:00/usb1/{}", sysname))
        .with_property("SUBSYSTEM", "usb")
        .with_property("ID_VENDOR_ID", vendor_id)
        .with_property("ID_MODEL_ID", product_id)
        .with_property("ID_VENDOR", manufacturer)
        .with_property("ID_MODEL", product)
        .with_attribute("idVendor", vendor_id)
        .with_attribute("idProduct", product_id)
        .with_attribute("manufacturer", manufacturer)
        .with_attribute("product", product)
        .with_attribute("bDeviceClass", "00")
}

/// tty entry with devnode `/dev/<sysname>` whose parent is `parent_syspath`
pub fn tty_entry(sysname: &str, parent_syspath: &str) -> DeviceEntry {
    DeviceEntry::new(format!("{}/tty/{}", parent_syspath, sysname))
        .with_property("SUBSYSTEM", "tty")
        .with_devnode(format!("/dev/{}", sysname))
        .with_parent(parent_syspath)
}

/// Minimal sysfs layout on disk, for exercising [`crate::SysfsDatabase`]
///
/// Devices live under `<root>/devices`; each gets a `uevent` file, a
/// `subsystem` link and an entry in the bus or class listing.
#[derive(Debug, Clone)]
pub struct SysfsTree {
    root: PathBuf,
}

impl SysfsTree {
    pub fn new(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(root.join("devices"))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Add a device listed under `bus/<subsystem>/devices`
    pub fn add_bus_device(&self, devpath: &str, subsystem: &str, uevent: &str) -> io::Result<PathBuf> {
        self.add_device(devpath, "bus", subsystem, uevent)
    }

    /// Add a device listed under `class/<subsystem>`
    pub fn add_class_device(&self, devpath: &str, subsystem: &str, uevent: &str) -> io::Result<PathBuf> {
        self.add_device(devpath, "class", subsystem, uevent)
    }

    /// Write a sysfs attribute file, newline terminated like the kernel does
    pub fn set_attribute(&self, devpath: &str, name: &str, value: &str) -> io::Result<()> {
        fs::write(self.root.join(devpath).join(name), format!("{}\n", value))
    }

    fn add_device(&self, devpath: &str, listing: &str, subsystem: &str, uevent: &str) -> io::Result<PathBuf> {
        let dir = self.root.join(devpath);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("uevent"), uevent)?;

        let subsystem_dir = self.root.join(listing).join(subsystem);
        let listing_dir = if listing == "bus" {
            subsystem_dir.join("devices")
        } else {
            subsystem_dir.clone()
        };
        fs::create_dir_all(&listing_dir)?;

        symlink(&subsystem_dir, dir.join("subsystem"))?;
        if let Some(name) = dir.file_name() {
            symlink(&dir, listing_dir.join(name))?;
        }

        Ok(dir)
    }
}
