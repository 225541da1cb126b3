//! Device database abstraction
//!
//! A device database answers one question: which devices currently belong to
//! a subsystem, and what do their udev properties and sysfs attributes say.
//! Every scan reads live system state; nothing is cached between scans.
//!
//! Two backends exist:
//! - [`UdevDatabase`] (feature `libudev`) goes through libudev's enumerator
//! - [`SysfsDatabase`] reads a sysfs tree and the udev data directory
//!   directly; it serves alternate roots and builds without libudev
//!
//! [`SystemDatabase::select`] picks one at startup.

mod sysfs;
#[cfg(feature = "libudev")]
mod libudev;

pub use sysfs::SysfsDatabase;
#[cfg(feature = "libudev")]
pub use libudev::UdevDatabase;

use std::collections::HashMap;
use std::path::Path;

/// Sysfs attributes captured for every entry
pub const SYSFS_ATTRIBUTES: &[&str] = &[
    "idVendor",
    "idProduct",
    "bDeviceClass",
    "manufacturer",
    "product",
];

/// Snapshot of one device database entry
///
/// Both namespaces are populated where the system provides them; consumers
/// pick the fields they need.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceEntry {
    syspath: String,
    devnode: Option<String>,
    parent_syspath: Option<String>,
    properties: HashMap<String, String>,
    attributes: HashMap<String, String>,
}

impl DeviceEntry {
    pub fn new(syspath: impl Into<String>) -> Self {
        Self {
            syspath: syspath.into(),
            ..Self::default()
        }
    }

    pub fn with_devnode(mut self, devnode: impl Into<String>) -> Self {
        self.devnode = Some(devnode.into());
        self
    }

    pub fn with_parent(mut self, syspath: impl Into<String>) -> Self {
        self.parent_syspath = Some(syspath.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Absolute enumeration path of the device
    pub fn syspath(&self) -> &str {
        &self.syspath
    }

    /// Last component of the syspath (`1-1`, `ttyACM0`, ...)
    pub fn sysname(&self) -> &str {
        self.syspath.rsplit('/').next().unwrap_or(&self.syspath)
    }

    /// Device node under `/dev`, if the device has one
    pub fn devnode(&self) -> Option<&str> {
        self.devnode.as_deref()
    }

    /// Syspath of the nearest parent device
    pub fn parent_syspath(&self) -> Option<&str> {
        self.parent_syspath.as_deref()
    }

    /// udev property (`ID_VENDOR_ID`, ...)
    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Raw sysfs attribute (`idVendor`, ...)
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Single-pass sequence of entries produced by one scan
pub type DeviceScan<'a> = Box<dyn Iterator<Item = DeviceEntry> + 'a>;

/// Source of device entries filtered by subsystem
pub trait DeviceDatabase {
    /// Scan all devices of `subsystem`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Database`] when the database itself cannot be
    /// opened. Unreadable individual entries are left out of the scan.
    fn scan(&self, subsystem: &str) -> crate::Result<DeviceScan<'_>>;
}

impl<T: DeviceDatabase + ?Sized> DeviceDatabase for &T {
    fn scan(&self, subsystem: &str) -> crate::Result<DeviceScan<'_>> {
        (**self).scan(subsystem)
    }
}

/// Backend chosen at startup from the command line
#[derive(Debug, Clone)]
pub enum SystemDatabase {
    Sysfs(SysfsDatabase),
    #[cfg(feature = "libudev")]
    Udev(UdevDatabase),
}

impl SystemDatabase {
    /// libudev when built in and no alternate location was given, sysfs otherwise
    pub fn select(sysfs_root: Option<&Path>, udev_data: Option<&Path>) -> Self {
        #[cfg(feature = "libudev")]
        {
            if sysfs_root.is_none() && udev_data.is_none() {
                return Self::Udev(UdevDatabase::new());
            }
        }

        Self::Sysfs(SysfsDatabase::new(
            sysfs_root.unwrap_or(Path::new(SysfsDatabase::DEFAULT_ROOT)),
            udev_data.unwrap_or(Path::new(SysfsDatabase::DEFAULT_UDEV_DATA)),
        ))
    }

    pub fn backend(&self) -> &'static str {
        match self {
            Self::Sysfs(_) => "sysfs",
            #[cfg(feature = "libudev")]
            Self::Udev(_) => "libudev",
        }
    }
}

impl DeviceDatabase for SystemDatabase {
    fn scan(&self, subsystem: &str) -> crate::Result<DeviceScan<'_>> {
        match self {
            Self::Sysfs(db) => db.scan(subsystem),
            #[cfg(feature = "libudev")]
            Self::Udev(db) => db.scan(subsystem),
        }
    }
}
