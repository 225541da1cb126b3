//! sysfs-backed device database
//!
//! Walks the same places libudev does:
//!
//! - `<root>/bus/<subsystem>/devices/*` and `<root>/class/<subsystem>/*`
//!   are symlinks into `<root>/devices/...`; their targets are the syspaths
//! - `<syspath>/uevent` holds the kernel's `KEY=VALUE` properties
//! - `<udev-data>/c<major>:<minor>` (or `b...` for block devices,
//!   `+<subsystem>:<sysname>` for devices without a node) holds the
//!   properties udev added, as `E:KEY=VALUE` lines
//! - every other file in the syspath directory is a sysfs attribute

use super::{DeviceDatabase, DeviceEntry, DeviceScan, SYSFS_ATTRIBUTES};
use crate::{Error, Result};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use uevent::keys;

/// Device database reading sysfs and the udev runtime data directory
#[derive(Debug, Clone)]
pub struct SysfsDatabase {
    root: PathBuf,
    udev_data: PathBuf,
}

impl Default for SysfsDatabase {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ROOT, Self::DEFAULT_UDEV_DATA)
    }
}

impl SysfsDatabase {
    pub const DEFAULT_ROOT: &'static str = "/sys";
    pub const DEFAULT_UDEV_DATA: &'static str = "/run/udev/data";

    /// Create a database over an arbitrary sysfs mount and udev data dir
    pub fn new(root: impl Into<PathBuf>, udev_data: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            udev_data: udev_data.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Collect the canonical syspaths of every device in `subsystem`
    fn device_paths(&self, root: &Path, subsystem: &str) -> Result<BTreeSet<PathBuf>> {
        let mut paths = BTreeSet::new();
        let listings = [
            root.join("bus").join(subsystem).join("devices"),
            root.join("class").join(subsystem),
        ];

        for dir in &listings {
            let entries = match fs::read_dir(dir) {
                Ok(entries) => entries,
                Err(e) if e.kind() == io::ErrorKind::NotFound => continue,
                Err(e) => {
                    return Err(Error::Database(format!(
                        "Cannot list {}: {}",
                        dir.display(),
                        e
                    )));
                }
            };

            for entry in entries.flatten() {
                match fs::canonicalize(entry.path()) {
                    Ok(path) => {
                        paths.insert(path);
                    }
                    Err(e) => {
                        debug!("Skipping dangling entry {}: {}", entry.path().display(), e);
                    }
                }
            }
        }

        Ok(paths)
    }

    /// Build an entry for one syspath
    ///
    /// Fails with [`Error::Skipped`] when the device vanished or belongs to
    /// another subsystem.
    fn read_entry(&self, root: &Path, syspath: &Path, subsystem: &str) -> Result<DeviceEntry> {
        if let Ok(link) = fs::read_link(syspath.join("subsystem")) {
            if link.file_name().is_some_and(|name| name != subsystem) {
                return Err(Error::Skipped(format!(
                    "{} is not in subsystem {}",
                    syspath.display(),
                    subsystem
                )));
            }
        }

        let uevent = fs::read_to_string(syspath.join("uevent")).map_err(|e| {
            Error::Skipped(format!("{}: cannot read uevent: {}", syspath.display(), e))
        })?;

        let mut properties: HashMap<String, String> = uevent
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        properties.insert(keys::SUBSYSTEM.to_string(), subsystem.to_string());
        if let Ok(devpath) = syspath.strip_prefix(root) {
            properties.insert(
                keys::DEVPATH.to_string(),
                format!("/{}", devpath.to_string_lossy()),
            );
        }

        let sysname = syspath
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.merge_udev_data(&mut properties, subsystem, &sysname);

        let mut entry = DeviceEntry::new(syspath.to_string_lossy());

        if let Some(name) = properties.get(keys::DEVNAME) {
            entry = entry.with_devnode(if name.starts_with('/') {
                name.clone()
            } else {
                format!("/dev/{}", name)
            });
        }

        if let Some(parent) = parent_device(root, syspath) {
            entry = entry.with_parent(parent.to_string_lossy());
        }

        for name in SYSFS_ATTRIBUTES {
            if let Some(value) = read_attribute(syspath, name) {
                entry = entry.with_attribute(*name, value);
            }
        }

        for (key, value) in properties {
            entry = entry.with_property(key, value);
        }

        Ok(entry)
    }

    /// Overlay the `E:` lines of the udev database record, if any
    fn merge_udev_data(
        &self,
        properties: &mut HashMap<String, String>,
        subsystem: &str,
        sysname: &str,
    ) {
        let record_name = match (properties.get(keys::MAJOR), properties.get(keys::MINOR)) {
            (Some(major), Some(minor)) => {
                let kind = if subsystem == "block" { 'b' } else { 'c' };
                format!("{}{}:{}", kind, major, minor)
            }
            _ => format!("+{}:{}", subsystem, sysname),
        };

        let Ok(contents) = fs::read_to_string(self.udev_data.join(&record_name)) else {
            trace!("No udev record {} for {}", record_name, sysname);
            return;
        };

        for line in contents.lines() {
            if let Some((key, value)) = line.strip_prefix("E:").and_then(|l| l.split_once('=')) {
                properties.insert(key.to_string(), value.to_string());
            }
        }
    }
}

impl DeviceDatabase for SysfsDatabase {
    fn scan(&self, subsystem: &str) -> Result<DeviceScan<'_>> {
        let root = fs::canonicalize(&self.root).map_err(|e| {
            Error::Database(format!("sysfs not available at {}: {}", self.root.display(), e))
        })?;

        let paths = self.device_paths(&root, subsystem)?;
        debug!("sysfs scan of {} found {} candidates", subsystem, paths.len());

        let subsystem = subsystem.to_string();
        Ok(Box::new(paths.into_iter().filter_map(move |path| {
            match self.read_entry(&root, &path, &subsystem) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    debug!("{}", e);
                    None
                }
            }
        })))
    }
}

/// Nearest ancestor directory that is itself a device
fn parent_device(root: &Path, syspath: &Path) -> Option<PathBuf> {
    let devices = root.join("devices");

    syspath
        .ancestors()
        .skip(1)
        .take_while(|dir| dir.starts_with(&devices) && *dir != devices)
        .find(|dir| dir.join("uevent").is_file())
        .map(Path::to_path_buf)
}

fn read_attribute(syspath: &Path, name: &str) -> Option<String> {
    fs::read_to_string(syspath.join(name))
        .ok()
        .map(|value| value.trim_end_matches('\n').to_string())
}
