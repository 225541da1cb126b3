//! Mapping a USB device to the tty nodes of its serial interfaces
//!
//! A CDC device exposes its serial port as a `tty` device whose parent is
//! one of the USB device's interfaces. Finding the port means scanning the
//! `tty` subsystem and keeping entries whose parent syspath contains the USB
//! device's syspath.
//!
//! The check is substring containment, not a path-segment prefix test, so
//! `/devices/.../1-1` also matches a parent under `/devices/.../1-10`.

use crate::class::{self, CDC_CLASS};
use crate::database::DeviceDatabase;
use crate::enumerator::DeviceEnumerator;
use crate::usb_types::DeviceDescriptor;
use serde::Serialize;
use tracing::debug;

/// Everything known about one matched USB device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub device: DeviceDescriptor,
    /// Class description; `None` when the device reports no class
    pub class_description: Option<&'static str>,
    /// Associated tty device nodes, in database order
    pub tty_nodes: Vec<String>,
}

pub struct CompositeDeviceResolver<D> {
    enumerator: DeviceEnumerator<D>,
}

impl<D: DeviceDatabase> CompositeDeviceResolver<D> {
    pub fn new(database: D) -> Self {
        Self {
            enumerator: DeviceEnumerator::new(database),
        }
    }

    pub fn enumerator(&self) -> &DeviceEnumerator<D> {
        &self.enumerator
    }

    /// tty nodes belonging to `device`
    ///
    /// Only CDC devices (class `"02"`) are considered; for any other class the
    /// tty subsystem is not scanned at all.
    pub fn associated_ttys(&self, device: &DeviceDescriptor) -> crate::Result<Vec<String>> {
        let (Some(class_code), Some(usb_path)) =
            (device.device_class.as_deref(), device.syspath.as_deref())
        else {
            return Ok(Vec::new());
        };

        if class_code != CDC_CLASS {
            return Ok(Vec::new());
        }

        let nodes: Vec<String> = self
            .enumerator
            .entries("tty")?
            .filter(|tty| tty.parent_syspath().is_some_and(|parent| parent.contains(usb_path)))
            .filter_map(|tty| tty.devnode().map(str::to_string))
            .collect();

        debug!("{} has {} associated tty nodes", usb_path, nodes.len());
        Ok(nodes)
    }

    /// Resolve class and tty association for one device
    pub fn resolve(&self, device: DeviceDescriptor) -> crate::Result<Resolution> {
        let class_description = device.device_class.as_deref().map(class::describe);
        let tty_nodes = self.associated_ttys(&device)?;

        Ok(Resolution {
            device,
            class_description,
            tty_nodes,
        })
    }

    /// Find every USB device with the given IDs and resolve each
    pub fn resolve_id(&self, vendor_id: &str, product_id: &str) -> crate::Result<Vec<Resolution>> {
        self.enumerator
            .find_by_id(vendor_id, product_id)?
            .into_iter()
            .map(|device| self.resolve(device))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::DeviceEntry;
    use crate::test_utils::{FakeDatabase, tty_entry};

    const USB_PATH: &str = "/devices/pci0000:00/usb1/1-1";

    fn cdc_device(class_code: &str) -> DeviceDescriptor {
        DeviceDescriptor {
            vendor_id: "2341".to_string(),
            product_id: "0043".to_string(),
            manufacturer: None,
            product: None,
            device_class: Some(class_code.to_string()),
            devnode: Some("/dev/bus/usb/001/004".to_string()),
            syspath: Some(USB_PATH.to_string()),
        }
    }

    #[test]
    fn test_cdc_device_gets_its_tty() {
        let db = FakeDatabase::new()
            .with_entry("tty", tty_entry("ttyACM0", "/devices/pci0000:00/usb1/1-1/1-1:1.0"))
            .with_entry("tty", tty_entry("ttyS0", "/devices/platform/serial8250"))
            .with_entry("tty", DeviceEntry::new("/devices/virtual/tty/tty0").with_devnode("/dev/tty0"));

        let resolver = CompositeDeviceResolver::new(&db);
        let nodes = resolver.associated_ttys(&cdc_device("02")).unwrap();

        assert_eq!(nodes, vec!["/dev/ttyACM0"]);
    }

    #[test]
    fn test_non_cdc_device_never_scans_tty() {
        let db = FakeDatabase::new()
            .with_entry("tty", tty_entry("ttyACM0", "/devices/pci0000:00/usb1/1-1/1-1:1.0"));

        let resolver = CompositeDeviceResolver::new(&db);
        let resolution = resolver.resolve(cdc_device("08")).unwrap();

        assert!(resolution.tty_nodes.is_empty());
        assert_eq!(resolution.class_description, Some("Interface: Mass Storage"));
        assert!(db.scanned().is_empty());
    }

    #[test]
    fn test_containment_quirk_is_preserved() {
        let db = FakeDatabase::new()
            .with_entry("tty", tty_entry("ttyACM1", "/devices/pci0000:00/usb1/1-10/1-10:1.0"));

        let nodes = CompositeDeviceResolver::new(&db)
            .associated_ttys(&cdc_device("02"))
            .unwrap();

        assert_eq!(nodes, vec!["/dev/ttyACM1"]);
    }

    #[test]
    fn test_order_follows_database() {
        let db = FakeDatabase::new()
            .with_entry("tty", tty_entry("ttyACM2", "/devices/pci0000:00/usb1/1-1/1-1:1.2"))
            .with_entry("tty", tty_entry("ttyACM0", "/devices/pci0000:00/usb1/1-1/1-1:1.0"));

        let nodes = CompositeDeviceResolver::new(&db)
            .associated_ttys(&cdc_device("02"))
            .unwrap();

        assert_eq!(nodes, vec!["/dev/ttyACM2", "/dev/ttyACM0"]);
    }

    #[test]
    fn test_missing_class_resolves_without_description() {
        let db = FakeDatabase::new();
        let mut device = cdc_device("02");
        device.device_class = None;

        let resolution = CompositeDeviceResolver::new(&db).resolve(device).unwrap();
        assert_eq!(resolution.class_description, None);
        assert!(resolution.tty_nodes.is_empty());
        assert!(db.scanned().is_empty());
    }
}
