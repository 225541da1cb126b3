//! Subsystem enumeration into device descriptors

use crate::Severity;
use crate::database::{DeviceDatabase, DeviceEntry};
use crate::usb_types::{DeviceDescriptor, FieldSet};
use tracing::{debug, trace, warn};

/// Enumerates devices of one subsystem through a [`DeviceDatabase`]
///
/// Every call re-queries the database; two calls a second apart may return
/// different devices.
pub struct DeviceEnumerator<D> {
    database: D,
}

impl<D: DeviceDatabase> DeviceEnumerator<D> {
    pub fn new(database: D) -> Self {
        Self { database }
    }

    pub fn database(&self) -> &D {
        &self.database
    }

    /// Raw entries of `subsystem`, in database order
    pub fn entries(&self, subsystem: &str) -> crate::Result<impl Iterator<Item = DeviceEntry> + '_> {
        self.database.scan(subsystem)
    }

    /// Descriptors of `subsystem` that carry every field `fields` requires
    ///
    /// Incomplete entries are skipped. Only a failure to open the database
    /// is an error.
    pub fn enumerate(
        &self,
        subsystem: &str,
        fields: FieldSet,
    ) -> crate::Result<impl Iterator<Item = DeviceDescriptor> + '_> {
        let scan = self.database.scan(subsystem)?;

        Ok(scan.filter_map(move |entry| {
            match DeviceDescriptor::from_entry(&entry, fields) {
                Ok(descriptor) => Some(descriptor),
                Err(e) if e.severity() == Severity::Skipped => {
                    trace!("{} ({:?})", e, fields);
                    None
                }
                Err(e) => {
                    warn!("Dropping {}: {}", entry.syspath(), e);
                    None
                }
            }
        }))
    }

    /// USB devices carrying all four identity properties, for inventory listing
    pub fn usb_inventory(&self) -> crate::Result<Vec<DeviceDescriptor>> {
        let devices: Vec<_> = self
            .enumerate("usb", FieldSet::Properties)?
            .collect();
        debug!("Inventory holds {} USB devices", devices.len());
        Ok(devices)
    }

    /// USB devices whose `idVendor`/`idProduct` equal the given strings
    pub fn find_by_id(&self, vendor_id: &str, product_id: &str) -> crate::Result<Vec<DeviceDescriptor>> {
        let matches: Vec<_> = self
            .enumerate("usb", FieldSet::SysAttributes)?
            .filter(|d| d.matches(vendor_id, product_id))
            .collect();
        debug!(
            "{} USB devices match {}:{}",
            matches.len(),
            vendor_id,
            product_id
        );
        Ok(matches)
    }
}
