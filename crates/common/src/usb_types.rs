//! USB device identity as seen through the device database

use crate::Error;
use crate::database::DeviceEntry;
use serde::Serialize;
use std::fmt;
use uevent::keys;

/// Which namespace of a [`DeviceEntry`] a descriptor is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    /// udev properties: `ID_VENDOR_ID`, `ID_MODEL_ID`, `ID_VENDOR`, `ID_MODEL`.
    /// All four are required.
    Properties,
    /// sysfs attributes: `idVendor`, `idProduct` (required), plus
    /// `manufacturer`, `product` and `bDeviceClass` when present.
    SysAttributes,
}

/// Identity snapshot of one USB device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceDescriptor {
    pub vendor_id: String,
    pub product_id: String,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    /// Two hex digit class code as the kernel prints it (`"02"`, `"ef"`)
    pub device_class: Option<String>,
    pub devnode: Option<String>,
    pub syspath: Option<String>,
}

impl DeviceDescriptor {
    /// Build a descriptor from a database entry
    ///
    /// A field required by `fields` that is missing yields
    /// [`Error::Skipped`]; such entries are left out of results rather than
    /// reported.
    pub fn from_entry(entry: &DeviceEntry, fields: FieldSet) -> crate::Result<Self> {
        let owned = |v: &str| v.to_string();
        let missing = |name: &str| Error::Skipped(format!("{} has no {}", entry.syspath(), name));
        let property = |key: &str| entry.property(key).ok_or_else(|| missing(key));
        let attribute = |name: &str| entry.attribute(name).ok_or_else(|| missing(name));

        let (vendor_id, product_id, manufacturer, product) = match fields {
            FieldSet::Properties => (
                property(keys::ID_VENDOR_ID)?,
                property(keys::ID_MODEL_ID)?,
                Some(owned(property(keys::ID_VENDOR)?)),
                Some(owned(property(keys::ID_MODEL)?)),
            ),
            FieldSet::SysAttributes => (
                attribute("idVendor")?,
                attribute("idProduct")?,
                entry.attribute("manufacturer").map(owned),
                entry.attribute("product").map(owned),
            ),
        };

        Ok(Self {
            vendor_id: owned(vendor_id),
            product_id: owned(product_id),
            manufacturer,
            product,
            device_class: entry.attribute("bDeviceClass").map(owned),
            devnode: entry.devnode().map(owned),
            syspath: Some(owned(entry.syspath())),
        })
    }

    /// Exact, case-sensitive identity match
    pub fn matches(&self, vendor_id: &str, product_id: &str) -> bool {
        self.vendor_id == vendor_id && self.product_id == product_id
    }
}

/// Console block listing the identity fields
impl fmt::Display for DeviceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "USB Device Info:")?;
        writeln!(f, "Vendor ID: {}", self.vendor_id)?;
        writeln!(f, "Product ID: {}", self.product_id)?;
        writeln!(
            f,
            "Manufacturer: {}",
            self.manufacturer.as_deref().unwrap_or("")
        )?;
        writeln!(f, "Product: {}", self.product.as_deref().unwrap_or(""))?;
        write!(f, "{}", SEPARATOR)
    }
}

/// Line printed after every device block
pub const SEPARATOR: &str = "-----------------------";
