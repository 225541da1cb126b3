//! Well-known uevent and udev property keys

/// Kernel action (`add`, `remove`, ...)
pub const ACTION: &str = "ACTION";
/// Kernel subsystem the device belongs to
pub const SUBSYSTEM: &str = "SUBSYSTEM";
/// Device path relative to the sysfs mount point
pub const DEVPATH: &str = "DEVPATH";
/// Device type within the subsystem (`usb_device`, `usb_interface`, ...)
pub const DEVTYPE: &str = "DEVTYPE";
/// Device node name relative to `/dev`
pub const DEVNAME: &str = "DEVNAME";
/// Monotonic kernel event sequence number
pub const SEQNUM: &str = "SEQNUM";
/// Kernel USB identity, `<vid>/<pid>/<bcdDevice>` in unpadded hex
pub const PRODUCT: &str = "PRODUCT";
/// Device node major number
pub const MAJOR: &str = "MAJOR";
/// Device node minor number
pub const MINOR: &str = "MINOR";

/// udev vendor ID property (four hex digits)
pub const ID_VENDOR_ID: &str = "ID_VENDOR_ID";
/// udev product ID property (four hex digits)
pub const ID_MODEL_ID: &str = "ID_MODEL_ID";
/// udev manufacturer string
pub const ID_VENDOR: &str = "ID_VENDOR";
/// udev product string
pub const ID_MODEL: &str = "ID_MODEL";
