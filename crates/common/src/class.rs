//! USB class code descriptions
//!
//! Codes are the two hex digit strings found in `bDeviceClass`. Lookups are
//! case-sensitive and follow the spelling of the usb.org class table.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Description returned for codes outside the table
pub const UNKNOWN_CLASS: &str = "Unknown USB class";

/// Communications and CDC Control; the class of composite serial devices
pub const CDC_CLASS: &str = "02";

static CLASS_TABLE: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("00", "Device: Use class information in the Interface Descriptors"),
        ("01", "Interface: Audio"),
        ("02", "Both: Communications and CDC Control"),
        ("03", "Interface: HID (Human Interface Device)"),
        ("05", "Interface: Physical"),
        ("06", "Interface: Image"),
        ("07", "Interface: Printer"),
        ("08", "Interface: Mass Storage"),
        ("09", "Device: Hub"),
        ("0A", "Interface: CDC-Data"),
        ("0B", "Interface: Smart Card"),
        ("0D", "Interface: Content Security"),
        ("0E", "Interface: Video"),
        ("0F", "Interface: Personal Healthcare"),
        ("10", "Interface: Audio/Video Devices"),
        ("11", "Device: Billboard Device Class"),
        ("12", "Interface: USB Type-C Bridge Class"),
        ("13", "Interface: USB Bulk Display Protocol Device Class"),
        ("14", "Interface: MCTP over USB Protocol Endpoint Device Class"),
        ("3C", "Interface: I3C Device Class"),
        ("DC", "Both: Diagnostic Device"),
        ("E0", "Interface: Wireless Controller"),
        ("EF", "Both: Miscellaneous"),
        ("FE", "Interface: Application Specific"),
        ("FF", "Both: Vendor Specific"),
    ])
});

/// Describe a USB class code
///
/// Never fails; unknown codes map to [`UNKNOWN_CLASS`].
pub fn describe(class_code: &str) -> &'static str {
    CLASS_TABLE
        .get(class_code)
        .copied()
        .unwrap_or(UNKNOWN_CLASS)
}

/// Number of known class codes
pub fn known_classes() -> usize {
    CLASS_TABLE.len()
}
