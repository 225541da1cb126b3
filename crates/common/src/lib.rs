//! Common utilities for usb-hotplug
//!
//! This crate provides shared functionality between the monitor and the
//! resolver: the error taxonomy, logging setup, cooperative shutdown, and the
//! device resolution engine (device database access, enumeration, USB class
//! descriptions and tty association for composite devices).

pub mod class;
pub mod composite;
pub mod database;
pub mod enumerator;
pub mod error;
pub mod logging;
pub mod shutdown;
pub mod test_utils;
pub mod usb_types;

pub use composite::{CompositeDeviceResolver, Resolution};
pub use database::{DeviceDatabase, DeviceEntry, DeviceScan, SysfsDatabase, SystemDatabase};
pub use enumerator::DeviceEnumerator;
pub use error::{Error, Result, Severity};
pub use logging::setup_logging;
pub use shutdown::ShutdownToken;
pub use usb_types::{DeviceDescriptor, FieldSet};
