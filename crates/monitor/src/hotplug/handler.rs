//! USB inventory handler
//!
//! Reacts to `SUBSYSTEM=usb` uevents by reporting the event and re-listing
//! the USB inventory. Records of every other subsystem are ignored.

use crate::config::OutputFormat;
use crate::hotplug::dispatcher::UeventHandler;
use anyhow::{Context, Result};
use common::{DeviceDatabase, DeviceDescriptor, DeviceEnumerator};
use serde::Serialize;
use std::io::Write;
use tracing::{info, trace};
use uevent::{UeventRecord, keys};

/// Identity fields extracted from one USB uevent
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsbEvent {
    pub action: Option<String>,
    pub vendor_id: Option<String>,
    pub product_id: Option<String>,
    pub manufacturer: Option<String>,
    pub product: Option<String>,
    pub devpath: Option<String>,
}

impl UsbEvent {
    /// Extract a USB event, or `None` if the record is for another subsystem
    ///
    /// Vendor and product IDs come from udev's `ID_VENDOR_ID`/`ID_MODEL_ID`
    /// when present, otherwise from the kernel's `PRODUCT` field.
    pub fn from_record(record: &UeventRecord) -> Option<Self> {
        if record.subsystem() != Some("usb") {
            return None;
        }

        let field = |key: &str| record.get(key).map(str::to_string);
        let kernel_ids = record.get(keys::PRODUCT).and_then(parse_product);

        Some(Self {
            action: field(keys::ACTION),
            vendor_id: field(keys::ID_VENDOR_ID)
                .or_else(|| kernel_ids.as_ref().map(|(v, _)| v.clone())),
            product_id: field(keys::ID_MODEL_ID)
                .or_else(|| kernel_ids.as_ref().map(|(_, p)| p.clone())),
            manufacturer: field(keys::ID_VENDOR),
            product: field(keys::ID_MODEL),
            devpath: field(keys::DEVPATH),
        })
    }

    /// Descriptor for printing, if all four identity fields are present
    pub fn descriptor(&self) -> Option<DeviceDescriptor> {
        Some(DeviceDescriptor {
            vendor_id: self.vendor_id.clone()?,
            product_id: self.product_id.clone()?,
            manufacturer: Some(self.manufacturer.clone()?),
            product: Some(self.product.clone()?),
            device_class: None,
            devnode: None,
            syspath: self.devpath.clone(),
        })
    }
}

/// Split `PRODUCT=<vid>/<pid>/<bcd>` into zero-padded lowercase IDs
fn parse_product(value: &str) -> Option<(String, String)> {
    let mut parts = value.split('/');
    let vendor = u16::from_str_radix(parts.next()?, 16).ok()?;
    let product = u16::from_str_radix(parts.next()?, 16).ok()?;
    Some((format!("{:04x}", vendor), format!("{:04x}", product)))
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Report<'a> {
    Event(&'a UsbEvent),
    Device(&'a DeviceDescriptor),
}

/// Handler printing USB hotplug events and the refreshed inventory
pub struct UsbInventoryHandler<D, W> {
    enumerator: DeviceEnumerator<D>,
    out: W,
    format: OutputFormat,
}

impl<D: DeviceDatabase, W: Write> UsbInventoryHandler<D, W> {
    pub fn new(database: D, out: W, format: OutputFormat) -> Self {
        Self {
            enumerator: DeviceEnumerator::new(database),
            out,
            format,
        }
    }

    /// Print the startup listing of already attached devices
    pub fn list_existing(&mut self) -> Result<usize> {
        if self.format == OutputFormat::Text {
            writeln!(self.out, "Listing existing USB devices...")?;
        }
        self.list_inventory()
    }

    /// Re-enumerate USB devices and print every complete one
    pub fn list_inventory(&mut self) -> Result<usize> {
        let devices = self
            .enumerator
            .usb_inventory()
            .context("Failed to enumerate USB devices")?;

        for device in &devices {
            self.emit(Report::Device(device))?;
        }
        self.out.flush()?;
        Ok(devices.len())
    }

    pub fn into_output(self) -> W {
        self.out
    }

    fn report_event(&mut self, event: &UsbEvent) -> Result<()> {
        match self.format {
            OutputFormat::Json => self.emit(Report::Event(event)),
            OutputFormat::Text => {
                if let Some(action) = &event.action {
                    writeln!(self.out, "USB Device Event: {}", action)?;
                }
                if let Some(device) = event.descriptor() {
                    self.emit(Report::Device(&device))?;
                }
                Ok(())
            }
        }
    }

    fn emit(&mut self, report: Report<'_>) -> Result<()> {
        match (self.format, report) {
            (OutputFormat::Json, report) => {
                serde_json::to_writer(&mut self.out, &report)?;
                writeln!(self.out)?;
            }
            (OutputFormat::Text, Report::Device(device)) => writeln!(self.out, "{}", device)?,
            (OutputFormat::Text, Report::Event(_)) => {}
        }
        Ok(())
    }
}

impl<D: DeviceDatabase, W: Write> UeventHandler for UsbInventoryHandler<D, W> {
    fn handle(&mut self, record: &UeventRecord) -> Result<()> {
        let Some(event) = UsbEvent::from_record(record) else {
            trace!("Ignoring {:?} event", record.subsystem());
            return Ok(());
        };

        info!(
            "USB {} {}",
            event.action.as_deref().unwrap_or("event"),
            event.devpath.as_deref().unwrap_or("")
        );

        self.report_event(&event)?;
        self.list_inventory()?;
        Ok(())
    }
}
