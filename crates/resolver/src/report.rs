//! Console rendering of resolution records

use anyhow::Result;
use common::Resolution;
use common::usb_types::SEPARATOR;
use std::io::Write;

/// Report style selected on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

pub fn write_header(out: &mut impl Write, format: Format, vendor_id: &str, product_id: &str) -> Result<()> {
    if format == Format::Text {
        writeln!(
            out,
            "Searching for USB device with Vendor ID: {} and Product ID: {}",
            vendor_id, product_id
        )?;
    }
    Ok(())
}

pub fn write_resolution(out: &mut impl Write, format: Format, resolution: &Resolution) -> Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *out, resolution)?;
            writeln!(out)?;
        }
        Format::Text => write_text(out, resolution)?,
    }
    Ok(())
}

fn write_text(out: &mut impl Write, resolution: &Resolution) -> Result<()> {
    let device = &resolution.device;

    writeln!(out, "Found matching USB device!")?;
    match &device.devnode {
        Some(node) => writeln!(out, "Device Node under /dev: {}", node)?,
        None => writeln!(out, "No /dev node associated with this device.")?,
    }

    match (&device.device_class, resolution.class_description) {
        (Some(code), Some(description)) => {
            writeln!(out, "USB Device Class ({}): {}", code, description)?;
            for tty in &resolution.tty_nodes {
                writeln!(out, "Associated tty device: {}", tty)?;
            }
        }
        _ => writeln!(out, "No USB class information available.")?,
    }

    writeln!(out, "{}", SEPARATOR)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::DeviceDescriptor;

    fn resolution(class: Option<&str>, ttys: &[&str]) -> Resolution {
        Resolution {
            device: DeviceDescriptor {
                vendor_id: "2341".to_string(),
                product_id: "0043".to_string(),
                manufacturer: Some("Arduino (www.arduino.cc)".to_string()),
                product: None,
                device_class: class.map(str::to_string),
                devnode: Some("/dev/bus/usb/001/004".to_string()),
                syspath: Some("/sys/devices/pci0000:00/usb1/1-1".to_string()),
            },
            class_description: class.map(common::class::describe),
            tty_nodes: ttys.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn render(format: Format, resolution: &Resolution) -> String {
        let mut out = Vec::new();
        write_resolution(&mut out, format, resolution).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_with_tty() {
        let text = render(Format::Text, &resolution(Some("02"), &["/dev/ttyACM0"]));
        assert_eq!(
            text,
            "Found matching USB device!\n\
Device Node under /dev: /dev/bus/usb/001/004\n\
USB Device Class (02): Both: Communications and CDC Control\n\
Associated tty device: /dev/ttyACM0\n\
-----------------------\n"
        );
    }

    #[test]
    fn test_text_without_class_or_node() {
        let mut r = resolution(None, &[]);
        r.device.devnode = None;
        let text = render(Format::Text, &r);

        assert!(text.contains("No /dev node associated with this device.\n"));
        assert!(text.contains("No USB class information available.\n"));
    }

    #[test]
    fn test_unknown_class_is_still_printed() {
        let text = render(Format::Text, &resolution(Some("ef"), &[]));
        assert!(text.contains("USB Device Class (ef): Unknown USB class\n"));
    }

    #[test]
    fn test_json_line() {
        let text = render(Format::Json, &resolution(Some("02"), &["/dev/ttyACM0"]));
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).unwrap();

        assert_eq!(value["device"]["vendor_id"], "2341");
        assert_eq!(value["class_description"], "Both: Communications and CDC Control");
        assert_eq!(value["tty_nodes"][0], "/dev/ttyACM0");
    }

    #[test]
    fn test_header_only_in_text() {
        let mut out = Vec::new();
        write_header(&mut out, Format::Json, "0403", "6001").unwrap();
        assert!(out.is_empty());

        write_header(&mut out, Format::Text, "0403", "6001").unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Searching for USB device with Vendor ID: 0403 and Product ID: 6001\n"
        );
    }
}
