//! usb-hotplug Resolver
//!
//! Looks up attached USB devices by vendor and product ID and reports their
//! device node, class and, for communications devices, the tty nodes they
//! expose.

mod report;

use anyhow::{Context, Result};
use clap::Parser;
use clap::error::ErrorKind;
use common::{CompositeDeviceResolver, DeviceDatabase, SystemDatabase, setup_logging};
use report::Format;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error};

const USAGE: &str = "Usage: usb-resolve <Vendor ID> <Product ID>";

#[derive(Parser, Debug)]
#[command(name = "usb-resolve")]
#[command(author, version, about = "USB Resolver - Find a USB device and its tty nodes")]
#[command(override_usage = "usb-resolve [OPTIONS] <Vendor ID> <Product ID>")]
#[command(long_about = "
Finds attached USB devices with the given vendor and product ID, as the
kernel reports them in sysfs (lowercase hex, e.g. 2341 0043). For every
match the device node and class are printed; communications class devices
also list the tty devices they provide.

EXAMPLES:
    # Find an Arduino Uno and its serial port
    usb-resolve 2341 0043

    # Emit one JSON line per match
    usb-resolve --json 2341 0043
")]
struct Args {
    /// Vendor ID as printed in sysfs idVendor
    #[arg(value_name = "Vendor ID")]
    vendor_id: String,

    /// Product ID as printed in sysfs idProduct
    #[arg(value_name = "Product ID")]
    product_id: String,

    /// Print JSON lines instead of text blocks
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL", default_value = "warn")]
    log_level: String,

    /// Read this sysfs tree directly instead of asking libudev
    #[arg(long, value_name = "PATH", hide = true)]
    sysfs_root: Option<PathBuf>,

    /// udev runtime data directory for the sysfs reader
    #[arg(long, value_name = "PATH", hide = true)]
    udev_data: Option<PathBuf>,
}

impl Args {
    fn format(&self) -> Format {
        if self.json { Format::Json } else { Format::Text }
    }

    fn database(&self) -> SystemDatabase {
        SystemDatabase::select(self.sysfs_root.as_deref(), self.udev_data.as_deref())
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => return usage_error(e),
    };

    if let Err(e) = setup_logging(&args.log_level) {
        eprintln!("Failed to setup logging: {}", e);
        return ExitCode::FAILURE;
    }

    let database = args.database();
    debug!("Device database: {}", database.backend());

    let stdout = std::io::stdout();
    match run(&args, database, &mut stdout.lock()) {
        Ok(found) => {
            debug!("{} matching devices", found);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Help and version requests succeed; every other parse failure is a usage error
fn usage_error(e: clap::Error) -> ExitCode {
    if let Err(err) = e.print() {
        debug!("Failed to print argument error: {}", err);
    }
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
        _ => {
            eprintln!("{}", USAGE);
            ExitCode::FAILURE
        }
    }
}

/// Resolve the requested ID against `database` and report every match
///
/// Returns the number of matches. No match is not an error.
fn run<D: DeviceDatabase>(args: &Args, database: D, out: &mut impl Write) -> Result<usize> {
    let format = args.format();
    report::write_header(out, format, &args.vendor_id, &args.product_id)?;

    let resolver = CompositeDeviceResolver::new(database);
    let resolutions = resolver
        .resolve_id(&args.vendor_id, &args.product_id)
        .context("Failed to query USB devices")?;

    for resolution in &resolutions {
        report::write_resolution(out, format, resolution)?;
    }
    out.flush()?;

    Ok(resolutions.len())
}
