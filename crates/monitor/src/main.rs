//! usb-hotplug Monitor
//!
//! Listens for kernel USB hotplug events on a Linux host and prints the
//! affected device together with a fresh inventory of attached USB devices.

mod config;
mod hotplug;

use anyhow::{Context, Result};
use clap::Parser;
use common::{ShutdownToken, SystemDatabase, setup_logging};
use config::{MonitorConfig, OutputFormat};
use hotplug::{DispatchStats, EventDispatcher, EventSource, UeventHandler, UsbInventoryHandler};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "usb-monitor")]
#[command(author, version, about = "USB Monitor - Watch USB hotplug events")]
#[command(long_about = "
Watches kernel uevents and reports USB devices as they are attached and
removed. Every USB event is followed by a fresh listing of all attached USB
devices that report vendor, product, manufacturer and product strings.

EXAMPLES:
    # Watch with default settings
    usb-monitor

    # Emit JSON lines for other tools
    usb-monitor --json

    # Run with debug logging
    usb-monitor --log-level debug
")]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Longest single wait for events, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = MonitorConfig::DEFAULT_POLL_INTERVAL_MS)]
    poll_interval_ms: u64,

    /// Print JSON lines instead of text blocks
    #[arg(long)]
    json: bool,

    /// Do not list already attached devices at startup
    #[arg(long)]
    no_initial_list: bool,

    /// Read this sysfs tree directly instead of asking libudev
    #[arg(long, value_name = "PATH", hide = true)]
    sysfs_root: Option<PathBuf>,

    /// udev runtime data directory for the sysfs reader
    #[arg(long, value_name = "PATH", hide = true)]
    udev_data: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> MonitorConfig {
        let defaults = MonitorConfig::default();
        MonitorConfig {
            log_level: self.log_level.unwrap_or(defaults.log_level),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            output: if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            },
            initial_list: !self.no_initial_list,
            sysfs_root: self.sysfs_root,
            udev_data: self.udev_data,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Args::parse().into_config();
    config.validate().context("Invalid configuration")?;

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("usb-hotplug Monitor v{}", env!("CARGO_PKG_VERSION"));
    info!("Log level: {}", config.log_level);

    let database =
        SystemDatabase::select(config.sysfs_root.as_deref(), config.udev_data.as_deref());
    info!("Device database: {}", database.backend());
    let mut handler = UsbInventoryHandler::new(database, std::io::stdout(), config.output);

    if config.initial_list {
        let count = handler
            .list_existing()
            .context("Failed to list existing USB devices")?;
        info!("{} USB devices attached", count);
    }

    let source = hotplug::NetlinkEventSource::open().context("Failed to open uevent socket")?;
    let shutdown = ShutdownToken::new();
    let dispatcher = EventDispatcher::new(source, handler, shutdown.clone(), config.poll_interval);

    info!("Press Ctrl+C to shutdown");
    let stats = supervise(dispatcher, shutdown, signal::ctrl_c()).await?;

    info!("Monitor stopped after {} events", stats.events);
    Ok(())
}

/// Run the reactor on a blocking thread until it fails or `stop` resolves
///
/// On `stop` the shutdown token is cancelled and the reactor is awaited, so
/// the event source is always closed before this returns.
async fn supervise<S, H>(
    dispatcher: EventDispatcher<S, H>,
    shutdown: ShutdownToken,
    stop: impl Future<Output = std::io::Result<()>>,
) -> Result<DispatchStats>
where
    S: EventSource + Send + 'static,
    H: UeventHandler + Send + 'static,
{
    let mut reactor = tokio::task::spawn_blocking(move || dispatcher.run());

    tokio::select! {
        result = &mut reactor => {
            let stats = result.context("Reactor thread panicked")??;
            Ok(stats)
        }
        signal = stop => {
            match signal {
                Ok(()) => info!("Received Ctrl+C, shutting down gracefully..."),
                Err(e) => error!("Error waiting for Ctrl+C: {}", e),
            }
            shutdown.cancel();
            let stats = reactor.await.context("Reactor thread panicked")??;
            Ok(stats)
        }
    }
}
