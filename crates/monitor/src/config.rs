//! Monitor runtime configuration
//!
//! The monitor reads no configuration files; everything comes from the
//! command line and falls back to the defaults below.

use anyhow::{Result, anyhow};
use std::path::PathBuf;
use std::time::Duration;

/// How reports are written to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable device blocks
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub log_level: String,
    /// Longest single multiplexer wait; bounds shutdown latency
    pub poll_interval: Duration,
    pub output: OutputFormat,
    /// Print already attached devices before listening
    pub initial_list: bool,
    /// Read this sysfs tree instead of asking libudev
    pub sysfs_root: Option<PathBuf>,
    pub udev_data: Option<PathBuf>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            poll_interval: Duration::from_millis(Self::DEFAULT_POLL_INTERVAL_MS),
            output: OutputFormat::Text,
            initial_list: true,
            sysfs_root: None,
            udev_data: None,
        }
    }
}

impl MonitorConfig {
    pub const DEFAULT_POLL_INTERVAL_MS: u64 = 100;
    pub const MAX_POLL_INTERVAL_MS: u64 = 60_000;

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let millis = self.poll_interval.as_millis();
        if millis == 0 || millis > u128::from(Self::MAX_POLL_INTERVAL_MS) {
            return Err(anyhow!(
                "Poll interval must be between 1 and {} ms, got {} ms",
                Self::MAX_POLL_INTERVAL_MS,
                millis
            ));
        }

        if self.log_level.trim().is_empty() {
            return Err(anyhow!("Log level must not be empty"));
        }

        Ok(())
    }
}
