//! Uevent reactor loop
//!
//! Waits on an [`EventSource`], parses each datagram and invokes the single
//! registered [`UeventHandler`]. The handler runs synchronously on the
//! reactor thread, so a handler that blocks stalls event processing.
//!
//! Failure policy:
//! - a multiplexer failure ends the loop with a fatal error
//! - a failed receive drops that one event
//! - a handler error or panic is contained to that one event
//!
//! The loop checks its [`ShutdownToken`] before every wait, so cancellation
//! takes effect within one poll interval.

use common::{Error, Result, Severity, ShutdownToken};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;
use tracing::{debug, error, info, trace, warn};
use uevent::{UeventRecord, parse_uevent};

/// Readiness-based source of raw uevent payloads
pub trait EventSource {
    /// Wait up to `timeout` for the next event and read it
    ///
    /// `Ok(None)` means the wait timed out. A [`Severity::Transient`] error
    /// loses one event and the source stays usable; any other error means
    /// the source is broken.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<&[u8]>>;
}

/// Receiver of parsed uevents
///
/// Implemented for any `FnMut(&UeventRecord) -> anyhow::Result<()>`.
pub trait UeventHandler {
    fn handle(&mut self, record: &UeventRecord) -> anyhow::Result<()>;
}

impl<F> UeventHandler for F
where
    F: FnMut(&UeventRecord) -> anyhow::Result<()>,
{
    fn handle(&mut self, record: &UeventRecord) -> anyhow::Result<()> {
        self(record)
    }
}

/// Counters reported when the reactor stops
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Events parsed and passed to the handler
    pub events: u64,
    /// Receives that failed and were dropped
    pub read_failures: u64,
    /// Handler invocations that returned an error or panicked
    pub handler_failures: u64,
}

pub struct EventDispatcher<S, H> {
    source: S,
    handler: H,
    shutdown: ShutdownToken,
    poll_interval: Duration,
    stats: DispatchStats,
}

impl<S: EventSource, H: UeventHandler> EventDispatcher<S, H> {
    pub fn new(source: S, handler: H, shutdown: ShutdownToken, poll_interval: Duration) -> Self {
        Self {
            source,
            handler,
            shutdown,
            poll_interval,
            stats: DispatchStats::default(),
        }
    }

    /// Run until cancelled or until the multiplexer fails
    ///
    /// The source and handler are dropped when this returns, on every path.
    pub fn run(mut self) -> Result<DispatchStats> {
        info!("Uevent reactor started");

        while !self.shutdown.is_cancelled() {
            let record = match self.source.next_event(self.poll_interval) {
                Ok(Some(buf)) => parse_uevent(buf),
                Ok(None) => continue,
                Err(e) if e.severity() == Severity::Transient => {
                    warn!("Dropping uevent: {}", e);
                    self.stats.read_failures += 1;
                    continue;
                }
                Err(e) => {
                    error!("Uevent source failed: {}", e);
                    return Err(e);
                }
            };

            self.dispatch(&record);
        }

        info!(
            "Uevent reactor stopped after {} events ({} dropped, {} handler failures)",
            self.stats.events, self.stats.read_failures, self.stats.handler_failures
        );
        Ok(self.stats)
    }

    fn dispatch(&mut self, record: &UeventRecord) {
        self.stats.events += 1;
        trace!(
            "uevent #{}: {:?} {:?}",
            self.stats.events,
            record.action(),
            record.devpath()
        );

        if let Err(e) = self.invoke_handler(record) {
            warn!("{}", e);
            self.stats.handler_failures += 1;
        }
    }

    /// Call the handler, converting errors and panics into transient errors
    fn invoke_handler(&mut self, record: &UeventRecord) -> Result<()> {
        let handler = &mut self.handler;

        match catch_unwind(AssertUnwindSafe(|| handler.handle(record))) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Handler(format!("{:#}", e))),
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                debug!("Handler panicked on {:?}", record.devpath());
                Err(Error::Handler(format!("panicked: {}", message)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotplug::testing::ScriptedSource;

    const USB_ADD: &[u8] = b"add@/devices/pci0000:00/usb1/1-1\0ACTION=add\0SUBSYSTEM=usb\0\
ID_VENDOR_ID=0403\0ID_MODEL_ID=6001\0ID_VENDOR=FTDI\0ID_MODEL=FT232R\0";

    const BLOCK_ADD: &[u8] = b"ACTION=add\0SUBSYSTEM=block\0DEVNAME=sda\0";

    fn run_with<H: UeventHandler>(source: ScriptedSource, handler: H) -> DispatchStats {
        let shutdown = source.shutdown_token();
        EventDispatcher::new(source, handler, shutdown, Duration::from_millis(1))
            .run()
            .unwrap()
    }

    #[test]
    fn test_single_event_reaches_handler_once() {
        let mut seen = Vec::new();
        let handler = |record: &UeventRecord| -> anyhow::Result<()> {
            seen.push(record.clone());
            Ok(())
        };

        let stats = run_with(ScriptedSource::new().with_event(USB_ADD), handler);

        assert_eq!(stats.events, 1);
        assert_eq!(seen.len(), 1);
        let record = &seen[0];
        assert_eq!(record.get("ACTION"), Some("add"));
        assert_eq!(record.get("ID_VENDOR_ID"), Some("0403"));
        assert_eq!(record.get("ID_MODEL_ID"), Some("6001"));
        assert_eq!(record.get("ID_VENDOR"), Some("FTDI"));
        assert_eq!(record.get("ID_MODEL"), Some("FT232R"));
    }

    #[test]
    fn test_dispatcher_never_filters() {
        let mut subsystems = Vec::new();
        let handler = |record: &UeventRecord| -> anyhow::Result<()> {
            subsystems.push(record.subsystem().unwrap_or_default().to_string());
            Ok(())
        };

        run_with(
            ScriptedSource::new().with_event(BLOCK_ADD).with_event(USB_ADD),
            handler,
        );

        assert_eq!(subsystems, vec!["block", "usb"]);
    }

    #[test]
    fn test_receive_failure_is_soft() {
        let mut count = 0;
        let handler = |_: &UeventRecord| -> anyhow::Result<()> {
            count += 1;
            Ok(())
        };

        let stats = run_with(
            ScriptedSource::new()
                .with_receive_error()
                .with_event(USB_ADD),
            handler,
        );

        assert_eq!(stats.read_failures, 1);
        assert_eq!(stats.events, 1);
        assert_eq!(count, 1);
    }

    #[test]
    fn test_handler_error_and_panic_are_contained() {
        let mut calls = 0;
        let handler = |record: &UeventRecord| -> anyhow::Result<()> {
            calls += 1;
            match record.subsystem() {
                Some("block") => anyhow::bail!("cannot handle block devices"),
                Some("usb") if calls == 2 => panic!("handler bug"),
                _ => Ok(()),
            }
        };

        let stats = run_with(
            ScriptedSource::new()
                .with_event(BLOCK_ADD)
                .with_event(USB_ADD)
                .with_event(USB_ADD),
            handler,
        );

        assert_eq!(calls, 3);
        assert_eq!(stats.events, 3);
        assert_eq!(stats.handler_failures, 2);
    }

    #[test]
    fn test_multiplexer_failure_is_fatal() {
        let shutdown = ShutdownToken::new();
        let source = ScriptedSource::new().with_event(USB_ADD).failing_after_events();
        let handler = |_: &UeventRecord| -> anyhow::Result<()> { Ok(()) };

        let err = EventDispatcher::new(source, handler, shutdown, Duration::from_millis(1))
            .run()
            .unwrap_err();

        assert_eq!(err.severity(), Severity::Fatal);
    }

    #[test]
    fn test_cancelled_before_start_reads_nothing() {
        let source = ScriptedSource::new().with_event(USB_ADD);
        let shutdown = source.shutdown_token();
        shutdown.cancel();

        let mut count = 0;
        let handler = |_: &UeventRecord| -> anyhow::Result<()> {
            count += 1;
            Ok(())
        };

        let stats = EventDispatcher::new(source, handler, shutdown, Duration::from_millis(1))
            .run()
            .unwrap();

        assert_eq!(stats, DispatchStats::default());
        assert_eq!(count, 0);
    }
}
