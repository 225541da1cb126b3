//! Hotplug subsystem
//!
//! Receives kernel uevents and hands them to a handler, one at a time.
//!
//! This module implements the monitor's event pipeline:
//! - The netlink source owning the uevent socket and its epoll instance
//! - The dispatcher loop that parses each datagram and calls the handler
//! - The USB inventory handler that reports hotplug activity
//!
//! The dispatcher runs on one dedicated blocking thread. Enumeration done by
//! the handler happens synchronously on that same thread.

pub mod dispatcher;
pub mod handler;
pub mod netlink;
#[cfg(test)]
pub(crate) mod testing;

pub use dispatcher::{DispatchStats, EventDispatcher, EventSource, UeventHandler};
pub use handler::UsbInventoryHandler;
pub use netlink::NetlinkEventSource;
