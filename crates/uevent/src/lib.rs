//! Kernel uevent records for usb-hotplug
//!
//! This crate decodes the payload of `NETLINK_KOBJECT_UEVENT` messages into
//! key/value records. It performs no I/O: the bytes come from the monitor's
//! netlink socket (or from a test fixture) and the resulting record is handed
//! to whatever handler is interested in it.
//!
//! # Wire format
//!
//! One message carries one event. The payload is a sequence of NUL-terminated
//! ASCII strings, the first of which is the `action@devpath` header followed
//! by `KEY=VALUE` pairs. There is no count or length field besides the length
//! of the received datagram.
//!
//! # Example
//!
//! ```
//! use uevent::{Action, parse_uevent};
//!
//! let raw = b"add@/devices/pci0000:00/usb1/1-1\0ACTION=add\0SUBSYSTEM=usb\0SEQNUM=4711\0";
//! let record = parse_uevent(raw);
//!
//! assert_eq!(record.action(), Some(Action::Add));
//! assert_eq!(record.subsystem(), Some("usb"));
//! assert_eq!(record.seqnum(), Some(4711));
//! ```

pub mod action;
pub mod error;
pub mod keys;
pub mod parser;
pub mod record;

pub use action::Action;
pub use error::UeventError;
pub use parser::{UEVENT_BUFFER_SIZE, parse_uevent};
pub use record::UeventRecord;
