//! Uevent payload parser
//!
//! Splits a received datagram on NUL boundaries and each fragment on its
//! first `=`. Fragments without `=` (such as the `add@/devices/...` header)
//! are dropped. A key that appears twice keeps its last value.

use crate::record::UeventRecord;

/// Largest datagram read from the uevent socket in one receive
pub const UEVENT_BUFFER_SIZE: usize = 2048;

/// Parse a raw uevent payload into a record
///
/// Never fails: malformed fragments are skipped and non-UTF-8 bytes are
/// replaced. A trailing fragment that is missing its NUL terminator is still
/// parsed.
pub fn parse_uevent(buf: &[u8]) -> UeventRecord {
    let mut record = UeventRecord::new();

    for fragment in buf.split(|&b| b == 0) {
        if fragment.is_empty() {
            continue;
        }

        let Some(eq) = fragment.iter().position(|&b| b == b'=') else {
            continue;
        };

        let key = String::from_utf8_lossy(&fragment[..eq]);
        let value = String::from_utf8_lossy(&fragment[eq + 1..]);
        record.insert(key, value);
    }

    record
}
