//! Benchmarks for uevent parsing
//!
//! Measures parsing of realistic kernel payloads:
//! - A short `remove` event
//! - A full USB `add` event with udev properties
//! - A payload padded to the receive buffer size

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use uevent::{UEVENT_BUFFER_SIZE, parse_uevent};

const REMOVE_EVENT: &[u8] = b"remove@/devices/pci0000:00/0000:00:14.0/usb1/1-2\0\
ACTION=remove\0DEVPATH=/devices/pci0000:00/0000:00:14.0/usb1/1-2\0SUBSYSTEM=usb\0SEQNUM=4180\0";

const ADD_EVENT: &[u8] = b"add@/devices/pci0000:00/0000:00:14.0/usb1/1-2\0\
ACTION=add\0DEVPATH=/devices/pci0000:00/0000:00:14.0/usb1/1-2\0SUBSYSTEM=usb\0\
MAJOR=189\0MINOR=1\0DEVNAME=bus/usb/001/002\0DEVTYPE=usb_device\0\
PRODUCT=403/6001/600\0TYPE=0/0/0\0BUSNUM=001\0DEVNUM=002\0SEQNUM=4179\0\
ID_VENDOR_ID=0403\0ID_MODEL_ID=6001\0ID_VENDOR=FTDI\0ID_MODEL=FT232R_USB_UART\0";

fn padded_event() -> Vec<u8> {
    let mut buf = Vec::with_capacity(UEVENT_BUFFER_SIZE);
    let mut i = 0;
    while buf.len() + 32 < UEVENT_BUFFER_SIZE {
        buf.extend_from_slice(format!("KEY_{:04}=value-{:04}\0", i, i).as_bytes());
        i += 1;
    }
    buf
}

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_uevent");
    let padded = padded_event();

    for (name, payload) in [
        ("remove", REMOVE_EVENT),
        ("usb_add", ADD_EVENT),
        ("full_buffer", padded.as_slice()),
    ] {
        group.throughput(Throughput::Bytes(payload.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), payload, |b, payload| {
            b.iter(|| parse_uevent(black_box(payload)))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_parse);
criterion_main!(benches);
