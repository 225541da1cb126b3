//! Kernel uevent socket
//!
//! Opens a `NETLINK_KOBJECT_UEVENT` socket bound to the kernel's hotplug
//! multicast group and watches it with a dedicated epoll instance.

use crate::hotplug::dispatcher::EventSource;
use common::{Error, Result};
use nix::errno::Errno;
use nix::sys::epoll::{Epoll, EpollCreateFlags, EpollEvent, EpollFlags, EpollTimeout};
use nix::sys::socket::{
    AddressFamily, MsgFlags, NetlinkAddr, SockFlag, SockProtocol, SockType, bind, recv, socket,
};
use nix::unistd::getpid;
use std::os::fd::{AsRawFd, OwnedFd};
use std::time::Duration;
use tracing::{debug, info, trace};
use uevent::UEVENT_BUFFER_SIZE;

/// Multicast group the kernel publishes uevents on
const KERNEL_UEVENT_GROUP: u32 = 1;

/// epoll token identifying the uevent socket
const SOCKET_TOKEN: u64 = 1;

/// Owner of the uevent socket and the multiplexer watching it
///
/// Field order matters: `epoll` is declared first so it is closed before the
/// socket it watches, the reverse of acquisition order.
pub struct NetlinkEventSource {
    epoll: Epoll,
    socket: OwnedFd,
    buffer: [u8; UEVENT_BUFFER_SIZE],
}

impl NetlinkEventSource {
    /// Open and bind the uevent socket and register it with epoll
    ///
    /// Any failure is fatal. Handles acquired before the failing step are
    /// closed on return.
    pub fn open() -> Result<Self> {
        let socket = socket(
            AddressFamily::Netlink,
            SockType::Raw,
            SockFlag::SOCK_CLOEXEC | SockFlag::SOCK_NONBLOCK,
            SockProtocol::NetlinkKObjectUEvent,
        )
        .map_err(|e| Error::Socket(e.into()))?;

        let pid = getpid().as_raw() as u32;
        let addr = NetlinkAddr::new(pid, KERNEL_UEVENT_GROUP);
        bind(socket.as_raw_fd(), &addr).map_err(|e| Error::Socket(e.into()))?;

        let epoll = Epoll::new(EpollCreateFlags::EPOLL_CLOEXEC)
            .map_err(|e| Error::Multiplexer(e.into()))?;
        epoll
            .add(&socket, EpollEvent::new(EpollFlags::EPOLLIN, SOCKET_TOKEN))
            .map_err(|e| Error::Multiplexer(e.into()))?;

        info!(
            "Listening for kernel uevents (pid {}, group {})",
            pid, KERNEL_UEVENT_GROUP
        );

        Ok(Self {
            epoll,
            socket,
            buffer: [0; UEVENT_BUFFER_SIZE],
        })
    }

    /// Wait up to `timeout` for the socket to become readable
    fn wait_readable(&self, timeout: Duration) -> Result<bool> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut events = [EpollEvent::empty(); 4];

        match self.epoll.wait(&mut events, EpollTimeout::from(millis)) {
            Ok(ready) => Ok(events[..ready]
                .iter()
                .any(|event| event.data() == SOCKET_TOKEN)),
            Err(Errno::EINTR) => {
                debug!("epoll wait interrupted");
                Ok(false)
            }
            Err(e) => Err(Error::Multiplexer(e.into())),
        }
    }
}

impl EventSource for NetlinkEventSource {
    /// One epoll wait followed by at most one bounded receive
    fn next_event(&mut self, timeout: Duration) -> Result<Option<&[u8]>> {
        if !self.wait_readable(timeout)? {
            return Ok(None);
        }

        let len = recv(self.socket.as_raw_fd(), &mut self.buffer, MsgFlags::empty())
            .map_err(|e| Error::Receive(e.into()))?;
        trace!("Received {} byte uevent", len);
        Ok(Some(&self.buffer[..len]))
    }
}

impl Drop for NetlinkEventSource {
    fn drop(&mut self) {
        debug!("Closing uevent multiplexer and socket");
    }
}
