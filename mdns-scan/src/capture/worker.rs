use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::mpsc;

use shared::error::Result;
use shared::ifaces::Interface;
use shared::{TransportContext, TransportMessage};

use crate::config::ScanConfig;
use crate::message::Message;
use crate::transport::{AddressFamily, MulticastTransport, Received, TransportBinder};

/// A decoded mDNS message together with where it came from.
pub type DatagramEvent = TransportMessage<Message>;

/// Lifecycle of a [`CaptureWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WorkerState {
    Initializing,
    Joining,
    Listening,
    Closed,
}

/// Counters one worker reports when it exits.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerStats {
    /// Datagrams read off the socket
    pub received: u64,
    /// Datagrams decoded and emitted
    pub accepted: u64,
    /// Datagrams not addressed to the group
    pub filtered: u64,
    /// Datagrams that failed to decode
    pub malformed: u64,
    /// Interfaces the group was joined on
    pub joined: usize,
}

// Group memberships held on a transport. Dropping it leaves every group and
// then closes the socket.
struct Membership {
    transport: Box<dyn MulticastTransport>,
    group: IpAddr,
    joined: Vec<Interface>,
}

impl Drop for Membership {
    fn drop(&mut self) {
        for iface in self.joined.drain(..) {
            if let Err(err) = self.transport.leave_group(&iface, self.group) {
                log::debug!("leave {} on {}: {err}", self.group, iface.name);
            }
        }
    }
}

/// Captures one address family on every candidate interface.
pub(crate) struct CaptureWorker {
    family: AddressFamily,
    group: IpAddr,
    interfaces: Vec<Interface>,
    read_timeout: Duration,
    recv_buffer_size: usize,
    state: WorkerState,
    stats: WorkerStats,
}

impl CaptureWorker {
    pub(crate) fn new(family: AddressFamily, interfaces: Vec<Interface>, config: &ScanConfig) -> Self {
        Self {
            family,
            group: family.group(),
            interfaces,
            read_timeout: config.read_timeout,
            recv_buffer_size: config.recv_buffer_size,
            state: WorkerState::Initializing,
            stats: WorkerStats::default(),
        }
    }

    fn set_state(&mut self, state: WorkerState) {
        log::debug!("{} worker: {:?} -> {:?}", self.family, self.state, state);
        self.state = state;
    }

    /// Runs until `stop_rx` fires or its sender is dropped, the event channel
    /// closes, or the socket reports a hard error.
    ///
    /// Blocks the calling thread. Failing to bind or to join any interface is
    /// logged and ends the worker with `Ok`.
    pub(crate) fn run(
        mut self,
        binder: &dyn TransportBinder,
        mut stop_rx: broadcast::Receiver<()>,
        events_tx: mpsc::Sender<DatagramEvent>,
    ) -> Result<WorkerStats> {
        let result = self.capture(binder, &mut stop_rx, &events_tx);
        self.set_state(WorkerState::Closed);
        result.map(|_| self.stats)
    }

    fn capture(
        &mut self,
        binder: &dyn TransportBinder,
        stop_rx: &mut broadcast::Receiver<()>,
        events_tx: &mpsc::Sender<DatagramEvent>,
    ) -> Result<()> {
        let transport = match binder.bind(self.family) {
            Ok(transport) => transport,
            Err(err) => {
                log::warn!("unable to bind {} mDNS socket: {err}", self.family);
                return Ok(());
            }
        };

        self.set_state(WorkerState::Joining);
        let mut membership = self.join_all(transport);
        self.stats.joined = membership.joined.len();
        if membership.joined.is_empty() {
            log::warn!(
                "unable to join group {} on any of the specified interfaces",
                self.group
            );
            return Ok(());
        }

        self.set_state(WorkerState::Listening);
        self.listen(&mut membership, stop_rx, events_tx)
    }

    fn join_all(&self, mut transport: Box<dyn MulticastTransport>) -> Membership {
        let mut joined = Vec::with_capacity(self.interfaces.len());
        for iface in &self.interfaces {
            log::info!(
                "joining group {} on {} (index={} flags={})",
                self.group,
                iface.name,
                iface.index,
                iface.flags()
            );
            match transport.join_group(iface, self.group) {
                Ok(()) => joined.push(iface.clone()),
                Err(err) => log::warn!(
                    "unable to join group {} on interface {}; ignoring: {err}",
                    self.group,
                    iface.name
                ),
            }
        }
        Membership {
            transport,
            group: self.group,
            joined,
        }
    }

    fn listen(
        &mut self,
        membership: &mut Membership,
        stop_rx: &mut broadcast::Receiver<()>,
        events_tx: &mpsc::Sender<DatagramEvent>,
    ) -> Result<()> {
        let mut buf = vec![0u8; self.recv_buffer_size];

        loop {
            match stop_rx.try_recv() {
                Err(TryRecvError::Empty) => {}
                _ => {
                    log::debug!("{} worker: stop requested", self.family);
                    return Ok(());
                }
            }

            membership
                .transport
                .set_read_deadline(Instant::now() + self.read_timeout)?;
            let received = match membership.transport.receive(&mut buf) {
                Ok(received) => received,
                Err(err) if err.is_timeout() => continue,
                Err(err) => {
                    log::error!("{} receive failed: {err}", self.family);
                    return Err(err);
                }
            };
            self.stats.received += 1;

            let Some(event) = self.accept(&buf, received) else {
                continue;
            };
            if events_tx.blocking_send(event).is_err() {
                log::debug!("{} worker: event channel closed", self.family);
                return Ok(());
            }
        }
    }

    // accept filters and decodes one datagram, updating the counters.
    fn accept(&mut self, buf: &[u8], received: Received) -> Option<DatagramEvent> {
        let dst_ip = match received.dst_ip {
            Some(ip) if ip.is_multicast() && ip == self.group => ip,
            dst => {
                self.stats.filtered += 1;
                log::trace!(
                    "dropping datagram from {} to {dst:?}: not for group {}",
                    received.peer_addr,
                    self.group
                );
                return None;
            }
        };

        let payload = &buf[..received.len.min(buf.len())];
        let message = match Message::decode(payload) {
            Ok(message) => message,
            Err(err) => {
                self.stats.malformed += 1;
                log::warn!(
                    "dropping malformed message ({} bytes) from {}: {err}",
                    payload.len(),
                    received.peer_addr
                );
                return None;
            }
        };
        self.stats.accepted += 1;

        Some(TransportMessage {
            now: Instant::now(),
            transport: TransportContext {
                interface: self.interface_name(received.if_index),
                peer_addr: received.peer_addr,
                src_ip: received.src_ip(),
                dst_ip,
            },
            message,
        })
    }

    fn interface_name(&self, if_index: Option<u32>) -> String {
        match if_index {
            Some(index) => self
                .interfaces
                .iter()
                .find(|iface| iface.index == index)
                .map_or_else(|| format!("#{index}"), |iface| iface.name.clone()),
            None => String::from("?"),
        }
    }
}
