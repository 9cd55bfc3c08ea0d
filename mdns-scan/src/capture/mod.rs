//! The capture engine: one blocking worker per address family, fanned into a
//! single event stream that [`Scanner::run`] dispatches.
//!
//! Shutdown is ordered. The stop channel is closed first, then a task starts
//! draining the event stream so a worker blocked on a full channel can finish
//! its send, then every worker is joined, and only then is the stream closed.


mod worker;

use std::fmt;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::{JoinError, JoinSet};
use tokio::time::{Instant, sleep_until};

use shared::error::{Error, Result, flatten_errs};
use shared::ifaces::Interface;

use crate::config::ScanConfig;
use crate::transport::{AddressFamily, SocketBinder, TransportBinder};
use worker::CaptureWorker;

pub use worker::{DatagramEvent, WorkerStats};

const FAMILIES: [AddressFamily; 2] = [AddressFamily::Ipv4, AddressFamily::Ipv6];

/// Why a run ended.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The external stop channel fired or was closed.
    Interrupted,
    /// The configured timeout elapsed.
    Deadline,
    /// Every worker exited on its own.
    WorkersExited,
    /// A worker hit a hard socket error.
    WorkerFailed,
    /// There was no interface to capture on.
    #[default]
    NoInterfaces,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Interrupted => "interrupted",
            StopReason::Deadline => "timeout",
            StopReason::WorkersExited => "all workers exited",
            StopReason::WorkerFailed => "worker failed",
            StopReason::NoInterfaces => "no suitable network interfaces",
        };
        write!(f, "{s}")
    }
}

/// What a finished run observed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ScanSummary {
    pub stop_reason: StopReason,
    /// Events handed to the callback
    pub events: u64,
    /// Events drained and discarded during shutdown
    pub discarded: u64,
    pub ipv4: WorkerStats,
    pub ipv6: WorkerStats,
}

impl ScanSummary {
    fn record(&mut self, family: AddressFamily, stats: WorkerStats) {
        match family {
            AddressFamily::Ipv4 => self.ipv4 = stats,
            AddressFamily::Ipv6 => self.ipv6 = stats,
        }
    }
}

type WorkerExit = (AddressFamily, Result<WorkerStats>);

/// Drives a capture run over a fixed candidate interface set.
///
/// ```rust,ignore
/// use mdns_scan::{Scanner, ScanConfig};
/// use tokio::sync::broadcast;
///
/// let (stop_tx, stop_rx) = broadcast::channel::<()>(1);
/// let scanner = Scanner::new(ScanConfig::default())?;
/// let summary = scanner
///     .run(stop_rx, |event| println!("{}\n{}", event.transport, event.message))
///     .await?;
/// ```
pub struct Scanner {
    config: ScanConfig,
    interfaces: Vec<Interface>,
}

impl Scanner {
    /// Resolves the configured interface selection against the system.
    ///
    /// Fails when an explicitly named interface does not exist.
    pub fn new(config: ScanConfig) -> Result<Self> {
        let interfaces = config.interfaces.resolve()?;
        Ok(Self::with_interfaces(config, interfaces))
    }

    /// Uses `interfaces` as the candidate set as is.
    pub fn with_interfaces(config: ScanConfig, interfaces: Vec<Interface>) -> Self {
        Self { config, interfaces }
    }

    pub fn interfaces(&self) -> &[Interface] {
        &self.interfaces
    }

    /// Captures on real sockets until stopped. See [`Scanner::run_with_binder`].
    pub async fn run<F>(self, stop_rx: broadcast::Receiver<()>, on_event: F) -> Result<ScanSummary>
    where
        F: FnMut(DatagramEvent),
    {
        let binder = Arc::new(SocketBinder::new(self.config.read_timeout));
        self.run_with_binder(binder, stop_rx, on_event).await
    }

    /// Captures on transports from `binder`, calling `on_event` for every
    /// decoded message, until a message arrives on `stop_rx` (or its sender is
    /// dropped), the timeout elapses, or every worker has exited.
    ///
    /// A hard socket error in a worker ends the run; the error is returned
    /// once shutdown has completed.
    pub async fn run_with_binder<F>(
        self,
        binder: Arc<dyn TransportBinder>,
        mut stop_rx: broadcast::Receiver<()>,
        mut on_event: F,
    ) -> Result<ScanSummary>
    where
        F: FnMut(DatagramEvent),
    {
        let mut summary = ScanSummary::default();
        if self.interfaces.is_empty() {
            log::warn!("{}", Error::ErrNoInterface);
            return Ok(summary);
        }

        let (stop_tx, _) = broadcast::channel::<()>(1);
        let (events_tx, mut events_rx) = mpsc::channel(self.config.event_queue_size);

        let mut workers: JoinSet<WorkerExit> = JoinSet::new();
        for family in FAMILIES {
            let worker = CaptureWorker::new(family, self.interfaces.clone(), &self.config);
            let binder = Arc::clone(&binder);
            let stop_rx = stop_tx.subscribe();
            let events_tx = events_tx.clone();
            workers.spawn_blocking(move || (family, worker.run(binder.as_ref(), stop_rx, events_tx)));
        }

        let deadline = self.config.timeout.map(|timeout| Instant::now() + timeout);
        let mut errs = Vec::new();

        summary.stop_reason = loop {
            tokio::select! {
                biased;

                _ = stop_rx.recv() => break StopReason::Interrupted,
                _ = sleep_until_opt(deadline) => break StopReason::Deadline,
                Some(event) = events_rx.recv() => {
                    summary.events += 1;
                    on_event(event);
                }
                exit = workers.join_next() => match exit {
                    Some(exit) => {
                        if !record_exit(exit, &mut summary, &mut errs) {
                            break StopReason::WorkerFailed;
                        }
                    }
                    None => break StopReason::WorkersExited,
                },
            }
        };
        log::info!("stopping capture: {}", summary.stop_reason);

        // 1. broadcast stop
        drop(stop_tx);

        // 2. keep the stream moving so no worker blocks mid-send
        let drain = tokio::spawn(async move {
            let mut discarded = 0;
            while events_rx.recv().await.is_some() {
                discarded += 1;
            }
            discarded
        });

        // 3. join every worker
        while let Some(exit) = workers.join_next().await {
            record_exit(exit, &mut summary, &mut errs);
        }

        // 4. close the stream
        drop(events_tx);
        summary.discarded = drain
            .await
            .map_err(|err| Error::Other(format!("event drain task failed: {err}")))?;
        log::debug!(
            "capture stopped: {} events, {} discarded",
            summary.events,
            summary.discarded
        );

        if errs.len() == 1 {
            return Err(errs.remove(0));
        }
        flatten_errs(errs)?;
        Ok(summary)
    }
}

// record_exit stores a finished worker's stats, returning false when it failed.
fn record_exit(
    exit: std::result::Result<WorkerExit, JoinError>,
    summary: &mut ScanSummary,
    errs: &mut Vec<Error>,
) -> bool {
    match exit {
        Ok((family, Ok(stats))) => {
            log::debug!("{family} worker exited: {stats:?}");
            summary.record(family, stats);
            true
        }
        Ok((family, Err(err))) => {
            log::error!("{family} worker failed: {err}");
            errs.push(err);
            false
        }
        Err(err) => {
            log::error!("capture worker panicked: {err}");
            errs.push(Error::Other(err.to_string()));
            false
        }
    }
}

async fn sleep_until_opt(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
