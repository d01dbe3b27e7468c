//! Session pollers - cancellable repeating tasks
//!
//! A poller never performs I/O itself. Each tick it emits a
//! `TimerEvent::Poll` tagged with the session epoch it was started for, and
//! the app actor decides whether that tick still issues a request.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::messages::{PollKind, TimerEvent};

/// Tick period of every session poller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollIntervals {
    pub frame: Duration,
    pub gesture: Duration,
    pub statistics: Duration,
}

impl PollIntervals {
    pub fn from_config(config: &ClientConfig) -> Self {
        PollIntervals {
            frame: config.frame_interval(),
            gesture: config.gesture_interval(),
            statistics: config.statistics_interval(),
        }
    }

    pub fn period(&self, kind: PollKind) -> Duration {
        match kind {
            PollKind::Frame => self.frame,
            PollKind::Gesture => self.gesture,
            PollKind::Statistics => self.statistics,
        }
    }
}

/// A running repeating task with an explicit stop handle
pub struct Poller {
    kind: PollKind,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Poller {
    pub fn spawn(
        kind: PollKind,
        epoch: u64,
        period: Duration,
        timer_tx: mpsc::UnboundedSender<TimerEvent>,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(kind, epoch, period, timer_tx, cancel.clone()));
        Poller {
            kind,
            cancel,
            handle,
        }
    }

    /// Cancel without waiting for the task to wind down
    pub fn stop(self) {
        if self.handle.is_finished() {
            tracing::debug!(kind = self.kind.as_str(), "Poller had already exited");
        }
        self.cancel.cancel();
    }

    #[cfg(test)]
    fn kind(&self) -> PollKind {
        self.kind
    }

    #[cfg(test)]
    fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel and wait until no further tick can be emitted
    #[cfg(test)]
    async fn shutdown(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::error!(kind = self.kind.as_str(), error = %e, "Poller task failed to join");
        }
    }
}

async fn poll_loop(
    kind: PollKind,
    epoch: u64,
    period: Duration,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    cancel: CancellationToken,
) {
    // First tick one period after start
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tracing::debug!(kind = kind.as_str(), epoch, period_ms = period.as_millis() as u64, "Poller started");

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                if timer_tx.send(TimerEvent::Poll { kind, epoch }).is_err() {
                    break;
                }
            }
        }
    }
    tracing::debug!(kind = kind.as_str(), epoch, "Poller stopped");
}

/// All pollers belonging to the live session
#[derive(Default)]
pub struct PollerSet {
    pollers: Vec<Poller>,
}

impl PollerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any running pollers with a fresh set for `epoch`
    pub fn start(
        &mut self,
        epoch: u64,
        intervals: PollIntervals,
        timer_tx: &mpsc::UnboundedSender<TimerEvent>,
    ) {
        self.stop_all();
        self.pollers = PollKind::ALL
            .iter()
            .map(|&kind| Poller::spawn(kind, epoch, intervals.period(kind), timer_tx.clone()))
            .collect();
    }

    pub fn stop_all(&mut self) {
        for poller in self.pollers.drain(..) {
            poller.stop();
        }
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        !self.pollers.is_empty()
    }

    #[cfg(test)]
    fn kinds(&self) -> Vec<PollKind> {
        self.pollers.iter().map(Poller::kind).collect()
    }
}

impl Drop for PollerSet {
    fn drop(&mut self) {
        self.stop_all();
    }
}
