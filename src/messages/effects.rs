//! Effects and timer events - side effects requested by the pure app state
//! and the events timers feed back into the app actor

use std::time::Duration;

use crate::messages::NetworkCommand;

/// Which session poller produced a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollKind {
    Frame,
    Gesture,
    Statistics,
}

impl PollKind {
    pub const ALL: [PollKind; 3] = [PollKind::Frame, PollKind::Gesture, PollKind::Statistics];

    pub fn as_str(&self) -> &'static str {
        match self {
            PollKind::Frame => "frame",
            PollKind::Gesture => "gesture",
            PollKind::Statistics => "statistics",
        }
    }
}

/// Events produced by timers owned by the app actor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    /// One poller tick, tagged with the session epoch it was started for
    Poll { kind: PollKind, epoch: u64 },
    /// The settle delay of a start sequence elapsed
    SettleElapsed,
}

/// Side effects returned by `AppState` and executed by `AppActor`
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Send(NetworkCommand),
    /// Launch all session pollers for this epoch
    StartPolling { epoch: u64 },
    /// Cancel all session pollers
    StopPolling,
    /// Emit `TimerEvent::SettleElapsed` after the delay
    Settle(Duration),
}
