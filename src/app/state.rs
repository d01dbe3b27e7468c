//! App state - pure data structure with no I/O logic

use std::time::Duration;

use crate::config::ClientConfig;
use crate::constants::{
    GESTURE_NONE_YET, LABEL_START, LABEL_STARTING, LABEL_STOP, LABEL_STOPPING,
    LABEL_STOPPING_OLD, STATUS_IDLE,
};
use crate::messages::ui_events::Overlay;
use crate::messages::RenderState;
use crate::models::{
    CameraStatus, Frame, GestureEvent, Notice, PredictionRecord, SessionState, StartPhase,
    Statistics,
};

/// Main application state - pure data, no I/O
pub struct AppState {
    // Settings
    pub backend_url: String,
    pub predictions_limit: u32,
    pub settle_delay: Duration,

    // Session lifecycle
    pub session: SessionState,
    pub start_phase: Option<StartPhase>,
    pub stopping: bool,
    /// Bumped on every transition into or out of Running. Poll requests and
    /// responses carry the epoch they belong to.
    pub epoch: u64,
    /// A frame arrived since the last start or no_frame warning
    pub feed_live: bool,
    pub status_text: String,

    // Frame display
    pub frame: Option<Frame>,
    pub next_frame_seq: u64,

    // Live gesture
    pub last_gesture: Option<GestureEvent>,

    // History and statistics
    pub predictions: Vec<PredictionRecord>,
    pub predictions_scroll: u16,
    pub statistics: Statistics,

    // Clear flow
    pub confirm_clear: bool,
    pub clearing: bool,

    // Popups
    pub notice: Option<Notice>,
    pub show_diagnostics: bool,
    pub diagnostics: Option<Result<CameraStatus, String>>,
    pub show_help: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&ClientConfig::default())
    }
}

impl AppState {
    pub fn new(config: &ClientConfig) -> Self {
        AppState {
            backend_url: config.backend_url.clone(),
            predictions_limit: config.predictions_limit,
            settle_delay: config.settle_delay(),
            session: SessionState::Stopped,
            start_phase: None,
            stopping: false,
            epoch: 0,
            feed_live: false,
            status_text: String::from(STATUS_IDLE),
            frame: None,
            next_frame_seq: 0,
            last_gesture: None,
            predictions: Vec::new(),
            predictions_scroll: 0,
            statistics: Statistics::default(),
            confirm_clear: false,
            clearing: false,
            notice: None,
            show_diagnostics: false,
            diagnostics: None,
            show_help: false,
        }
    }

    pub fn start_enabled(&self) -> bool {
        self.session == SessionState::Stopped && !self.stopping
    }

    pub fn stop_enabled(&self) -> bool {
        self.session == SessionState::Running && !self.stopping
    }

    /// Whether a poll tagged with `epoch` belongs to the live session
    pub fn is_current(&self, epoch: u64) -> bool {
        self.session == SessionState::Running && epoch == self.epoch
    }

    /// The popup that owns the keyboard, most urgent first
    pub fn overlay(&self) -> Overlay {
        if self.notice.is_some() {
            Overlay::Notice
        } else if self.confirm_clear {
            Overlay::ConfirmClear
        } else if self.show_diagnostics {
            Overlay::Diagnostics
        } else if self.show_help {
            Overlay::Help
        } else {
            Overlay::None
        }
    }

    fn start_label(&self) -> &'static str {
        match self.start_phase {
            Some(StartPhase::ClearingPrevious) | Some(StartPhase::Settling) => LABEL_STOPPING_OLD,
            Some(StartPhase::AwaitingStart) => LABEL_STARTING,
            None => LABEL_START,
        }
    }

    fn stop_label(&self) -> &'static str {
        if self.stopping {
            LABEL_STOPPING
        } else {
            LABEL_STOP
        }
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        let (gesture_label, confidence) = match &self.last_gesture {
            Some(g) => (g.label.clone(), g.confidence),
            None => (String::from(GESTURE_NONE_YET), 0),
        };
        RenderState {
            backend_url: self.backend_url.clone(),
            session: self.session,
            start_enabled: self.start_enabled(),
            stop_enabled: self.stop_enabled(),
            start_label: self.start_label(),
            stop_label: self.stop_label(),
            status_text: self.status_text.clone(),
            frame: self.frame.clone(),
            gesture_label,
            confidence,
            predictions: self.predictions.clone(),
            predictions_scroll: self.predictions_scroll,
            statistics: self.statistics.clone(),
            overlay: self.overlay(),
            notice: self.notice.clone(),
            diagnostics: self.diagnostics.clone(),
        }
    }
}
