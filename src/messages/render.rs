//! Render state - data structure sent from App layer to UI for rendering

use crate::constants::{GESTURE_NONE_YET, LABEL_START, LABEL_STOP, STATUS_IDLE};
use crate::messages::ui_events::Overlay;
use crate::models::{CameraStatus, Frame, Notice, PredictionRecord, SessionState, Statistics};

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    pub backend_url: String,

    // Session controls
    pub session: SessionState,
    pub start_enabled: bool,
    pub stop_enabled: bool,
    pub start_label: &'static str,
    pub stop_label: &'static str,
    pub status_text: String,

    // Frame display, `None` shows the placeholder
    pub frame: Option<Frame>,

    // Live gesture
    pub gesture_label: String,
    pub confidence: u8,

    // History and statistics
    pub predictions: Vec<PredictionRecord>,
    pub predictions_scroll: u16,
    pub statistics: Statistics,

    // Popups
    pub overlay: Overlay,
    pub notice: Option<Notice>,
    pub diagnostics: Option<Result<CameraStatus, String>>,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            backend_url: String::new(),
            session: SessionState::Stopped,
            start_enabled: true,
            stop_enabled: false,
            start_label: LABEL_START,
            stop_label: LABEL_STOP,
            status_text: String::from(STATUS_IDLE),
            frame: None,
            gesture_label: String::from(GESTURE_NONE_YET),
            confidence: 0,
            predictions: Vec::new(),
            predictions_scroll: 0,
            statistics: Statistics::default(),
            overlay: Overlay::None,
            notice: None,
            diagnostics: None,
        }
    }
}
