use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MOST_DETECTED_PLACEHOLDER, TIME_PLACEHOLDER};

/// Camera session lifecycle as seen by the client
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Stopped,
    Starting,
    Running,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Stopped => "stopped",
            SessionState::Starting => "starting",
            SessionState::Running => "running",
        }
    }
}

/// Steps of the start sequence
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StartPhase {
    /// Waiting for the forced stop of any previous remote session
    ClearingPrevious,
    /// Giving the backend time to release the device
    Settling,
    /// Remote start issued
    AwaitingStart,
}

/// Latest camera frame, JPEG bytes decoded from the wire payload
#[derive(Clone, Debug)]
pub struct Frame {
    pub seq: u64,
    pub jpeg: Arc<[u8]>,
}

impl Frame {
    pub fn len(&self) -> usize {
        self.jpeg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jpeg.is_empty()
    }
}

/// Last gesture classification shown to the user
#[derive(Clone, Debug, PartialEq)]
pub struct GestureEvent {
    pub label: String,
    pub confidence: u8,
    pub saved: bool,
}

/// One persisted prediction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub gesture: String,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

impl PredictionRecord {
    /// Prediction time rendered in the local time zone
    pub fn local_time_label(&self) -> String {
        match self.timestamp {
            Some(ts) => ts.with_timezone(&Local).format("%H:%M:%S").to_string(),
            None => String::from(TIME_PLACEHOLDER),
        }
    }
}

/// Accepts RFC 3339 as well as SQLite's `CURRENT_TIMESTAMP` format (UTC)
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_timestamp))
}

/// Aggregate counts as displayed
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub total_predictions: Option<u64>,
    #[serde(default)]
    pub unique_gestures: Option<u64>,
    #[serde(default)]
    pub most_detected: Option<String>,
}

impl Statistics {
    pub fn total(&self) -> u64 {
        self.total_predictions.unwrap_or(0)
    }

    pub fn unique(&self) -> u64 {
        self.unique_gestures.unwrap_or(0)
    }

    pub fn most_detected_label(&self) -> &str {
        match self.most_detected.as_deref() {
            Some(label) if !label.is_empty() => label,
            _ => MOST_DETECTED_PLACEHOLDER,
        }
    }
}

/// Backend diagnostics for the camera device
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct CameraStatus {
    #[serde(default)]
    pub camera_active: bool,
    #[serde(default)]
    pub camera_object_exists: bool,
    #[serde(default)]
    pub camera_is_running: bool,
    #[serde(default)]
    pub is_opened: bool,
    #[serde(default)]
    pub camera_index: Option<i64>,
}

/// Blocking notification raised for user-initiated failures
#[derive(Clone, Debug, PartialEq)]
pub struct Notice {
    pub title: String,
    pub message: String,
    pub hint: Option<String>,
}

impl Notice {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Notice {
            title: title.into(),
            message: message.into(),
            hint: None,
        }
    }

    pub fn with_hint(mut self, hint: Option<String>) -> Self {
        self.hint = hint.filter(|h| !h.is_empty());
        self
    }
}

// ============================================================================
// Wire bodies
// ============================================================================

/// `GET /api/frame`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FrameReply {
    #[serde(default)]
    pub frame: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// What a frame reply means for the session
#[derive(Clone, Debug, PartialEq)]
pub enum FrameSignal {
    Present(String),
    NoCamera,
    NoFrame,
    BackendError(String),
    Unknown(Option<String>),
}

impl FrameReply {
    pub fn signal(self) -> FrameSignal {
        match self.frame {
            Some(frame) if !frame.is_empty() => FrameSignal::Present(frame),
            _ => match self.status.as_deref() {
                Some("no_camera") => FrameSignal::NoCamera,
                Some("no_frame") => FrameSignal::NoFrame,
                Some("error") => FrameSignal::BackendError(
                    self.message.unwrap_or_else(|| String::from("unknown error")),
                ),
                _ => FrameSignal::Unknown(self.status),
            },
        }
    }
}

/// `POST /start_camera`, `/stop_camera`, `/api/clear_data`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ActionReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub hint: Option<String>,
}

impl ActionReply {
    /// Logical success; the backend answers 200 even when an action fails
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    pub fn message_or(&self, fallback: &str) -> String {
        self.message.clone().unwrap_or_else(|| fallback.to_string())
    }
}

/// `POST /api/detect_gesture`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GestureReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub gesture: Option<String>,
    #[serde(default)]
    pub saved: bool,
}

/// `GET /api/predictions`
#[derive(Clone, Debug, Deserialize)]
pub struct PredictionsReply {
    pub predictions: Vec<PredictionRecord>,
}

/// `GET /api/statistics`
#[derive(Clone, Debug, Deserialize)]
pub struct StatisticsReply {
    #[serde(default)]
    pub statistics: Statistics,
}
