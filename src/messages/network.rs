//! Network messages - communication between App and Network layers

use crate::models::{
    ActionReply, CameraStatus, FrameReply, GestureReply, PredictionRecord, Statistics,
};
use crate::network::FetchError;

/// Why a remote stop was issued
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Forced stop at the beginning of a start sequence
    ClearPrevious,
    /// The user asked to stop the camera
    UserRequested,
}

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Poll the latest frame for the given session epoch
    FetchFrame { epoch: u64 },
    /// Poll a gesture classification for the given session epoch
    DetectGesture { epoch: u64 },
    StartCamera,
    StopCamera { reason: StopReason },
    FetchPredictions { limit: u32 },
    FetchStatistics,
    ClearData,
    FetchCameraStatus,

    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Frame {
        epoch: u64,
        result: Result<FrameReply, FetchError>,
    },
    Gesture {
        epoch: u64,
        result: Result<GestureReply, FetchError>,
    },
    CameraStarted(Result<ActionReply, FetchError>),
    CameraStopped {
        reason: StopReason,
        result: Result<ActionReply, FetchError>,
    },
    Predictions(Result<Vec<PredictionRecord>, FetchError>),
    Statistics(Result<Statistics, FetchError>),
    DataCleared(Result<ActionReply, FetchError>),
    CameraStatus(Result<CameraStatus, FetchError>),
}

impl NetworkResponse {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkResponse::Frame { .. } => "frame",
            NetworkResponse::Gesture { .. } => "gesture",
            NetworkResponse::CameraStarted(_) => "start_camera",
            NetworkResponse::CameraStopped { .. } => "stop_camera",
            NetworkResponse::Predictions(_) => "predictions",
            NetworkResponse::Statistics(_) => "statistics",
            NetworkResponse::DataCleared(_) => "clear_data",
            NetworkResponse::CameraStatus(_) => "camera_status",
        }
    }

    /// Check if this response failed at the transport/HTTP/decode level
    pub fn is_error(&self) -> bool {
        match self {
            NetworkResponse::Frame { result, .. } => result.is_err(),
            NetworkResponse::Gesture { result, .. } => result.is_err(),
            NetworkResponse::CameraStarted(result) => result.is_err(),
            NetworkResponse::CameraStopped { result, .. } => result.is_err(),
            NetworkResponse::Predictions(result) => result.is_err(),
            NetworkResponse::Statistics(result) => result.is_err(),
            NetworkResponse::DataCleared(result) => result.is_err(),
            NetworkResponse::CameraStatus(result) => result.is_err(),
        }
    }
}
