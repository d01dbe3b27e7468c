//! Application constants
//!
//! Centralized location for display strings and configuration defaults.

/// Default backend the dashboard talks to
pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000";

/// Environment variable overriding the backend URL
pub const BACKEND_URL_ENV: &str = "SIGNDASH_BACKEND_URL";

/// Default poll cadences (milliseconds)
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 150;
pub const DEFAULT_GESTURE_INTERVAL_MS: u64 = 200;
pub const DEFAULT_STATISTICS_INTERVAL_MS: u64 = 3000;

/// Pause between the forced stop and the fresh start, lets the backend
/// release the camera device
pub const DEFAULT_SETTLE_DELAY_MS: u64 = 1000;

/// How many recent predictions are requested per refresh
pub const DEFAULT_PREDICTIONS_LIMIT: u32 = 10;

/// In-flight request count that gets logged as a backlog, and every
/// multiple of it after that
pub const IN_FLIGHT_WARN_THRESHOLD: usize = 64;

/// Default log file (relative to the working directory)
pub const DEFAULT_LOG_FILE: &str = "signdash.log";

/// Confidence shown while a gesture is detected. The backend does not report
/// one, it saves every prediction at 0.9.
pub const DETECTED_CONFIDENCE_PERCENT: u8 = 90;

// Control labels
pub const LABEL_START: &str = "Start Camera";
pub const LABEL_STOPPING_OLD: &str = "Stopping old session...";
pub const LABEL_STARTING: &str = "Starting...";
pub const LABEL_STOP: &str = "Stop Camera";
pub const LABEL_STOPPING: &str = "Stopping...";

// Status line texts
pub const STATUS_IDLE: &str = "Camera is off. Press 's' to start.";
pub const STATUS_RUNNING: &str = "Camera is running...";
pub const STATUS_STOPPED: &str = "Camera stopped";
pub const STATUS_CAMERA_LOST: &str = "Camera not available or stopped";
pub const STATUS_NO_FRAME: &str =
    "No frame from camera (check permissions or other apps using camera)";

pub const GESTURE_NONE_YET: &str = "Waiting...";
pub const GESTURE_NONE_DETECTED: &str = "No gesture detected";

pub const EMPTY_PREDICTIONS: &str = "No predictions yet. Start camera to detect signs!";
pub const MOST_DETECTED_PLACEHOLDER: &str = "--";
pub const TIME_PLACEHOLDER: &str = "--:--:--";

pub const CLEAR_CONFIRM_PROMPT: &str =
    "Are you sure you want to delete all predictions? This cannot be undone!";
pub const CLEAR_DONE: &str = "All predictions cleared!";

/// Shown in the frame panel whenever no live frame is available
pub const PLACEHOLDER_FRAME: &str = r#"
        .----------------.
        |   .--------.   |
        |   |  (  )  |   |
        |   '--------'   |
        '----------------'

          no camera feed
"#;

/// Application name
pub const APP_NAME: &str = "signdash";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
