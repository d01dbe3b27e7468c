//! # signdash
//!
//! A terminal dashboard for a sign-language gesture recognition backend.
//!
//! ## Features
//! - Camera session control (forced stop, settle, start)
//! - Live camera frame preview
//! - Live gesture label
//! - Recent prediction history and aggregate statistics
//! - History wipe with confirmation
//! - Camera diagnostics
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine + session pollers)
//! - Network Layer (Tokio runtime)

pub mod constants;
pub mod config;
pub mod models;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::{Frame, GestureEvent, PredictionRecord, SessionState, Statistics};
pub use messages::{Effect, NetworkCommand, NetworkResponse, RenderState, TimerEvent, UiEvent};
pub use app::{AppActor, AppState};
pub use network::{BackendClient, NetworkActor};
