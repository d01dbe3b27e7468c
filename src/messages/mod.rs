//! Message types for inter-layer communication in the actor-based architecture.
//!
//! This module defines all messages that flow between the UI, App, Poller and
//! Network layers.

pub mod ui_events;
pub mod network;
pub mod render;
pub mod effects;

pub use ui_events::UiEvent;
pub use network::{NetworkCommand, NetworkResponse, StopReason};
pub use render::RenderState;
pub use effects::{Effect, PollKind, TimerEvent};
