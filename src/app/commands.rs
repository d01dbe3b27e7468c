//! Command handlers - session transitions and response processing
//!
//! Every handler mutates `AppState` and returns the effects the actor must
//! carry out. Nothing here touches the network or the clock.

use base64::Engine;

use crate::app::AppState;
use crate::constants::{
    CLEAR_DONE, DETECTED_CONFIDENCE_PERCENT, GESTURE_NONE_DETECTED, LABEL_STARTING,
    LABEL_STOPPING_OLD, STATUS_CAMERA_LOST, STATUS_IDLE, STATUS_NO_FRAME, STATUS_RUNNING,
    STATUS_STOPPED,
};
use crate::messages::{Effect, NetworkCommand, NetworkResponse, PollKind, StopReason, TimerEvent};
use crate::models::{
    ActionReply, CameraStatus, Frame, FrameReply, FrameSignal, GestureEvent, GestureReply, Notice,
    PredictionRecord, SessionState, StartPhase, Statistics,
};
use crate::network::FetchError;

impl AppState {
    // ========================
    // Session controller
    // ========================

    /// Begin a start sequence: forced remote stop, settle, remote start
    pub fn start_camera(&mut self) -> Vec<Effect> {
        if !self.start_enabled() {
            tracing::debug!(session = self.session.as_str(), "Start ignored, control disabled");
            return Vec::new();
        }
        tracing::info!("Starting camera, clearing any previous session first");
        self.session = SessionState::Starting;
        self.start_phase = Some(StartPhase::ClearingPrevious);
        self.status_text = String::from(LABEL_STOPPING_OLD);
        vec![Effect::Send(NetworkCommand::StopCamera {
            reason: StopReason::ClearPrevious,
        })]
    }

    /// Ask the backend to stop, also when already stopped
    pub fn stop_camera(&mut self) -> Vec<Effect> {
        if self.stopping || self.session == SessionState::Starting {
            tracing::debug!(session = self.session.as_str(), "Stop ignored");
            return Vec::new();
        }
        tracing::info!("Stopping camera");
        self.stopping = true;
        vec![Effect::Send(NetworkCommand::StopCamera {
            reason: StopReason::UserRequested,
        })]
    }

    /// Local transition to Stopped, halts every session poller
    fn enter_stopped(&mut self, status: &str) -> Vec<Effect> {
        self.session = SessionState::Stopped;
        self.start_phase = None;
        self.epoch += 1;
        self.feed_live = false;
        self.frame = None;
        self.status_text = status.to_string();
        vec![Effect::StopPolling]
    }

    fn on_previous_cleared(&mut self, result: Result<ActionReply, FetchError>) -> Vec<Effect> {
        if self.start_phase != Some(StartPhase::ClearingPrevious) {
            tracing::debug!("Late forced-stop response ignored");
            return Vec::new();
        }
        // Best effort only, the outcome never reaches the user
        match result {
            Ok(reply) => tracing::debug!(status = ?reply.status, message = ?reply.message, "Previous session stopped"),
            Err(e) => tracing::debug!(error = %e, "Forced stop failed, starting anyway"),
        }
        self.start_phase = Some(StartPhase::Settling);
        vec![Effect::Settle(self.settle_delay)]
    }

    fn on_settle_elapsed(&mut self) -> Vec<Effect> {
        if self.session != SessionState::Starting || self.start_phase != Some(StartPhase::Settling) {
            return Vec::new();
        }
        self.start_phase = Some(StartPhase::AwaitingStart);
        self.status_text = String::from(LABEL_STARTING);
        vec![Effect::Send(NetworkCommand::StartCamera)]
    }

    fn on_camera_started(&mut self, result: Result<ActionReply, FetchError>) -> Vec<Effect> {
        if self.start_phase != Some(StartPhase::AwaitingStart) {
            tracing::warn!("Unexpected start_camera response ignored");
            return Vec::new();
        }
        self.start_phase = None;

        match result {
            Ok(reply) if reply.is_success() => {
                self.session = SessionState::Running;
                self.epoch += 1;
                self.feed_live = true;
                self.status_text = String::from(STATUS_RUNNING);
                tracing::info!(epoch = self.epoch, message = ?reply.message, "Camera started");
                vec![
                    Effect::StartPolling { epoch: self.epoch },
                    Effect::Send(NetworkCommand::FetchPredictions {
                        limit: self.predictions_limit,
                    }),
                    Effect::Send(NetworkCommand::FetchStatistics),
                ]
            }
            Ok(reply) => {
                tracing::error!(status = ?reply.status, message = ?reply.message, "Camera start failed");
                self.session = SessionState::Stopped;
                self.status_text = String::from(STATUS_IDLE);
                let message = reply.message_or("Failed to start camera");
                self.notice = Some(Notice::new("Camera Error", message).with_hint(reply.hint));
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Camera start request failed");
                self.session = SessionState::Stopped;
                self.status_text = String::from(STATUS_IDLE);
                self.notice = Some(Notice::new("Failed to start camera", e.to_string()));
                Vec::new()
            }
        }
    }

    fn on_camera_stopped(&mut self, result: Result<ActionReply, FetchError>) -> Vec<Effect> {
        if !self.stopping {
            return Vec::new();
        }
        self.stopping = false;

        match result {
            Ok(reply) if reply.is_success() => {
                tracing::info!(message = ?reply.message, "Camera stopped");
                if self.session == SessionState::Running {
                    self.enter_stopped(STATUS_STOPPED)
                } else {
                    Vec::new()
                }
            }
            Ok(reply) => {
                tracing::error!(status = ?reply.status, message = ?reply.message, "Camera stop failed");
                self.notice = Some(Notice::new("Error", reply.message_or("Failed to stop camera")));
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Camera stop request failed");
                self.notice = Some(Notice::new("Failed to stop camera", e.to_string()));
                Vec::new()
            }
        }
    }

    // ========================
    // Pollers
    // ========================

    /// Dispatch a timer event
    pub fn handle_timer(&mut self, event: TimerEvent) -> Vec<Effect> {
        match event {
            TimerEvent::Poll { kind, epoch } => self
                .poll_command(kind, epoch)
                .map(|cmd| vec![Effect::Send(cmd)])
                .unwrap_or_default(),
            TimerEvent::SettleElapsed => self.on_settle_elapsed(),
        }
    }

    /// The request a poller tick should issue, `None` for a stale poller
    pub fn poll_command(&self, kind: PollKind, epoch: u64) -> Option<NetworkCommand> {
        if !self.is_current(epoch) {
            tracing::trace!(kind = kind.as_str(), epoch, "Stale poller tick dropped");
            return None;
        }
        Some(match kind {
            PollKind::Frame => NetworkCommand::FetchFrame { epoch },
            PollKind::Gesture => NetworkCommand::DetectGesture { epoch },
            PollKind::Statistics => NetworkCommand::FetchStatistics,
        })
    }

    fn on_frame(&mut self, epoch: u64, result: Result<FrameReply, FetchError>) -> Vec<Effect> {
        if !self.is_current(epoch) {
            tracing::trace!(epoch, current = self.epoch, "Late frame response dropped");
            return Vec::new();
        }
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(error = %e, "Frame tick skipped");
                return Vec::new();
            }
        };

        match reply.signal() {
            FrameSignal::Present(encoded) => {
                match base64::engine::general_purpose::STANDARD.decode(encoded.as_bytes()) {
                    Ok(bytes) => {
                        self.next_frame_seq += 1;
                        self.frame = Some(Frame {
                            seq: self.next_frame_seq,
                            jpeg: bytes.into(),
                        });
                        if !self.feed_live {
                            self.feed_live = true;
                            self.status_text = String::from(STATUS_RUNNING);
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "Frame payload is not valid base64"),
                }
                Vec::new()
            }
            FrameSignal::NoCamera => {
                tracing::info!("Backend reports no camera, stopping session");
                self.enter_stopped(STATUS_CAMERA_LOST)
            }
            FrameSignal::NoFrame => {
                self.feed_live = false;
                self.status_text = String::from(STATUS_NO_FRAME);
                Vec::new()
            }
            FrameSignal::BackendError(message) => {
                tracing::warn!(%message, "Backend failed to produce a frame");
                Vec::new()
            }
            FrameSignal::Unknown(status) => {
                tracing::warn!(?status, "Unexpected frame response shape");
                Vec::new()
            }
        }
    }

    fn on_gesture(&mut self, epoch: u64, result: Result<GestureReply, FetchError>) -> Vec<Effect> {
        if !self.is_current(epoch) {
            tracing::trace!(epoch, current = self.epoch, "Late gesture response dropped");
            return Vec::new();
        }
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                tracing::debug!(error = %e, "Gesture tick skipped");
                return Vec::new();
            }
        };
        if reply.status.as_deref() != Some("success") {
            tracing::warn!(status = ?reply.status, "Unexpected gesture response shape");
            return Vec::new();
        }

        match reply.gesture.filter(|g| !g.is_empty()) {
            Some(label) => {
                let saved = reply.saved;
                self.last_gesture = Some(GestureEvent {
                    label: label.clone(),
                    confidence: DETECTED_CONFIDENCE_PERCENT,
                    saved,
                });
                if saved {
                    // Statistics catch up on their own slower timer
                    tracing::info!(gesture = %label, "Gesture saved");
                    return vec![Effect::Send(NetworkCommand::FetchPredictions {
                        limit: self.predictions_limit,
                    })];
                }
            }
            None => {
                self.last_gesture = Some(GestureEvent {
                    label: String::from(GESTURE_NONE_DETECTED),
                    confidence: 0,
                    saved: false,
                });
            }
        }
        Vec::new()
    }

    // ========================
    // Data refresher
    // ========================

    /// Requests issued once when the dashboard opens
    pub fn initial_load(&self) -> Vec<Effect> {
        vec![
            Effect::Send(NetworkCommand::FetchPredictions {
                limit: self.predictions_limit,
            }),
            Effect::Send(NetworkCommand::FetchStatistics),
        ]
    }

    pub fn refresh_predictions(&self) -> Vec<Effect> {
        vec![Effect::Send(NetworkCommand::FetchPredictions {
            limit: self.predictions_limit,
        })]
    }

    pub fn refresh_statistics(&self) -> Vec<Effect> {
        vec![Effect::Send(NetworkCommand::FetchStatistics)]
    }

    fn on_predictions(&mut self, result: Result<Vec<PredictionRecord>, FetchError>) {
        match result {
            Ok(mut predictions) => {
                predictions.truncate(self.predictions_limit as usize);
                self.predictions_scroll = newest_index(&predictions) as u16;
                self.predictions = predictions;
            }
            Err(e) => tracing::warn!(error = %e, "Predictions refresh failed"),
        }
    }

    fn on_statistics(&mut self, result: Result<Statistics, FetchError>) {
        match result {
            Ok(statistics) => self.statistics = statistics,
            Err(e) => tracing::warn!(error = %e, "Statistics refresh failed"),
        }
    }

    /// Open the confirmation prompt, nothing is sent yet
    pub fn request_clear(&mut self) -> Vec<Effect> {
        if !self.clearing {
            self.confirm_clear = true;
        }
        Vec::new()
    }

    pub fn confirm_clear(&mut self) -> Vec<Effect> {
        if !self.confirm_clear {
            return Vec::new();
        }
        self.confirm_clear = false;
        self.clearing = true;
        tracing::info!("Clearing all predictions");
        vec![Effect::Send(NetworkCommand::ClearData)]
    }

    pub fn cancel_clear(&mut self) {
        self.confirm_clear = false;
    }

    fn on_data_cleared(&mut self, result: Result<ActionReply, FetchError>) {
        self.clearing = false;
        match result {
            Ok(reply) if reply.is_success() => {
                self.predictions.clear();
                self.predictions_scroll = 0;
                self.statistics = Statistics {
                    total_predictions: Some(0),
                    unique_gestures: Some(0),
                    most_detected: None,
                };
                self.notice = Some(Notice::new("Done", CLEAR_DONE));
            }
            Ok(reply) => {
                tracing::error!(message = ?reply.message, "Clearing data failed");
                self.notice = Some(Notice::new("Error", reply.message_or("Failed to clear data")));
            }
            Err(e) => {
                tracing::error!(error = %e, "Clear data request failed");
                self.notice = Some(Notice::new("Failed to clear data", e.to_string()));
            }
        }
    }

    pub fn scroll_up(&mut self) {
        self.predictions_scroll = self.predictions_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max = self.predictions.len().saturating_sub(1) as u16;
        self.predictions_scroll = self.predictions_scroll.saturating_add(1).min(max);
    }

    // ========================
    // Popups
    // ========================

    /// Open the popup in its loading state and fetch a fresh report
    pub fn show_diagnostics(&mut self) -> Vec<Effect> {
        self.show_diagnostics = true;
        self.diagnostics = None;
        vec![Effect::Send(NetworkCommand::FetchCameraStatus)]
    }

    pub fn close_diagnostics(&mut self) {
        self.show_diagnostics = false;
    }

    fn on_camera_status(&mut self, result: Result<CameraStatus, FetchError>) {
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Camera status request failed");
        }
        self.diagnostics = Some(result.map_err(|e| e.to_string()));
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    pub fn close_help(&mut self) {
        self.show_help = false;
    }

    // ========================
    // Network responses
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) -> Vec<Effect> {
        match response {
            NetworkResponse::Frame { epoch, result } => self.on_frame(epoch, result),
            NetworkResponse::Gesture { epoch, result } => self.on_gesture(epoch, result),
            NetworkResponse::CameraStarted(result) => self.on_camera_started(result),
            NetworkResponse::CameraStopped { reason, result } => match reason {
                StopReason::ClearPrevious => self.on_previous_cleared(result),
                StopReason::UserRequested => self.on_camera_stopped(result),
            },
            NetworkResponse::Predictions(result) => {
                self.on_predictions(result);
                Vec::new()
            }
            NetworkResponse::Statistics(result) => {
                self.on_statistics(result);
                Vec::new()
            }
            NetworkResponse::DataCleared(result) => {
                self.on_data_cleared(result);
                Vec::new()
            }
            NetworkResponse::CameraStatus(result) => {
                self.on_camera_status(result);
                Vec::new()
            }
        }
    }
}

/// Position of the most recent prediction, the list order is the backend's
fn newest_index(predictions: &[PredictionRecord]) -> usize {
    predictions
        .iter()
        .enumerate()
        .filter_map(|(i, p)| p.timestamp.map(|ts| (i, ts)))
        .max_by_key(|(_, ts)| *ts)
        .map(|(i, _)| i)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{EMPTY_PREDICTIONS, MOST_DETECTED_PLACEHOLDER};
    use crate::messages::ui_events::Overlay;
    use crate::models::parse_timestamp;
    use std::time::Duration;

    fn ok_action(status: &str, message: &str) -> Result<ActionReply, FetchError> {
        Ok(ActionReply {
            status: Some(status.to_string()),
            message: Some(message.to_string()),
            hint: None,
        })
    }

    fn frame_reply(frame: Option<&str>, status: &str) -> Result<FrameReply, FetchError> {
        Ok(FrameReply {
            frame: frame.map(String::from),
            status: Some(status.to_string()),
            message: None,
        })
    }

    fn gesture_reply(gesture: Option<&str>, saved: bool) -> Result<GestureReply, FetchError> {
        Ok(GestureReply {
            status: Some(String::from("success")),
            gesture: gesture.map(String::from),
            saved,
        })
    }

    fn sends(effects: &[Effect]) -> Vec<NetworkCommand> {
        effects
            .iter()
            .filter_map(|e| match e {
                Effect::Send(cmd) => Some(cmd.clone()),
                _ => None,
            })
            .collect()
    }

    /// Drive a full start sequence and return the running state
    fn running_state() -> AppState {
        let mut state = AppState::default();
        state.start_camera();
        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "Camera not running (already stopped)"),
        });
        state.handle_timer(TimerEvent::SettleElapsed);
        state.handle_response(NetworkResponse::CameraStarted(ok_action("success", "Camera started!")));
        assert_eq!(state.session, SessionState::Running);
        state
    }

    #[test]
    fn test_start_sequence() {
        let mut state = AppState::default();

        let effects = state.start_camera();
        assert_eq!(
            effects,
            vec![Effect::Send(NetworkCommand::StopCamera {
                reason: StopReason::ClearPrevious
            })]
        );
        assert_eq!(state.session, SessionState::Starting);
        assert!(!state.start_enabled());
        assert_eq!(state.to_render_state().start_label, LABEL_STOPPING_OLD);
        assert_eq!(state.status_text, LABEL_STOPPING_OLD);

        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "Camera stopped!"),
        });
        assert_eq!(effects, vec![Effect::Settle(Duration::from_millis(1000))]);

        let effects = state.handle_timer(TimerEvent::SettleElapsed);
        assert_eq!(effects, vec![Effect::Send(NetworkCommand::StartCamera)]);
        assert_eq!(state.status_text, LABEL_STARTING);

        let effects = state.handle_response(NetworkResponse::CameraStarted(ok_action("success", "Camera started!")));
        assert_eq!(state.session, SessionState::Running);
        assert_eq!(state.epoch, 1);
        assert!(state.stop_enabled());
        assert!(!state.start_enabled());
        assert_eq!(state.status_text, STATUS_RUNNING);
        assert_eq!(
            effects,
            vec![
                Effect::StartPolling { epoch: 1 },
                Effect::Send(NetworkCommand::FetchPredictions { limit: 10 }),
                Effect::Send(NetworkCommand::FetchStatistics),
            ]
        );
    }

    #[test]
    fn test_start_always_force_stops_first() {
        for _ in 0..3 {
            let mut state = running_state();
            state.stop_camera();
            state.handle_response(NetworkResponse::CameraStopped {
                reason: StopReason::UserRequested,
                result: ok_action("success", "Camera stopped!"),
            });
            let effects = state.start_camera();
            assert_eq!(
                sends(&effects),
                vec![NetworkCommand::StopCamera {
                    reason: StopReason::ClearPrevious
                }]
            );
        }
    }

    #[test]
    fn test_start_ignored_while_starting_or_running() {
        let mut state = AppState::default();
        state.start_camera();
        assert!(state.start_camera().is_empty());

        let mut state = running_state();
        assert!(state.start_camera().is_empty());
    }

    #[test]
    fn test_forced_stop_failure_is_swallowed() {
        let mut state = AppState::default();
        state.start_camera();
        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: Err(FetchError::Transport(String::from("Connection failed"))),
        });
        assert_eq!(effects, vec![Effect::Settle(Duration::from_millis(1000))]);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_start_failure_surfaces_hint() {
        let mut state = AppState::default();
        state.start_camera();
        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        state.handle_timer(TimerEvent::SettleElapsed);
        let effects = state.handle_response(NetworkResponse::CameraStarted(Ok(ActionReply {
            status: Some(String::from("error")),
            message: Some(String::from("Failed to start camera")),
            hint: Some(String::from("Check if camera is connected or already in use")),
        })));

        assert!(effects.is_empty());
        assert_eq!(state.session, SessionState::Stopped);
        assert!(state.start_enabled());
        assert_eq!(state.status_text, STATUS_IDLE);
        let notice = state.notice.clone().unwrap();
        assert_eq!(notice.title, "Camera Error");
        assert_eq!(notice.message, "Failed to start camera");
        assert_eq!(notice.hint.as_deref(), Some("Check if camera is connected or already in use"));
        assert_eq!(state.overlay(), Overlay::Notice);
    }

    #[test]
    fn test_start_transport_failure() {
        let mut state = AppState::default();
        state.start_camera();
        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        state.handle_timer(TimerEvent::SettleElapsed);
        state.handle_response(NetworkResponse::CameraStarted(Err(FetchError::Decode(String::from("eof")))));
        assert_eq!(state.session, SessionState::Stopped);
        assert_eq!(state.notice.unwrap().title, "Failed to start camera");
    }

    #[test]
    fn test_settle_before_forced_stop_is_ignored() {
        let mut state = AppState::default();
        state.start_camera();
        assert!(state.handle_timer(TimerEvent::SettleElapsed).is_empty());
        assert_eq!(state.start_phase, Some(StartPhase::ClearingPrevious));
    }

    #[test]
    fn test_stop_success() {
        let mut state = running_state();
        state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(Some("AAEC"), "success"),
        });
        assert!(state.frame.is_some());

        let effects = state.stop_camera();
        assert_eq!(
            sends(&effects),
            vec![NetworkCommand::StopCamera {
                reason: StopReason::UserRequested
            }]
        );
        assert!(!state.stop_enabled());
        assert!(state.stop_camera().is_empty());

        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::UserRequested,
            result: ok_action("success", "Camera stopped!"),
        });
        assert_eq!(effects, vec![Effect::StopPolling]);
        assert_eq!(state.session, SessionState::Stopped);
        assert!(state.frame.is_none());
        assert_eq!(state.status_text, STATUS_STOPPED);
        assert!(state.start_enabled());
        assert!(!state.stop_enabled());
    }

    #[test]
    fn test_stop_failure_keeps_session() {
        let mut state = running_state();
        state.stop_camera();
        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::UserRequested,
            result: Err(FetchError::Status {
                code: 500,
                message: String::from("Internal server error"),
            }),
        });
        assert!(effects.is_empty());
        assert_eq!(state.session, SessionState::Running);
        assert!(state.stop_enabled());
        assert!(state.poll_command(PollKind::Frame, 1).is_some());
        assert_eq!(state.notice.unwrap().title, "Failed to stop camera");
    }

    #[test]
    fn test_stop_when_already_stopped() {
        let mut state = AppState::default();
        let effects = state.stop_camera();
        assert_eq!(
            sends(&effects),
            vec![NetworkCommand::StopCamera {
                reason: StopReason::UserRequested
            }]
        );
        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::UserRequested,
            result: ok_action("success", "Camera not running (already stopped)"),
        });
        assert!(effects.is_empty());
        assert_eq!(state.session, SessionState::Stopped);
        assert_eq!(state.epoch, 0);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_frame_sequence_ends_on_camera_loss() {
        let mut state = running_state();

        state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(Some("QQ=="), "success"),
        });
        let first = state.frame.clone().unwrap();
        assert_eq!(&*first.jpeg, b"A");

        state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(Some("Qg=="), "success"),
        });
        let second = state.frame.clone().unwrap();
        assert_eq!(&*second.jpeg, b"B");
        assert!(second.seq > first.seq);

        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(None, "no_camera"),
        });
        assert_eq!(effects, vec![Effect::StopPolling]);
        assert_eq!(state.session, SessionState::Stopped);
        assert!(state.frame.is_none());
        assert_eq!(state.status_text, STATUS_CAMERA_LOST);
        assert!(state.start_enabled());
        assert!(!state.stop_enabled());
        assert!(state.poll_command(PollKind::Frame, 1).is_none());
    }

    #[test]
    fn test_no_frame_warns_and_recovers() {
        let mut state = running_state();
        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(None, "no_frame"),
        });
        assert!(effects.is_empty());
        assert_eq!(state.session, SessionState::Running);
        assert_eq!(state.status_text, STATUS_NO_FRAME);

        state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(Some("QQ=="), "success"),
        });
        assert_eq!(state.status_text, STATUS_RUNNING);
    }

    #[test]
    fn test_frame_failures_are_skipped() {
        let mut state = running_state();
        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: Err(FetchError::Decode(String::from("expected value at line 1 column 1"))),
        });
        assert!(effects.is_empty());
        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(Some("not base64 !!"), "success"),
        });
        assert!(effects.is_empty());
        assert!(state.frame.is_none());
        assert!(state.notice.is_none());
        assert_eq!(state.session, SessionState::Running);
        assert_eq!(
            state.poll_command(PollKind::Frame, 1),
            Some(NetworkCommand::FetchFrame { epoch: 1 })
        );
    }

    #[test]
    fn test_late_frame_does_not_resurrect() {
        let mut state = running_state();
        state.stop_camera();
        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::UserRequested,
            result: ok_action("success", "Camera stopped!"),
        });

        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(Some("QQ=="), "success"),
        });
        assert!(effects.is_empty());
        assert!(state.frame.is_none());
        assert_eq!(state.session, SessionState::Stopped);
        assert_eq!(state.status_text, STATUS_STOPPED);
    }

    #[test]
    fn test_stale_epoch_after_restart() {
        let mut state = running_state();
        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(None, "no_camera"),
        });
        assert_eq!(effects, vec![Effect::StopPolling]);

        // Restart into epoch 3; epoch 1 leftovers must not stop it
        state.start_camera();
        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        state.handle_timer(TimerEvent::SettleElapsed);
        state.handle_response(NetworkResponse::CameraStarted(ok_action("success", "ok")));
        assert_eq!(state.epoch, 3);

        let effects = state.handle_response(NetworkResponse::Frame {
            epoch: 1,
            result: frame_reply(None, "no_camera"),
        });
        assert!(effects.is_empty());
        assert_eq!(state.session, SessionState::Running);
        assert!(state.handle_timer(TimerEvent::Poll { kind: PollKind::Gesture, epoch: 1 }).is_empty());
        assert_eq!(
            state.handle_timer(TimerEvent::Poll { kind: PollKind::Gesture, epoch: 3 }),
            vec![Effect::Send(NetworkCommand::DetectGesture { epoch: 3 })]
        );
    }

    #[test]
    fn test_gesture_refresh_only_on_save() {
        let mut state = running_state();
        let refreshes: Vec<usize> = [
            gesture_reply(Some("A"), true),
            gesture_reply(None, false),
            gesture_reply(Some("B"), false),
        ]
        .into_iter()
        .map(|reply| {
            let effects = state.handle_response(NetworkResponse::Gesture { epoch: 1, result: reply });
            sends(&effects)
                .iter()
                .filter(|c| matches!(c, NetworkCommand::FetchPredictions { .. }))
                .count()
        })
        .collect();
        assert_eq!(refreshes, vec![1, 0, 0]);
        let render = state.to_render_state();
        assert_eq!(render.gesture_label, "B");
        assert_eq!(render.confidence, DETECTED_CONFIDENCE_PERCENT);
    }

    #[test]
    fn test_gesture_first_save_triggers_refresh() {
        let mut state = running_state();
        let effects = state.handle_response(NetworkResponse::Gesture {
            epoch: 1,
            result: gesture_reply(Some("A"), true),
        });
        assert_eq!(effects, vec![Effect::Send(NetworkCommand::FetchPredictions { limit: 10 })]);
    }

    #[test]
    fn test_no_gesture_detected() {
        let mut state = running_state();
        state.handle_response(NetworkResponse::Gesture {
            epoch: 1,
            result: gesture_reply(None, false),
        });
        let render = state.to_render_state();
        assert_eq!(render.gesture_label, GESTURE_NONE_DETECTED);
        assert_eq!(render.confidence, 0);
    }

    #[test]
    fn test_unexpected_gesture_shape_keeps_display() {
        let mut state = running_state();
        state.handle_response(NetworkResponse::Gesture {
            epoch: 1,
            result: gesture_reply(Some("HELLO"), false),
        });
        let effects = state.handle_response(NetworkResponse::Gesture {
            epoch: 1,
            result: Ok(GestureReply {
                status: Some(String::from("error")),
                gesture: None,
                saved: false,
            }),
        });
        assert!(effects.is_empty());
        assert_eq!(state.to_render_state().gesture_label, "HELLO");

        state.handle_response(NetworkResponse::Gesture {
            epoch: 1,
            result: Err(FetchError::Status {
                code: 502,
                message: String::from("Bad Gateway"),
            }),
        });
        assert_eq!(state.to_render_state().gesture_label, "HELLO");
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_predictions_render_and_scroll_to_newest() {
        let mut state = AppState::default();
        let record = |gesture: &str, ts: &str| PredictionRecord {
            id: None,
            gesture: gesture.to_string(),
            timestamp: parse_timestamp(ts),
            confidence: Some(0.9),
        };
        state.handle_response(NetworkResponse::Predictions(Ok(vec![
            record("YES", "2024-05-01 10:00:01"),
            record("NO", "2024-05-01 10:00:03"),
            record("OK", "2024-05-01 10:00:02"),
        ])));
        assert_eq!(state.predictions.len(), 3);
        assert_eq!(state.predictions_scroll, 1);

        state.scroll_down();
        state.scroll_down();
        state.scroll_down();
        assert_eq!(state.predictions_scroll, 2);
    }

    #[test]
    fn test_empty_predictions() {
        let mut state = AppState::default();
        state.handle_response(NetworkResponse::Predictions(Ok(Vec::new())));
        assert!(state.to_render_state().predictions.is_empty());
        assert_eq!(EMPTY_PREDICTIONS, "No predictions yet. Start camera to detect signs!");
    }

    #[test]
    fn test_refresh_failures_leave_data() {
        let mut state = AppState::default();
        state.handle_response(NetworkResponse::Statistics(Ok(Statistics {
            total_predictions: Some(4),
            unique_gestures: Some(2),
            most_detected: Some(String::from("YES")),
        })));
        state.handle_response(NetworkResponse::Statistics(Err(FetchError::Transport(String::from("down")))));
        assert_eq!(state.statistics.total(), 4);
        assert!(state.notice.is_none());
    }

    #[test]
    fn test_clear_requires_confirmation() {
        let mut state = AppState::default();
        assert!(state.request_clear().is_empty());
        assert_eq!(state.overlay(), Overlay::ConfirmClear);
        state.cancel_clear();
        assert_eq!(state.overlay(), Overlay::None);
        assert!(state.confirm_clear().is_empty());
    }

    #[test]
    fn test_clear_success() {
        let mut state = AppState::default();
        state.handle_response(NetworkResponse::Predictions(Ok(vec![PredictionRecord {
            id: Some(1),
            gesture: String::from("YES"),
            timestamp: None,
            confidence: None,
        }])));
        state.request_clear();
        assert_eq!(state.confirm_clear(), vec![Effect::Send(NetworkCommand::ClearData)]);

        state.handle_response(NetworkResponse::DataCleared(ok_action("success", "All data cleared!")));
        assert!(state.predictions.is_empty());
        assert_eq!(state.statistics.total(), 0);
        assert_eq!(state.statistics.most_detected_label(), MOST_DETECTED_PLACEHOLDER);
        assert_eq!(state.notice.unwrap().message, CLEAR_DONE);
    }

    #[test]
    fn test_clear_failure_keeps_data() {
        let mut state = AppState::default();
        state.handle_response(NetworkResponse::Predictions(Ok(vec![PredictionRecord {
            id: Some(1),
            gesture: String::from("YES"),
            timestamp: None,
            confidence: None,
        }])));
        state.request_clear();
        state.confirm_clear();
        state.handle_response(NetworkResponse::DataCleared(ok_action(
            "error",
            "Failed to clear data - database error",
        )));
        assert_eq!(state.predictions.len(), 1);
        let notice = state.notice.unwrap();
        assert_eq!(notice.title, "Error");
        assert_eq!(notice.message, "Failed to clear data - database error");
    }

    #[test]
    fn test_statistics_poll_only_while_running() {
        let state = AppState::default();
        assert!(state.poll_command(PollKind::Statistics, 0).is_none());
        let state = running_state();
        assert_eq!(
            state.poll_command(PollKind::Statistics, 1),
            Some(NetworkCommand::FetchStatistics)
        );
    }

    #[test]
    fn test_diagnostics() {
        let mut state = AppState::default();
        assert_eq!(
            state.show_diagnostics(),
            vec![Effect::Send(NetworkCommand::FetchCameraStatus)]
        );
        state.handle_response(NetworkResponse::CameraStatus(Err(FetchError::Transport(String::from(
            "Connection failed: refused",
        )))));
        assert_eq!(state.overlay(), Overlay::Diagnostics);
        assert_eq!(state.diagnostics, Some(Err(String::from("Connection failed: refused"))));
        state.close_diagnostics();
        assert_eq!(state.overlay(), Overlay::None);
    }

    #[test]
    fn test_diagnostics_reload_shows_loading() {
        let mut state = AppState::default();
        state.show_diagnostics();
        state.handle_response(NetworkResponse::CameraStatus(Ok(CameraStatus {
            camera_active: true,
            camera_object_exists: true,
            camera_is_running: true,
            is_opened: true,
            camera_index: Some(0),
        })));
        assert!(matches!(state.diagnostics, Some(Ok(_))));

        let effects = state.show_diagnostics();
        assert_eq!(effects, vec![Effect::Send(NetworkCommand::FetchCameraStatus)]);
        assert!(state.diagnostics.is_none());
        assert!(state.to_render_state().diagnostics.is_none());
    }

    #[test]
    fn test_stop_ignored_in_every_start_phase() {
        let mut state = AppState::default();

        state.start_camera();
        assert_eq!(state.start_phase, Some(StartPhase::ClearingPrevious));
        assert!(state.stop_camera().is_empty());
        assert!(!state.stopping);

        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        assert_eq!(state.start_phase, Some(StartPhase::Settling));
        assert!(state.stop_camera().is_empty());
        assert!(!state.stopping);

        state.handle_timer(TimerEvent::SettleElapsed);
        assert_eq!(state.start_phase, Some(StartPhase::AwaitingStart));
        assert!(state.stop_camera().is_empty());
        assert!(!state.stopping);

        // The start sequence still completes normally
        state.handle_response(NetworkResponse::CameraStarted(ok_action("success", "Camera started!")));
        assert_eq!(state.session, SessionState::Running);
        assert!(state.stop_enabled());
    }

    #[test]
    fn test_duplicate_forced_stop_reply_is_dropped() {
        let mut state = AppState::default();
        state.start_camera();
        state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        state.handle_timer(TimerEvent::SettleElapsed);

        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        assert!(effects.is_empty());
        assert_eq!(state.start_phase, Some(StartPhase::AwaitingStart));
        assert_eq!(state.session, SessionState::Starting);
        assert_eq!(state.status_text, LABEL_STARTING);

        // Also dropped once the session is running
        state.handle_response(NetworkResponse::CameraStarted(ok_action("success", "Camera started!")));
        let effects = state.handle_response(NetworkResponse::CameraStopped {
            reason: StopReason::ClearPrevious,
            result: ok_action("success", "ok"),
        });
        assert!(effects.is_empty());
        assert_eq!(state.session, SessionState::Running);
        assert_eq!(state.start_phase, None);
    }
}
