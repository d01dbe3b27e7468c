//! App actor - message loop processing UI events, timer events and network
//! responses

use tokio::sync::mpsc;

use crate::app::poller::{PollIntervals, PollerSet};
use crate::app::state::AppState;
use crate::config::ClientConfig;
use crate::messages::{Effect, NetworkCommand, NetworkResponse, RenderState, TimerEvent, UiEvent};

/// App actor that owns the session state and its pollers
pub struct AppActor {
    state: AppState,
    intervals: PollIntervals,
    pollers: PollerSet,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
    timer_tx: mpsc::UnboundedSender<TimerEvent>,
    timer_rx: Option<mpsc::UnboundedReceiver<TimerEvent>>,
}

impl AppActor {
    pub fn new(
        config: &ClientConfig,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        AppActor {
            state: AppState::new(config),
            intervals: PollIntervals::from_config(config),
            pollers: PollerSet::new(),
            network_tx,
            render_tx,
            timer_tx,
            timer_rx: Some(timer_rx),
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        let Some(mut timer_rx) = self.timer_rx.take() else {
            return;
        };

        // Send initial render state and load history once
        let _ = self.render_tx.send(self.state.to_render_state());
        let effects = self.state.initial_load();
        self.apply(effects);

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        self.pollers.stop_all();
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                }
                Some(response) = net_rx.recv() => {
                    let effects = self.state.handle_response(response);
                    self.apply(effects);
                }
                Some(event) = timer_rx.recv() => {
                    let effects = self.state.handle_timer(event);
                    self.apply(effects);
                }
                else => break,
            }
            let _ = self.render_tx.send(self.state.to_render_state());
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let effects = match event {
            // Session controls
            UiEvent::StartCamera => self.state.start_camera(),
            UiEvent::StopCamera => self.state.stop_camera(),

            // Data
            UiEvent::RefreshPredictions => self.state.refresh_predictions(),
            UiEvent::RefreshStatistics => self.state.refresh_statistics(),
            UiEvent::RequestClear => self.state.request_clear(),
            UiEvent::ConfirmClear => self.state.confirm_clear(),
            UiEvent::CancelClear => {
                self.state.cancel_clear();
                Vec::new()
            }

            // Predictions list
            UiEvent::ScrollUp => {
                self.state.scroll_up();
                Vec::new()
            }
            UiEvent::ScrollDown => {
                self.state.scroll_down();
                Vec::new()
            }

            // Popups
            UiEvent::ShowDiagnostics => self.state.show_diagnostics(),
            UiEvent::CloseDiagnostics => {
                self.state.close_diagnostics();
                Vec::new()
            }
            UiEvent::DismissNotice => {
                self.state.dismiss_notice();
                Vec::new()
            }
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                Vec::new()
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                Vec::new()
            }

            // System
            UiEvent::Quit => return true,
        };
        self.apply(effects);
        false
    }

    /// Carry out effects requested by the state
    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Send(cmd) => {
                    let _ = self.network_tx.send(cmd);
                }
                Effect::StartPolling { epoch } => {
                    tracing::info!(epoch, "Starting session pollers");
                    self.pollers.start(epoch, self.intervals, &self.timer_tx);
                }
                Effect::StopPolling => {
                    tracing::info!("Stopping session pollers");
                    self.pollers.stop_all();
                }
                Effect::Settle(delay) => {
                    let timer_tx = self.timer_tx.clone();
                    tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = timer_tx.send(TimerEvent::SettleElapsed);
                    });
                }
            }
        }
    }
}
