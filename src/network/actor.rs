//! Network actor - runs backend calls in the Tokio async runtime

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::constants::IN_FLIGHT_WARN_THRESHOLD;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::BackendClient;

/// Network actor that turns commands into backend calls
pub struct NetworkActor {
    client: BackendClient,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
}

impl NetworkActor {
    pub fn new(client: BackendClient, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Shutdown) | None => {
                            // In-flight requests are dropped with the set
                            self.active_requests.abort_all();
                            break;
                        }
                        Some(cmd) => {
                            let client = self.client.clone();
                            let response_tx = self.response_tx.clone();

                            // Every request runs on its own task, a slow one never
                            // delays the next poll
                            self.active_requests.spawn(async move {
                                if let Some(response) = execute(&client, cmd).await {
                                    if response.is_error() {
                                        tracing::debug!(kind = response.kind(), "Request failed");
                                    }
                                    let _ = response_tx.send(response);
                                }
                            });

                            let in_flight = self.active_requests.len();
                            if is_backlogged(in_flight) {
                                tracing::warn!(in_flight, "Backend is not answering, requests are piling up");
                            }
                        }
                    }
                }

                // Clean up completed tasks
                Some(result) = self.active_requests.join_next() => {
                    if let Err(e) = result {
                        if e.is_panic() {
                            tracing::error!(error = %e, "Request task panicked");
                        }
                    }
                }
            }
        }
    }
}

/// Whether `in_flight` just reached a multiple of the backlog threshold
fn is_backlogged(in_flight: usize) -> bool {
    in_flight > 0 && in_flight % IN_FLIGHT_WARN_THRESHOLD == 0
}

/// Execute a single command against the backend, `None` for control commands
pub async fn execute(client: &BackendClient, cmd: NetworkCommand) -> Option<NetworkResponse> {
    let response = match cmd {
        NetworkCommand::FetchFrame { epoch } => NetworkResponse::Frame {
            epoch,
            result: client.frame().await,
        },
        NetworkCommand::DetectGesture { epoch } => NetworkResponse::Gesture {
            epoch,
            result: client.detect_gesture().await,
        },
        NetworkCommand::StartCamera => {
            tracing::info!(url = client.base_url(), "Requesting camera start");
            NetworkResponse::CameraStarted(client.start_camera().await)
        }
        NetworkCommand::StopCamera { reason } => {
            tracing::info!(url = client.base_url(), ?reason, "Requesting camera stop");
            NetworkResponse::CameraStopped {
                reason,
                result: client.stop_camera().await,
            }
        }
        NetworkCommand::FetchPredictions { limit } => {
            NetworkResponse::Predictions(client.predictions(limit).await)
        }
        NetworkCommand::FetchStatistics => NetworkResponse::Statistics(client.statistics().await),
        NetworkCommand::ClearData => {
            tracing::info!(url = client.base_url(), "Requesting history wipe");
            NetworkResponse::DataCleared(client.clear_data().await)
        }
        NetworkCommand::FetchCameraStatus => {
            NetworkResponse::CameraStatus(client.camera_status().await)
        }
        NetworkCommand::Shutdown => return None,
    };
    Some(response)
}
