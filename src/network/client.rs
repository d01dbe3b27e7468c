//! HTTP client wrapper - one method per backend endpoint

use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;

use crate::models::{
    ActionReply, CameraStatus, FrameReply, GestureReply, PredictionRecord, PredictionsReply,
    Statistics, StatisticsReply,
};
use crate::network::FetchError;

/// Thin typed client over the backend's JSON API
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Self {
        BackendClient {
            http: create_client(timeout),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn frame(&self) -> Result<FrameReply, FetchError> {
        self.execute(self.http.get(self.url("/api/frame"))).await
    }

    pub async fn start_camera(&self) -> Result<ActionReply, FetchError> {
        self.execute(self.json_post("/start_camera")).await
    }

    pub async fn stop_camera(&self) -> Result<ActionReply, FetchError> {
        self.execute(self.json_post("/stop_camera")).await
    }

    /// The backend classifies its own current frame, no body is sent
    pub async fn detect_gesture(&self) -> Result<GestureReply, FetchError> {
        self.execute(self.http.post(self.url("/api/detect_gesture"))).await
    }

    pub async fn predictions(&self, limit: u32) -> Result<Vec<PredictionRecord>, FetchError> {
        let req = self
            .http
            .get(self.url("/api/predictions"))
            .query(&[("limit", limit)]);
        let reply: PredictionsReply = self.execute(req).await?;
        Ok(reply.predictions)
    }

    pub async fn statistics(&self) -> Result<Statistics, FetchError> {
        let reply: StatisticsReply = self.execute(self.http.get(self.url("/api/statistics"))).await?;
        Ok(reply.statistics)
    }

    pub async fn clear_data(&self) -> Result<ActionReply, FetchError> {
        self.execute(self.json_post("/api/clear_data")).await
    }

    pub async fn camera_status(&self) -> Result<CameraStatus, FetchError> {
        self.execute(self.http.get(self.url("/api/camera_status"))).await
    }

    fn json_post(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(self.url(path))
            .header("Content-Type", "application/json")
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        req_builder: reqwest::RequestBuilder,
    ) -> Result<T, FetchError> {
        let start = Instant::now();
        let resp = req_builder
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e))?;
        let status = resp.status().as_u16();
        let url = resp.url().path().to_string();
        let body = resp
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("Error reading body: {}", e)))?;
        tracing::trace!(%url, status, time_ms = start.elapsed().as_millis() as u64, "Response received");
        decode_body(status, &body)
    }
}

/// Map a raw HTTP status and body to a typed reply
pub fn decode_body<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, FetchError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| json.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or_else(|| body.chars().take(120).collect());
        return Err(FetchError::Status { code: status, message });
    }
    serde_json::from_str::<T>(body).map_err(|e| FetchError::Decode(e.to_string()))
}

/// Create an HTTP client, without a timeout unless configured
pub fn create_client(timeout: Option<Duration>) -> reqwest::Client {
    let mut builder = reqwest::Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().unwrap_or_else(|_| reqwest::Client::new())
}
