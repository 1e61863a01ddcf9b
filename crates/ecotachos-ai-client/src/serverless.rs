//! Client for the serverless detection logger.
//!
//! The logger is a separate function that records detections outside the
//! main backend. Read endpoints are best-effort and return `None` when the
//! logger is unreachable.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AiError, AiResult};
use crate::retry::{retry_linear, RetryPolicy};
use crate::types::ErrorBody;

pub const DEFAULT_SERVERLESS_URL: &str = "http://localhost:9000";

const DEFAULT_TACHO_ID: &str = "unknown";
const DEFAULT_CONFIDENCE: f64 = 0.95;

#[derive(Debug, Clone)]
pub struct ServerlessConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ServerlessConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVERLESS_URL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl ServerlessConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("SERVERLESS_URL")
                .unwrap_or_else(|_| DEFAULT_SERVERLESS_URL.to_string()),
            timeout: Duration::from_secs(
                std::env::var("SERVERLESS_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }
}

/// A detection to log. Unset fields get defaults when sent.
#[derive(Debug, Clone, Default)]
pub struct DetectionEvent {
    pub tacho_id: Option<String>,
    pub classification: String,
    /// 0-1 fraction
    pub confidence: Option<f64>,
    pub image_url: Option<String>,
    pub timestamp: Option<DateTime<Utc>>,
    pub user_id: Option<String>,
    pub location_lat: Option<f64>,
    pub location_lon: Option<f64>,
}

impl DetectionEvent {
    pub fn new(classification: impl Into<String>) -> Self {
        Self {
            classification: classification.into(),
            ..Default::default()
        }
    }

    /// Valid when it names a bin and a classification and the confidence
    /// is in `(0, 1]`.
    pub fn is_valid(&self) -> bool {
        self.tacho_id.as_deref().is_some_and(|t| !t.is_empty())
            && !self.classification.is_empty()
            && self.confidence.is_some_and(|c| c > 0.0 && c <= 1.0)
    }

    fn to_payload(&self) -> DetectionPayload<'_> {
        DetectionPayload {
            tacho_id: self
                .tacho_id
                .as_deref()
                .filter(|t| !t.is_empty())
                .unwrap_or(DEFAULT_TACHO_ID),
            classification: &self.classification,
            confidence: self
                .confidence
                .filter(|c| *c != 0.0)
                .unwrap_or(DEFAULT_CONFIDENCE),
            image_url: self.image_url.as_deref(),
            timestamp: self.timestamp.unwrap_or_else(Utc::now),
            user_id: self.user_id.as_deref(),
            location_lat: self.location_lat,
            location_lon: self.location_lon,
        }
    }
}

#[derive(Debug, Serialize)]
struct DetectionPayload<'a> {
    tacho_id: &'a str,
    classification: &'a str,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<&'a str>,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location_lon: Option<f64>,
}

/// Per-item result of [`ServerlessClient::send_batch`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchItemResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// `GET /health` of the logger.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerlessHealth {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

pub struct ServerlessClient {
    http: Client,
    config: ServerlessConfig,
}

impl ServerlessClient {
    pub fn new(config: ServerlessConfig) -> AiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AiError::Network)?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> AiResult<Self> {
        Self::new(ServerlessConfig::from_env())
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// `POST /detect`.
    pub async fn send_detection(&self, event: &DetectionEvent) -> AiResult<serde_json::Value> {
        if !event.is_valid() {
            debug!(
                classification = %event.classification,
                "Incomplete detection event, filling defaults"
            );
        }
        let payload = event.to_payload();
        debug!(
            tacho_id = payload.tacho_id,
            classification = payload.classification,
            "Sending detection to serverless logger"
        );

        let response = self.http.post(self.url("/detect")).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            return Err(AiError::Http { status, message });
        }

        Ok(response.json().await?)
    }

    /// Send each event in order. One failure does not stop the batch.
    pub async fn send_batch(&self, events: &[DetectionEvent]) -> Vec<BatchItemResult> {
        info!(count = events.len(), "Sending detection batch");
        let mut results = Vec::with_capacity(events.len());

        for event in events {
            let item = match self.send_detection(event).await {
                Ok(data) => BatchItemResult {
                    success: true,
                    data: Some(data),
                    error: None,
                },
                Err(e) => BatchItemResult {
                    success: false,
                    data: None,
                    error: Some(e.to_string()),
                },
            };
            results.push(item);
        }

        results
    }

    /// Send with the linear retry loop.
    pub async fn send_detection_with_retry(
        &self,
        event: &DetectionEvent,
        policy: &RetryPolicy,
    ) -> AiResult<serde_json::Value> {
        retry_linear(policy, || self.send_detection(event)).await
    }

    pub async fn health(&self) -> Option<ServerlessHealth> {
        self.get_optional("/health").await
    }

    pub async fn stats(&self) -> Option<serde_json::Value> {
        self.get_optional("/stats").await
    }

    pub async fn info(&self) -> Option<serde_json::Value> {
        self.get_optional("/info").await
    }

    async fn get_optional<T: serde::de::DeserializeOwned>(&self, path: &str) -> Option<T> {
        let result = async {
            let response = self.http.get(self.url(path)).send().await?.error_for_status()?;
            response.json::<T>().await
        }
        .await;

        match result {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path, error = %e, "Serverless logger unavailable");
                None
            }
        }
    }
}
