//! AI classification HTTP client.

use std::sync::Arc;
use std::time::Instant;

use ecotachos_models::TokenProvider;
use metrics::{counter, histogram};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::AiClientConfig;
use crate::error::{AiError, AiResult};
use crate::outcome::DetectionOutcome;
use crate::retry::{retry_linear, RetryPolicy};
use crate::types::{AiHealth, DetectJsonRequest, DetectResponse, ErrorBody, ImageInput, ModelInfo};

/// AI routes, relative to the API base URL.
pub mod endpoints {
    pub const DETECT: &str = "/ia/detect/";
    pub const HEALTH: &str = "/ia/health/";
    pub const INFO: &str = "/ia/info/";
    pub const STATUS: &str = "/ia/status/";
}

/// Client for the backend's AI endpoints.
#[derive(Clone)]
pub struct AiClient {
    http: Client,
    config: AiClientConfig,
    tokens: Option<Arc<dyn TokenProvider>>,
}

impl AiClient {
    /// Create a new AI client.
    pub fn new(config: AiClientConfig) -> AiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AiError::Network)?;

        Ok(Self {
            http,
            config,
            tokens: None,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> AiResult<Self> {
        Self::new(AiClientConfig::from_env())
    }

    /// Attach a bearer token source. A 401 answer invalidates it.
    pub fn with_token_provider(mut self, tokens: Arc<dyn TokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    pub fn config(&self) -> &AiClientConfig {
        &self.config
    }

    /// Classify an image. Never fails: every failure becomes an outcome.
    pub async fn detect(&self, image: &ImageInput) -> DetectionOutcome {
        let outcome = DetectionOutcome::from_result(self.detect_raw(image).await);
        record_outcome(&outcome);
        outcome
    }

    /// Classify with the linear retry loop around the raw call.
    ///
    /// Only the final attempt's result is interpreted.
    pub async fn detect_with_retry(&self, image: &ImageInput, policy: &RetryPolicy) -> DetectionOutcome {
        let result = retry_linear(policy, || self.detect_raw(image)).await;
        let outcome = DetectionOutcome::from_result(result);
        record_outcome(&outcome);
        outcome
    }

    /// Send one detection request and return the decoded 2xx body.
    ///
    /// Data URLs go as JSON `{"imagen": ...}`; files as multipart field `imagen`.
    pub async fn detect_raw(&self, image: &ImageInput) -> AiResult<DetectResponse> {
        let url = self.config.url(endpoints::DETECT);
        let request = self.http.post(&url);

        let request = match image {
            ImageInput::DataUrl(encoded) => {
                debug!(url = %url, mime = encoded.mime_type(), "Sending detection as JSON");
                request.json(&DetectJsonRequest {
                    imagen: encoded.as_data_url(),
                })
            }
            ImageInput::File { name, mime, bytes } => {
                debug!(url = %url, file = %name, mime = %mime, "Sending detection as multipart");
                let part = Part::bytes(bytes.clone())
                    .file_name(name.clone())
                    .mime_str(mime)
                    .map_err(AiError::Network)?;
                request.multipart(Form::new().part("imagen", part))
            }
        };

        let start = Instant::now();
        let response = self.send(request).await;
        histogram!("ai_detect_latency_seconds").record(start.elapsed().as_secs_f64());

        self.decode(response?).await
    }

    /// `GET /ia/health/`.
    pub async fn health_check(&self) -> AiResult<AiHealth> {
        self.get_json(endpoints::HEALTH).await
    }

    /// `GET /ia/info/`.
    pub async fn model_info(&self) -> AiResult<ModelInfo> {
        self.get_json(endpoints::INFO).await
    }

    /// `GET /ia/status/`, returned as-is.
    pub async fn status(&self) -> AiResult<serde_json::Value> {
        self.get_json(endpoints::STATUS).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AiResult<T> {
        let url = self.config.url(path);
        let response = self.send(self.http.get(&url)).await?;
        self.decode(response).await
    }

    async fn send(&self, request: RequestBuilder) -> AiResult<Response> {
        let request = match self.tokens.as_ref().and_then(|t| t.bearer_token()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        Ok(request.send().await?)
    }

    async fn decode<T: DeserializeOwned>(&self, response: Response) -> AiResult<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            if let Some(tokens) = &self.tokens {
                info!("AI service rejected the session token, invalidating");
                tokens.invalidate();
            }
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(ErrorBody::into_message);
            warn!(status = %status, message = ?message, "AI service request failed");
            return Err(if status == StatusCode::UNAUTHORIZED && message.is_none() {
                AiError::Unauthorized
            } else {
                AiError::Http { status, message }
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AiError::InvalidResponse(e.to_string()))
    }
}

fn record_outcome(outcome: &DetectionOutcome) {
    let label = match outcome {
        DetectionOutcome::Classified(_) => "classified",
        DetectionOutcome::NoDetection { .. } => "no_detection",
        DetectionOutcome::Failed { .. } => "failed",
        DetectionOutcome::Unexpected => "unexpected",
    };
    counter!("ai_detect_total", "outcome" => label).increment(1);
}
