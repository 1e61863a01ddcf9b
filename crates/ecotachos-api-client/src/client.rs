//! Backend REST client.
//!
//! - Bearer token from the shared [`Session`]
//! - 401 answers invalidate the session
//! - List endpoints accept a bare array or a paginated `{results: [...]}`
//! - Tracing spans and request metrics per operation

use std::sync::Arc;
use std::time::{Duration, Instant};

use ecotachos_models::TokenProvider;
use reqwest::multipart::Form;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Instrument};

use crate::config::ApiConfig;
use crate::error::{error_message_from_body, ApiError, ApiResult};
use crate::metrics::record_request;
use crate::session::{Session, TokenStore};

/// List body: bare array or DRF-style page.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListBody<T> {
    Plain(Vec<T>),
    Paged { results: Vec<T> },
}

impl<T> ListBody<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Plain(items) | ListBody::Paged { results: items } => items,
        }
    }
}

/// Client for the EcoTachos backend.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    config: ApiConfig,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client sharing an existing session.
    pub fn new(config: ApiConfig, session: Arc<Session>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("ecotachos-api-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ApiError::Network)?;

        Ok(Self {
            http,
            config,
            session,
        })
    }

    /// Create from environment variables, with a file-backed session.
    pub fn from_env() -> ApiResult<Self> {
        let config = ApiConfig::from_env();
        let session = Arc::new(Session::open(TokenStore::new(&config.session_file)));
        Self::new(config, session)
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    // =========================================================================
    // JSON helpers
    // =========================================================================

    pub async fn get<T: DeserializeOwned>(&self, operation: &str, path: &str) -> ApiResult<T> {
        self.execute(operation, self.request(Method::GET, path)).await
    }

    /// GET a collection, accepting either list shape.
    pub async fn get_list<T: DeserializeOwned>(&self, operation: &str, path: &str) -> ApiResult<Vec<T>> {
        let body: ListBody<T> = self.get(operation, path).await?;
        Ok(body.into_vec())
    }

    pub async fn post<B, T>(&self, operation: &str, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(operation, self.request(Method::POST, path).json(body))
            .await
    }

    pub async fn put<B, T>(&self, operation: &str, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(operation, self.request(Method::PUT, path).json(body))
            .await
    }

    pub async fn patch<B, T>(&self, operation: &str, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.execute(operation, self.request(Method::PATCH, path).json(body))
            .await
    }

    pub async fn delete(&self, operation: &str, path: &str) -> ApiResult<()> {
        let _: serde_json::Value = self
            .execute(operation, self.request(Method::DELETE, path))
            .await?;
        Ok(())
    }

    /// POST a multipart form.
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        operation: &str,
        path: &str,
        form: Form,
    ) -> ApiResult<T> {
        self.execute(operation, self.request(Method::POST, path).multipart(form))
            .await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.config.url(path));
        match self.session.bearer_token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn execute<T: DeserializeOwned>(&self, operation: &str, request: RequestBuilder) -> ApiResult<T> {
        let span = info_span!("api_request", operation = %operation);

        let start = Instant::now();
        let result = async {
            let response = request.send().await?;
            self.handle_response(response).await
        }
        .instrument(span)
        .await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(0),
        };
        record_request(operation, status, latency_ms);

        result
    }

    async fn handle_response<T: DeserializeOwned>(&self, response: Response) -> ApiResult<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.session.invalidate();
        }

        if !status.is_success() {
            let url = response.url().path().to_string();
            let body = response.text().await.unwrap_or_default();
            debug!(status = %status, url = %url, "Backend request failed");
            return Err(ApiError::from_http_status(
                status.as_u16(),
                error_message_from_body(&body),
            ));
        }

        let body = response.text().await?;
        // 204 and empty 200 bodies decode as JSON null.
        let body = if body.trim().is_empty() { "null" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}
