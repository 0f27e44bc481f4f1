use std::sync::{Arc, RwLock};
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::AppError;
use crate::session::SessionStore;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenPair {
    pub access: Option<String>,
    pub refresh: Option<String>,
}

/// Bearer tokens shared between the HTTP clients and the session store.
#[derive(Debug, Clone, Default)]
pub struct AuthTokens {
    inner: Arc<RwLock<TokenPair>>,
}

impl AuthTokens {
    pub fn new(pair: TokenPair) -> Self {
        Self {
            inner: Arc::new(RwLock::new(pair)),
        }
    }

    pub fn access(&self) -> Option<String> {
        self.snapshot().access
    }

    pub fn refresh(&self) -> Option<String> {
        self.snapshot().refresh
    }

    pub fn snapshot(&self) -> TokenPair {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Replaces the access token; the refresh token is only replaced when a
    /// new one is given.
    pub fn set(&self, access: String, refresh: Option<String>) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.access = Some(access);
        if refresh.is_some() {
            guard.refresh = refresh;
        }
    }

    pub fn clear(&self) {
        let mut guard = self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = TokenPair::default();
    }

    pub fn is_present(&self) -> bool {
        self.access().is_some()
    }
}

/// Shared request plumbing: URL building, bearer header, per-call timeout and
/// error extraction.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    config: ClientConfig,
    tokens: AuthTokens,
    session: Option<SessionStore>,
}

impl HttpTransport {
    pub fn new(config: ClientConfig, tokens: AuthTokens) -> Result<Self, AppError> {
        let client = Client::builder()
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build http client: {}", e)))?;
        Ok(Self {
            client,
            config,
            tokens,
            session: None,
        })
    }

    /// Also wipes the persisted tokens when the server answers 401.
    pub fn with_session_store(mut self, session: SessionStore) -> Self {
        self.session = Some(session);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &AuthTokens {
        &self.tokens
    }

    pub fn request(&self, method: Method, endpoint: &str) -> RequestBuilder {
        let url = self.config.api_url(endpoint);
        let mut builder = self
            .client
            .request(method, url)
            .header("X-Request-Id", Uuid::new_v4().to_string());
        if let Some(token) = self.tokens.access() {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Sends without looking at the status code.
    pub async fn send_unchecked(
        &self,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<Response, AppError> {
        let request = builder
            .timeout(timeout)
            .build()
            .map_err(|e| transport_error(e, timeout))?;
        debug!(method = %request.method(), url = %request.url(), "sending request");

        self.client
            .execute(request)
            .await
            .map_err(|e| transport_error(e, timeout))
    }

    pub async fn send(&self, builder: RequestBuilder, timeout: Duration) -> Result<Response, AppError> {
        let response = self.send_unchecked(builder, timeout).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(self.error_from_response(response).await)
    }

    pub async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        timeout: Duration,
    ) -> Result<T, AppError> {
        let response = self.send(builder, timeout).await?;
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(e, timeout))?;

        serde_json::from_str::<T>(&body).map_err(|e| {
            error!("Failed to parse response: {}", e);
            AppError::Decode(format!("{}: {}", e, preview(&body)))
        })
    }

    async fn error_from_response(&self, response: Response) -> AppError {
        let status = response.status();
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();

        if status == StatusCode::UNAUTHORIZED {
            warn!("{} rejected the access token, clearing it", url);
            self.tokens.clear();
            if let Some(session) = &self.session {
                if let Err(e) = session.clear().await {
                    error!("Failed to clear the stored session: {}", e);
                }
            }
            return AppError::Unauthorized;
        }

        let message = if is_json {
            serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| message_from_body(&v))
                .unwrap_or_else(|| status_text("API error", status))
        } else {
            match status {
                StatusCode::NOT_FOUND => {
                    "API endpoint not found. Please check the server configuration.".to_string()
                }
                StatusCode::INTERNAL_SERVER_ERROR => {
                    "Server error. Please check the server logs.".to_string()
                }
                _ => status_text("Server error", status),
            }
        };

        error!(status = status.as_u16(), %url, "API error: {}", message);
        AppError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Picks the human-readable message out of an error body.
pub fn message_from_body(body: &Value) -> Option<String> {
    ["error", "message", "detail"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

fn status_text(prefix: &str, status: StatusCode) -> String {
    format!(
        "{}: {} {}",
        prefix,
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> AppError {
    if err.is_timeout() {
        warn!("request timed out after {:?}", timeout);
        AppError::Timeout { after: timeout }
    } else {
        error!("request failed: {}", err);
        AppError::Network(err)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
