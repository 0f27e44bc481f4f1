use reqwest::Method;
use serde_json::Value;
use tracing::{info, warn};

use super::dto::{LoginRequest, RefreshRequest, TokenResponse};
use super::http::{HttpTransport, message_from_body};
use crate::error::AppError;

/// Token endpoints. Successful calls update the shared [`super::AuthTokens`].
pub struct AuthClient {
    transport: HttpTransport,
}

impl AuthClient {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<TokenResponse, AppError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::validation("Username and password are required"));
        }

        let timeout = self.transport.config().timeout;
        let builder = self
            .transport
            .request(Method::POST, "token/")
            .json(&LoginRequest { username, password });
        let response = self.transport.send_unchecked(builder, timeout).await?;

        // Bad credentials come back as 401 with a `detail`; that must not be
        // reported as an expired session.
        let status = response.status();
        if !status.is_success() {
            let body: Value = response.json().await.unwrap_or_default();
            let message = message_from_body(&body)
                .unwrap_or_else(|| "Invalid username or password".to_string());
            warn!("Login failed for {}: {}", username, message);
            return Err(AppError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let tokens: TokenResponse = response.json().await?;
        self.transport
            .tokens()
            .set(tokens.access.clone(), tokens.refresh.clone());
        info!("Logged in as {}", username);
        Ok(tokens)
    }

    pub async fn refresh(&self) -> Result<TokenResponse, AppError> {
        let refresh = self
            .transport
            .tokens()
            .refresh()
            .ok_or(AppError::Unauthorized)?;

        let timeout = self.transport.config().timeout;
        let builder = self
            .transport
            .request(Method::POST, "token/refresh/")
            .json(&RefreshRequest { refresh: &refresh });
        let tokens: TokenResponse = self.transport.send_json(builder, timeout).await?;

        self.transport
            .tokens()
            .set(tokens.access.clone(), tokens.refresh.clone());
        info!("Access token refreshed");
        Ok(tokens)
    }

    /// Forgets the in-memory tokens; persisted state is cleared by the caller.
    pub fn logout(&self) {
        self.transport.tokens().clear();
        info!("Logged out");
    }
}
