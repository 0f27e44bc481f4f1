use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::client::http::HttpTransport;
use crate::client::{AuthClient, AuthTokens, ExamApi, HttpExamClient, HttpModelClient, ModelApi};
use crate::config::ClientConfig;
use crate::error::AppError;
use crate::session::{SessionStore, StoredSession};

/// Everything a page or command needs: configuration, the API clients and
/// the persisted session. Built once by [`AppContext::init`].
#[derive(Clone)]
pub struct AppContext {
    pub config: ClientConfig,
    pub models: Arc<dyn ModelApi>,
    pub exams: Arc<dyn ExamApi>,
    pub auth: Arc<AuthClient>,
    pub tokens: AuthTokens,
    pub session: SessionStore,
}

impl AppContext {
    /// Opens the session store, loads persisted tokens and wires the HTTP
    /// clients to them.
    pub async fn init(config: ClientConfig) -> Result<Self, AppError> {
        let session = SessionStore::connect(&config.database_url).await?;
        Self::with_session(config, session).await
    }

    pub async fn with_session(config: ClientConfig, session: SessionStore) -> Result<Self, AppError> {
        let stored = session.load().await?;
        let tokens = AuthTokens::new(stored.tokens.clone());
        let transport =
            HttpTransport::new(config.clone(), tokens.clone())?.with_session_store(session.clone());

        info!(
            "Context ready for {} (authenticated: {})",
            config.base_url,
            stored.is_authenticated()
        );

        Ok(Self {
            models: Arc::new(HttpModelClient::new(transport.clone())),
            exams: Arc::new(HttpExamClient::new(transport.clone())),
            auth: Arc::new(AuthClient::new(transport)),
            config,
            tokens,
            session,
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.tokens.is_present()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<(), AppError> {
        let response = self.auth.login(username, password).await?;
        let user = response
            .user
            .unwrap_or_else(|| serde_json::json!({ "username": username }));
        self.persist(Some(user)).await
    }

    pub async fn refresh(&self) -> Result<(), AppError> {
        self.auth.refresh().await?;
        let user = self.session.load().await?.user;
        self.persist(user).await
    }

    /// Drops the tokens from memory and from the store.
    pub async fn logout(&self) -> Result<(), AppError> {
        self.auth.logout();
        self.session.clear().await
    }

    async fn persist(&self, user: Option<Value>) -> Result<(), AppError> {
        self.session
            .save(&StoredSession {
                user,
                tokens: self.tokens.snapshot(),
            })
            .await
    }
}
